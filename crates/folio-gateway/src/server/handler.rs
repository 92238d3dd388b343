//! WebSocket handler
//!
//! One ban page session per socket. The writer task owns the sink; the
//! session, reader, and heartbeat monitor all queue through the connection.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use folio_core::VisitorId;
use folio_service::{BanPageOrchestrator, BanPageParams, BanPageQuery, BanPageSession, BanPageUpdate};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::interval;

use crate::connection::{Connection, Outbound};
use crate::events::encode_update;
use crate::handlers::MessageDispatcher;
use crate::protocol::{CloseCode, GatewayMessage};
use crate::server::GatewayState;

const MESSAGE_BUFFER_SIZE: usize = 64;

/// Time the writer gets to flush a close frame
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Live ban page for a visitor
///
/// GET /ban/{visitor_id}/live?reason=&policyReference=&category=&severity=
pub async fn live_handler(
    State(state): State<GatewayState>,
    Path(raw_id): Path<String>,
    Query(query): Query<BanPageQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let visitor_id = match raw_id.parse::<VisitorId>() {
        Ok(id) => id,
        Err(_) => {
            return (StatusCode::BAD_REQUEST, format!("Invalid visitor id: {raw_id}")).into_response();
        }
    };

    let params = BanPageParams::from_query(Some(visitor_id), &query);
    ws.on_upgrade(move |socket| handle_socket(state, socket, params))
}

/// Live ban page without a visitor; follows design changes only
///
/// GET /ban/live
pub async fn anonymous_live_handler(
    State(state): State<GatewayState>,
    Query(query): Query<BanPageQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let params = BanPageParams::from_query(None, &query);
    ws.on_upgrade(move |socket| handle_socket(state, socket, params))
}

async fn handle_socket(state: GatewayState, socket: WebSocket, params: BanPageParams) {
    let session_id = uuid::Uuid::new_v4().to_string();
    let visitor_id = params.visitor_id;

    let (tx, rx) = mpsc::channel::<Outbound>(MESSAGE_BUFFER_SIZE);
    let connection = state
        .connection_manager()
        .add_connection(session_id.clone(), visitor_id, tx);

    tracing::info!(session_id = %session_id, ?visitor_id, "Ban page connected");
    set_presence(&state, visitor_id, true).await;

    let (mut ws_sink, ws_stream) = socket.split();

    let hello = GatewayMessage::hello(state.hello());
    let hello_sent = match hello.to_json() {
        Ok(json) => ws_sink.send(Message::Text(json)).await.is_ok(),
        Err(_) => false,
    };
    if !hello_sent {
        tracing::warn!(session_id = %session_id, "Failed to send Hello message");
        cleanup_connection(&state, &connection).await;
        return;
    }

    let session = BanPageOrchestrator::new(state.service_context())
        .start(params)
        .await;

    let mut session_task = tokio::spawn(forward_session(session, connection.clone()));
    let mut send_task = tokio::spawn(write_frames(ws_sink, rx, session_id.clone()));
    let mut recv_task = tokio::spawn(read_frames(ws_stream, connection.clone()));
    let mut heartbeat_task = tokio::spawn(monitor_heartbeat(
        connection.clone(),
        state.config().ban_page.heartbeat_interval(),
        state.config().ban_page.heartbeat_timeout(),
    ));

    tokio::select! {
        _ = &mut send_task => {
            tracing::debug!(session_id = %session_id, "Send task ended");
        }
        result = &mut recv_task => {
            if let Ok(Some(code)) = result {
                tracing::debug!(session_id = %session_id, close_code = %code, "Closing connection");
                let _ = connection.close(code).await;
            }
        }
        _ = &mut heartbeat_task => {
            let _ = connection.close(CloseCode::SessionTimeout).await;
        }
    }

    if !send_task.is_finished() {
        let _ = tokio::time::timeout(CLOSE_GRACE, &mut send_task).await;
    }

    session_task.abort();
    send_task.abort();
    recv_task.abort();
    heartbeat_task.abort();

    cleanup_connection(&state, &connection).await;
}

/// Stream session updates to the socket, starting with the initial view
async fn forward_session(mut session: BanPageSession, connection: Arc<Connection>) {
    let initial = BanPageUpdate::Render(session.initial().clone());
    let mut next = Some(initial);

    while let Some(update) = next {
        let (event, payload) = match encode_update(&update) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(session_id = %connection.session_id(), error = %e, "Dropping update");
                next = session.next().await;
                continue;
            }
        };

        if connection.dispatch(event.as_str(), payload).await.is_err() {
            return;
        }
        if event.is_terminal() {
            let _ = connection.close(CloseCode::Normal).await;
            return;
        }

        next = session.next().await;
    }
}

async fn write_frames(
    mut ws_sink: futures_util::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<Outbound>,
    session_id: String,
) {
    while let Some(outbound) = rx.recv().await {
        match outbound {
            Outbound::Frame(message) => {
                let Ok(json) = message.to_json() else {
                    continue;
                };
                if ws_sink.send(Message::Text(json)).await.is_err() {
                    tracing::warn!(session_id = %session_id, "Failed to send message to WebSocket");
                    break;
                }
            }
            Outbound::Close(code) => {
                let frame = CloseFrame {
                    code: code.as_u16(),
                    reason: code.description().into(),
                };
                let _ = ws_sink.send(Message::Close(Some(frame))).await;
                break;
            }
        }
    }

    let _ = ws_sink.close().await;
}

/// Returns the close code to use, or `None` when the client went away
async fn read_frames(
    mut ws_stream: futures_util::stream::SplitStream<WebSocket>,
    connection: Arc<Connection>,
) -> Option<CloseCode> {
    while let Some(msg) = ws_stream.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Err(code) = handle_text_message(&connection, &text).await {
                    return Some(code);
                }
            }
            Ok(Message::Binary(_)) => {
                tracing::debug!(session_id = %connection.session_id(), "Binary messages not supported");
                return Some(CloseCode::DecodeError);
            }
            Ok(Message::Ping(_) | Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                tracing::info!(session_id = %connection.session_id(), "Client closed connection");
                return None;
            }
            Err(e) => {
                tracing::warn!(session_id = %connection.session_id(), error = %e, "WebSocket error");
                return None;
            }
        }
    }
    None
}

/// Returns once the client has been silent for longer than `timeout`
async fn monitor_heartbeat(connection: Arc<Connection>, heartbeat: Duration, timeout: Duration) {
    // tokio panics on a zero period
    let mut check_interval = interval((heartbeat / 2).max(Duration::from_millis(1)));
    loop {
        check_interval.tick().await;

        let time_since = connection.time_since_heartbeat();
        if time_since > timeout {
            tracing::warn!(
                session_id = %connection.session_id(),
                time_since_ms = time_since.as_millis(),
                "Connection timed out (no heartbeat)"
            );
            return;
        }
    }
}

async fn handle_text_message(connection: &Arc<Connection>, text: &str) -> Result<(), CloseCode> {
    let message = GatewayMessage::from_json(text).map_err(|e| {
        tracing::debug!(session_id = %connection.session_id(), error = %e, "Failed to parse message");
        CloseCode::DecodeError
    })?;

    match MessageDispatcher::dispatch(connection, message).await {
        Ok(Some(code)) => Err(code),
        Ok(None) => Ok(()),
        Err(e) => {
            tracing::warn!(session_id = %connection.session_id(), error = %e, "Handler error");
            Err(e.to_close_code())
        }
    }
}

async fn set_presence(state: &GatewayState, visitor_id: Option<VisitorId>, online: bool) {
    let Some(visitor_id) = visitor_id else {
        return;
    };
    if let Err(e) = state
        .service_context()
        .presence()
        .set_online(visitor_id, online)
        .await
    {
        tracing::warn!(%visitor_id, online, error = %e, "Failed to update presence");
    }
}

async fn cleanup_connection(state: &GatewayState, connection: &Arc<Connection>) {
    tracing::info!(
        session_id = %connection.session_id(),
        age_ms = connection.age().as_millis(),
        "Ban page disconnected"
    );

    let remaining = state
        .connection_manager()
        .remove_connection(connection.session_id());

    // Offline once the visitor's last tab is gone
    if remaining == Some(0) {
        set_presence(state, connection.visitor_id(), false).await;
    }
}
