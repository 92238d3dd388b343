//! Op code handlers

mod error;
mod heartbeat;

pub use error::{HandlerError, HandlerResult};
pub use heartbeat::HeartbeatHandler;

use std::sync::Arc;

use crate::connection::Connection;
use crate::protocol::{CloseCode, GatewayMessage, OpCode};

/// Routes client frames to their handler
pub struct MessageDispatcher;

impl MessageDispatcher {
    /// `Ok(Some(code))` asks the caller to close the socket
    pub async fn dispatch(
        connection: &Arc<Connection>,
        message: GatewayMessage,
    ) -> HandlerResult<Option<CloseCode>> {
        if !message.op.is_client_op() {
            tracing::warn!(
                session_id = %connection.session_id(),
                op = %message.op,
                "Received server-only op code from client"
            );
            return Ok(Some(CloseCode::UnknownOpcode));
        }

        match message.op {
            OpCode::Heartbeat => {
                let seq = message.as_heartbeat_seq().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid Heartbeat payload".to_string())
                })?;
                HeartbeatHandler::handle(connection, seq).await
            }
            _ => {
                tracing::error!(op = %message.op, "Unhandled client op code");
                Ok(Some(CloseCode::UnknownOpcode))
            }
        }
    }
}
