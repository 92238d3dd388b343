//! A single live ban page socket

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use folio_core::VisitorId;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::protocol::{CloseCode, GatewayMessage};

/// What the writer half of the socket should do next
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Frame(GatewayMessage),
    /// Flush, then close with this code
    Close(CloseCode),
}

pub struct Connection {
    session_id: String,

    /// `None` for an anonymous ban page
    visitor_id: Option<VisitorId>,

    sender: mpsc::Sender<Outbound>,

    /// Last dispatch sequence sent
    sequence: AtomicU64,

    last_heartbeat: Mutex<Instant>,

    created_at: Instant,
}

impl Connection {
    pub fn new(
        session_id: String,
        visitor_id: Option<VisitorId>,
        sender: mpsc::Sender<Outbound>,
    ) -> Arc<Self> {
        Arc::new(Self {
            session_id,
            visitor_id,
            sender,
            sequence: AtomicU64::new(0),
            last_heartbeat: Mutex::new(Instant::now()),
            created_at: Instant::now(),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn visitor_id(&self) -> Option<VisitorId> {
        self.visitor_id
    }

    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    pub fn record_heartbeat(&self) {
        *self.last_heartbeat.lock() = Instant::now();
    }

    pub fn time_since_heartbeat(&self) -> Duration {
        self.last_heartbeat.lock().elapsed()
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Queue a frame for the socket
    pub async fn send(&self, message: GatewayMessage) -> Result<(), mpsc::error::SendError<Outbound>> {
        self.sender.send(Outbound::Frame(message)).await
    }

    /// Queue a DISPATCH frame with the next sequence number
    pub async fn dispatch(
        &self,
        event_type: &str,
        data: Value,
    ) -> Result<(), mpsc::error::SendError<Outbound>> {
        let message = GatewayMessage::dispatch(event_type, self.next_sequence(), data);
        self.send(message).await
    }

    /// Close once everything queued so far has been written
    pub async fn close(&self, code: CloseCode) -> Result<(), mpsc::error::SendError<Outbound>> {
        self.sender.send(Outbound::Close(code)).await
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("visitor_id", &self.visitor_id)
            .field("sequence", &self.sequence.load(Ordering::SeqCst))
            .field("created_at", &self.created_at)
            .finish()
    }
}
