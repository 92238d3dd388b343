//! Connection manager
//!
//! All live sockets, indexed by session and by visitor, in `DashMap`s.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use folio_core::VisitorId;
use tokio::sync::mpsc;

use super::{Connection, Outbound};

pub struct ConnectionManager {
    /// Active connections by session ID
    connections: DashMap<String, Arc<Connection>>,

    /// Visitor to session IDs; a visitor may have several tabs open
    visitor_connections: DashMap<VisitorId, HashSet<String>>,
}

impl ConnectionManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            visitor_connections: DashMap::new(),
        }
    }

    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection
    pub fn add_connection(
        &self,
        session_id: String,
        visitor_id: Option<VisitorId>,
        sender: mpsc::Sender<Outbound>,
    ) -> Arc<Connection> {
        let connection = Connection::new(session_id.clone(), visitor_id, sender);
        self.connections.insert(session_id.clone(), connection.clone());

        if let Some(visitor_id) = visitor_id {
            self.visitor_connections
                .entry(visitor_id)
                .or_default()
                .insert(session_id.clone());
        }

        tracing::debug!(session_id = %session_id, ?visitor_id, "Connection added");
        connection
    }

    /// Remove a connection; returns how many sockets its visitor still has open
    pub fn remove_connection(&self, session_id: &str) -> Option<usize> {
        let (_, connection) = self.connections.remove(session_id)?;
        tracing::debug!(session_id = %session_id, "Connection removed");

        let visitor_id = connection.visitor_id()?;
        let remaining = self
            .visitor_connections
            .get_mut(&visitor_id)
            .map(|mut sessions| {
                sessions.remove(session_id);
                sessions.len()
            })
            .unwrap_or(0);

        self.visitor_connections
            .remove_if(&visitor_id, |_, sessions| sessions.is_empty());
        Some(remaining)
    }

    pub fn get_connection(&self, session_id: &str) -> Option<Arc<Connection>> {
        self.connections.get(session_id).map(|r| r.clone())
    }

    pub fn get_visitor_connections(&self, visitor_id: VisitorId) -> Vec<Arc<Connection>> {
        self.visitor_connections
            .get(&visitor_id)
            .map(|sessions| {
                sessions
                    .iter()
                    .filter_map(|id| self.get_connection(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn visitor_count(&self) -> usize {
        self.visitor_connections.len()
    }

    pub fn has_session(&self, session_id: &str) -> bool {
        self.connections.contains_key(session_id)
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.connections.len())
            .field("visitors", &self.visitor_connections.len())
            .finish()
    }
}
