//! Visitor ID - UUID assigned to every portfolio visitor
//!
//! The id travels in URLs (`/{uuid}`, `/ban/{uuid}`) and keys the visitor
//! document. Parsing is the validation boundary: anything that is not a
//! UUID is rejected before it reaches a repository.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::DomainError;

/// Visitor identifier (UUID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorId(Uuid);

impl VisitorId {
    /// Wrap an existing UUID
    #[inline]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a fresh random visitor id
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    #[inline]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }

    /// Path of the visitor's portfolio page
    pub fn portfolio_path(&self) -> String {
        format!("/{}", self.0)
    }
}

impl FromStr for VisitorId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| DomainError::InvalidVisitorId(s.to_string()))
    }
}

impl TryFrom<&str> for VisitorId {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Uuid> for VisitorId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_uuid() {
        let id: VisitorId = "6f1c2a52-9f59-4c8e-a3a6-1f2b3c4d5e6f".parse().unwrap();
        assert_eq!(id.to_string(), "6f1c2a52-9f59-4c8e-a3a6-1f2b3c4d5e6f");
        assert_eq!(
            id.portfolio_path(),
            "/6f1c2a52-9f59-4c8e-a3a6-1f2b3c4d5e6f"
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = "not-a-uuid".parse::<VisitorId>().unwrap_err();
        assert!(err.is_validation());
        assert!("".parse::<VisitorId>().is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = VisitorId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));

        let parsed: VisitorId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
