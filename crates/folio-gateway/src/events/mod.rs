//! Gateway events
//!
//! Ban page updates as DISPATCH event types and payloads.

mod event_types;
mod payloads;

pub use event_types::BanPageEventType;
pub use payloads::{encode_update, EncodeError, RenderPayload, TransitioningPayload, UnbannedPayload};
