//! Events - live document feed items and change notifications

mod document_event;

pub use document_event::{DocumentChange, DocumentEvent};
