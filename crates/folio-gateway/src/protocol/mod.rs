//! Gateway protocol definitions
//!
//! Op codes, the frame format, and close codes.

mod close_codes;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::CloseCode;
pub use messages::GatewayMessage;
pub use opcodes::OpCode;
pub use payloads::{HelloPayload, DEFAULT_HEARTBEAT_INTERVAL};
