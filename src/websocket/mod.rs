//! WebSocket layer: connection lifecycle and wire frame types.

mod handler;
mod message;

pub use handler::ws_handler;
pub use message::{ClientFrame, ServerEvent};
