mod settings;

pub use settings::{ChatConfig, ServerConfig, Settings, WebSocketConfig};
