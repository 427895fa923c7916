// Shared infrastructure
pub mod config;
pub mod error;

// Core: registry + fan-out
pub mod broadcast;
pub mod registry;

// Domain state
pub mod store;

// Application layer
pub mod api;
pub mod server;
pub mod websocket;
