pub mod analyzers;
pub mod error;
pub mod grid;
pub mod loader;
pub mod pipeline;
pub mod render;
pub mod server;
