//! Development reverse proxy for the parsing and model servers.

mod error;
mod handlers;
mod proxy;
mod router;
mod server;

pub use error::GatewayError;
pub use proxy::Upstreams;
pub use server::GatewayServer;
