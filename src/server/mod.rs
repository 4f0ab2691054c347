pub mod config;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use server::{make_app, run_server};
