pub mod methods;
pub mod protocol;
pub mod server;

pub use server::{run_server, serve, LoggedDisplay};
