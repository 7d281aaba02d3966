pub mod handlers;
pub mod page;
pub mod routes;
pub mod server;
pub mod state;

pub use routes::create_router;
pub use server::{serve, start_server_with_shutdown};
pub use state::AppState;
