pub mod auth;
pub mod error;
pub mod extract;
pub mod geo;
pub mod notify;
pub mod response;
pub mod routes;
pub mod state;
pub mod validate;

pub use routes::build_router;
pub use state::{ApiSettings, AppState};
