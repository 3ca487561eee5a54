pub mod auth;
pub mod export;
pub mod pipeline;
pub mod policy;
pub mod responses;
pub mod router;
pub mod state;
pub mod templates;

pub use responses::{ApiMessage, json_error};
pub use state::AppState;
