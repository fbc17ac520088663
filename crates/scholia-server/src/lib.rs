pub mod handlers;
pub mod pipeline;
pub mod routes;
pub mod state;

pub use pipeline::analyze_upload;
pub use routes::create_router;
pub use state::{AppState, RecordRegistry};
