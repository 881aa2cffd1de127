mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::{AppState, Phase, ViewEvent, ViewState};
