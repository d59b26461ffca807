//! Web layer for the airport lookup service.
//!
//! Provides JSON endpoints for looking up airports by IATA code, ident or
//! primary id.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
