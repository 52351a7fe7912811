use crate::state::AppState;
use axum::Router;

mod claims;
pub(crate) mod extractors;
pub mod handlers;
mod identity;
pub mod jwt;

pub use extractors::AuthUser;
pub use identity::Identity;
pub use jwt::JwtKeys;

pub fn router() -> Router<AppState> {
    handlers::me_routes()
}
