mod auth;
mod slash;

pub use auth::{authorize, handle_panic, require_role};
pub use slash::redirect_slashes;
