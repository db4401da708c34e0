pub mod auth;
pub mod favorite;
pub mod follow;
pub mod like;
pub mod post;
pub mod user;

pub use auth::{get_current_user, login, register};
