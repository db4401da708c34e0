pub mod auth;
pub mod email;
pub mod favorite;
pub mod follow;
pub mod like;
pub mod post;
pub mod token;
pub mod user;
