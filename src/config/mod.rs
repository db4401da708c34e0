pub mod database;
pub mod email;
pub mod rate_limit;
pub mod security;
