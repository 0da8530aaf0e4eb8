pub mod auth;
pub mod deploy;
pub mod placeholders;
pub mod policies;
