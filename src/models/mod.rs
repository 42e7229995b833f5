pub mod app_token;
pub mod auth_token;
pub mod record;
