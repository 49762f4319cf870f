pub mod auth;
pub mod client;
pub mod incident;
pub mod key;
pub mod tenant;
