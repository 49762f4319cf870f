pub mod tenant;
pub mod client;
pub mod user;
pub mod session;
pub mod code;
pub mod token;
pub mod sign_key;
pub mod admin;

pub use tenant::Tenant;
pub use client::{Client, RedirectUri, PostLogoutRedirectUri};
pub use user::{User, Credential, PasswordCredential};
pub use session::Session;
pub use code::AuthorizationCode;
pub use token::{AccessToken, RefreshToken, IdToken};
pub use sign_key::SignKey;
pub use admin::{AdminUser, AdminSession};
