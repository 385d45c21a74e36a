//! gs2-identifier: client for the GS2-Identifier service
//!
//! Manages users, their GSIs (client ID / client secret pairs) and the security
//! policies attached to them. Every operation is a single signed REST call.
//!
//! ```no_run
//! use gs2_identifier::{ClientConfig, Gs2Credentials, IdentifierClient};
//! use gs2_identifier::models::GetUserRequest;
//!
//! # async fn run() -> Result<(), gs2_identifier::IdentifierError> {
//! let creds = Gs2Credentials::new("client-id", "c2VjcmV0");
//! let client = IdentifierClient::new(creds, ClientConfig::new("ap-northeast-1"))?;
//! let user = client.get_user(&GetUserRequest::new("alice")).await?;
//! println!("{}", user.user_id);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
// Signed HTTP transport behind the Transport trait
pub mod transport;

pub use auth::Gs2Credentials;
pub use client::IdentifierClient;
pub use config::ClientConfig;
pub use error::{IdentifierError, TransportError};
