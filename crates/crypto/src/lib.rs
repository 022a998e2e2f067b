//! Signed deep-link tokens for joingate.
//!
//! A token carries a file identifier together with an HMAC-SHA256 tag over
//! it, laid out as:
//!
//! ```text
//! base64url_nopad( file_id "." base64url_nopad( HMAC-SHA256(secret, file_id) ) )
//! ```
//!
//! Tokens are stateless: validity is decided purely by recomputing the tag
//! with the service secret. There is no expiry and no revocation list.
//!
//! ```rust
//! use joingate_crypto::TokenCodec;
//!
//! let codec = TokenCodec::new(b"service-secret").unwrap();
//! let token = codec.issue("3f2a9c0d4e5b6a7c8d9e0f1a2b3c4d5e");
//! assert_eq!(codec.resolve(&token).as_deref(), Some("3f2a9c0d4e5b6a7c8d9e0f1a2b3c4d5e"));
//! ```

pub mod token;

// Re-export for consumers so they don't need a direct `secrecy` dependency.
pub use secrecy::{ExposeSecret, SecretString};
pub use token::{TOKEN_DELIMITER, TokenCodec, TokenError, issue_token, resolve_token};
