use std::fmt;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use hmac::{Hmac, Mac};
pub use joingate_core::types::TOKEN_DELIMITER;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// URL-safe base64 that never emits padding and accepts input with or
/// without it, so tokens survive transports that strip trailing `=`.
const B64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Why a token failed to resolve.
///
/// Only for logs. Users are shown a single generic "invalid link" message
/// whatever the variant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The signing secret is empty.
    #[error("signing secret must not be empty")]
    EmptySecret,

    /// The secret could not be used as an HMAC key.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    /// Not valid base64url, not UTF-8, or an empty payload.
    #[error("malformed token")]
    Malformed,

    /// The decoded token has no payload/signature delimiter.
    #[error("token has no signature delimiter")]
    MissingDelimiter,

    /// The signature does not match the payload.
    #[error("token signature mismatch")]
    BadSignature,
}

/// Issues and resolves signed tokens with a single service secret.
///
/// Cheap to clone. The [`Debug`] implementation is redacted.
#[derive(Clone)]
pub struct TokenCodec {
    mac: HmacSha256,
}

impl TokenCodec {
    /// Create a codec keyed by `secret`.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, TokenError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| TokenError::InvalidKey(e.to_string()))?;
        Ok(Self { mac })
    }

    /// Create a codec from a configuration secret.
    pub fn from_secret(secret: &SecretString) -> Result<Self, TokenError> {
        Self::new(secret.expose_secret().as_bytes())
    }

    /// base64url (unpadded) HMAC-SHA256 of `payload`.
    fn sign(&self, payload: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        B64URL.encode(mac.finalize().into_bytes())
    }

    /// Encode `file_id` into a signed, URL-safe token.
    #[must_use]
    pub fn issue(&self, file_id: &str) -> String {
        let signature = self.sign(file_id);
        let raw = format!("{file_id}{TOKEN_DELIMITER}{signature}");
        B64URL.encode(raw.as_bytes())
    }

    /// Recover the file identifier from `token`, or `None` if the token is
    /// malformed or its signature does not verify.
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<String> {
        self.resolve_detailed(token).ok()
    }

    /// Like [`resolve`](Self::resolve), but reports why a token was rejected.
    pub fn resolve_detailed(&self, token: &str) -> Result<String, TokenError> {
        let bytes = B64URL
            .decode(token.trim())
            .map_err(|_| TokenError::Malformed)?;
        let raw = String::from_utf8(bytes).map_err(|_| TokenError::Malformed)?;

        let (payload, signature) = raw
            .rsplit_once(TOKEN_DELIMITER)
            .ok_or(TokenError::MissingDelimiter)?;
        if payload.is_empty() {
            return Err(TokenError::Malformed);
        }

        let expected = self.sign(payload);
        if bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            Ok(payload.to_owned())
        } else {
            Err(TokenError::BadSignature)
        }
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenCodec([REDACTED])")
    }
}

/// Issue a token for `file_id` under `secret`.
pub fn issue_token(secret: &[u8], file_id: &str) -> Result<String, TokenError> {
    Ok(TokenCodec::new(secret)?.issue(file_id))
}

/// Resolve `token` under `secret`; `None` for any invalid token or secret.
#[must_use]
pub fn resolve_token(secret: &[u8], token: &str) -> Option<String> {
    TokenCodec::new(secret).ok()?.resolve(token)
}
