//! # Webhook Verification
//!
//! Authenticity checks for inbound webhooks:
//!
//! - [`HubSignatureVerifier`]: `X-Hub-Signature` style HMAC-SHA1 over the raw body,
//!   rendered as `sha1=<lowercase hex>`.
//! - [`SharedTokenVerifier`]: equality of a token carried in the payload or URL
//!   against the configured secret.
//!
//! All comparisons run in constant time with respect to the compared contents.

use crate::secrets::SecretValue;
use crate::ConfigurationError;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;

type HmacSha1 = Hmac<Sha1>;

/// Outcome of comparing a received signature with the expected one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureCheck {
    Verified,
    /// Carries the locally computed signature for diagnostics
    Mismatch { computed: String },
}

/// Verifies `sha1=` HMAC signatures computed with a shared secret
#[derive(Debug, Clone)]
pub struct HubSignatureVerifier {
    secret: SecretValue,
}

impl HubSignatureVerifier {
    pub fn new(secret: SecretValue) -> Self {
        Self { secret }
    }

    /// Compute `"sha1=" + hex(HMAC-SHA1(secret, raw))`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::InvalidSecret`] when the key is rejected by the MAC.
    pub fn sign(&self, raw: &[u8]) -> Result<String, ConfigurationError> {
        let mut mac = HmacSha1::new_from_slice(self.secret.expose_bytes()).map_err(|_| {
            ConfigurationError::InvalidSecret {
                name: "GITHUB_WEBHOOK_SECRET".to_string(),
            }
        })?;
        mac.update(raw);

        Ok(format!("sha1={}", hex::encode(mac.finalize().into_bytes())))
    }

    /// Compare `received` against the signature of `raw`.
    ///
    /// Nothing verifies while the secret is unset.
    pub fn verify(&self, raw: &[u8], received: &str) -> Result<SignatureCheck, ConfigurationError> {
        let computed = self.sign(raw)?;

        if !self.secret.is_empty() && constant_time_eq(computed.as_bytes(), received.as_bytes()) {
            Ok(SignatureCheck::Verified)
        } else {
            Ok(SignatureCheck::Mismatch { computed })
        }
    }
}

/// Verifies a plain shared token
#[derive(Debug, Clone)]
pub struct SharedTokenVerifier {
    token: SecretValue,
}

impl SharedTokenVerifier {
    pub fn new(token: SecretValue) -> Self {
        Self { token }
    }

    /// Nothing verifies while the token is unset
    pub fn verify(&self, candidate: &str) -> bool {
        !self.token.is_empty() && constant_time_eq(self.token.expose_bytes(), candidate.as_bytes())
    }
}

/// Constant-time byte comparison.
///
/// Slices of different length compare unequal without inspecting contents;
/// only the length is disclosed.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

#[cfg(test)]
#[path = "verification_tests.rs"]
mod tests;
