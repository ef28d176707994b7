//! JWT identity-provider client.
//!
//! Verifies ID tokens signed either with a shared secret (HS256) or with the
//! provider's RSA key (RS256), optionally pinning issuer and audience. Built
//! once from [`IdentityConfig`] at startup and handed to the access guard.

use chrono::DateTime;
use churchos_core::{
  credential::DecodedCredential,
  identity::{IdentityProvider, ProviderError},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use serde::Deserialize;
use thiserror::Error;

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SigningAlgorithm {
  #[default]
  #[serde(rename = "HS256", alias = "hs256")]
  Hs256,
  #[serde(rename = "RS256", alias = "rs256")]
  Rs256,
}

/// Identity-provider settings, deserialised from the `identity` table of
/// `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
  #[serde(default)]
  pub algorithm:      SigningAlgorithm,
  /// Shared secret for HS256.
  pub secret:         Option<String>,
  /// PEM-encoded RSA public key for RS256.
  pub public_key_pem: Option<String>,
  pub issuer:         Option<String>,
  pub audience:       Option<String>,
  /// Clock skew tolerated by the provider-side `exp` check.
  #[serde(default = "default_leeway")]
  pub leeway_secs:    u64,
}

fn default_leeway() -> u64 { 60 }

impl IdentityConfig {
  pub fn hs256(secret: impl Into<String>) -> Self {
    Self {
      algorithm:      SigningAlgorithm::Hs256,
      secret:         Some(secret.into()),
      public_key_pem: None,
      issuer:         None,
      audience:       None,
      leeway_secs:    default_leeway(),
    }
  }
}

#[derive(Debug, Error)]
pub enum JwtConfigError {
  #[error("identity.secret is required for HS256")]
  MissingSecret,

  #[error("identity.public_key_pem is required for RS256")]
  MissingPublicKey,

  #[error("invalid identity key: {0}")]
  InvalidKey(#[from] jsonwebtoken::errors::Error),
}

// ─── Claims ──────────────────────────────────────────────────────────────────

/// The subset of ID-token claims the access layer reads.
///
/// Providers disagree on where the subject and name live, so every known
/// spelling is accepted separately.
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
  sub:          Option<String>,
  uid:          Option<String>,
  user_id:      Option<String>,
  email:        Option<String>,
  name:         Option<String>,
  display_name: Option<String>,
  exp:          Option<i64>,
}

impl IdTokenClaims {
  fn into_credential(self) -> DecodedCredential {
    DecodedCredential {
      subject:      self.sub.or(self.uid).or(self.user_id).unwrap_or_default(),
      email:        self.email,
      display_name: self.name.or(self.display_name),
      expires_at:   self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0)),
    }
  }
}

// ─── Provider ────────────────────────────────────────────────────────────────

pub struct JwtIdentityProvider {
  key:        DecodingKey,
  validation: Validation,
}

impl JwtIdentityProvider {
  pub fn from_config(config: &IdentityConfig) -> Result<Self, JwtConfigError> {
    let (algorithm, key) = match config.algorithm {
      SigningAlgorithm::Hs256 => {
        let secret = config
          .secret
          .as_deref()
          .filter(|s| !s.is_empty())
          .ok_or(JwtConfigError::MissingSecret)?;
        (Algorithm::HS256, DecodingKey::from_secret(secret.as_bytes()))
      }
      SigningAlgorithm::Rs256 => {
        let pem = config
          .public_key_pem
          .as_deref()
          .ok_or(JwtConfigError::MissingPublicKey)?;
        (Algorithm::RS256, DecodingKey::from_rsa_pem(pem.as_bytes())?)
      }
    };

    let mut validation = Validation::new(algorithm);
    validation.leeway = config.leeway_secs;
    validation.validate_exp = true;
    if let Some(issuer) = &config.issuer {
      validation.set_issuer(&[issuer]);
    }
    match &config.audience {
      Some(audience) => validation.set_audience(&[audience]),
      None => validation.validate_aud = false,
    }

    Ok(Self { key, validation })
  }
}

impl IdentityProvider for JwtIdentityProvider {
  async fn verify_id_token(
    &self,
    raw: &str,
  ) -> Result<DecodedCredential, ProviderError> {
    let data =
      jsonwebtoken::decode::<IdTokenClaims>(raw, &self.key, &self.validation)
        .map_err(|e| provider_error(&e))?;
    Ok(data.claims.into_credential())
  }
}

fn provider_error(err: &jsonwebtoken::errors::Error) -> ProviderError {
  match err.kind() {
    ErrorKind::ExpiredSignature => ProviderError::Expired,
    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
      ProviderError::SignatureInvalid
    }
    ErrorKind::InvalidToken
    | ErrorKind::Base64(_)
    | ErrorKind::Json(_)
    | ErrorKind::Utf8(_)
    | ErrorKind::MissingRequiredClaim(_)
    | ErrorKind::InvalidIssuer
    | ErrorKind::InvalidAudience
    | ErrorKind::ImmatureSignature => ProviderError::Malformed,
    _ => ProviderError::Other(err.to_string()),
  }
}
