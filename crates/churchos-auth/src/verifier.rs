//! Token Verifier, the first stage of the access pipeline.

use chrono::{DateTime, Utc};
use churchos_core::{
  credential::DecodedCredential,
  identity::{IdentityProvider, ProviderError},
};

use crate::error::{AuthError, Result, UnauthenticatedReason};

/// Validates bearer credentials against an injected [`IdentityProvider`].
///
/// Holds no state besides the provider client.
pub struct TokenVerifier<P> {
  provider: P,
}

impl<P: IdentityProvider> TokenVerifier<P> {
  pub fn new(provider: P) -> Self { Self { provider } }

  pub fn provider(&self) -> &P { &self.provider }

  /// Verify `raw` against the provider at the current time.
  pub async fn verify(&self, raw: &str) -> Result<DecodedCredential> {
    self.verify_at(raw, Utc::now()).await
  }

  /// Verify `raw`, judging the local expiry check against `now`.
  pub async fn verify_at(
    &self,
    raw: &str,
    now: DateTime<Utc>,
  ) -> Result<DecodedCredential> {
    let outcome = self.check(raw, now).await;
    match &outcome {
      Ok(credential) => {
        tracing::info!(subject = %credential.subject, "token verified");
      }
      Err(AuthError::Unauthenticated(reason)) => {
        tracing::warn!(%reason, "token rejected");
      }
      Err(e) => tracing::error!(error = %e, "token verification failed"),
    }
    outcome
  }

  async fn check(
    &self,
    raw: &str,
    now: DateTime<Utc>,
  ) -> Result<DecodedCredential> {
    let raw = raw.trim();
    if raw.is_empty() {
      return Err(AuthError::Unauthenticated(UnauthenticatedReason::Malformed));
    }

    let credential = self
      .provider
      .verify_id_token(raw)
      .await
      .map_err(|e| AuthError::Unauthenticated(provider_reason(&e)))?;

    if credential.subject.trim().is_empty() {
      return Err(AuthError::Unauthenticated(
        UnauthenticatedReason::MissingSubject,
      ));
    }

    // The provider checks expiry too; this check runs regardless.
    if credential.is_expired_at(now) {
      return Err(AuthError::Unauthenticated(UnauthenticatedReason::Expired));
    }

    Ok(credential)
  }
}

fn provider_reason(err: &ProviderError) -> UnauthenticatedReason {
  match err {
    ProviderError::Expired => UnauthenticatedReason::Expired,
    ProviderError::Revoked => UnauthenticatedReason::Revoked,
    ProviderError::Malformed | ProviderError::SignatureInvalid => {
      UnauthenticatedReason::Malformed
    }
    ProviderError::Other(detail) => {
      tracing::debug!(%detail, "identity provider error");
      UnauthenticatedReason::ProviderError
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Duration;

  use super::*;
  use crate::testing::ScriptedProvider;

  fn reason(err: AuthError) -> UnauthenticatedReason {
    match err {
      AuthError::Unauthenticated(r) => r,
      other => panic!("expected Unauthenticated, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn valid_token_yields_claims() {
    let provider = ScriptedProvider::new()
      .accept("tok", DecodedCredential::new("uid-1").with_email("a@b.com"));
    let verifier = TokenVerifier::new(provider);

    let claims = verifier.verify("tok").await.unwrap();
    assert_eq!(claims.subject, "uid-1");
    assert_eq!(claims.email.as_deref(), Some("a@b.com"));
  }

  #[tokio::test]
  async fn empty_credential_never_reaches_provider() {
    let provider = ScriptedProvider::new();
    let verifier = TokenVerifier::new(provider);

    let err = verifier.verify("   ").await.unwrap_err();
    assert_eq!(reason(err), UnauthenticatedReason::Malformed);
    assert_eq!(verifier.provider().calls(), 0);
  }

  #[tokio::test]
  async fn provider_failures_map_to_reasons() {
    let provider = ScriptedProvider::new()
      .reject("expired", ProviderError::Expired)
      .reject("revoked", ProviderError::Revoked)
      .reject("garbage", ProviderError::Malformed)
      .reject("forged", ProviderError::SignatureInvalid)
      .reject("down", ProviderError::Other("503".into()));
    let verifier = TokenVerifier::new(provider);

    let cases = [
      ("expired", UnauthenticatedReason::Expired),
      ("revoked", UnauthenticatedReason::Revoked),
      ("garbage", UnauthenticatedReason::Malformed),
      ("forged", UnauthenticatedReason::Malformed),
      ("down", UnauthenticatedReason::ProviderError),
    ];
    for (token, expected) in cases {
      let err = verifier.verify(token).await.unwrap_err();
      assert_eq!(reason(err), expected, "token {token}");
    }
  }

  #[tokio::test]
  async fn empty_subject_is_rejected() {
    let provider =
      ScriptedProvider::new().accept("tok", DecodedCredential::new(""));
    let verifier = TokenVerifier::new(provider);

    let err = verifier.verify("tok").await.unwrap_err();
    assert_eq!(reason(err), UnauthenticatedReason::MissingSubject);
  }

  #[tokio::test]
  async fn past_expiry_is_rejected_locally() {
    let now = Utc::now();
    let provider = ScriptedProvider::new().accept(
      "tok",
      DecodedCredential::new("uid-1").with_expiry(now - Duration::seconds(5)),
    );
    let verifier = TokenVerifier::new(provider);

    let err = verifier.verify_at("tok", now).await.unwrap_err();
    assert_eq!(reason(err), UnauthenticatedReason::Expired);
  }

  #[tokio::test]
  async fn expiry_equal_to_now_is_rejected() {
    let now = Utc::now();
    let provider = ScriptedProvider::new()
      .accept("tok", DecodedCredential::new("uid-1").with_expiry(now));
    let verifier = TokenVerifier::new(provider);

    let err = verifier.verify_at("tok", now).await.unwrap_err();
    assert_eq!(reason(err), UnauthenticatedReason::Expired);
  }

  #[tokio::test]
  async fn future_expiry_passes() {
    let now = Utc::now();
    let provider = ScriptedProvider::new().accept(
      "tok",
      DecodedCredential::new("uid-1").with_expiry(now + Duration::minutes(5)),
    );
    let verifier = TokenVerifier::new(provider);

    assert!(verifier.verify_at("tok", now).await.is_ok());
  }
}
