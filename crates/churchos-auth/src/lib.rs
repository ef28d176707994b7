//! Authentication and authorization for CHURCHOS.
//!
//! Every protected request runs the same three-stage pipeline:
//!
//! 1. [`TokenVerifier`] checks the bearer credential with the identity
//!    provider and produces a [`DecodedCredential`].
//! 2. [`UserDirectory`] maps the credential's subject to a [`Principal`],
//!    provisioning one on first login.
//! 3. The role hierarchy decides admission.
//!
//! [`AccessGuard`] composes the three. It is generic over the identity
//! provider and the principal store, both of which are injected at startup.
//!
//! [`DecodedCredential`]: churchos_core::credential::DecodedCredential
//! [`Principal`]: churchos_core::principal::Principal

pub mod directory;
pub mod error;
pub mod guard;
pub mod jwt;
pub mod verifier;

pub use directory::UserDirectory;
pub use error::{AuthError, ResolutionFailure, Result, UnauthenticatedReason};
pub use guard::{AccessGuard, Admission, AdmissionMode};
pub use jwt::{IdentityConfig, JwtIdentityProvider, SigningAlgorithm};
pub use verifier::TokenVerifier;

#[cfg(test)]
mod testing;
