pub mod approval_service;
pub mod credential;
pub mod general_user_service;
pub mod profile_faker;

pub use approval_service::ApprovalService;
pub use credential::{Argon2CredentialVerifier, CredentialVerifier, PlainCredentialVerifier};
pub use general_user_service::GeneralUserService;
pub use profile_faker::RandomProfileSynthesizer;
