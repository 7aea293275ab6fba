//! Fixtures shared by the in-crate tests.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use bullion_shared::token::TokenService;

use crate::models::{BullionSiteInfo, DeviceType, GeneralUser, GeneralUserInfo};
use crate::repos::memory::{MemoryGeneralUserRepo, MemoryGeneralUserReqRepo};
use crate::repos::{
    BullionSiteInfoRepository, GeneralUserRepository, GeneralUserReqRepository, Repositories,
};
use crate::services::{
    ApprovalService, CredentialVerifier, GeneralUserService, PlainCredentialVerifier,
    RandomProfileSynthesizer,
};

pub const TEST_SECRET: &[u8] = b"test-signing-key-0123456789";
pub const TEST_ISSUER: &str = "bullion-test";

pub fn complete_profile() -> GeneralUser {
    GeneralUser {
        first_name: "Asha".into(),
        last_name: "Mehta".into(),
        firm_name: "Mehta Jewellers".into(),
        contact_number: "9876543210".into(),
        gst_number: "27ABCDE1234F1Z5".into(),
        os: "android 14".into(),
        device_id: "device-1".into(),
        device_type: Some(DeviceType::Android),
        random_pass: "0123456789abcdef".into(),
        is_auto: false,
        registration_incomplete: false,
    }
}

/// Wire payload for a complete caller-supplied profile.
pub fn profile_payload() -> serde_json::Value {
    json!({
        "firstName": "Asha",
        "lastName": "Mehta",
        "firmName": "Mehta Jewellers",
        "contactNumber": "9876543210",
        "gstNumber": "27ABCDE1234F1Z5",
        "os": "android 14",
        "deviceId": "device-1",
        "deviceType": "android",
    })
}

pub struct Harness {
    pub repos: Repositories,
    pub tokens: Arc<TokenService>,
    pub approvals: Arc<ApprovalService>,
    pub users: GeneralUserService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_credentials(Arc::new(PlainCredentialVerifier))
    }

    pub fn with_credentials(credentials: Arc<dyn CredentialVerifier>) -> Self {
        Self::with_parts(
            Arc::new(MemoryGeneralUserRepo::default()),
            Arc::new(MemoryGeneralUserReqRepo::default()),
            credentials,
        )
    }

    pub fn with_parts(
        general_users: Arc<dyn GeneralUserRepository>,
        general_user_reqs: Arc<dyn GeneralUserReqRepository>,
        credentials: Arc<dyn CredentialVerifier>,
    ) -> Self {
        let repos = Repositories {
            general_users,
            general_user_reqs,
            ..Repositories::in_memory()
        };
        let tokens = Arc::new(TokenService::new(TEST_SECRET, TEST_ISSUER));
        let approvals = Arc::new(ApprovalService::new(
            repos.general_user_reqs.clone(),
            tokens.clone(),
            60,
            600,
        ));
        let users = GeneralUserService::new(
            repos.general_users.clone(),
            repos.bullion_site_infos.clone(),
            approvals.clone(),
            tokens.clone(),
            credentials,
            Arc::new(RandomProfileSynthesizer),
        );
        Self { repos, tokens, approvals, users }
    }

    /// Store a new bullion site with the given general-user policy.
    pub async fn bullion(&self, auto_login: bool, auto_approve: bool) -> BullionSiteInfo {
        let short = Uuid::new_v4().simple().to_string();
        let site = BullionSiteInfo::new(
            format!("Bullion {short}"),
            format!("{short}.example"),
            short.clone(),
            GeneralUserInfo { auto_approve, auto_login },
        );
        self.repos
            .bullion_site_infos
            .save(&site)
            .await
            .expect("save bullion site")
    }
}
