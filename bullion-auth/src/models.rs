use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use bullion_shared::types::auth::UserRole;

// --- Base entity ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BaseEntity {
    #[validate(custom = "validate_entity_id")]
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for BaseEntity {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::nil(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl BaseEntity {
    pub fn new() -> Self {
        let mut base = Self::default();
        base.create_new_id();
        base
    }

    pub fn create_new_id(&mut self) {
        let now = Utc::now();
        self.id = Uuid::new_v4();
        self.created_at = now;
        self.updated_at = now;
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn validate_entity_id(id: &Uuid) -> Result<(), ValidationError> {
    if id.is_nil() {
        let mut err = ValidationError::new("id");
        err.message = Some("entity id has not been assigned".into());
        return Err(err);
    }
    Ok(())
}

// --- General users ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Ios,
    Android,
    Windows,
    Mac,
    Web,
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeviceType::Ios => "ios",
            DeviceType::Android => "android",
            DeviceType::Windows => "windows",
            DeviceType::Mac => "mac",
            DeviceType::Web => "web",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ios" => Ok(DeviceType::Ios),
            "android" => Ok(DeviceType::Android),
            "windows" => Ok(DeviceType::Windows),
            "mac" => Ok(DeviceType::Mac),
            "web" => Ok(DeviceType::Web),
            _ => Err(format!("unknown device type: {s}")),
        }
    }
}

/// Profile of a general (end) user of a bullion site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GeneralUser {
    #[validate(length(min = 1, max = 100, message = "first name must be 1 to 100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "last name must be 1 to 100 characters"))]
    pub last_name: String,
    #[validate(length(min = 1, max = 255, message = "firm name must be 1 to 255 characters"))]
    pub firm_name: String,
    #[validate(custom = "validate_contact_number")]
    pub contact_number: String,
    #[validate(custom = "validate_gst_number")]
    pub gst_number: String,
    #[validate(length(min = 1, max = 50, message = "os must be 1 to 50 characters"))]
    pub os: String,
    #[validate(length(min = 1, max = 255, message = "device id must be 1 to 255 characters"))]
    pub device_id: String,
    #[validate(required(message = "device type is required"))]
    pub device_type: Option<DeviceType>,
    #[validate(length(min = 8, message = "credential is too short"))]
    pub random_pass: String,
    pub is_auto: bool,
    #[serde(default)]
    pub registration_incomplete: bool,
}

/// 10 to 12 ASCII digits.
fn validate_contact_number(value: &str) -> Result<(), ValidationError> {
    let ok = (10..=12).contains(&value.len()) && value.chars().all(|c| c.is_ascii_digit());
    if !ok {
        let mut err = ValidationError::new("contact_number");
        err.message = Some("contact number must be 10 to 12 digits".into());
        return Err(err);
    }
    Ok(())
}

/// GSTIN layout: 2 digits, 5 letters, 4 digits, 1 letter, 1 alnum, `Z`, 1 alnum.
pub fn is_gst_number(value: &str) -> bool {
    let b = value.as_bytes();
    b.len() == 15
        && b[0..2].iter().all(u8::is_ascii_digit)
        && b[2..7].iter().all(u8::is_ascii_uppercase)
        && b[7..11].iter().all(u8::is_ascii_digit)
        && b[11].is_ascii_uppercase()
        && (b[12].is_ascii_digit() || b[12].is_ascii_uppercase())
        && b[13] == b'Z'
        && (b[14].is_ascii_digit() || b[14].is_ascii_uppercase())
}

fn validate_gst_number(value: &str) -> Result<(), ValidationError> {
    if !is_gst_number(value) {
        let mut err = ValidationError::new("gst_number");
        err.message = Some("gst number is not a valid GSTIN".into());
        return Err(err);
    }
    Ok(())
}

/// Caller supplied profile fields. Present fields replace the base profile's.
///
/// The credential, `isAuto` and identity fields are deliberately absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralUserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub firm_name: Option<String>,
    pub contact_number: Option<String>,
    pub gst_number: Option<String>,
    pub os: Option<String>,
    pub device_id: Option<String>,
    pub device_type: Option<DeviceType>,
}

impl GeneralUserPatch {
    pub fn apply(self, user: &mut GeneralUser) {
        fn set(target: &mut String, value: Option<String>) {
            if let Some(v) = value {
                *target = v;
            }
        }

        set(&mut user.first_name, self.first_name);
        set(&mut user.last_name, self.last_name);
        set(&mut user.firm_name, self.firm_name);
        set(&mut user.contact_number, self.contact_number);
        set(&mut user.gst_number, self.gst_number);
        set(&mut user.os, self.os);
        set(&mut user.device_id, self.device_id);
        if self.device_type.is_some() {
            user.device_type = self.device_type;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GeneralUserEntity {
    #[serde(flatten)]
    #[validate]
    pub base: BaseEntity,
    #[serde(flatten)]
    #[validate]
    pub user: GeneralUser,
    pub role: UserRole,
}

impl GeneralUserEntity {
    pub fn new(user: GeneralUser) -> Self {
        Self {
            base: BaseEntity::default(),
            user,
            role: UserRole::GeneralUser,
        }
    }

    pub fn id(&self) -> Uuid {
        self.base.id
    }
}

// --- Approval requests ---

/// Lifecycle of a general user's request to access a bullion site.
///
/// Values read back from storage that match no known state decode to
/// `Unknown` instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GeneralUserAuthStatus {
    Requested,
    Authorized,
    Rejected,
    Unknown(String),
}

impl GeneralUserAuthStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Requested => "REQUESTED",
            Self::Authorized => "AUTHORIZED",
            Self::Rejected => "REJECTED",
            Self::Unknown(s) => s,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Authorized | Self::Rejected)
    }

    /// Only `Requested -> Authorized | Rejected` is a valid move.
    pub fn can_transition_to(&self, next: &GeneralUserAuthStatus) -> bool {
        matches!(self, Self::Requested) && next.is_terminal()
    }
}

impl From<String> for GeneralUserAuthStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "REQUESTED" => Self::Requested,
            "AUTHORIZED" => Self::Authorized,
            "REJECTED" => Self::Rejected,
            _ => Self::Unknown(value),
        }
    }
}

impl From<GeneralUserAuthStatus> for String {
    fn from(status: GeneralUserAuthStatus) -> Self {
        match status {
            GeneralUserAuthStatus::Unknown(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for GeneralUserAuthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GeneralUserReq {
    #[serde(flatten)]
    #[validate]
    pub base: BaseEntity,
    pub general_user_id: Uuid,
    pub bullion_id: Uuid,
    pub status: GeneralUserAuthStatus,
}

impl GeneralUserReq {
    pub fn new(general_user_id: Uuid, bullion_id: Uuid, status: GeneralUserAuthStatus) -> Self {
        Self {
            base: BaseEntity::new(),
            general_user_id,
            bullion_id,
            status,
        }
    }

    pub fn id(&self) -> Uuid {
        self.base.id
    }
}

// --- Bullion sites (tenants) ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralUserInfo {
    pub auto_approve: bool,
    pub auto_login: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BullionSiteInfo {
    #[serde(flatten)]
    pub base: BaseEntity,
    pub name: String,
    pub domain: String,
    pub short_name: String,
    pub general_user_info: GeneralUserInfo,
}

impl BullionSiteInfo {
    pub fn new(
        name: impl Into<String>,
        domain: impl Into<String>,
        short_name: impl Into<String>,
        general_user_info: GeneralUserInfo,
    ) -> Self {
        Self {
            base: BaseEntity::new(),
            name: name.into(),
            domain: domain.into(),
            short_name: short_name.into(),
            general_user_info,
        }
    }

    pub fn id(&self) -> Uuid {
        self.base.id
    }
}

// --- Bank details ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    #[serde(flatten)]
    pub base: BaseEntity,
    pub bullion_id: Uuid,
    pub account_holder_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub bank_name: String,
    pub branch_name: String,
}

// --- OTP requests ---

/// Stored one-time-password challenge for a bullion site's phone login.
// No route issues OTPs yet; kept as the stored record for OTP login.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OtpReq {
    #[serde(flatten)]
    #[validate]
    pub base: BaseEntity,
    pub bullion_id: Uuid,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 10, max = 12))]
    pub number: String,
    pub attempt: i16,
    pub expires_at: DateTime<Utc>,
    #[validate(length(min = 1))]
    pub otp: String,
}

#[allow(dead_code)]
impl OtpReq {
    pub fn new(
        bullion_id: Uuid,
        name: impl Into<String>,
        number: impl Into<String>,
        otp: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        let base = BaseEntity::new();
        let expires_at = base.created_at + ttl;
        Self {
            base,
            bullion_id,
            name: name.into(),
            number: number.into(),
            attempt: 0,
            expires_at,
            otp: otp.into(),
        }
    }

    pub fn new_attempt(&mut self) {
        self.attempt += 1;
        self.base.touch();
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}
