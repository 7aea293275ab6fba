use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use bullion_shared::clients::db::DbPool;
use bullion_shared::errors::{AppError, AppResult, ErrorCode};
use bullion_shared::types::auth::UserRole;

use super::{BankDetailsRepository, BullionSiteInfoRepository, GeneralUserRepository, GeneralUserReqRepository};
use crate::models::{
    BankDetails, BaseEntity, BullionSiteInfo, DeviceType, GeneralUser, GeneralUserAuthStatus, GeneralUserEntity,
    GeneralUserInfo, GeneralUserReq,
};
use crate::schema::{bank_details, bullion_site_infos, general_user_reqs, general_users};

type PgConn = diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<diesel::pg::PgConnection>>;

fn conn(pool: &DbPool) -> AppResult<PgConn> {
    pool.get().map_err(|e| AppError::internal(e.to_string()))
}

fn base(id: Uuid, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> BaseEntity {
    BaseEntity { id, created_at, updated_at }
}

// --- General users ---

#[derive(Debug, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = general_users)]
struct GeneralUserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    firm_name: String,
    contact_number: String,
    gst_number: String,
    os: String,
    device_id: String,
    device_type: Option<String>,
    random_pass: String,
    is_auto: bool,
    registration_incomplete: bool,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&GeneralUserEntity> for GeneralUserRow {
    fn from(e: &GeneralUserEntity) -> Self {
        Self {
            id: e.base.id,
            first_name: e.user.first_name.clone(),
            last_name: e.user.last_name.clone(),
            firm_name: e.user.firm_name.clone(),
            contact_number: e.user.contact_number.clone(),
            gst_number: e.user.gst_number.clone(),
            os: e.user.os.clone(),
            device_id: e.user.device_id.clone(),
            device_type: e.user.device_type.map(|d| d.to_string()),
            random_pass: e.user.random_pass.clone(),
            is_auto: e.user.is_auto,
            registration_incomplete: e.user.registration_incomplete,
            role: e.role.to_string(),
            created_at: e.base.created_at,
            updated_at: e.base.updated_at,
        }
    }
}

impl TryFrom<GeneralUserRow> for GeneralUserEntity {
    type Error = AppError;

    fn try_from(row: GeneralUserRow) -> Result<Self, Self::Error> {
        let device_type: Option<DeviceType> = row
            .device_type
            .map(|d| d.parse())
            .transpose()
            .map_err(AppError::internal)?;
        let role: UserRole = row.role.parse().map_err(AppError::internal)?;

        Ok(Self {
            base: base(row.id, row.created_at, row.updated_at),
            user: GeneralUser {
                first_name: row.first_name,
                last_name: row.last_name,
                firm_name: row.firm_name,
                contact_number: row.contact_number,
                gst_number: row.gst_number,
                os: row.os,
                device_id: row.device_id,
                device_type,
                random_pass: row.random_pass,
                is_auto: row.is_auto,
                registration_incomplete: row.registration_incomplete,
            },
            role,
        })
    }
}

pub struct PgGeneralUserRepo {
    pool: DbPool,
}

impl PgGeneralUserRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GeneralUserRepository for PgGeneralUserRepo {
    async fn save(&self, entity: &GeneralUserEntity) -> AppResult<GeneralUserEntity> {
        let mut conn = conn(&self.pool)?;
        let row = GeneralUserRow::from(entity);

        let saved: GeneralUserRow = diesel::insert_into(general_users::table)
            .values(&row)
            .on_conflict(general_users::id)
            .do_update()
            .set(&row)
            .returning(GeneralUserRow::as_returning())
            .get_result(&mut conn)?;

        saved.try_into()
    }

    async fn find_one(&self, id: Uuid) -> AppResult<Option<GeneralUserEntity>> {
        let mut conn = conn(&self.pool)?;
        let row: Option<GeneralUserRow> = general_users::table
            .find(id)
            .select(GeneralUserRow::as_select())
            .first(&mut conn)
            .optional()?;
        row.map(GeneralUserEntity::try_from).transpose()
    }
}

// --- Approval requests ---

#[derive(Debug, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = general_user_reqs)]
struct GeneralUserReqRow {
    id: Uuid,
    general_user_id: Uuid,
    bullion_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&GeneralUserReq> for GeneralUserReqRow {
    fn from(e: &GeneralUserReq) -> Self {
        Self {
            id: e.base.id,
            general_user_id: e.general_user_id,
            bullion_id: e.bullion_id,
            status: e.status.to_string(),
            created_at: e.base.created_at,
            updated_at: e.base.updated_at,
        }
    }
}

impl From<GeneralUserReqRow> for GeneralUserReq {
    fn from(row: GeneralUserReqRow) -> Self {
        Self {
            base: base(row.id, row.created_at, row.updated_at),
            general_user_id: row.general_user_id,
            bullion_id: row.bullion_id,
            status: GeneralUserAuthStatus::from(row.status),
        }
    }
}

pub struct PgGeneralUserReqRepo {
    pool: DbPool,
}

impl PgGeneralUserReqRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GeneralUserReqRepository for PgGeneralUserReqRepo {
    async fn find_one(&self, id: Uuid) -> AppResult<Option<GeneralUserReq>> {
        let mut conn = conn(&self.pool)?;
        let row: Option<GeneralUserReqRow> = general_user_reqs::table
            .find(id)
            .select(GeneralUserReqRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(GeneralUserReq::from))
    }

    async fn find_one_by_general_user_id_and_bullion_id(
        &self,
        general_user_id: Uuid,
        bullion_id: Uuid,
    ) -> AppResult<Option<GeneralUserReq>> {
        let mut conn = conn(&self.pool)?;
        let row: Option<GeneralUserReqRow> = general_user_reqs::table
            .filter(general_user_reqs::general_user_id.eq(general_user_id))
            .filter(general_user_reqs::bullion_id.eq(bullion_id))
            .select(GeneralUserReqRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(GeneralUserReq::from))
    }

    async fn insert(&self, entity: &GeneralUserReq) -> AppResult<GeneralUserReq> {
        let mut conn = conn(&self.pool)?;
        let row: GeneralUserReqRow = diesel::insert_into(general_user_reqs::table)
            .values(GeneralUserReqRow::from(entity))
            .returning(GeneralUserReqRow::as_returning())
            .get_result(&mut conn)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    AppError::new(ErrorCode::GeneralUserReqExists, "REQUEST ALREADY EXISTS")
                }
                other => AppError::Database(other),
            })?;
        Ok(row.into())
    }

    async fn save(&self, entity: &GeneralUserReq) -> AppResult<GeneralUserReq> {
        let mut conn = conn(&self.pool)?;
        let row = GeneralUserReqRow::from(entity);
        let saved: GeneralUserReqRow = diesel::insert_into(general_user_reqs::table)
            .values(&row)
            .on_conflict(general_user_reqs::id)
            .do_update()
            .set(&row)
            .returning(GeneralUserReqRow::as_returning())
            .get_result(&mut conn)?;
        Ok(saved.into())
    }
}

// --- Bullion sites ---

#[derive(Debug, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = bullion_site_infos)]
struct BullionSiteInfoRow {
    id: Uuid,
    name: String,
    domain: String,
    short_name: String,
    auto_approve: bool,
    auto_login: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&BullionSiteInfo> for BullionSiteInfoRow {
    fn from(e: &BullionSiteInfo) -> Self {
        Self {
            id: e.base.id,
            name: e.name.clone(),
            domain: e.domain.clone(),
            short_name: e.short_name.clone(),
            auto_approve: e.general_user_info.auto_approve,
            auto_login: e.general_user_info.auto_login,
            created_at: e.base.created_at,
            updated_at: e.base.updated_at,
        }
    }
}

impl From<BullionSiteInfoRow> for BullionSiteInfo {
    fn from(row: BullionSiteInfoRow) -> Self {
        Self {
            base: base(row.id, row.created_at, row.updated_at),
            name: row.name,
            domain: row.domain,
            short_name: row.short_name,
            general_user_info: GeneralUserInfo {
                auto_approve: row.auto_approve,
                auto_login: row.auto_login,
            },
        }
    }
}

pub struct PgBullionSiteInfoRepo {
    pool: DbPool,
}

impl PgBullionSiteInfoRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BullionSiteInfoRepository for PgBullionSiteInfoRepo {
    async fn save(&self, entity: &BullionSiteInfo) -> AppResult<BullionSiteInfo> {
        let mut conn = conn(&self.pool)?;
        let row = BullionSiteInfoRow::from(entity);
        let saved: BullionSiteInfoRow = diesel::insert_into(bullion_site_infos::table)
            .values(&row)
            .on_conflict(bullion_site_infos::id)
            .do_update()
            .set(&row)
            .returning(BullionSiteInfoRow::as_returning())
            .get_result(&mut conn)?;
        Ok(saved.into())
    }

    async fn find_one(&self, id: Uuid) -> AppResult<Option<BullionSiteInfo>> {
        let mut conn = conn(&self.pool)?;
        let row: Option<BullionSiteInfoRow> = bullion_site_infos::table
            .find(id)
            .select(BullionSiteInfoRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(BullionSiteInfo::from))
    }

    async fn find_one_by_domain(&self, domain: &str) -> AppResult<Option<BullionSiteInfo>> {
        let mut conn = conn(&self.pool)?;
        let row: Option<BullionSiteInfoRow> = bullion_site_infos::table
            .filter(bullion_site_infos::domain.eq(domain))
            .select(BullionSiteInfoRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(BullionSiteInfo::from))
    }

    async fn find_by_short_name(&self, short_name: &str) -> AppResult<Option<BullionSiteInfo>> {
        let mut conn = conn(&self.pool)?;
        let row: Option<BullionSiteInfoRow> = bullion_site_infos::table
            .filter(bullion_site_infos::short_name.eq(short_name))
            .select(BullionSiteInfoRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(BullionSiteInfo::from))
    }
}

// --- Bank details ---

#[derive(Debug, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = bank_details)]
struct BankDetailsRow {
    id: Uuid,
    bullion_id: Uuid,
    account_holder_name: String,
    account_number: String,
    ifsc_code: String,
    bank_name: String,
    branch_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&BankDetails> for BankDetailsRow {
    fn from(e: &BankDetails) -> Self {
        Self {
            id: e.base.id,
            bullion_id: e.bullion_id,
            account_holder_name: e.account_holder_name.clone(),
            account_number: e.account_number.clone(),
            ifsc_code: e.ifsc_code.clone(),
            bank_name: e.bank_name.clone(),
            branch_name: e.branch_name.clone(),
            created_at: e.base.created_at,
            updated_at: e.base.updated_at,
        }
    }
}

impl From<BankDetailsRow> for BankDetails {
    fn from(row: BankDetailsRow) -> Self {
        Self {
            base: base(row.id, row.created_at, row.updated_at),
            bullion_id: row.bullion_id,
            account_holder_name: row.account_holder_name,
            account_number: row.account_number,
            ifsc_code: row.ifsc_code,
            bank_name: row.bank_name,
            branch_name: row.branch_name,
        }
    }
}

pub struct PgBankDetailsRepo {
    pool: DbPool,
}

impl PgBankDetailsRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BankDetailsRepository for PgBankDetailsRepo {
    async fn save(&self, entity: &BankDetails) -> AppResult<BankDetails> {
        let mut conn = conn(&self.pool)?;
        let row = BankDetailsRow::from(entity);
        let saved: BankDetailsRow = diesel::insert_into(bank_details::table)
            .values(&row)
            .on_conflict(bank_details::id)
            .do_update()
            .set(&row)
            .returning(BankDetailsRow::as_returning())
            .get_result(&mut conn)?;
        Ok(saved.into())
    }

    async fn find_by_bullion_id(&self, bullion_id: Uuid) -> AppResult<Vec<BankDetails>> {
        let mut conn = conn(&self.pool)?;
        let rows: Vec<BankDetailsRow> = bank_details::table
            .filter(bank_details::bullion_id.eq(bullion_id))
            .order(bank_details::created_at.asc())
            .select(BankDetailsRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(BankDetails::from).collect())
    }
}
