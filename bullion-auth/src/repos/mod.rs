//! Entity stores consumed by the services.
//!
//! Stores have document semantics: `save` is an upsert keyed by id and the
//! last write wins. The only conditional write is
//! [`GeneralUserReqRepository::insert`], which rejects a second request for
//! the same `(general_user_id, bullion_id)` pair.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use bullion_shared::clients::db::DbPool;
use bullion_shared::errors::AppResult;

use crate::models::{BankDetails, BullionSiteInfo, GeneralUserEntity, GeneralUserReq};

pub mod memory;
pub mod postgres;

#[async_trait]
pub trait GeneralUserRepository: Send + Sync {
    async fn save(&self, entity: &GeneralUserEntity) -> AppResult<GeneralUserEntity>;
    async fn find_one(&self, id: Uuid) -> AppResult<Option<GeneralUserEntity>>;
}

#[async_trait]
pub trait GeneralUserReqRepository: Send + Sync {
    async fn find_one(&self, id: Uuid) -> AppResult<Option<GeneralUserReq>>;

    async fn find_one_by_general_user_id_and_bullion_id(
        &self,
        general_user_id: Uuid,
        bullion_id: Uuid,
    ) -> AppResult<Option<GeneralUserReq>>;

    /// Insert a new request. Fails with `GeneralUserReqExists` when the pair
    /// already has one.
    async fn insert(&self, entity: &GeneralUserReq) -> AppResult<GeneralUserReq>;

    async fn save(&self, entity: &GeneralUserReq) -> AppResult<GeneralUserReq>;
}

#[async_trait]
pub trait BullionSiteInfoRepository: Send + Sync {
    async fn save(&self, entity: &BullionSiteInfo) -> AppResult<BullionSiteInfo>;
    async fn find_one(&self, id: Uuid) -> AppResult<Option<BullionSiteInfo>>;
    async fn find_one_by_domain(&self, domain: &str) -> AppResult<Option<BullionSiteInfo>>;
    async fn find_by_short_name(&self, short_name: &str) -> AppResult<Option<BullionSiteInfo>>;
}

#[async_trait]
pub trait BankDetailsRepository: Send + Sync {
    async fn save(&self, entity: &BankDetails) -> AppResult<BankDetails>;
    async fn find_by_bullion_id(&self, bullion_id: Uuid) -> AppResult<Vec<BankDetails>>;
}

/// Every store handle the service needs, built once at startup.
#[derive(Clone)]
pub struct Repositories {
    pub general_users: Arc<dyn GeneralUserRepository>,
    pub general_user_reqs: Arc<dyn GeneralUserReqRepository>,
    pub bullion_site_infos: Arc<dyn BullionSiteInfoRepository>,
    pub bank_details: Arc<dyn BankDetailsRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            general_users: Arc::new(memory::MemoryGeneralUserRepo::default()),
            general_user_reqs: Arc::new(memory::MemoryGeneralUserReqRepo::default()),
            bullion_site_infos: Arc::new(memory::MemoryBullionSiteInfoRepo::default()),
            bank_details: Arc::new(memory::MemoryBankDetailsRepo::default()),
        }
    }

    pub fn postgres(pool: DbPool) -> Self {
        Self {
            general_users: Arc::new(postgres::PgGeneralUserRepo::new(pool.clone())),
            general_user_reqs: Arc::new(postgres::PgGeneralUserReqRepo::new(pool.clone())),
            bullion_site_infos: Arc::new(postgres::PgBullionSiteInfoRepo::new(pool.clone())),
            bank_details: Arc::new(postgres::PgBankDetailsRepo::new(pool)),
        }
    }
}
