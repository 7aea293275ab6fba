use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use bullion_shared::errors::{AppError, AppResult, ErrorCode};

use super::{BankDetailsRepository, BullionSiteInfoRepository, GeneralUserRepository, GeneralUserReqRepository};
use crate::models::{BankDetails, BullionSiteInfo, GeneralUserEntity, GeneralUserReq};

fn read<T>(lock: &RwLock<T>) -> AppResult<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| AppError::internal("in-memory store lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> AppResult<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| AppError::internal("in-memory store lock poisoned"))
}

#[derive(Default)]
pub struct MemoryGeneralUserRepo {
    users: RwLock<HashMap<Uuid, GeneralUserEntity>>,
}

#[cfg(test)]
impl MemoryGeneralUserRepo {
    pub fn list(&self) -> AppResult<Vec<GeneralUserEntity>> {
        Ok(read(&self.users)?.values().cloned().collect())
    }
}

#[async_trait]
impl GeneralUserRepository for MemoryGeneralUserRepo {
    async fn save(&self, entity: &GeneralUserEntity) -> AppResult<GeneralUserEntity> {
        write(&self.users)?.insert(entity.id(), entity.clone());
        Ok(entity.clone())
    }

    async fn find_one(&self, id: Uuid) -> AppResult<Option<GeneralUserEntity>> {
        Ok(read(&self.users)?.get(&id).cloned())
    }
}

#[derive(Default)]
pub struct MemoryGeneralUserReqRepo {
    reqs: RwLock<HashMap<Uuid, GeneralUserReq>>,
}

#[async_trait]
impl GeneralUserReqRepository for MemoryGeneralUserReqRepo {
    async fn find_one(&self, id: Uuid) -> AppResult<Option<GeneralUserReq>> {
        Ok(read(&self.reqs)?.get(&id).cloned())
    }

    async fn find_one_by_general_user_id_and_bullion_id(
        &self,
        general_user_id: Uuid,
        bullion_id: Uuid,
    ) -> AppResult<Option<GeneralUserReq>> {
        Ok(read(&self.reqs)?
            .values()
            .find(|r| r.general_user_id == general_user_id && r.bullion_id == bullion_id)
            .cloned())
    }

    async fn insert(&self, entity: &GeneralUserReq) -> AppResult<GeneralUserReq> {
        // check and insert under one write guard
        let mut reqs = write(&self.reqs)?;
        let exists = reqs
            .values()
            .any(|r| r.general_user_id == entity.general_user_id && r.bullion_id == entity.bullion_id);
        if exists {
            return Err(AppError::new(ErrorCode::GeneralUserReqExists, "REQUEST ALREADY EXISTS"));
        }
        reqs.insert(entity.id(), entity.clone());
        Ok(entity.clone())
    }

    async fn save(&self, entity: &GeneralUserReq) -> AppResult<GeneralUserReq> {
        write(&self.reqs)?.insert(entity.id(), entity.clone());
        Ok(entity.clone())
    }
}

#[derive(Default)]
pub struct MemoryBullionSiteInfoRepo {
    sites: RwLock<HashMap<Uuid, BullionSiteInfo>>,
}

impl MemoryBullionSiteInfoRepo {
    fn find_by<F>(&self, pred: F) -> AppResult<Option<BullionSiteInfo>>
    where
        F: Fn(&BullionSiteInfo) -> bool,
    {
        Ok(read(&self.sites)?.values().find(|s| pred(*s)).cloned())
    }
}

#[async_trait]
impl BullionSiteInfoRepository for MemoryBullionSiteInfoRepo {
    async fn save(&self, entity: &BullionSiteInfo) -> AppResult<BullionSiteInfo> {
        write(&self.sites)?.insert(entity.id(), entity.clone());
        Ok(entity.clone())
    }

    async fn find_one(&self, id: Uuid) -> AppResult<Option<BullionSiteInfo>> {
        Ok(read(&self.sites)?.get(&id).cloned())
    }

    async fn find_one_by_domain(&self, domain: &str) -> AppResult<Option<BullionSiteInfo>> {
        self.find_by(|s| s.domain == domain)
    }

    async fn find_by_short_name(&self, short_name: &str) -> AppResult<Option<BullionSiteInfo>> {
        self.find_by(|s| s.short_name == short_name)
    }
}

#[derive(Default)]
pub struct MemoryBankDetailsRepo {
    details: RwLock<HashMap<Uuid, BankDetails>>,
}

#[async_trait]
impl BankDetailsRepository for MemoryBankDetailsRepo {
    async fn save(&self, entity: &BankDetails) -> AppResult<BankDetails> {
        write(&self.details)?.insert(entity.base.id, entity.clone());
        Ok(entity.clone())
    }

    async fn find_by_bullion_id(&self, bullion_id: Uuid) -> AppResult<Vec<BankDetails>> {
        let mut found: Vec<BankDetails> = read(&self.details)?
            .values()
            .filter(|d| d.bullion_id == bullion_id)
            .cloned()
            .collect();
        found.sort_by_key(|d| d.base.created_at);
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeneralUserAuthStatus, GeneralUserInfo};

    #[tokio::test]
    async fn insert_rejects_duplicate_pair() {
        let repo = MemoryGeneralUserReqRepo::default();
        let (user, bullion) = (Uuid::new_v4(), Uuid::new_v4());

        repo.insert(&GeneralUserReq::new(user, bullion, GeneralUserAuthStatus::Requested))
            .await
            .unwrap();
        let err = repo
            .insert(&GeneralUserReq::new(user, bullion, GeneralUserAuthStatus::Authorized))
            .await
            .unwrap_err();
        assert!(err.is(ErrorCode::GeneralUserReqExists));

        // a different bullion is a different pair
        repo.insert(&GeneralUserReq::new(user, Uuid::new_v4(), GeneralUserAuthStatus::Requested))
            .await
            .unwrap();

        let found = repo
            .find_one_by_general_user_id_and_bullion_id(user, bullion)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.status, GeneralUserAuthStatus::Requested);
    }

    #[tokio::test]
    async fn site_lookups() {
        let repo = MemoryBullionSiteInfoRepo::default();
        let site = BullionSiteInfo::new("Akshat Bullion", "akshat.example", "akshat", GeneralUserInfo::default());
        repo.save(&site).await.unwrap();

        assert_eq!(repo.find_one(site.id()).await.unwrap(), Some(site.clone()));
        assert_eq!(repo.find_one_by_domain("akshat.example").await.unwrap(), Some(site.clone()));
        assert_eq!(repo.find_by_short_name("akshat").await.unwrap(), Some(site));
        assert!(repo.find_by_short_name("other").await.unwrap().is_none());
    }
}
