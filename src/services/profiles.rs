use std::sync::Arc;

use super::store_failure;
use crate::auth::CallerId;
use crate::error::AppError;
use crate::models::{Profile, ProfileChanges};
use crate::store::ProfileStore;

/// Operations on the caller's own profile row.
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, caller: &CallerId) -> Result<Profile, AppError> {
        let profile = self
            .store
            .find_profile(caller.as_str())
            .await
            .map_err(|e| store_failure(e, "Fetching user profile"))?;

        profile.ok_or_else(|| {
            log::info!("Profile not found for user {}, potential first login", caller);
            AppError::NotFound(format!("Profile for user {} not found", caller))
        })
    }

    pub async fn update(
        &self,
        caller: &CallerId,
        changes: ProfileChanges,
    ) -> Result<Profile, AppError> {
        let changes = changes.sanitized();
        self.store
            .update_profile(caller.as_str(), &changes)
            .await
            .map_err(|e| store_failure(e, "Updating user profile"))?
            .ok_or_else(|| AppError::NotFound(format!("Profile for user {} not found", caller)))
    }
}
