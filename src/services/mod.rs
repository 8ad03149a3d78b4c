//! Caller-scoped operations on tasks and profiles.
//!
//! Services never see rows the caller does not own: every store call carries
//! the caller's subject. Store failures are normalized here so handlers only
//! ever deal with [`AppError`].

pub mod profiles;
pub mod tasks;

pub use profiles::ProfileService;
pub use tasks::TaskService;

use crate::error::AppError;
use crate::store::StoreError;

/// Maps a store failure raised while performing `context`.
///
/// "No row matched" becomes `NotFound`; anything else becomes `Database` with the
/// backend error kept for diagnostics.
pub(crate) fn store_failure(error: StoreError, context: &str) -> AppError {
    match error {
        StoreError::NoRows => {
            log::warn!("[store - {}] no rows matched", context);
            AppError::NotFound(format!(
                "{} failed: resource not found or insufficient permissions",
                context
            ))
        }
        source @ StoreError::Backend(_) => {
            log::error!("[store - {}] {}", context, source);
            AppError::Database {
                message: format!("{} failed", context),
                source,
            }
        }
    }
}
