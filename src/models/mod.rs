pub mod profile;
pub mod task;

pub use profile::{Profile, ProfileChanges};
pub use task::{NewTask, Task, TaskChanges, TaskList, TaskPriority, TaskStatus};

use serde::{Deserialize, Deserializer};

/// Deserializes a nullable field of a partial update.
///
/// Paired with `#[serde(default)]`: an absent field stays `None`, `null`
/// becomes `Some(None)` and a value becomes `Some(Some(value))`.
pub(crate) fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
