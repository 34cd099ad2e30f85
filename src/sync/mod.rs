//! Remote Record Sync
//!
//! Pushes saved meals and mood entries to a remote document store:
//!
//! ```text
//! PUT {base_url}/users/{user_id}/meals/{meal_id}
//! PUT {base_url}/users/{user_id}/moodEntries/{entry_id}
//! ```
//!
//! Sync is fire-and-forget from the journal's point of view. Failures are
//! retried here and then logged by the caller.

mod client;

pub use client::{HttpRecordSync, SyncConfig, SyncError};
