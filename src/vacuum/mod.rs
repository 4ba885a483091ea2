use std::num::NonZeroU32;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::{common::prelude::StorageError, storage::Storage};

/// Retention sweeper: drops articles once they are older than the threshold
pub struct Vacuum<'a> {
    storage: &'a mut Storage,
}

impl<'a> Vacuum<'a> {
    #[must_use]
    pub fn new(storage: &'a mut Storage) -> Self {
        Vacuum { storage }
    }

    /// Remove articles scraped more than `max_age_days` days ago. Returns the number deleted.
    pub fn sweep(&mut self, max_age_days: NonZeroU32) -> Result<usize, StorageError> {
        self.sweep_at(Utc::now(), max_age_days)
    }

    pub fn sweep_at(
        &mut self,
        now: DateTime<Utc>,
        max_age_days: NonZeroU32,
    ) -> Result<usize, StorageError> {
        // a cutoff before the representable range leaves nothing to delete
        let Some(cutoff) = now.checked_sub_signed(Duration::days(i64::from(max_age_days.get())))
        else {
            info!(days = max_age_days.get(), "Cleanup: threshold predates every article");
            return Ok(0);
        };
        let num_deleted = self.storage.delete_scraped_before(cutoff)?;

        info!(
            deleted = num_deleted,
            days = max_age_days.get(),
            %cutoff,
            "Cleanup: deleted old articles"
        );
        Ok(num_deleted)
    }
}
