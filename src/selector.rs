//! Picks the single best underlying journal to read from, for a given
//! starting transaction id.

use crate::collaborators::{InputStream, StorageRegistry, TransactionCountError};
use crate::entry::JournalEntry;
use crate::error::JournalSetError;

pub struct InputSelector;

impl InputSelector {
    /// Returns `Ok(None)` when every journal reports zero transactions and
    /// none raised corruption; `Err(Corrupt)` when no viable candidate
    /// survived and at least one journal reported corruption.
    pub fn select(
        entries: &[JournalEntry],
        from_txid: u64,
        registry: &dyn StorageRegistry,
    ) -> Result<Option<Box<dyn InputStream>>, JournalSetError> {
        let mut best_index: Option<usize> = None;
        let mut best_count: u64 = 0;
        let mut corruption: Option<anyhow::Error> = None;

        for (index, entry) in entries.iter().enumerate() {
            match entry.journal().number_of_transactions(from_txid) {
                Ok(count) if count > 0 => {
                    let take = match best_index {
                        None => true,
                        Some(_) if count > best_count => true,
                        Some(current) if count == best_count => {
                            entry.is_local(registry) && !entries[current].is_local(registry)
                        }
                        _ => false,
                    };
                    if take {
                        best_index = Some(index);
                        best_count = count;
                    }
                }
                Ok(_) => {}
                Err(TransactionCountError::Corrupt(cause)) => {
                    corruption.get_or_insert(cause);
                }
                Err(TransactionCountError::Io(cause)) => {
                    tracing::warn!(index, error = %cause, "skipping journal after I/O error during selection");
                }
            }
        }

        match best_index {
            Some(index) => entries[index]
                .journal()
                .get_input_stream(from_txid)
                .map(Some)
                .map_err(JournalSetError::InputStreamFailed),
            None => match corruption {
                Some(cause) => Err(JournalSetError::Corrupt { from_txid, cause }),
                None => Ok(None),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{MockJournal, StorageDirectoryHandle};
    use crate::entry::JournalEntry;
    use std::sync::Arc;

    struct NoopInputStream;
    impl InputStream for NoopInputStream {}

    fn registry_local_only(local_id: &'static str) -> impl StorageRegistry {
        let mut registry = crate::collaborators::MockStorageRegistry::new();
        registry
            .expect_is_local()
            .returning(move |dir| dir.0 == local_id);
        registry
    }

    #[test]
    fn prefers_local_on_tie() {
        let mut local = MockJournal::new();
        local
            .expect_storage_directory()
            .returning(|| Some(StorageDirectoryHandle::new("local-dir")));
        local.expect_number_of_transactions().returning(|_| Ok(500));
        local
            .expect_get_input_stream()
            .returning(|_| Ok(Box::new(NoopInputStream)));

        let mut remote = MockJournal::new();
        remote.expect_storage_directory().returning(|| None);
        remote.expect_number_of_transactions().returning(|_| Ok(500));
        remote
            .expect_get_input_stream()
            .returning(|_| Ok(Box::new(NoopInputStream)));

        let entries = vec![
            JournalEntry::new(Arc::new(remote), false, false, true),
            JournalEntry::new(Arc::new(local), false, false, false),
        ];
        let registry = registry_local_only("local-dir");

        let result = InputSelector::select(&entries, 1000, &registry);
        assert!(matches!(result, Ok(Some(_))));
    }

    #[test]
    fn all_zero_and_no_corruption_returns_none() {
        let mut j1 = MockJournal::new();
        j1.expect_storage_directory().returning(|| None);
        j1.expect_number_of_transactions().returning(|_| Ok(0));
        let mut j2 = MockJournal::new();
        j2.expect_storage_directory().returning(|| None);
        j2.expect_number_of_transactions().returning(|_| Ok(0));

        let entries = vec![
            JournalEntry::new(Arc::new(j1), false, false, false),
            JournalEntry::new(Arc::new(j2), false, false, false),
        ];
        let registry = registry_local_only("unused");

        let result = InputSelector::select(&entries, 1, &registry);
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn corruption_without_candidate_fails() {
        let mut j1 = MockJournal::new();
        j1.expect_storage_directory().returning(|| None);
        j1.expect_number_of_transactions()
            .returning(|_| Err(TransactionCountError::Corrupt(anyhow::anyhow!("bad header"))));

        let entries = vec![JournalEntry::new(Arc::new(j1), false, false, false)];
        let registry = registry_local_only("unused");

        let result = InputSelector::select(&entries, 42, &registry);
        match result {
            Err(JournalSetError::Corrupt { from_txid, .. }) => assert_eq!(from_txid, 42),
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }
}
