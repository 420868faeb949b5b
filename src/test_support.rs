//! Shared test fixtures for building `JournalEntry`s backed by `MockJournal`
//! without repeating the same expectation boilerplate in every test module.
#![cfg(test)]

use std::sync::Arc;

use crate::collaborators::MockJournal;
use crate::entry::JournalEntry;

/// A journal entry wrapping a bare `MockJournal` that reports no storage
/// directory (i.e. not file-backed) and is never otherwise called. Good
/// enough for health-arbiter tests that only inspect the entry's flags.
pub(crate) fn mock_journal_entry(required: bool, shared: bool, remote: bool) -> JournalEntry {
    let mut journal = MockJournal::new();
    journal.expect_storage_directory().returning(|| None);
    JournalEntry::new(Arc::new(journal), required, shared, remote)
}

/// Same as `mock_journal_entry`, but the mock reports a given storage
/// directory id, making it file-backed.
pub(crate) fn mock_file_backed_entry(
    required: bool,
    shared: bool,
    remote: bool,
    dir_id: &'static str,
) -> JournalEntry {
    let mut journal = MockJournal::new();
    journal
        .expect_storage_directory()
        .returning(move || Some(crate::collaborators::StorageDirectoryHandle::new(dir_id)));
    JournalEntry::new(Arc::new(journal), required, shared, remote)
}
