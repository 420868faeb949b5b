//! Merges per-journal segment listings into one gap-respecting,
//! greedy-longest manifest. Only file-backed journals participate — remote
//! journals have no manifest surface.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entry::JournalEntry;

/// A single segment on one journal: `[start_txid, end_txid]`, finalized or
/// still being written.
///
/// Wire-compatible with the existing manifest consumer as the tuple
/// `(start_txid, end_txid, in_progress)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEditLog {
    pub start_txid: u64,
    pub end_txid: u64,
    pub in_progress: bool,
}

impl RemoteEditLog {
    pub fn new(start_txid: u64, end_txid: u64, in_progress: bool) -> Self {
        Self {
            start_txid,
            end_txid,
            in_progress,
        }
    }
}

/// Finalized segments sort above in-progress ones; within the same
/// finalization state, the longer (greater `end_txid`) segment wins; ties
/// break on `start_txid` for a total, stable order.
impl Ord for RemoteEditLog {
    fn cmp(&self, other: &Self) -> Ordering {
        (!self.in_progress)
            .cmp(&!other.in_progress)
            .then(self.end_txid.cmp(&other.end_txid))
            .then(self.start_txid.cmp(&other.start_txid))
    }
}

impl PartialOrd for RemoteEditLog {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// An ordered, gap-free, non-overlapping list of segments starting at some
/// requested `from_txid` (or at the first segment beyond a gap).
pub type RemoteEditLogManifest = Vec<RemoteEditLog>;

pub struct ManifestBuilder;

impl ManifestBuilder {
    /// Builds the manifest from `from_txid` across every file-backed entry.
    /// Per-journal errors are swallowed with a warning: a missing directory
    /// must not block manifest generation for the journals that are fine.
    pub fn build(entries: &[JournalEntry], from_txid: u64) -> RemoteEditLogManifest {
        let mut groups: BTreeMap<u64, Vec<RemoteEditLog>> = BTreeMap::new();

        for entry in entries {
            if !entry.is_file_backed() {
                continue;
            }
            match entry.journal().edit_log_manifest(from_txid) {
                Ok(segments) => {
                    for segment in segments {
                        if segment.start_txid >= from_txid {
                            groups.entry(segment.start_txid).or_default().push(segment);
                        }
                    }
                }
                Err(error) => {
                    tracing::warn!(%error, from_txid, "failed to read edit log manifest from journal");
                }
            }
        }

        let mut manifest = Vec::new();
        let mut cursor = from_txid;
        loop {
            match groups.get(&cursor).and_then(|group| group.iter().max().copied()) {
                Some(best) => {
                    manifest.push(best);
                    cursor = best.end_txid + 1;
                }
                None => match groups.keys().find(|&&start| start > cursor) {
                    Some(&next) => {
                        // A gap means everything accumulated so far is not
                        // safely replayable past it — start over from the
                        // far side of the gap.
                        manifest.clear();
                        cursor = next;
                    }
                    None => break,
                },
            }
        }
        manifest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::mock_file_backed_entry;

    fn journal_with_segments(entry: &mut JournalEntry, segments: Vec<RemoteEditLog>) {
        // Re-point the entry's mock journal expectation for
        // `edit_log_manifest` now that construction is done.
        let mut journal = crate::collaborators::MockJournal::new();
        journal
            .expect_storage_directory()
            .returning(|| Some(crate::collaborators::StorageDirectoryHandle::new("dir")));
        journal
            .expect_edit_log_manifest()
            .returning(move |_| Ok(segments.clone()));
        *entry = JournalEntry::new(std::sync::Arc::new(journal), false, false, false);
    }

    #[test]
    fn gap_discards_prefix_manifest() {
        let mut a = mock_file_backed_entry(false, false, false, "a");
        journal_with_segments(
            &mut a,
            vec![
                RemoteEditLog::new(100, 199, false),
                RemoteEditLog::new(200, 299, false),
            ],
        );
        let mut b = mock_file_backed_entry(false, false, false, "b");
        journal_with_segments(&mut b, vec![RemoteEditLog::new(400, 499, false)]);

        let manifest = ManifestBuilder::build(&[a, b], 100);
        assert_eq!(manifest, vec![RemoteEditLog::new(400, 499, false)]);
    }

    #[test]
    fn longest_finalized_segment_wins_over_in_progress() {
        let mut a = mock_file_backed_entry(false, false, false, "a");
        journal_with_segments(&mut a, vec![RemoteEditLog::new(100, 149, true)]);
        let mut b = mock_file_backed_entry(false, false, false, "b");
        journal_with_segments(&mut b, vec![RemoteEditLog::new(100, 199, false)]);

        let manifest = ManifestBuilder::build(&[a, b], 100);
        assert_eq!(manifest, vec![RemoteEditLog::new(100, 199, false)]);
    }

    #[test]
    fn no_segments_at_all_yields_empty_manifest() {
        let a = mock_file_backed_entry(false, false, false, "a");
        let manifest = ManifestBuilder::build(&[a], 100);
        assert!(manifest.is_empty());
    }

    #[test]
    fn remote_journals_are_excluded_from_manifest_sources() {
        let remote = crate::test_support::mock_journal_entry(false, true, true);
        let manifest = ManifestBuilder::build(&[remote], 100);
        assert!(manifest.is_empty());
    }
}
