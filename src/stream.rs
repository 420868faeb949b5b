//! Single write/flush/close surface that multiplexes to every active
//! journal entry via the fan-out executor. Obtained from
//! `JournalSet::start_log_segment` and held for the lifetime of one
//! segment.

use crate::error::JournalSetError;
use crate::facade::JournalSet;
use crate::fanout::FanoutMode;
use crate::health::QuorumCheck;

pub struct AggregateOutputStream<'a> {
    set: &'a mut JournalSet,
}

impl<'a> AggregateOutputStream<'a> {
    pub(crate) fn new(set: &'a mut JournalSet) -> Self {
        Self { set }
    }

    pub fn write(&mut self, record: &[u8]) -> Result<QuorumCheck, JournalSetError> {
        self.set.fanout(FanoutMode::Sequential, "write", |entry| {
            if entry.is_active() {
                entry
                    .stream_mut()
                    .expect("is_active implies a stream is present")
                    .write(record)
            } else {
                Ok(())
            }
        })
    }

    pub fn create(&mut self) -> Result<QuorumCheck, JournalSetError> {
        self.set.fanout(FanoutMode::Sequential, "create", |entry| {
            if entry.is_active() {
                entry
                    .stream_mut()
                    .expect("is_active implies a stream is present")
                    .create()
            } else {
                Ok(())
            }
        })
    }

    pub fn set_ready_to_flush(&mut self) -> Result<QuorumCheck, JournalSetError> {
        self.set
            .fanout(FanoutMode::Sequential, "set_ready_to_flush", |entry| {
                if entry.is_active() {
                    entry
                        .stream_mut()
                        .expect("is_active implies a stream is present")
                        .set_ready_to_flush()
                } else {
                    Ok(())
                }
            })
    }

    /// Durability barrier: parallel, because it hides per-journal fsync
    /// latency behind the worker pool instead of paying it serially.
    pub fn flush_and_sync(&mut self) -> Result<QuorumCheck, JournalSetError> {
        self.set
            .fanout(FanoutMode::Parallel, "flush_and_sync", |entry| {
                if entry.is_active() {
                    entry
                        .stream_mut()
                        .expect("is_active implies a stream is present")
                        .flush_and_sync()
                } else {
                    Ok(())
                }
            })
    }

    pub fn flush(&mut self) -> Result<QuorumCheck, JournalSetError> {
        self.set.fanout(FanoutMode::Parallel, "flush", |entry| {
            if entry.is_active() {
                entry
                    .stream_mut()
                    .expect("is_active implies a stream is present")
                    .flush()
            } else {
                Ok(())
            }
        })
    }

    /// Not skip-if-inactive — `close_stream` is idempotent, so closing an
    /// already-inactive entry is a harmless no-op rather than something to
    /// filter out up front.
    pub fn close(&mut self) -> Result<QuorumCheck, JournalSetError> {
        self.set
            .fanout(FanoutMode::Sequential, "close", |entry| entry.close_stream())
    }

    /// Also not skip-if-inactive: `abort` is idempotent.
    pub fn abort(&mut self) -> Result<QuorumCheck, JournalSetError> {
        self.set.fanout(FanoutMode::Sequential, "abort", |entry| {
            entry.abort();
            Ok(())
        })
    }

    /// True if any active journal's stream reports it.
    pub fn should_force_sync(&self) -> bool {
        self.set
            .entries()
            .iter()
            .filter(|entry| entry.is_active())
            .filter_map(|entry| entry.stream_ref())
            .any(|stream| stream.should_force_sync())
    }

    /// The first active entry's sync counter. All entries driven by this
    /// aggregate share sync-counter semantics, so the first is treated as
    /// representative rather than authoritative — see the open question in
    /// the design notes about whether this is intentional.
    pub fn get_num_sync(&self) -> Option<u64> {
        self.set
            .entries()
            .iter()
            .find(|entry| entry.is_active())
            .and_then(|entry| entry.stream_ref())
            .map(|stream| stream.num_sync())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{MockJournal, MockJournalStream};
    use crate::config::JournalSetConfig;
    use crate::metrics::NoopMetrics;
    use std::sync::Arc;

    fn journal_with_stream() -> MockJournal {
        let mut journal = MockJournal::new();
        journal.expect_storage_directory().returning(|| None);
        journal.expect_start_log_segment().returning(|_| {
            let mut stream = MockJournalStream::new();
            stream.expect_write().returning(|_| Ok(()));
            stream.expect_should_force_sync().returning(|| false);
            stream.expect_num_sync().returning(|| 7);
            Ok(Box::new(stream) as Box<dyn crate::collaborators::JournalStream>)
        });
        journal
    }

    #[test]
    fn write_skips_inactive_entries_and_succeeds() {
        let registry = crate::collaborators::MockStorageRegistry::new();
        let mut set = JournalSet::new(
            vec![crate::facade::JournalRegistration {
                journal: Arc::new(journal_with_stream()),
                required: false,
                shared: false,
                remote: false,
            }],
            JournalSetConfig::default(),
            Arc::new(registry),
            Arc::new(NoopMetrics),
        )
        .unwrap();

        let mut output = set.start_log_segment(1).unwrap();
        assert!(output.write(b"hello").is_ok());
        assert_eq!(output.get_num_sync(), Some(7));
        assert!(!output.should_force_sync());
    }
}
