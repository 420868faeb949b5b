//! Applies one operation across every journal entry, either in the calling
//! thread or spread over a fixed-size worker pool, with total fan-out
//! (every entry attempted exactly once, no short-circuit on first failure).

use std::panic::{catch_unwind, AssertUnwindSafe};

use rayon::prelude::*;

use crate::entry::JournalEntry;
use crate::error::JournalSetError;

/// Which fan-out strategy to use for a given operation.
///
/// Per the choice rule: latency-sensitive, per-journal-blocking calls
/// (flush, start/finalize segment, purge, recover, whole-set close) go
/// parallel; in-memory-fast calls (write, create, single-stream close,
/// abort, set-ready-to-flush) go sequential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanoutMode {
    Sequential,
    Parallel,
}

/// One entry's failure during a fan-out, paired with its position so the
/// health arbiter can find it again without re-borrowing by identity.
#[derive(Debug)]
pub struct FanoutFailure {
    pub index: usize,
    pub cause: anyhow::Error,
}

/// The accumulated failures from one fan-out call.
#[derive(Debug, Default)]
pub struct FanoutOutcome {
    pub bad: Vec<FanoutFailure>,
}

pub struct FanoutExecutor {
    pool: rayon::ThreadPool,
}

impl FanoutExecutor {
    /// `capacity` should be the initial journal count (§9: the pool is
    /// sized at construction and not resized on `add`).
    pub fn new(capacity: usize) -> Result<Self, JournalSetError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(capacity.max(1))
            .thread_name(|i| format!("journal-set-fanout-{i}"))
            .build()
            .map_err(|e| JournalSetError::InternalPoolError(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn run<F>(
        &self,
        mode: FanoutMode,
        entries: &mut [JournalEntry],
        op_name: &str,
        op: F,
    ) -> Result<FanoutOutcome, JournalSetError>
    where
        F: Fn(&mut JournalEntry) -> anyhow::Result<()> + Sync,
    {
        match mode {
            FanoutMode::Sequential => Ok(self.run_sequential(entries, op_name, op)),
            FanoutMode::Parallel => self.run_parallel(entries, op_name, op),
        }
    }

    fn run_sequential<F>(&self, entries: &mut [JournalEntry], op_name: &str, op: F) -> FanoutOutcome
    where
        F: Fn(&mut JournalEntry) -> anyhow::Result<()>,
    {
        let mut bad = Vec::new();
        for (index, entry) in entries.iter_mut().enumerate() {
            if let Err(cause) = op(entry) {
                tracing::warn!(op = op_name, index, error = %cause, "journal entry failed");
                bad.push(FanoutFailure { index, cause });
            }
        }
        FanoutOutcome { bad }
    }

    fn run_parallel<F>(
        &self,
        entries: &mut [JournalEntry],
        op_name: &str,
        op: F,
    ) -> Result<FanoutOutcome, JournalSetError>
    where
        F: Fn(&mut JournalEntry) -> anyhow::Result<()> + Sync,
    {
        // Every entry is submitted as its own task and joined before this
        // call returns; a task's closure panicking (rather than returning
        // an Err) is treated as a pool anomaly, not a per-entry failure —
        // it violates the "every entry attempted" contract for that entry.
        let results: Vec<Result<Option<FanoutFailure>, String>> = self.pool.install(|| {
            entries
                .par_iter_mut()
                .enumerate()
                .map(|(index, entry)| {
                    match catch_unwind(AssertUnwindSafe(|| op(entry))) {
                        Ok(Ok(())) => Ok(None),
                        Ok(Err(cause)) => {
                            tracing::warn!(op = op_name, index, error = %cause, "journal entry failed");
                            Ok(Some(FanoutFailure { index, cause }))
                        }
                        Err(panic) => Err(panic_message(panic)),
                    }
                })
                .collect()
        });

        let mut bad = Vec::new();
        for result in results {
            match result {
                Ok(Some(failure)) => bad.push(failure),
                Ok(None) => {}
                Err(message) => {
                    tracing::error!(op = op_name, %message, "worker pool task panicked");
                    return Err(JournalSetError::InternalPoolError(message));
                }
            }
        }
        Ok(FanoutOutcome { bad })
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked with a non-string payload".to_string()
    }
}
