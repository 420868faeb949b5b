//! Disables failed entries, reports them to the storage registry, and
//! decides whether the surviving set still satisfies quorum.

use crate::collaborators::StorageRegistry;
use crate::config::JournalSetConfig;
use crate::entry::JournalEntry;
use crate::error::{JournalSetError, QuorumStatus};
use crate::fanout::FanoutOutcome;
use crate::metrics::JournalSetMetrics;

/// Result of running the arbiter over one fan-out's outcome.
///
/// `Skipped` is returned when there was nothing to disable and no pending
/// re-check — the common, cheap path. `Active(n)` reports a fresh quorum
/// evaluation's active count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuorumCheck {
    Skipped,
    Active(usize),
}

pub struct HealthArbiter<'a> {
    registry: &'a dyn StorageRegistry,
    metrics: &'a dyn JournalSetMetrics,
}

impl<'a> HealthArbiter<'a> {
    pub fn new(registry: &'a dyn StorageRegistry, metrics: &'a dyn JournalSetMetrics) -> Self {
        Self { registry, metrics }
    }

    /// Runs the full algorithm from the component design: disable+report on
    /// `outcome.bad`, then re-evaluate quorum if there was anything to
    /// disable or a prior operation left `force_check` set.
    pub fn arbitrate(
        &self,
        entries: &mut [JournalEntry],
        outcome: FanoutOutcome,
        force_check: &mut bool,
        config: &JournalSetConfig,
    ) -> Result<QuorumCheck, JournalSetError> {
        if outcome.bad.is_empty() {
            if !*force_check {
                return Ok(QuorumCheck::Skipped);
            }
            *force_check = false;
            return self.evaluate(entries, config);
        }

        self.disable_and_report(entries, &outcome);
        self.evaluate(entries, config)
    }

    fn disable_and_report(&self, entries: &mut [JournalEntry], outcome: &FanoutOutcome) {
        for failure in &outcome.bad {
            let entry = &mut entries[failure.index];
            tracing::error!(index = failure.index, error = %failure.cause, "disabling journal entry");
            let dir = entry.storage_directory();
            entry.disable();
            if let Some(dir) = dir {
                self.registry.report_error_on_directory(&dir);
            }
        }
        let disabled = entries.iter().filter(|e| e.is_disabled()).count();
        self.registry.update_journal_metrics(disabled);
        self.metrics.record_disabled_count(disabled);
    }

    fn evaluate(
        &self,
        entries: &[JournalEntry],
        config: &JournalSetConfig,
    ) -> Result<QuorumCheck, JournalSetError> {
        let mut active = 0usize;
        let mut non_local_active = 0usize;
        let mut required_disabled = false;

        for entry in entries {
            let is_active = entry.is_resource_available();
            if is_active {
                active += 1;
                if entry.shared() || entry.remote() {
                    non_local_active += 1;
                }
            }
            if entry.required() && entry.is_disabled() {
                required_disabled = true;
            }
        }

        if required_disabled
            || active < config.min_journals
            || non_local_active < config.min_nonlocal_journals
        {
            let status = QuorumStatus {
                min_journals: config.min_journals,
                active,
                min_nonlocal_journals: config.min_nonlocal_journals,
                non_local_active,
                required_disabled,
            };
            return Err(JournalSetError::QuorumLost { status });
        }

        Ok(QuorumCheck::Active(active))
    }
}
