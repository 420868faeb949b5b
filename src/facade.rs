//! Lifecycle (add/remove/start-segment/finalize/purge/recover/close),
//! wiring, and quorum thresholds — the component the metadata server
//! actually talks to.

use std::sync::Arc;

use crate::collaborators::{Journal, NamespaceInfo, StorageRegistry};
use crate::config::JournalSetConfig;
use crate::entry::JournalEntry;
use crate::error::JournalSetError;
use crate::fanout::{FanoutExecutor, FanoutMode};
use crate::health::{HealthArbiter, QuorumCheck};
use crate::manifest::{ManifestBuilder, RemoteEditLogManifest};
use crate::metrics::JournalSetMetrics;
use crate::selector::InputSelector;
use crate::stream::AggregateOutputStream;

/// A journal to register, alongside its role flags: `required`, `shared`,
/// `remote`.
pub struct JournalRegistration {
    pub journal: Arc<dyn Journal>,
    pub required: bool,
    pub shared: bool,
    pub remote: bool,
}

pub struct JournalSet {
    pub(crate) entries: Vec<JournalEntry>,
    config: JournalSetConfig,
    registry: Arc<dyn StorageRegistry>,
    metrics: Arc<dyn JournalSetMetrics>,
    executor: FanoutExecutor,
    force_check: bool,
}

impl JournalSet {
    /// `initial` seeds both the entry list and the worker pool's fixed
    /// size — §9 leaves resizing on `add` unspecified, and this crate
    /// chooses not to (see DESIGN.md).
    pub fn new(
        initial: Vec<JournalRegistration>,
        config: JournalSetConfig,
        registry: Arc<dyn StorageRegistry>,
        metrics: Arc<dyn JournalSetMetrics>,
    ) -> Result<Self, JournalSetError> {
        let executor = FanoutExecutor::new(initial.len())?;
        let entries = initial
            .into_iter()
            .map(|r| JournalEntry::new(r.journal, r.required, r.shared, r.remote))
            .collect();
        Ok(Self {
            entries,
            config,
            registry,
            metrics,
            executor,
            force_check: false,
        })
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_shared_journal_available(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.shared() && entry.is_resource_available())
    }

    pub fn add(&mut self, journal: Arc<dyn Journal>, required: bool, shared: bool, remote: bool) {
        self.entries
            .push(JournalEntry::new(journal, required, shared, remote));
        self.report_disabled_count();
    }

    /// Matches by identity (`Arc::ptr_eq`) on the underlying journal handle.
    /// Returns whether an entry was found and removed.
    pub fn remove(&mut self, journal: &Arc<dyn Journal>) -> bool {
        let Some(pos) = self.entries.iter().position(|e| e.is_same_journal(journal)) else {
            return false;
        };
        self.entries[pos].abort();
        self.entries.remove(pos);
        self.report_disabled_count();
        true
    }

    fn report_disabled_count(&self) {
        let disabled = self.entries.iter().filter(|e| e.is_disabled()).count();
        self.registry.update_journal_metrics(disabled);
        self.metrics.record_disabled_count(disabled);
    }

    /// Runs before the set is live, so errors propagate directly instead of
    /// going through the health arbiter.
    pub fn format_non_file_journals(&self, ns_info: &NamespaceInfo) -> Result<(), JournalSetError> {
        for entry in &self.entries {
            if !entry.is_file_backed() {
                entry
                    .journal()
                    .format(ns_info)
                    .map_err(JournalSetError::FormatFailed)?;
            }
        }
        Ok(())
    }

    pub fn get_sync_times(&self) -> Vec<u64> {
        self.entries
            .iter()
            .filter(|entry| entry.is_active())
            .filter_map(|entry| entry.stream_ref())
            .map(|stream| stream.total_sync_time())
            .collect()
    }

    pub fn get_input_stream(
        &self,
        from_txid: u64,
    ) -> Result<Option<Box<dyn crate::collaborators::InputStream>>, JournalSetError> {
        InputSelector::select(&self.entries, from_txid, self.registry.as_ref())
    }

    pub fn get_edit_log_manifest(&self, from_txid: u64) -> RemoteEditLogManifest {
        ManifestBuilder::build(&self.entries, from_txid)
    }

    /// Opens a new segment across every entry. The "no entry may already
    /// have a stream open" precondition is a programmer-error check done
    /// up front, not a per-entry fan-out failure — it propagates directly
    /// as `StreamAlreadyOpen` rather than disabling anything.
    pub fn start_log_segment(&mut self, txid: u64) -> Result<AggregateOutputStream<'_>, JournalSetError> {
        if self.entries.iter().any(|e| e.is_active()) {
            return Err(JournalSetError::StreamAlreadyOpen);
        }
        self.fanout(FanoutMode::Parallel, "start_log_segment", move |entry| {
            entry.start_log_segment(txid)
        })?;
        Ok(AggregateOutputStream::new(self))
    }

    pub fn finalize_log_segment(
        &mut self,
        first_txid: u64,
        last_txid: u64,
    ) -> Result<QuorumCheck, JournalSetError> {
        self.fanout(FanoutMode::Parallel, "finalize_log_segment", move |entry| {
            entry.close_stream()?;
            entry.journal().finalize_log_segment(first_txid, last_txid)
        })
    }

    pub fn purge_logs_older_than(&mut self, min_txid: u64) -> Result<QuorumCheck, JournalSetError> {
        self.fanout(FanoutMode::Parallel, "purge_logs_older_than", move |entry| {
            entry.journal().purge_logs_older_than(min_txid)
        })
    }

    pub fn recover_unfinalized_segments(&mut self) -> Result<QuorumCheck, JournalSetError> {
        self.fanout(FanoutMode::Parallel, "recover_unfinalized_segments", |entry| {
            entry.journal().recover_unfinalized_segments()
        })
    }

    /// Closes every entry. The worker pool itself is torn down when this
    /// `JournalSet` is dropped (RAII), not by this call.
    pub fn close(&mut self) -> Result<QuorumCheck, JournalSetError> {
        self.fanout(FanoutMode::Parallel, "close", |entry| entry.close())
    }

    pub fn format(&self, _ns_info: &NamespaceInfo) -> Result<(), JournalSetError> {
        Err(JournalSetError::Unsupported)
    }

    pub fn has_some_data(&self) -> Result<bool, JournalSetError> {
        Err(JournalSetError::Unsupported)
    }

    pub fn is_segment_in_progress(&self, _txid: u64) -> Result<bool, JournalSetError> {
        Err(JournalSetError::Unsupported)
    }

    pub fn read_with_validation(&self, _from_txid: u64) -> Result<(), JournalSetError> {
        Err(JournalSetError::Unsupported)
    }

    pub(crate) fn fanout<F>(
        &mut self,
        mode: FanoutMode,
        op_name: &str,
        op: F,
    ) -> Result<QuorumCheck, JournalSetError>
    where
        F: Fn(&mut JournalEntry) -> anyhow::Result<()> + Sync,
    {
        let span = tracing::debug_span!("journal_set_fanout", op = op_name, entries = self.entries.len());
        let _guard = span.enter();
        let outcome = self.executor.run(mode, &mut self.entries, op_name, op)?;
        let arbiter = HealthArbiter::new(self.registry.as_ref(), self.metrics.as_ref());
        arbiter.arbitrate(&mut self.entries, outcome, &mut self.force_check, &self.config)
    }
}

impl std::fmt::Debug for JournalSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalSet")
            .field("entries", &self.entries.len())
            .field("config", &self.config)
            .field("force_check", &self.force_check)
            .finish()
    }
}
