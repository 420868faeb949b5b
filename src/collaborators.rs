//! Contracts for the byte-level collaborators the journal set fans out to.
//!
//! Implementations (a local file journal, a remote log-service client, the
//! storage-directory health registry) live outside this crate; this module
//! only pins down the seam each one must satisfy. All methods are
//! synchronous and expected to block — see the crate-level docs for why.

use crate::manifest::RemoteEditLog;

/// Opaque identity for a storage directory, as handed to the storage
/// registry. Implementations commonly wrap a filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageDirectoryHandle(pub String);

impl StorageDirectoryHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Placeholder for the namespace descriptor passed to `format`.
///
/// The real shape (cluster id, layout version, creation time, ...) is owned
/// by the metadata server; the journal set only forwards it.
#[derive(Debug, Clone, Default)]
pub struct NamespaceInfo {
    pub cluster_id: String,
    pub layout_version: i32,
}

/// An open write handle on a single underlying journal's current segment.
#[cfg_attr(test, mockall::automock)]
pub trait JournalStream: Send {
    fn write(&mut self, record: &[u8]) -> anyhow::Result<()>;
    fn create(&mut self) -> anyhow::Result<()>;
    fn set_ready_to_flush(&mut self) -> anyhow::Result<()>;
    fn flush_and_sync(&mut self) -> anyhow::Result<()>;
    fn flush(&mut self) -> anyhow::Result<()>;
    fn close(&mut self) -> anyhow::Result<()>;
    /// Best-effort abort. Implementations should swallow their own I/O
    /// errors; the journal entry treats this as infallible.
    fn abort(&mut self) -> anyhow::Result<()>;
    fn should_force_sync(&self) -> bool;
    fn num_sync(&self) -> u64;
    fn total_sync_time(&self) -> u64;
}

/// Distinguishes corruption (every replica is unreadable from this point)
/// from an ordinary, possibly-transient I/O failure on one journal.
#[derive(Debug)]
pub enum TransactionCountError {
    Corrupt(anyhow::Error),
    Io(anyhow::Error),
}

/// A read handle opened from `Journal::get_input_stream`. Its contents are
/// opaque to the journal set — reading arbitrary ranges is out of scope.
pub trait InputStream: Send {}

/// One independent durable copy of the edit log.
///
/// Heterogeneous journals (a local file journal, a remote RPC-backed one)
/// share this single trait object type; their streams and input handles are
/// themselves boxed trait objects so the set can hold a mix of them.
#[cfg_attr(test, mockall::automock)]
pub trait Journal: Send + Sync {
    fn start_log_segment(&self, txid: u64) -> anyhow::Result<Box<dyn JournalStream>>;
    fn finalize_log_segment(&self, first_txid: u64, last_txid: u64) -> anyhow::Result<()>;
    fn close(&self) -> anyhow::Result<()>;
    fn number_of_transactions(&self, from_txid: u64) -> Result<u64, TransactionCountError>;
    fn get_input_stream(&self, from_txid: u64) -> anyhow::Result<Box<dyn InputStream>>;
    fn purge_logs_older_than(&self, min_txid: u64) -> anyhow::Result<()>;
    fn recover_unfinalized_segments(&self) -> anyhow::Result<()>;
    fn format(&self, ns_info: &NamespaceInfo) -> anyhow::Result<()>;

    /// `Some` only for file-backed journals; remote journals have no
    /// directory to report errors against or classify as local.
    fn storage_directory(&self) -> Option<StorageDirectoryHandle> {
        None
    }

    /// Segment listing for the manifest builder. Only called on entries
    /// where `storage_directory` is `Some`.
    fn edit_log_manifest(&self, from_txid: u64) -> anyhow::Result<Vec<RemoteEditLog>> {
        let _ = from_txid;
        Ok(Vec::new())
    }
}

/// The storage-directory health registry. Receives error notifications and
/// answers locality questions; never mutated by the journal set beyond that.
#[cfg_attr(test, mockall::automock)]
pub trait StorageRegistry: Send + Sync {
    fn report_error_on_directory(&self, dir: &StorageDirectoryHandle);
    fn update_journal_metrics(&self, failed_count: usize);
    fn is_local(&self, dir: &StorageDirectoryHandle) -> bool;
}
