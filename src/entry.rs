use std::sync::Arc;

use crate::collaborators::{Journal, JournalStream, StorageDirectoryHandle, StorageRegistry};
use crate::error::JournalSetError;

/// One journal plus its current output stream and health flags.
///
/// `required`, `shared`, and `remote` are set at construction and never
/// change; `current_stream` and `disabled` are the only mutable state, and
/// every mutator on this type upholds `disabled ⇒ current_stream.is_none()`.
pub struct JournalEntry {
    journal: Arc<dyn Journal>,
    required: bool,
    shared: bool,
    remote: bool,
    current_stream: Option<Box<dyn JournalStream>>,
    disabled: bool,
}

impl JournalEntry {
    pub fn new(journal: Arc<dyn Journal>, required: bool, shared: bool, remote: bool) -> Self {
        Self {
            journal,
            required,
            shared,
            remote,
            current_stream: None,
            disabled: false,
        }
    }

    pub fn journal(&self) -> &Arc<dyn Journal> {
        &self.journal
    }

    /// Identity used by `JournalSet::remove` — two entries wrap "the same"
    /// journal iff their handles point at the same allocation.
    pub fn is_same_journal(&self, journal: &Arc<dyn Journal>) -> bool {
        Arc::ptr_eq(&self.journal, journal)
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn shared(&self) -> bool {
        self.shared
    }

    pub fn remote(&self) -> bool {
        self.remote
    }

    pub fn is_active(&self) -> bool {
        self.current_stream.is_some()
    }

    pub fn is_resource_available(&self) -> bool {
        !self.disabled
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn stream_mut(&mut self) -> Option<&mut (dyn JournalStream + 'static)> {
        self.current_stream.as_deref_mut()
    }

    pub fn stream_ref(&self) -> Option<&(dyn JournalStream + 'static)> {
        self.current_stream.as_deref()
    }

    pub fn storage_directory(&self) -> Option<StorageDirectoryHandle> {
        self.journal.storage_directory()
    }

    pub fn is_local(&self, registry: &dyn StorageRegistry) -> bool {
        match self.storage_directory() {
            Some(dir) => registry.is_local(&dir),
            None => false,
        }
    }

    pub fn is_file_backed(&self) -> bool {
        self.storage_directory().is_some()
    }

    pub fn start_log_segment(&mut self, txid: u64) -> anyhow::Result<()> {
        if self.current_stream.is_some() {
            return Err(JournalSetError::StreamAlreadyOpen.into());
        }
        let stream = self.journal.start_log_segment(txid)?;
        self.current_stream = Some(stream);
        self.disabled = false;
        Ok(())
    }

    /// Idempotent: closing an entry with no open stream is a no-op.
    pub fn close_stream(&mut self) -> anyhow::Result<()> {
        if let Some(mut stream) = self.current_stream.take() {
            stream.close()?;
        }
        Ok(())
    }

    pub fn close(&mut self) -> anyhow::Result<()> {
        self.close_stream()?;
        self.journal.close()
    }

    /// Best-effort: swallows whatever the underlying stream's abort raises.
    /// Idempotent on an already-inactive entry.
    pub fn abort(&mut self) {
        if let Some(mut stream) = self.current_stream.take() {
            let _ = stream.abort();
        }
    }

    pub fn disable(&mut self) {
        self.abort();
        self.disabled = true;
    }
}

impl std::fmt::Debug for JournalEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalEntry")
            .field("required", &self.required)
            .field("shared", &self.shared)
            .field("remote", &self.remote)
            .field("active", &self.is_active())
            .field("disabled", &self.disabled)
            .finish()
    }
}
