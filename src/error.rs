use std::fmt;

use thiserror::Error;

/// Snapshot of the quorum inputs at the moment a check failed.
///
/// Carried on [`JournalSetError::QuorumLost`] so callers can log or alert on
/// the exact counts that tripped the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuorumStatus {
    pub min_journals: usize,
    pub active: usize,
    pub min_nonlocal_journals: usize,
    pub non_local_active: usize,
    pub required_disabled: bool,
}

impl fmt::Display for QuorumStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "active={}/{} non_local_active={}/{} required_disabled={}",
            self.active,
            self.min_journals,
            self.non_local_active,
            self.min_nonlocal_journals,
            self.required_disabled
        )
    }
}

#[derive(Error, Debug)]
pub enum JournalSetError {
    #[error("stream already open for this journal entry")]
    StreamAlreadyOpen,

    #[error("quorum lost: {status}")]
    QuorumLost { status: QuorumStatus },

    #[error("internal worker pool error: {0}")]
    InternalPoolError(String),

    #[error("operation not supported on the journal set facade")]
    Unsupported,

    #[error("no journal could serve transactions from txid {from_txid}")]
    Corrupt {
        from_txid: u64,
        #[source]
        cause: anyhow::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The input selector picked a journal but opening its stream failed.
    /// Not one of the named §7 kinds — the spec leaves this case open —
    /// but a real crate still needs a typed way to report it.
    #[error("failed to open input stream from selected journal: {0}")]
    InputStreamFailed(anyhow::Error),

    /// `format_non_file_journals` runs before the set is live, so its
    /// errors propagate directly rather than going through the arbiter.
    #[error("format failed on a non-file-backed journal: {0}")]
    FormatFailed(anyhow::Error),
}

pub type Result<T, E = JournalSetError> = std::result::Result<T, E>;
