use serde::{Deserialize, Serialize};

/// Quorum thresholds consumed at construction time. See module-level docs on
/// [`crate::health`] for how these are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalSetConfig {
    pub min_journals: usize,
    pub min_nonlocal_journals: usize,
}

impl Default for JournalSetConfig {
    fn default() -> Self {
        Self {
            min_journals: 1,
            min_nonlocal_journals: 0,
        }
    }
}
