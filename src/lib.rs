//! Fan-out, health-tracking, and quorum enforcement across a set of
//! metadata edit-log journals.
//!
//! A `JournalSet` multiplexes writes and lifecycle operations across every
//! registered [`collaborators::Journal`], tolerating the failure of
//! individual journals as long as quorum (configured in [`config`]) still
//! holds. See [`facade::JournalSet`] for the entry point.

pub mod collaborators;
pub mod config;
pub mod entry;
pub mod error;
pub mod facade;
pub mod fanout;
pub mod health;
pub mod manifest;
pub mod metrics;
pub mod selector;
pub mod stream;

#[cfg(test)]
mod test_support;

pub use config::JournalSetConfig;
pub use error::{JournalSetError, QuorumStatus, Result};
pub use facade::{JournalRegistration, JournalSet};
pub use health::QuorumCheck;
pub use manifest::{RemoteEditLog, RemoteEditLogManifest};
