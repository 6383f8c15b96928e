//! Process-wide indexing session: cancel flag and resume offset.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::IndexError;

/// Shared between the administrative surfaces and the indexer.
///
/// Both fields are read by the indexer at well-defined points only: the
/// resume offset once at run start, the cancel flag once per window.
#[derive(Debug, Default)]
pub struct IndexSession {
    cancel_requested: AtomicBool,
    resume_offset: AtomicU64,
}

impl IndexSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the active run to stop at its next window boundary. Idempotent.
    pub fn request_cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }

    pub(crate) fn reset_cancel(&self) {
        self.cancel_requested.store(false, Ordering::SeqCst);
    }

    /// Set how many of the most recent messages the next run skips.
    pub fn set_resume_offset(&self, offset: i64) -> Result<(), IndexError> {
        let offset = u64::try_from(offset).map_err(|_| {
            IndexError::Validation(format!("resume offset must be >= 0, got {}", offset))
        })?;
        self.resume_offset.store(offset, Ordering::SeqCst);
        Ok(())
    }

    /// Parse and set the resume offset from command text.
    pub fn set_resume_offset_str(&self, raw: &str) -> Result<u64, IndexError> {
        let offset: i64 = raw.trim().parse().map_err(|_| {
            IndexError::Validation(format!("resume offset must be a number, got {:?}", raw.trim()))
        })?;
        self.set_resume_offset(offset)?;
        Ok(self.resume_offset())
    }

    pub fn resume_offset(&self) -> u64 {
        self.resume_offset.load(Ordering::SeqCst)
    }
}
