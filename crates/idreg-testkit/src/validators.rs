//! Key metadata validators with fixed answers

use idreg_core::{Fid, MetadataValidator};
use parking_lot::Mutex;
use std::sync::Arc;

/// Validator returning a test-controlled verdict and counting calls.
#[derive(Debug)]
pub struct StaticValidator {
    verdict: Mutex<bool>,
    calls: Mutex<usize>,
}

impl StaticValidator {
    /// Validator that accepts everything
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self {
            verdict: Mutex::new(true),
            calls: Mutex::new(0),
        })
    }

    /// Validator that rejects everything
    pub fn rejecting() -> Arc<Self> {
        let validator = Self::accepting();
        validator.set_verdict(false);
        validator
    }

    /// Change the verdict for later calls
    pub fn set_verdict(&self, verdict: bool) {
        *self.verdict.lock() = verdict;
    }

    /// Number of validations performed
    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

impl MetadataValidator for StaticValidator {
    fn validate(&self, _fid: Fid, _key: &[u8], _metadata: &[u8]) -> bool {
        *self.calls.lock() += 1;
        *self.verdict.lock()
    }
}
