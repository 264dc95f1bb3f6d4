//! IAQ baseline checkpointing.
//!
//! The SGP30 learns a pair of baseline words while it runs.  They are lost
//! on power-off, so the scheduler periodically reads them back and stores
//! them; on the next boot they are restored before the first measurement.
//!
//! The record is human-readable JSON, a two-element array
//! `[co2eq, tvoc]`, kept under a single key of a [`StoragePort`].

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{BaselineError, BaselinePort, StorageError, StoragePort};

/// Largest record we expect: `[65535, 65535]` plus some whitespace slack.
const RECORD_BUF: usize = 64;

/// The sensor's calibration baseline.  Only ever handled as a complete pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u16; 2]", into = "[u16; 2]")]
pub struct CalibrationBaseline {
    pub co2eq: u16,
    pub tvoc: u16,
}

impl CalibrationBaseline {
    pub const fn new(co2eq: u16, tvoc: u16) -> Self {
        Self { co2eq, tvoc }
    }
}

impl From<[u16; 2]> for CalibrationBaseline {
    fn from([co2eq, tvoc]: [u16; 2]) -> Self {
        Self { co2eq, tvoc }
    }
}

impl From<CalibrationBaseline> for [u16; 2] {
    fn from(b: CalibrationBaseline) -> Self {
        [b.co2eq, b.tvoc]
    }
}

impl core::fmt::Display for CalibrationBaseline {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}, {}]", self.co2eq, self.tvoc)
    }
}

/// Baseline record backed by one key of a [`StoragePort`].
pub struct BaselineStore<S> {
    storage: S,
    namespace: heapless::String<15>,
    key: heapless::String<15>,
}

impl<S: StoragePort> BaselineStore<S> {
    pub fn new(storage: S, namespace: heapless::String<15>, key: heapless::String<15>) -> Self {
        Self {
            storage,
            namespace,
            key,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Encode a baseline as its on-storage text form.
    pub fn encode(baseline: CalibrationBaseline) -> Result<Vec<u8>, BaselineError> {
        serde_json::to_vec(&baseline).map_err(|_| BaselineError::WriteFailure)
    }

    /// Decode the on-storage text form.
    pub fn decode(bytes: &[u8]) -> Result<CalibrationBaseline, BaselineError> {
        serde_json::from_slice(bytes).map_err(|_| BaselineError::Corrupt)
    }
}

impl<S: StoragePort> BaselinePort for BaselineStore<S> {
    fn load(&self) -> Result<CalibrationBaseline, BaselineError> {
        let mut buf = [0u8; RECORD_BUF];
        let len = match self.storage.read(&self.namespace, &self.key, &mut buf) {
            Ok(len) => len,
            Err(StorageError::NotFound) => return Err(BaselineError::NotFound),
            Err(e) => {
                warn!("BaselineStore: read failed ({}), treating record as corrupt", e);
                return Err(BaselineError::Corrupt);
            }
        };

        let baseline = Self::decode(&buf[..len])?;
        debug!("BaselineStore: loaded {}", baseline);
        Ok(baseline)
    }

    fn save(&mut self, baseline: CalibrationBaseline) -> Result<(), BaselineError> {
        let bytes = Self::encode(baseline)?;
        self.storage
            .write(&self.namespace, &self.key, &bytes)
            .map_err(|e| {
                warn!("BaselineStore: write failed ({})", e);
                BaselineError::WriteFailure
            })
    }
}
