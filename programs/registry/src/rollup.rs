//! In-process ephemeral context
//!
//! Holds a delegated copy of the record, applies oracle updates under the
//! ephemeral rules and produces the settlement snapshot to merge back. Used
//! by off-chain tooling and tests; on a live deployment the same rules run
//! inside the program built with the `ephemeral` feature.

use crate::guard::Caller;
use crate::instructions::process_update_rate;
use crate::state::{ExecutionContext, RateData, SettlementSnapshot};
use ratebook_common::RegistryError;

pub struct EphemeralSession {
    record: RateData,
}

impl EphemeralSession {
    /// Clone a delegated durable record into a new session
    pub fn open(durable: &RateData) -> Result<Self, RegistryError> {
        if !durable.validate() {
            return Err(RegistryError::InvalidAccount);
        }
        if !durable.is_delegated() {
            return Err(RegistryError::NotDelegated);
        }
        Ok(Self { record: *durable })
    }

    pub fn update_rate(&mut self, caller: &Caller, rate: u64, now: i64) -> Result<usize, RegistryError> {
        process_update_rate(&mut self.record, caller, rate, now, ExecutionContext::Ephemeral)
    }

    pub fn record(&self) -> &RateData {
        &self.record
    }

    /// Everything accumulated so far, stamped with the session revision
    pub fn snapshot(&self) -> SettlementSnapshot {
        self.record.snapshot()
    }
}
