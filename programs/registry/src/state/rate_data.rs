//! The registry record
//! PDA: ["rate_data", program_id]

use super::{DelegationState, OracleEntry, SettledRate, SettlementOutcome, SettlementSnapshot};
use pinocchio::pubkey::Pubkey;
use ratebook_common::{RegistryError, MAX_ORACLES};

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RateData {
    /// Magic bytes (b"RATEBOOK")
    pub magic: [u8; 8],
    /// Layout version
    pub version: u8,
    /// PDA bump seed
    pub bump: u8,
    /// `DelegationState` discriminant
    pub delegation_state: u8,
    /// Number of live entries in `oracles`
    pub oracle_count: u8,
    pub _padding: [u8; 4],

    /// Administrative signer, fixed at creation
    pub authority: Pubkey,
    /// Bumped by every successful mutation; settlement snapshots carry it
    pub revision: u64,
    /// Unix timestamp of the current delegation, 0 when undelegated
    pub delegated_at: i64,

    /// Registered oracles in insertion order
    pub oracles: [OracleEntry; MAX_ORACLES],
}

impl RateData {
    pub const MAGIC: &'static [u8; 8] = b"RATEBOOK";
    pub const VERSION: u8 = 1;
    pub const LEN: usize = core::mem::size_of::<Self>();
    pub const CAPACITY: usize = MAX_ORACLES;

    /// Initialize in account memory without building a temporary on the stack
    pub fn initialize_in_place(&mut self, authority: Pubkey, bump: u8) {
        self.magic = *Self::MAGIC;
        self.version = Self::VERSION;
        self.bump = bump;
        self.delegation_state = DelegationState::Undelegated as u8;
        self.oracle_count = 0;
        self._padding = [0; 4];
        self.authority = authority;
        self.revision = 0;
        self.delegated_at = 0;

        unsafe {
            core::ptr::write_bytes(self.oracles.as_mut_ptr(), 0, MAX_ORACLES);
        }
    }

    /// Stack-built record for host-side use (sessions, tests, tooling)
    #[cfg(not(target_os = "solana"))]
    pub fn new(authority: Pubkey, bump: u8) -> Self {
        Self {
            magic: *Self::MAGIC,
            version: Self::VERSION,
            bump,
            delegation_state: DelegationState::Undelegated as u8,
            oracle_count: 0,
            _padding: [0; 4],
            authority,
            revision: 0,
            delegated_at: 0,
            oracles: [OracleEntry::EMPTY; MAX_ORACLES],
        }
    }

    /// Copy a record out of raw account bytes, checking magic and version.
    /// Works on unaligned buffers such as RPC responses.
    pub fn load(data: &[u8]) -> Result<Self, RegistryError> {
        if data.len() < Self::LEN {
            return Err(RegistryError::InvalidAccount);
        }
        let record = unsafe { core::ptr::read_unaligned(data.as_ptr() as *const Self) };
        if !record.validate() {
            return Err(RegistryError::InvalidAccount);
        }
        Ok(record)
    }

    /// Raw byte view, the inverse of [`RateData::load`]
    pub fn as_bytes(&self) -> &[u8] {
        unsafe { core::slice::from_raw_parts(self as *const Self as *const u8, Self::LEN) }
    }

    /// True when `data` already carries a registry record
    pub fn is_initialized(data: &[u8]) -> bool {
        data.len() >= 8 && &data[..8] == Self::MAGIC
    }

    pub fn validate(&self) -> bool {
        &self.magic == Self::MAGIC
            && self.version == Self::VERSION
            && (self.oracle_count as usize) <= MAX_ORACLES
            && DelegationState::try_from(self.delegation_state).is_ok()
    }

    pub fn delegation_state(&self) -> Result<DelegationState, RegistryError> {
        DelegationState::try_from(self.delegation_state)
    }

    pub fn set_delegation_state(&mut self, state: DelegationState) {
        self.delegation_state = state as u8;
    }

    pub fn is_delegated(&self) -> bool {
        self.delegation_state == DelegationState::Delegated as u8
    }

    /// Live oracle entries
    pub fn oracles(&self) -> &[OracleEntry] {
        &self.oracles[..(self.oracle_count as usize).min(MAX_ORACLES)]
    }

    pub fn is_full(&self) -> bool {
        self.oracle_count as usize >= MAX_ORACLES
    }

    pub fn find_oracle(&self, pubkey: &Pubkey) -> Option<(usize, &OracleEntry)> {
        self.oracles()
            .iter()
            .enumerate()
            .find(|(_, entry)| &entry.pubkey == pubkey)
    }

    pub fn find_oracle_mut(&mut self, pubkey: &Pubkey) -> Option<(usize, &mut OracleEntry)> {
        let count = (self.oracle_count as usize).min(MAX_ORACLES);
        self.oracles[..count]
            .iter_mut()
            .enumerate()
            .find(|(_, entry)| &entry.pubkey == pubkey)
    }

    /// Append an entry, keeping pubkeys unique and the table within capacity
    pub fn push_oracle(&mut self, entry: OracleEntry) -> Result<usize, RegistryError> {
        if self.find_oracle(&entry.pubkey).is_some() {
            return Err(RegistryError::OracleAlreadyExists);
        }
        if self.is_full() {
            return Err(RegistryError::CapacityExceeded);
        }
        let idx = self.oracle_count as usize;
        self.oracles[idx] = entry;
        self.oracle_count += 1;
        Ok(idx)
    }

    #[inline]
    pub fn bump_revision(&mut self) -> u64 {
        self.revision = self.revision.wrapping_add(1);
        self.revision
    }

    /// Snapshot every oracle's rate at the current revision
    pub fn snapshot(&self) -> SettlementSnapshot {
        let mut snapshot = SettlementSnapshot::new(self.revision);
        for entry in self.oracles() {
            // Cannot overflow: the table and the snapshot share MAX_ORACLES.
            let _ = snapshot.push(SettledRate {
                pubkey: entry.pubkey,
                rate: entry.rate,
                last_updated: entry.last_updated,
            });
        }
        snapshot
    }

    /// Merge a settlement snapshot.
    ///
    /// Snapshots at or below the current revision are no-ops. Otherwise each
    /// entry is written unless it is older than the durable copy; equal
    /// timestamps apply, since several updates can share one clock second.
    /// Unknown pubkeys are ignored. The record then adopts the snapshot
    /// revision.
    pub fn apply_settlement(&mut self, snapshot: &SettlementSnapshot) -> SettlementOutcome {
        let mut outcome = SettlementOutcome::default();
        if snapshot.revision <= self.revision {
            outcome.replayed = true;
            return outcome;
        }

        for settled in snapshot.entries() {
            match self.find_oracle_mut(&settled.pubkey) {
                None => outcome.unknown += 1,
                Some((_, entry)) if settled.last_updated >= entry.last_updated => {
                    if entry.rate == settled.rate && entry.last_updated == settled.last_updated {
                        outcome.unchanged += 1;
                    } else {
                        entry.record_rate(settled.rate, settled.last_updated);
                        outcome.applied += 1;
                    }
                }
                Some(_) => outcome.stale += 1,
            }
        }

        self.revision = snapshot.revision;
        outcome
    }
}
