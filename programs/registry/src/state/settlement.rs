//! Settlement snapshots: ephemeral-context state carried back to the durable
//! record by `settle` / `undelegate`.
//!
//! Wire layout (little-endian):
//!
//! ```text
//! revision: u64
//! count:    u8                 (<= MAX_ORACLES)
//! count x { pubkey: [u8; 32], rate: u64, last_updated: i64 }
//! ```

use pinocchio::pubkey::Pubkey;
use ratebook_common::{InstructionReader, RegistryError, MAX_ORACLES, SETTLED_RATE_LEN};

/// Last known rate of one oracle in the ephemeral copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettledRate {
    pub pubkey: Pubkey,
    pub rate: u64,
    pub last_updated: i64,
}

impl SettledRate {
    const EMPTY: Self = Self {
        pubkey: [0; 32],
        rate: 0,
        last_updated: 0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementSnapshot {
    /// Revision of the ephemeral copy the snapshot was taken from
    pub revision: u64,
    count: u8,
    entries: [SettledRate; MAX_ORACLES],
}

/// What a settlement did to the durable record
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SettlementOutcome {
    /// Snapshot revision was not newer than the record; nothing applied
    pub replayed: bool,
    /// Entries written
    pub applied: u8,
    /// Entries already identical to the durable copy
    pub unchanged: u8,
    /// Entries skipped because the durable copy is newer
    pub stale: u8,
    /// Entries skipped because the pubkey is not registered
    pub unknown: u8,
}

impl SettlementSnapshot {
    /// Bytes before the entries: revision + count
    pub const HEADER_LEN: usize = 9;

    pub fn new(revision: u64) -> Self {
        Self {
            revision,
            count: 0,
            entries: [SettledRate::EMPTY; MAX_ORACLES],
        }
    }

    pub fn push(&mut self, rate: SettledRate) -> Result<(), RegistryError> {
        let idx = self.count as usize;
        if idx >= MAX_ORACLES {
            return Err(RegistryError::InvalidInstruction);
        }
        self.entries[idx] = rate;
        self.count += 1;
        Ok(())
    }

    pub fn entries(&self) -> &[SettledRate] {
        &self.entries[..self.count as usize]
    }

    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn packed_len(&self) -> usize {
        Self::HEADER_LEN + self.len() * SETTLED_RATE_LEN
    }

    /// Decode from instruction data. Trailing bytes are rejected.
    pub fn unpack(data: &[u8]) -> Result<Self, RegistryError> {
        let mut reader = InstructionReader::new(data);
        let revision = reader.read_u64()?;
        let count = reader.read_u8()? as usize;
        if count > MAX_ORACLES {
            return Err(RegistryError::InvalidInstruction);
        }

        let mut snapshot = Self::new(revision);
        for _ in 0..count {
            let pubkey = reader.read_pubkey()?;
            let rate = reader.read_u64()?;
            let last_updated = reader.read_i64()?;
            snapshot.push(SettledRate {
                pubkey,
                rate,
                last_updated,
            })?;
        }
        reader.finish()?;
        Ok(snapshot)
    }

    /// Encode into `out`, returning the number of bytes written
    pub fn pack_into(&self, out: &mut [u8]) -> Result<usize, RegistryError> {
        let len = self.packed_len();
        if out.len() < len {
            return Err(RegistryError::InvalidInstruction);
        }
        out[..8].copy_from_slice(&self.revision.to_le_bytes());
        out[8] = self.count;
        let mut offset = Self::HEADER_LEN;
        for settled in self.entries() {
            out[offset..offset + 32].copy_from_slice(&settled.pubkey);
            out[offset + 32..offset + 40].copy_from_slice(&settled.rate.to_le_bytes());
            out[offset + 40..offset + 48].copy_from_slice(&settled.last_updated.to_le_bytes());
            offset += SETTLED_RATE_LEN;
        }
        Ok(len)
    }

    #[cfg(not(target_os = "solana"))]
    pub fn to_bytes(&self) -> std::vec::Vec<u8> {
        let mut out = std::vec![0u8; self.packed_len()];
        // Buffer is sized from packed_len, so packing cannot fall short.
        let _ = self.pack_into(&mut out);
        out
    }
}
