//! Oracle table entry

use pinocchio::pubkey::Pubkey;
use ratebook_common::{RegistryError, MAX_NAME_LEN};

/// One registered rate reporter.
///
/// `rate` and `last_updated` only change through an update signed by
/// `pubkey` (or through settlement of such updates).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleEntry {
    /// Display label, UTF-8, `name_len` bytes used
    pub name: [u8; MAX_NAME_LEN],
    /// Identity that must sign rate updates for this entry
    pub pubkey: Pubkey,
    /// Last reported rate, implicit fixed scale
    pub rate: u64,
    /// Unix timestamp of the last update, 0 until the first one
    pub last_updated: i64,
    pub name_len: u8,
    pub _padding: [u8; 7],
}

impl OracleEntry {
    pub const LEN: usize = core::mem::size_of::<Self>();

    pub const EMPTY: Self = Self {
        name: [0; MAX_NAME_LEN],
        pubkey: [0; 32],
        rate: 0,
        last_updated: 0,
        name_len: 0,
        _padding: [0; 7],
    };

    /// Fresh entry with zero rate and no update yet
    pub fn new(name: &[u8], pubkey: Pubkey) -> Result<Self, RegistryError> {
        validate_name(name)?;
        let mut entry = Self::EMPTY;
        entry.name[..name.len()].copy_from_slice(name);
        entry.name_len = name.len() as u8;
        entry.pubkey = pubkey;
        Ok(entry)
    }

    pub fn name(&self) -> &str {
        let len = (self.name_len as usize).min(MAX_NAME_LEN);
        core::str::from_utf8(&self.name[..len]).unwrap_or("")
    }

    /// Last-write-wins rate update
    #[inline]
    pub fn record_rate(&mut self, rate: u64, now: i64) {
        self.rate = rate;
        self.last_updated = now;
    }
}

/// Names are 1..=MAX_NAME_LEN bytes of UTF-8
pub fn validate_name(name: &[u8]) -> Result<&str, RegistryError> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(RegistryError::InvalidName);
    }
    core::str::from_utf8(name).map_err(|_| RegistryError::InvalidName)
}
