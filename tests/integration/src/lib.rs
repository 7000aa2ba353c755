//! Ratebook Integration Tests
//!
//! Drives the registry handlers end to end against an in-memory record, the
//! way a client sees them: one operation at a time, each either fully applied
//! or rejected with a registry error and no change.
//!
//! Account plumbing (PDA creation, owner and signer flags) is covered by the
//! program's own unit tests; these tests start from an initialized record.

use pinocchio::pubkey::Pubkey;
use ratebook_registry::{guard::Caller, RateData};

pub use ratebook_common;
pub use ratebook_registry;

pub const AUTHORITY: Pubkey = [0xA0; 32];
pub const BUMP: u8 = 254;

/// Freshly initialized record owned by [`AUTHORITY`]
pub fn fresh_registry() -> RateData {
    RateData::new(AUTHORITY, BUMP)
}

pub fn authority() -> Caller {
    Caller::signer(AUTHORITY)
}

/// Distinct oracle key for index `i`
pub fn oracle_key(i: u8) -> Pubkey {
    let mut key = [0x10; 32];
    key[31] = i;
    key
}
