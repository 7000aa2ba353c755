//! Shared constants for the rate registry

/// PDA seed of the single registry record
pub const RATE_DATA_SEED: &[u8] = b"rate_data";

/// Oracle table capacity, fixed when the record is created
pub const MAX_ORACLES: usize = 16;

/// Maximum oracle display name length in bytes (UTF-8)
pub const MAX_NAME_LEN: usize = 32;

/// Serialized size of one settled rate inside a settlement snapshot:
/// pubkey (32) + rate (8) + last_updated (8)
pub const SETTLED_RATE_LEN: usize = 48;
