//! Error codes surfaced by the registry program
//!
//! Every rejection maps to exactly one variant, returned to the submitter as
//! `ProgramError::Custom(code)`. Codes are part of the wire contract: append,
//! never renumber.

use pinocchio::program_error::ProgramError;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The record already exists at the deterministic address
    AlreadyInitialized = 0,
    /// Caller is not the stored authority
    Unauthorized = 1,
    /// An oracle with this pubkey is already registered
    OracleAlreadyExists = 2,
    /// The oracle table is full
    CapacityExceeded = 3,
    /// Caller did not sign, or is not a registered oracle
    UnauthorizedOracle = 4,
    /// The record is delegated to the ephemeral context
    AlreadyDelegated = 5,
    /// The record is not delegated
    NotDelegated = 6,

    // Transport-level rejections
    /// Unknown discriminator or malformed instruction data
    InvalidInstruction = 100,
    /// Wrong address, owner, size or layout for an account
    InvalidAccount = 101,
    /// Oracle name is empty, too long or not UTF-8
    InvalidName = 102,
}

impl RegistryError {
    /// Numeric code as seen by clients
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Reverse of [`RegistryError::code`], used by off-chain tooling to
    /// decode `Custom` errors
    pub fn from_code(code: u32) -> Option<Self> {
        let err = match code {
            0 => Self::AlreadyInitialized,
            1 => Self::Unauthorized,
            2 => Self::OracleAlreadyExists,
            3 => Self::CapacityExceeded,
            4 => Self::UnauthorizedOracle,
            5 => Self::AlreadyDelegated,
            6 => Self::NotDelegated,
            100 => Self::InvalidInstruction,
            101 => Self::InvalidAccount,
            102 => Self::InvalidName,
            _ => return None,
        };
        Some(err)
    }

    /// Whether retrying with the same signer can ever succeed.
    ///
    /// Authorization failures are permanent. Everything else is either a
    /// precondition the caller has to change or a malformed request.
    pub const fn is_permanent_rejection(self) -> bool {
        matches!(self, Self::Unauthorized | Self::UnauthorizedOracle)
    }
}

impl From<RegistryError> for ProgramError {
    fn from(e: RegistryError) -> Self {
        ProgramError::Custom(e.code())
    }
}
