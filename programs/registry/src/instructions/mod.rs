/// Registry instruction handlers

pub mod initialize;
pub mod add_oracle;
pub mod update_rate;
pub mod delegate;
pub mod settle;

pub use initialize::*;
pub use add_oracle::*;
pub use update_rate::*;
pub use delegate::*;
pub use settle::*;

use ratebook_common::RegistryError;

/// Instruction discriminator (first byte of instruction data)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryInstruction {
    /// Create the record at its PDA
    Initialize = 0,
    /// Register an oracle (authority only)
    AddOracle = 1,
    /// Report a rate (registered oracle only)
    UpdateRate = 2,
    /// Hand rate updates to the ephemeral context
    Delegate = 3,
    /// Merge ephemeral state, stay delegated
    Settle = 4,
    /// Commit ephemeral state and take back mutation authority
    Undelegate = 5,
}

impl TryFrom<u8> for RegistryInstruction {
    type Error = RegistryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Initialize),
            1 => Ok(Self::AddOracle),
            2 => Ok(Self::UpdateRate),
            3 => Ok(Self::Delegate),
            4 => Ok(Self::Settle),
            5 => Ok(Self::Undelegate),
            _ => Err(RegistryError::InvalidInstruction),
        }
    }
}

// Account parsing and dispatch live in entrypoint.rs; the functions in this
// module operate on an already-validated record.
