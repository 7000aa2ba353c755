//! Delegation lifecycle and execution contexts
//!
//! ```text
//!              delegate()
//!  Undelegated ───────────► Delegated ──┐ settle(snapshot)
//!       ▲                       │  ▲────┘
//!       └───────────────────────┘
//!     undelegate(snapshot): commit and release
//! ```
//!
//! While `Delegated`, the durable ledger refuses oracle registration and rate
//! updates; those land in the ephemeral context and come back through
//! settlement. While `Undelegated`, the ephemeral context refuses updates.

use ratebook_common::RegistryError;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegationState {
    Undelegated = 0,
    Delegated = 1,
}

impl TryFrom<u8> for DelegationState {
    type Error = RegistryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Undelegated),
            1 => Ok(Self::Delegated),
            _ => Err(RegistryError::InvalidAccount),
        }
    }
}

/// Where the program is executing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionContext {
    /// Base ledger, source of finality
    Durable,
    /// Low-latency context holding a delegated copy of the record
    Ephemeral,
}

impl ExecutionContext {
    #[cfg(not(feature = "ephemeral"))]
    pub const CURRENT: Self = Self::Durable;

    #[cfg(feature = "ephemeral")]
    pub const CURRENT: Self = Self::Ephemeral;
}

impl DelegationState {
    /// Can oracle rates be written in `ctx` right now?
    pub fn check_rate_writable(self, ctx: ExecutionContext) -> Result<(), RegistryError> {
        match (ctx, self) {
            (ExecutionContext::Durable, Self::Undelegated) => Ok(()),
            (ExecutionContext::Durable, Self::Delegated) => Err(RegistryError::AlreadyDelegated),
            (ExecutionContext::Ephemeral, Self::Delegated) => Ok(()),
            (ExecutionContext::Ephemeral, Self::Undelegated) => Err(RegistryError::NotDelegated),
        }
    }

    /// Administrative mutations only happen on the durable ledger while the
    /// record is not delegated.
    pub fn check_admin_writable(self) -> Result<(), RegistryError> {
        match self {
            Self::Undelegated => Ok(()),
            Self::Delegated => Err(RegistryError::AlreadyDelegated),
        }
    }
}
