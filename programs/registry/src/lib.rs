//! Rate registry program
//!
//! A single PDA record holding an authority and a fixed-capacity table of
//! oracles, each reporting its own rate. Rate updates can be delegated to an
//! ephemeral execution context and settled back.
//!
//! ## Instructions
//!
//! - **Initialize** (0): Create the record, caller becomes authority
//! - **AddOracle** (1): Register an oracle (authority only)
//! - **UpdateRate** (2): Report a rate (registered oracle signer only)
//! - **Delegate** (3): Hand rate updates to the ephemeral context
//! - **Settle** (4): Merge ephemeral state, stay delegated
//! - **Undelegate** (5): Commit ephemeral state and return to the durable ledger

#![cfg_attr(target_os = "solana", no_std)]

// Always expose the dispatcher; the symbol is only registered with `bpf-entrypoint`
pub mod entrypoint;

pub mod guard;
pub mod instructions;
pub mod pda;
pub mod state;

#[cfg(not(target_os = "solana"))]
pub mod rollup;

// Panic handler for no_std builds (only for Solana BPF)
#[cfg(all(target_os = "solana", not(test), not(feature = "bpf-entrypoint")))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

pub use state::*;
pub use instructions::RegistryInstruction;

pinocchio_pubkey::declare_id!("6Y6D6zXKSrAq8gdNfp8do8Qs7yhvNbTtXU4jtEm2gdiL");
