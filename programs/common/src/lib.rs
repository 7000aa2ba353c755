#![no_std]

pub mod types;
pub mod error;
pub mod account;
pub mod instruction;

pub use types::*;
pub use error::*;
pub use account::*;
pub use instruction::*;
