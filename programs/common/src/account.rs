//! Account validation and zero-copy access helpers

use crate::error::RegistryError;
use pinocchio::{account_info::AccountInfo, msg, pubkey::Pubkey};

/// Require that `account` is owned by `program_id`
#[inline]
pub fn validate_owner(account: &AccountInfo, program_id: &Pubkey) -> Result<(), RegistryError> {
    if !account.is_owned_by(program_id) {
        msg!("Error: Account not owned by program");
        return Err(RegistryError::InvalidAccount);
    }
    Ok(())
}

/// Require that `account` is writable
#[inline]
pub fn validate_writable(account: &AccountInfo) -> Result<(), RegistryError> {
    if !account.is_writable() {
        msg!("Error: Account must be writable");
        return Err(RegistryError::InvalidAccount);
    }
    Ok(())
}

/// Require that `account` sits at `expected`
#[inline]
pub fn validate_key(account: &AccountInfo, expected: &Pubkey) -> Result<(), RegistryError> {
    if account.key() != expected {
        msg!("Error: Unexpected account address");
        return Err(RegistryError::InvalidAccount);
    }
    Ok(())
}

/// Reinterpret account data as `&mut T`.
///
/// # Safety
///
/// `T` must be `#[repr(C)]`, valid for any bit pattern of its size, and the
/// caller must hold no other borrow of the account data.
#[inline]
pub unsafe fn borrow_account_data_mut<T>(account: &AccountInfo) -> Result<&mut T, RegistryError> {
    if account.data_len() < core::mem::size_of::<T>() {
        msg!("Error: Account data too small");
        return Err(RegistryError::InvalidAccount);
    }
    let data = account.borrow_mut_data_unchecked();
    Ok(&mut *(data.as_mut_ptr() as *mut T))
}
