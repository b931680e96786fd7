//! Process exit codes.

pub const SUCCESS: u8 = 0;
pub const GENERAL_ERROR: u8 = 1;
/// The caller's arguments or parameters were rejected.
pub const ARGUMENT_ERROR: u8 = 2;
/// The derivation routine returned a non-zero result code.
pub const SCRYPT_ERROR: u8 = 3;
pub const CONFIG_ERROR: u8 = 4;
