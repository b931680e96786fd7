//! Result codes reported by the native scrypt routine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Description returned for any code outside the known table.
///
/// The misspelling is part of the wire format and must not be corrected.
pub const UNKNOWN_DESCRIPTION: &str = "error unkown";

/// Highest result code with a dedicated description.
pub const MAX_KNOWN_CODE: i32 = 13;

const DESCRIPTIONS: [&str; 14] = [
    "success",
    "getrlimit or sysctl(hw.usermem) failed",
    "clock_getres or clock_gettime failed",
    "error computing derived key",
    "could not read salt from /dev/urandom",
    "error in OpenSSL",
    "malloc failed",
    "data is not a valid scrypt-encrypted block",
    "unrecognized scrypt format",
    "decrypting file would take too much memory",
    "decrypting file would take too long",
    "password is incorrect",
    "error writing output file",
    "error reading input file",
];

/// Look up the fixed description of a native result code.
///
/// Total over `i32`: unknown codes map to [`UNKNOWN_DESCRIPTION`].
pub fn describe(code: i32) -> &'static str {
    usize::try_from(code)
        .ok()
        .and_then(|idx| DESCRIPTIONS.get(idx))
        .copied()
        .unwrap_or(UNKNOWN_DESCRIPTION)
}

/// Integer status returned by the derivation routine. `0` is success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NativeResultCode(i32);

impl NativeResultCode {
    pub const SUCCESS: Self = Self(0);
    pub const DERIVATION_FAILED: Self = Self(3);
    pub const MALLOC_FAILED: Self = Self(6);
    pub const TOO_MUCH_MEMORY: Self = Self(9);

    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    pub const fn code(self) -> i32 {
        self.0
    }

    pub const fn is_success(self) -> bool {
        self.0 == 0
    }

    /// Whether the code has its own entry in the description table.
    pub const fn is_known(self) -> bool {
        self.0 >= 0 && self.0 <= MAX_KNOWN_CODE
    }

    pub fn describe(self) -> &'static str {
        describe(self.0)
    }
}

impl From<i32> for NativeResultCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl From<NativeResultCode> for i32 {
    fn from(code: NativeResultCode) -> Self {
        code.0
    }
}

impl fmt::Display for NativeResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_match_table() {
        let expected = [
            (0, "success"),
            (1, "getrlimit or sysctl(hw.usermem) failed"),
            (2, "clock_getres or clock_gettime failed"),
            (3, "error computing derived key"),
            (4, "could not read salt from /dev/urandom"),
            (5, "error in OpenSSL"),
            (6, "malloc failed"),
            (7, "data is not a valid scrypt-encrypted block"),
            (8, "unrecognized scrypt format"),
            (9, "decrypting file would take too much memory"),
            (10, "decrypting file would take too long"),
            (11, "password is incorrect"),
            (12, "error writing output file"),
            (13, "error reading input file"),
        ];
        for (code, text) in expected {
            assert_eq!(describe(code), text, "code {code}");
        }
    }

    #[test]
    fn test_unknown_codes_fall_back() {
        for code in [-1, 14, 500, 999, i32::MIN, i32::MAX] {
            assert_eq!(describe(code), "error unkown");
        }
    }

    #[test]
    fn test_result_code_helpers() {
        assert!(NativeResultCode::SUCCESS.is_success());
        assert!(!NativeResultCode::TOO_MUCH_MEMORY.is_success());
        assert!(NativeResultCode::new(13).is_known());
        assert!(!NativeResultCode::new(14).is_known());
        assert!(!NativeResultCode::new(-3).is_known());
        assert_eq!(
            NativeResultCode::TOO_MUCH_MEMORY.to_string(),
            "9 (decrypting file would take too much memory)"
        );
    }
}
