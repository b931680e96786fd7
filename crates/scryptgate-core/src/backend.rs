//! The derivation routine behind the boundary.
//!
//! The rest of the crate only sees [`ScryptBackend`], which reports success or
//! failure as a [`NativeResultCode`] the same way the C routine does.
//! [`RustCryptoScrypt`] is the in-process implementation built on the
//! `scrypt` crate.

use crate::native::NativeResultCode;
use crate::params::ScryptParams;

/// A scrypt implementation reporting failures as native result codes.
pub trait ScryptBackend: Send + Sync {
    /// Derive `output.len()` bytes from `passphrase` and `salt`.
    ///
    /// Returns [`NativeResultCode::SUCCESS`] once `output` is filled.
    fn derive(
        &self,
        passphrase: &[u8],
        salt: &[u8],
        params: &ScryptParams,
        output: &mut [u8],
    ) -> NativeResultCode;
}

impl<T: ScryptBackend + ?Sized> ScryptBackend for &T {
    fn derive(
        &self,
        passphrase: &[u8],
        salt: &[u8],
        params: &ScryptParams,
        output: &mut [u8],
    ) -> NativeResultCode {
        (**self).derive(passphrase, salt, params, output)
    }
}

/// Working memory allowed when no explicit limit is configured (2 GiB).
pub const DEFAULT_MAX_MEMORY: u64 = 2 * 1024 * 1024 * 1024;

/// Pure-Rust scrypt with a ceiling on working memory.
///
/// Parameters whose buffers would exceed the ceiling are refused with result
/// code 9 before anything is allocated.
#[derive(Debug, Clone, Copy)]
pub struct RustCryptoScrypt {
    max_memory: u64,
}

impl RustCryptoScrypt {
    pub const fn new() -> Self {
        Self {
            max_memory: DEFAULT_MAX_MEMORY,
        }
    }

    /// Refuse parameters needing more than `bytes` of working memory
    /// (reported as result code 9).
    pub const fn with_memory_limit(mut self, bytes: u64) -> Self {
        self.max_memory = bytes;
        self
    }

    /// Ceiling actually enforced: the configured limit, capped at the largest
    /// allocation the platform can describe.
    pub fn memory_limit(&self) -> u64 {
        let addressable = u64::try_from(isize::MAX).unwrap_or(u64::MAX);
        self.max_memory.min(addressable)
    }
}

impl Default for RustCryptoScrypt {
    fn default() -> Self {
        Self::new()
    }
}

impl ScryptBackend for RustCryptoScrypt {
    fn derive(
        &self,
        passphrase: &[u8],
        salt: &[u8],
        params: &ScryptParams,
        output: &mut [u8],
    ) -> NativeResultCode {
        let limit = self.memory_limit();
        if params.memory_cost() > u128::from(limit) {
            tracing::debug!(
                %params,
                required = %params.memory_cost(),
                limit,
                "scrypt parameters exceed memory limit"
            );
            return NativeResultCode::TOO_MUCH_MEMORY;
        }

        let Some(log_n) = params.log_n() else {
            tracing::debug!(%params, "N is not a power of two greater than one");
            return NativeResultCode::DERIVATION_FAILED;
        };

        // `len` only matters for PHC strings; `scrypt::scrypt` checks the
        // output buffer itself.
        let scrypt_params = match scrypt::Params::new(
            log_n,
            params.r,
            params.p,
            scrypt::Params::RECOMMENDED_LEN,
        ) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(%params, error = %e, "scrypt rejected parameters");
                return NativeResultCode::DERIVATION_FAILED;
            }
        };

        match scrypt::scrypt(passphrase, salt, &scrypt_params, output) {
            Ok(()) => NativeResultCode::SUCCESS,
            Err(e) => {
                tracing::debug!(error = %e, "scrypt derivation failed");
                NativeResultCode::DERIVATION_FAILED
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_fills_output() {
        let mut out = [0u8; 32];
        let code = RustCryptoScrypt::new().derive(
            b"password",
            b"salt",
            &ScryptParams::new(16, 1, 1),
            &mut out,
        );
        assert_eq!(code, NativeResultCode::SUCCESS);
        assert_ne!(out, [0u8; 32]);
    }

    #[test]
    fn test_non_power_of_two_n_fails() {
        let mut out = [0u8; 32];
        let code = RustCryptoScrypt::new().derive(
            b"password",
            b"salt",
            &ScryptParams::new(1000, 8, 1),
            &mut out,
        );
        assert_eq!(code.code(), 3);
    }

    #[test]
    fn test_zero_block_size_fails() {
        let mut out = [0u8; 32];
        let code =
            RustCryptoScrypt::new().derive(b"pw", b"salt", &ScryptParams::new(16, 0, 1), &mut out);
        assert_eq!(code, NativeResultCode::DERIVATION_FAILED);
    }

    #[test]
    fn test_memory_limit() {
        let backend = RustCryptoScrypt::new().with_memory_limit(1024 * 1024);
        let mut out = [0u8; 32];
        let code = backend.derive(b"pw", b"salt", &ScryptParams::new(16384, 8, 1), &mut out);
        assert_eq!(code, NativeResultCode::TOO_MUCH_MEMORY);
        assert_eq!(out, [0u8; 32]);

        let code = backend.derive(b"pw", b"salt", &ScryptParams::new(16, 8, 1), &mut out);
        assert!(code.is_success());
    }

    #[test]
    fn test_default_limit_refuses_huge_n() {
        let backend = RustCryptoScrypt::default();
        let addressable = u64::try_from(isize::MAX).unwrap();
        assert_eq!(backend.memory_limit(), DEFAULT_MAX_MEMORY.min(addressable));

        let mut out = [0u8; 32];
        let code = backend.derive(b"pw", b"salt", &ScryptParams::new(1 << 50, 8, 1), &mut out);
        assert_eq!(code, NativeResultCode::TOO_MUCH_MEMORY);
        assert_eq!(out, [0u8; 32]);
    }

    #[test]
    fn test_limit_counts_parallel_buffers() {
        let backend = RustCryptoScrypt::new().with_memory_limit(1024 * 1024);
        let mut out = [0u8; 32];
        let params = ScryptParams::new(2, 1, (1 << 29) + 1);
        let code = backend.derive(b"pw", b"salt", &params, &mut out);
        assert_eq!(code, NativeResultCode::TOO_MUCH_MEMORY);
    }

    #[test]
    fn test_limit_is_capped_at_isize_max() {
        let backend = RustCryptoScrypt::new().with_memory_limit(u64::MAX);
        assert_eq!(backend.memory_limit(), u64::try_from(isize::MAX).unwrap());

        let mut out = [0u8; 32];
        let code = backend.derive(b"pw", b"salt", &ScryptParams::new(1 << 60, 8, 1), &mut out);
        assert_eq!(code, NativeResultCode::TOO_MUCH_MEMORY);
    }

    #[test]
    fn test_output_lengths_outside_phc_range() {
        let params = ScryptParams::new(16, 1, 1);

        let mut short = [0u8; 8];
        let code = RustCryptoScrypt::new().derive(b"pw", b"salt", &params, &mut short);
        assert!(code.is_success());
        assert_ne!(short, [0u8; 8]);

        let mut long = [0u8; 128];
        let code = RustCryptoScrypt::new().derive(b"pw", b"salt", &params, &mut long);
        assert!(code.is_success());
        assert_eq!(&long[..8], &short[..]);
    }
}
