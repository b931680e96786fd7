//! End-to-end flow from caller configuration to derived key or error object.

use std::fmt;

use secrecy::{ExposeSecret, SecretBox};
use tracing::instrument;

use crate::backend::ScryptBackend;
use crate::error::{ErrorCategory, ErrorObject};
use crate::native::NativeResultCode;
use crate::params::{self, ParamSource, ScryptParams};

/// Default length of a derived key in bytes.
pub const DEFAULT_KEY_LENGTH: usize = 64;

/// Longest key scrypt can produce: `(2^32 - 1) * 32` bytes (RFC 7914).
pub const MAX_KEY_LENGTH: u64 = ((1 << 32) - 1) * 32;

/// Arguments supplied by the host layer alongside the caller's configuration.
pub struct KeyRequest<'a> {
    pub passphrase: &'a [u8],
    pub salt: &'a [u8],
    pub key_length: usize,
}

impl<'a> KeyRequest<'a> {
    pub fn new(passphrase: &'a [u8], salt: &'a [u8]) -> Self {
        Self {
            passphrase,
            salt,
            key_length: DEFAULT_KEY_LENGTH,
        }
    }

    pub fn with_key_length(mut self, key_length: usize) -> Self {
        self.key_length = key_length;
        self
    }

    fn check(&self) -> Result<(), ErrorObject> {
        if self.salt.is_empty() {
            return Err(ErrorObject::argument(
                ErrorCategory::InternalArgument,
                "salt must not be empty",
            ));
        }
        if self.key_length == 0 {
            return Err(ErrorObject::argument(
                ErrorCategory::InternalArgument,
                "key length must be greater than zero",
            ));
        }
        if !u64::try_from(self.key_length).is_ok_and(|len| len <= MAX_KEY_LENGTH) {
            return Err(ErrorObject::argument(
                ErrorCategory::InternalArgument,
                format!("key length must not exceed {MAX_KEY_LENGTH}"),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for KeyRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRequest")
            .field("passphrase", &"<redacted>")
            .field("salt_len", &self.salt.len())
            .field("key_length", &self.key_length)
            .finish()
    }
}

/// Key material produced by a successful derivation. Zeroized on drop.
pub struct DerivedKey(SecretBox<[u8]>);

impl DerivedKey {
    fn new(bytes: Vec<u8>) -> Self {
        Self(SecretBox::new(bytes.into_boxed_slice()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.expose_secret()
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey").field("len", &self.len()).finish()
    }
}

/// Validate and extract the cost parameters, translating failures into a
/// script argument error.
pub fn check_params<S: ParamSource + ?Sized>(config: &S) -> Result<ScryptParams, ErrorObject> {
    let validated = params::validate(config)?;
    Ok(validated.extract())
}

/// Run the whole pipeline: request checks, parameter validation, extraction
/// and derivation.
#[instrument(level = "debug", skip_all, fields(key_length = request.key_length))]
pub fn derive_key<S, B>(
    config: &S,
    request: &KeyRequest<'_>,
    backend: &B,
) -> Result<DerivedKey, ErrorObject>
where
    S: ParamSource + ?Sized,
    B: ScryptBackend + ?Sized,
{
    request.check()?;
    let params = check_params(config)?;
    tracing::debug!(%params, "deriving key");

    let mut output = output_buffer(request.key_length)?;
    let code = backend.derive(request.passphrase, request.salt, &params, &mut output);
    if !code.is_success() {
        zeroize::Zeroize::zeroize(&mut output);
        tracing::debug!(%code, "derivation routine reported failure");
        return Err(ErrorObject::scrypt(ErrorCategory::Scrypt, code));
    }

    Ok(DerivedKey::new(output))
}

fn output_buffer(len: usize) -> Result<Vec<u8>, ErrorObject> {
    let mut output = Vec::new();
    if let Err(e) = output.try_reserve_exact(len) {
        tracing::debug!(error = %e, len, "could not allocate output buffer");
        return Err(ErrorObject::scrypt(
            ErrorCategory::Scrypt,
            NativeResultCode::MALLOC_FAILED,
        ));
    }
    output.resize(len, 0);
    Ok(output)
}
