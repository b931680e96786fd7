//! Validation and extraction of the scrypt cost parameters.
//!
//! Callers hand in an untyped configuration (anything implementing
//! [`ParamSource`]). [`validate`] checks that `N`, `r` and `p` are present and
//! numeric and returns a [`ValidatedConfig`], which is the only way to get at
//! [`extract`]. Whether the numbers make sense for scrypt (power-of-two `N`,
//! memory limits) is left to the derivation backend.

use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// One of the three required configuration fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamField {
    /// CPU/memory cost factor.
    N,
    /// Block size.
    R,
    /// Parallelization factor.
    P,
}

impl ParamField {
    /// Fields in the order they are checked.
    pub const ALL: [ParamField; 3] = [ParamField::N, ParamField::R, ParamField::P];

    /// Key under which the field is looked up in a configuration.
    pub const fn key(self) -> &'static str {
        match self {
            ParamField::N => "N",
            ParamField::R => "r",
            ParamField::P => "p",
        }
    }
}

impl fmt::Display for ParamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Why a configuration was rejected.
///
/// The `Display` output is the message reported to the scripting host.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamError {
    #[error("{0} value is not present")]
    Missing(ParamField),

    #[error("{0} must be a numeric value")]
    NotNumeric(ParamField),
}

impl ParamError {
    pub fn field(&self) -> ParamField {
        match self {
            ParamError::Missing(field) | ParamError::NotNumeric(field) => *field,
        }
    }
}

/// Read-only mapping from field name to an untyped value.
pub trait ParamSource {
    fn field(&self, key: &str) -> Option<&Value>;
}

impl ParamSource for Map<String, Value> {
    fn field(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

/// Only JSON objects have fields; any other value behaves as an empty mapping.
impl ParamSource for Value {
    fn field(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }
}

impl<S: BuildHasher> ParamSource for HashMap<String, Value, S> {
    fn field(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl<T: ParamSource + ?Sized> ParamSource for &T {
    fn field(&self, key: &str) -> Option<&Value> {
        (**self).field(key)
    }
}

/// Cost parameters handed to the derivation routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScryptParams {
    #[serde(rename = "N")]
    pub n: u64,
    pub r: u32,
    pub p: u32,
}

impl ScryptParams {
    pub const fn new(n: u64, r: u32, p: u32) -> Self {
        Self { n, r, p }
    }

    /// `log2(N)` when `N` is a power of two greater than one.
    pub fn log_n(&self) -> Option<u8> {
        if self.n > 1 && self.n.is_power_of_two() {
            u8::try_from(self.n.trailing_zeros()).ok()
        } else {
            None
        }
    }

    /// Bytes of working memory scrypt needs for these parameters: the `V`
    /// buffer (`128 * r * N`) plus the `B` buffer (`128 * r * p`).
    pub fn memory_cost(&self) -> u128 {
        128 * u128::from(self.r) * (u128::from(self.n) + u128::from(self.p))
    }
}

impl fmt::Display for ScryptParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N={}, r={}, p={}", self.n, self.r, self.p)
    }
}

/// A configuration that passed [`validate`].
#[derive(Debug)]
pub struct ValidatedConfig<'a, S: ?Sized> {
    source: &'a S,
}

impl<S: ?Sized> Clone for ValidatedConfig<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for ValidatedConfig<'_, S> {}

impl<'a, S: ParamSource + ?Sized> ValidatedConfig<'a, S> {
    pub fn source(&self) -> &'a S {
        self.source
    }

    pub fn extract(&self) -> ScryptParams {
        extract(self)
    }
}

/// Check presence and type of `N`, `r` and `p`.
///
/// Presence is checked first, stopping at the first missing field. Once all
/// three are present every field is type-checked in order and a later failure
/// replaces an earlier one, so with several non-numeric fields the error names
/// the last of them.
pub fn validate<S>(config: &S) -> Result<ValidatedConfig<'_, S>, ParamError>
where
    S: ParamSource + ?Sized,
{
    for field in ParamField::ALL {
        if config.field(field.key()).is_none() {
            tracing::debug!(field = field.key(), "scrypt parameter missing");
            return Err(ParamError::Missing(field));
        }
    }

    let mut failure = None;
    for field in ParamField::ALL {
        if !config.field(field.key()).is_some_and(Value::is_number) {
            failure = Some(ParamError::NotNumeric(field));
        }
    }

    match failure {
        Some(err) => {
            tracing::debug!(field = err.field().key(), "scrypt parameter is not numeric");
            Err(err)
        }
        None => Ok(ValidatedConfig { source: config }),
    }
}

/// Coerce the validated fields into [`ScryptParams`].
///
/// Fractional values are truncated toward zero and out-of-range values
/// saturate (negative numbers become `0`).
pub fn extract<S: ParamSource + ?Sized>(config: &ValidatedConfig<'_, S>) -> ScryptParams {
    let get = |field: ParamField| config.source.field(field.key()).map_or(0, coerce_u64);
    ScryptParams {
        n: get(ParamField::N),
        r: u32::try_from(get(ParamField::R)).unwrap_or(u32::MAX),
        p: u32::try_from(get(ParamField::P)).unwrap_or(u32::MAX),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn coerce_u64(value: &Value) -> u64 {
    value
        .as_u64()
        .unwrap_or_else(|| value.as_f64().map_or(0, |f| f as u64))
}
