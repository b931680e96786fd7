//! Boundary layer between a scripting host and a scrypt key-derivation routine.
//!
//! The crate validates caller-supplied cost parameters (`N`, `r`, `p`) and
//! translates every failure (bad arguments, unclassified internal errors,
//! numeric result codes of the derivation routine) into an [`ErrorObject`]
//! with a fixed wire shape.
//!
//! ```
//! use scryptgate_core::{params, ErrorCategory, ErrorObject};
//! use serde_json::json;
//!
//! let config = json!({ "N": 16384, "r": 8, "p": "one" });
//! let err = params::validate(&config).unwrap_err();
//! let obj = ErrorObject::argument(ErrorCategory::ScriptArgument, err.to_string());
//! assert_eq!(
//!     serde_json::to_value(&obj).unwrap(),
//!     json!({ "err_code": 2, "err_message": "p must be a numeric value" })
//! );
//! ```
#![forbid(unsafe_code)]

pub mod backend;
pub mod bridge;
pub mod error;
pub mod native;
pub mod params;

pub use backend::{DEFAULT_MAX_MEMORY, RustCryptoScrypt, ScryptBackend};
pub use bridge::{
    DEFAULT_KEY_LENGTH, DerivedKey, KeyRequest, MAX_KEY_LENGTH, check_params, derive_key,
};
pub use error::{ArgumentKind, ErrorCategory, ErrorObject};
pub use native::{NativeResultCode, describe};
pub use params::{ParamError, ParamField, ParamSource, ScryptParams, ValidatedConfig};
