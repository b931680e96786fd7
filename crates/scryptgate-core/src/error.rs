//! Structured error values returned to the scripting host.
//!
//! Every failure crosses the boundary as an [`ErrorObject`]. The Rust value is
//! a plain enum; its `Serialize` impl produces the wire shapes:
//!
//! | kind     | fields |
//! |----------|--------|
//! | argument | `err_code`, `err_message` |
//! | generic  | `err_code` (500), `err_message`, optional `internal_message` |
//! | scrypt   | `err_code`, `err_message`, `scrypt_err_code`, `scrypt_err_message` |

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::native::NativeResultCode;
use crate::params::ParamError;

/// Public message of every generic error.
pub const GENERIC_ERROR_MESSAGE: &str = "Unknown internal error - please report this error to make this module better. Details about reporting the error can be found at...";

/// Public message of every scrypt error.
pub const SCRYPT_ERROR_MESSAGE: &str = "Scrypt internal error";

/// Error categories and their numeric wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bad argument passed by the host layer itself.
    InternalArgument,
    /// Bad argument supplied by the script calling into the host.
    ScriptArgument,
    /// Non-zero result from the derivation routine.
    Scrypt,
    /// Anything else.
    Generic,
}

impl ErrorCategory {
    pub const fn code(self) -> i32 {
        match self {
            ErrorCategory::InternalArgument => 1,
            ErrorCategory::ScriptArgument => 2,
            ErrorCategory::Scrypt => 3,
            ErrorCategory::Generic => 500,
        }
    }

    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(ErrorCategory::InternalArgument),
            2 => Some(ErrorCategory::ScriptArgument),
            3 => Some(ErrorCategory::Scrypt),
            500 => Some(ErrorCategory::Generic),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::InternalArgument => "internal argument error",
            ErrorCategory::ScriptArgument => "script argument error",
            ErrorCategory::Scrypt => "scrypt error",
            ErrorCategory::Generic => "generic error",
        };
        f.write_str(name)
    }
}

/// Which side of the boundary supplied a bad argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentKind {
    Internal,
    Script,
}

impl ArgumentKind {
    pub const fn category(self) -> ErrorCategory {
        match self {
            ArgumentKind::Internal => ErrorCategory::InternalArgument,
            ArgumentKind::Script => ErrorCategory::ScriptArgument,
        }
    }
}

/// A failure, ready to be handed back to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorObject {
    #[error("{message}")]
    Argument { kind: ArgumentKind, message: String },

    #[error("{}", GENERIC_ERROR_MESSAGE)]
    Generic { internal_message: Option<String> },

    #[error("{}: {}", SCRYPT_ERROR_MESSAGE, .code.describe())]
    Scrypt { code: NativeResultCode },
}

impl ErrorObject {
    /// Build an argument error.
    ///
    /// Only the two argument categories produce an argument error. Any other
    /// category yields a generic error carrying `message` as its internal
    /// message.
    pub fn argument(category: ErrorCategory, message: impl Into<String>) -> Self {
        let message: String = message.into();
        let kind = match category {
            ErrorCategory::InternalArgument => ArgumentKind::Internal,
            ErrorCategory::ScriptArgument => ArgumentKind::Script,
            other => {
                tracing::debug!(category = %other, "argument error requested with non-argument category");
                return Self::generic(Some(message));
            }
        };
        ErrorObject::Argument { kind, message }
    }

    /// Build a generic error. An empty message is treated as absent.
    pub fn generic<S: Into<String>>(message: Option<S>) -> Self {
        let internal_message = message.map(Into::<String>::into).filter(|m| !m.is_empty());
        ErrorObject::Generic { internal_message }
    }

    /// Build a scrypt error for a native result code.
    ///
    /// # Panics
    ///
    /// Panics if `category` is not [`ErrorCategory::Scrypt`]; that is a bug
    /// in the caller, not a reportable failure.
    pub fn scrypt(category: ErrorCategory, code: impl Into<NativeResultCode>) -> Self {
        assert_eq!(
            category,
            ErrorCategory::Scrypt,
            "scrypt error objects require the scrypt category"
        );
        ErrorObject::Scrypt { code: code.into() }
    }

    /// Build a script argument error from a rejected configuration.
    pub fn from_param_error(err: ParamError) -> Self {
        Self::argument(ErrorCategory::ScriptArgument, err.to_string())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorObject::Argument { kind, .. } => kind.category(),
            ErrorObject::Generic { .. } => ErrorCategory::Generic,
            ErrorObject::Scrypt { .. } => ErrorCategory::Scrypt,
        }
    }

    /// Value of the `err_code` field.
    pub fn err_code(&self) -> i32 {
        self.category().code()
    }

    /// Value of the `err_message` field.
    pub fn err_message(&self) -> &str {
        match self {
            ErrorObject::Argument { message, .. } => message,
            ErrorObject::Generic { .. } => GENERIC_ERROR_MESSAGE,
            ErrorObject::Scrypt { .. } => SCRYPT_ERROR_MESSAGE,
        }
    }

    pub fn internal_message(&self) -> Option<&str> {
        match self {
            ErrorObject::Generic { internal_message } => internal_message.as_deref(),
            _ => None,
        }
    }

    pub fn native_code(&self) -> Option<NativeResultCode> {
        match self {
            ErrorObject::Scrypt { code } => Some(*code),
            _ => None,
        }
    }

    /// Serialize into a JSON value with the wire field set.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(self.wire_fields())
    }

    fn wire_fields(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut fields = serde_json::Map::new();
        fields.insert("err_code".into(), self.err_code().into());
        fields.insert("err_message".into(), self.err_message().into());
        match self {
            ErrorObject::Argument { .. } => {}
            ErrorObject::Generic { internal_message } => {
                if let Some(message) = internal_message {
                    fields.insert("internal_message".into(), message.as_str().into());
                }
            }
            ErrorObject::Scrypt { code } => {
                fields.insert("scrypt_err_code".into(), code.code().into());
                fields.insert("scrypt_err_message".into(), code.describe().into());
            }
        }
        fields
    }
}

impl From<ParamError> for ErrorObject {
    fn from(err: ParamError) -> Self {
        Self::from_param_error(err)
    }
}

#[derive(Serialize)]
struct WireErrorObject<'a> {
    err_code: i32,
    err_message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    internal_message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scrypt_err_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scrypt_err_message: Option<&'static str>,
}

impl Serialize for ErrorObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let code = self.native_code();
        WireErrorObject {
            err_code: self.err_code(),
            err_message: self.err_message(),
            internal_message: self.internal_message(),
            scrypt_err_code: code.map(NativeResultCode::code),
            scrypt_err_message: code.map(NativeResultCode::describe),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamField;
    use serde_json::json;

    #[test]
    fn test_argument_error_shape() {
        let obj = ErrorObject::argument(ErrorCategory::InternalArgument, "N value is not present");
        assert_eq!(
            obj.to_json(),
            json!({ "err_code": 1, "err_message": "N value is not present" })
        );
        assert_eq!(obj.category(), ErrorCategory::InternalArgument);
    }

    #[test]
    fn test_argument_error_with_wrong_category_degrades_to_generic() {
        let obj = ErrorObject::argument(ErrorCategory::Scrypt, "odd");
        assert_eq!(
            obj,
            ErrorObject::Generic {
                internal_message: Some("odd".into())
            }
        );
        assert_eq!(obj.err_code(), 500);
    }

    #[test]
    fn test_generic_error_without_message() {
        let obj = ErrorObject::generic(None::<String>);
        assert_eq!(
            obj.to_json(),
            json!({ "err_code": 500, "err_message": GENERIC_ERROR_MESSAGE })
        );

        let obj = ErrorObject::generic(Some(""));
        assert_eq!(obj.internal_message(), None);
    }

    #[test]
    fn test_generic_error_with_message() {
        let obj = ErrorObject::generic(Some("disk full"));
        assert_eq!(
            obj.to_json(),
            json!({
                "err_code": 500,
                "err_message": GENERIC_ERROR_MESSAGE,
                "internal_message": "disk full"
            })
        );
    }

    #[test]
    fn test_scrypt_error_shape() {
        let obj = ErrorObject::scrypt(ErrorCategory::Scrypt, 9);
        assert_eq!(
            obj.to_json(),
            json!({
                "err_code": 3,
                "err_message": "Scrypt internal error",
                "scrypt_err_code": 9,
                "scrypt_err_message": "decrypting file would take too much memory"
            })
        );
    }

    #[test]
    fn test_scrypt_error_unknown_code() {
        let obj = ErrorObject::scrypt(ErrorCategory::Scrypt, 42);
        assert_eq!(obj.to_json()["scrypt_err_message"], "error unkown");
        assert_eq!(obj.to_json()["scrypt_err_code"], 42);
    }

    #[test]
    #[should_panic(expected = "scrypt category")]
    fn test_scrypt_error_requires_scrypt_category() {
        let _ = ErrorObject::scrypt(ErrorCategory::ScriptArgument, 3);
    }

    #[test]
    fn test_serialize_matches_to_json() {
        let objects = [
            ErrorObject::argument(ErrorCategory::ScriptArgument, "p must be a numeric value"),
            ErrorObject::generic(Some("boom")),
            ErrorObject::generic(None::<&str>),
            ErrorObject::scrypt(ErrorCategory::Scrypt, 11),
        ];
        for obj in objects {
            assert_eq!(serde_json::to_value(&obj).unwrap(), obj.to_json());
        }
    }

    #[test]
    fn test_from_param_error() {
        let obj = ErrorObject::from(ParamError::Missing(ParamField::R));
        assert_eq!(
            obj.to_json(),
            json!({ "err_code": 2, "err_message": "r value is not present" })
        );
    }

    #[test]
    fn test_category_codes_round_trip() {
        for category in [
            ErrorCategory::InternalArgument,
            ErrorCategory::ScriptArgument,
            ErrorCategory::Scrypt,
            ErrorCategory::Generic,
        ] {
            assert_eq!(ErrorCategory::from_code(category.code()), Some(category));
        }
        assert_eq!(ErrorCategory::from_code(4), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ErrorObject::scrypt(ErrorCategory::Scrypt, 11).to_string(),
            "Scrypt internal error: password is incorrect"
        );
        assert_eq!(
            ErrorObject::argument(ErrorCategory::ScriptArgument, "N value is not present")
                .to_string(),
            "N value is not present"
        );
    }
}
