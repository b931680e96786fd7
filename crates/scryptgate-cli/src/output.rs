//! Table and JSON output helpers.

use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use serde::Serialize;

use scryptgate_core::ErrorObject;

pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Convert any failure into the error object handed back to callers.
pub fn error_object_for(err: &anyhow::Error) -> ErrorObject {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ErrorObject>())
        .cloned()
        .unwrap_or_else(|| ErrorObject::generic(Some(format!("{err:#}"))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use scryptgate_core::ErrorCategory;

    #[test]
    fn test_error_object_passthrough() {
        let obj = ErrorObject::scrypt(ErrorCategory::Scrypt, 9);
        let err = anyhow::Error::new(obj.clone());
        assert_eq!(error_object_for(&err), obj);
    }

    #[test]
    fn test_error_object_found_under_context() {
        let obj = ErrorObject::argument(ErrorCategory::ScriptArgument, "r value is not present");
        let err = Err::<(), _>(obj.clone()).context("while deriving").unwrap_err();
        assert_eq!(error_object_for(&err), obj);
    }

    #[test]
    fn test_other_errors_become_generic() {
        let err = anyhow::anyhow!("disk full");
        assert_eq!(
            error_object_for(&err).to_json(),
            serde_json::json!({
                "err_code": 500,
                "err_message": scryptgate_core::error::GENERIC_ERROR_MESSAGE,
                "internal_message": "disk full"
            })
        );
    }
}
