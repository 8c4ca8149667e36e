//! Contract surface validation.
//!
//! Checks applied before a contract is accepted by the runtime:
//!
//! 1. Entry-point names follow the export naming rule
//! 2. Every imported host function belongs to the closed `HostFunction` set

use std::collections::BTreeSet;

use keystone_hostapi::HostFunction;

use crate::error::RuntimeError;

/// Validate an exported entry-point name.
///
/// A name is non-empty, starts with an ASCII letter and contains only
/// ASCII letters, digits and `_`. Names starting with `_` are private.
pub fn validate_entry_name(name: &str) -> Result<(), RuntimeError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            first.is_ascii_alphabetic() && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if !valid {
        return Err(RuntimeError::InvalidEntryName(name.to_owned()));
    }
    Ok(())
}

/// Resolve a contract's host-function imports.
///
/// Returns the distinct functions imported, in `HostFunction` order.
/// Fails on the first name outside the closed set.
pub fn validate_imports<'a, I>(names: I) -> Result<Vec<HostFunction>, RuntimeError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut resolved = BTreeSet::new();
    for name in names {
        let function = HostFunction::from_name(name)
            .ok_or_else(|| RuntimeError::UnknownImport(name.to_owned()))?;
        resolved.insert(function);
    }
    Ok(resolved.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_entry_names() {
        for name in ["hello", "get_counter", "kv_put", "a", "Method2"] {
            assert!(validate_entry_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_invalid_entry_names() {
        for name in ["", "_private", "2fast", "has-dash", "white space", "ünicode"] {
            assert!(
                matches!(validate_entry_name(name), Err(RuntimeError::InvalidEntryName(_))),
                "{name}"
            );
        }
    }

    #[test]
    fn test_imports_resolved_and_deduplicated() {
        let resolved =
            validate_imports(["storage_read", "value_return", "storage_read", "input"]).unwrap();
        assert_eq!(
            resolved,
            vec![
                HostFunction::ValueReturn,
                HostFunction::Input,
                HostFunction::StorageRead,
            ]
        );
    }

    #[test]
    fn test_unknown_import_rejected() {
        let err = validate_imports(["input", "promise_create"]).unwrap_err();
        assert!(matches!(err, RuntimeError::UnknownImport(name) if name == "promise_create"));
    }

    #[test]
    fn test_no_imports() {
        assert!(validate_imports(std::iter::empty()).unwrap().is_empty());
    }
}
