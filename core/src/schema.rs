//! Schema registry for outbound payload validation.
//!
//! # Design
//! The registry is an explicitly constructed value, passed to the client at
//! build time — there is no process-wide schema state. `bundled()` compiles
//! the four documents shipped under `core/schemas/`; `from_dir()` loads any
//! directory following the same `{operation}.schema.json` naming convention.
//! Schemas are compiled once at construction and read-only afterwards.
//! A missing name is a packaging defect, reported as `Configuration`, not
//! something callers recover from at runtime.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use jsonschema::Validator;
use serde_json::Value;

use crate::error::ApiError;

/// Filename suffix stripped to derive an operation name.
const SCHEMA_SUFFIX: &str = ".schema.json";

/// The schema documents bundled with the crate, one per POST operation.
const BUNDLED: [(&str, &str); 4] = [
    ("account_create", include_str!("../schemas/account_create.schema.json")),
    ("cc_register", include_str!("../schemas/cc_register.schema.json")),
    ("cc_fund", include_str!("../schemas/cc_fund.schema.json")),
    ("order_create", include_str!("../schemas/order_create.schema.json")),
];

/// Immutable operation-name → compiled-validator map.
pub struct SchemaRegistry {
    validators: HashMap<String, Validator>,
}

impl SchemaRegistry {
    /// Build the registry from the schema documents bundled with the crate.
    ///
    /// Fails with `Configuration` if a bundled document is not valid JSON or
    /// not a valid schema — the crate cannot serve schema-validated
    /// operations in that state.
    pub fn bundled() -> Result<Self, ApiError> {
        let mut validators = HashMap::new();
        for (name, raw) in BUNDLED {
            validators.insert(name.to_string(), compile(name, raw)?);
        }
        Ok(Self { validators })
    }

    /// Build the registry from every `*.schema.json` file in `dir`,
    /// deriving each operation name by stripping the suffix.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ApiError> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| {
            ApiError::Configuration(format!("cannot read schema dir {}: {e}", dir.display()))
        })?;

        let mut validators = HashMap::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                ApiError::Configuration(format!("cannot read schema dir entry: {e}"))
            })?;
            let file_name = entry.file_name();
            let Some(name) = file_name
                .to_str()
                .and_then(|f| f.strip_suffix(SCHEMA_SUFFIX))
            else {
                continue;
            };
            let raw = fs::read_to_string(entry.path()).map_err(|e| {
                ApiError::Configuration(format!("cannot read schema file {name}: {e}"))
            })?;
            validators.insert(name.to_string(), compile(name, &raw)?);
        }
        Ok(Self { validators })
    }

    /// The compiled validator registered under `name`.
    pub fn get(&self, name: &str) -> Result<&Validator, ApiError> {
        self.validators.get(name).ok_or_else(|| {
            ApiError::Configuration(format!("no schema registered under '{name}'"))
        })
    }

    /// Validate `value` against the schema registered under `name`.
    ///
    /// Collects every violation (instance path plus message) so a rejected
    /// payload can be fixed in one pass.
    pub fn validate(&self, name: &str, value: &Value) -> Result<(), ApiError> {
        let validator = self.get(name)?;
        let violations: Vec<String> = validator
            .iter_errors(value)
            .map(|err| {
                let path = err.instance_path().to_string();
                if path.is_empty() {
                    err.to_string()
                } else {
                    format!("{path}: {err}")
                }
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation {
                schema: name.to_string(),
                violations,
            })
        }
    }

    /// Registered operation names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("names", &self.names())
            .finish()
    }
}

/// Parse and compile one schema document.
fn compile(name: &str, raw: &str) -> Result<Validator, ApiError> {
    let document: Value = serde_json::from_str(raw)
        .map_err(|e| ApiError::Configuration(format!("schema '{name}' is not valid JSON: {e}")))?;
    jsonschema::validator_for(&document)
        .map_err(|e| ApiError::Configuration(format!("schema '{name}' is not a valid schema: {e}")))
}
