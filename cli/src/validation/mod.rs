//! JSON Schema validation for the configuration document.
//!
//! The schema is embedded at compile time from `schemas/config.schema.json`
//! and checked with JSON Schema Draft 7 before the document is deserialized,
//! so every structural problem is reported at once instead of one serde
//! error at a time.

use jsonschema::Validator;
use once_cell::sync::Lazy;
use serde_json::Value;

const CONFIG_SCHEMA: &str = include_str!("../../schemas/config.schema.json");

/// Draft 7 validator for the config document, compiled on first use.
static CONFIG_VALIDATOR: Lazy<Result<Validator, String>> = Lazy::new(|| {
    let schema: Value = serde_json::from_str(CONFIG_SCHEMA)
        .map_err(|e| format!("Invalid embedded schema: {}", e))?;
    jsonschema::draft7::new(&schema).map_err(|e| format!("Invalid embedded schema: {}", e))
});

/// Check a configuration document against the embedded schema.
///
/// Returns every violation, one message each.
pub fn validate_config(data: &Value) -> Result<(), Vec<String>> {
    let validator = CONFIG_VALIDATOR.as_ref().map_err(|e| vec![e.clone()])?;
    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
