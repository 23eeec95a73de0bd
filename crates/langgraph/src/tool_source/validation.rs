//! Checks model-supplied tool arguments against a tool's declared schema.
//!
//! Only the subset of JSON Schema the tool declarations use is understood: an object
//! with `required` keys and per-property `type`. Keys the schema does not declare pass.

use serde_json::Value;

use super::{ToolSourceError, ToolSpec};

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

/// `type` may be one name or a list of names.
fn expected_types(schema: &Value) -> Vec<&str> {
    match schema.get("type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(ts)) => ts.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Validates `args` for `spec`: an object holding every required key, each declared
/// property of the declared type.
///
/// Errors are `ToolSourceError::InvalidInput` naming the tool and the offending key, so
/// the model can correct the call from the tool message alone.
pub fn check_arguments(spec: &ToolSpec, args: &Value) -> Result<(), ToolSourceError> {
    let invalid = |reason: String| ToolSourceError::InvalidInput(format!("{}: {}", spec.name, reason));
    let Some(obj) = args.as_object() else {
        return Err(invalid(format!("arguments must be a JSON object, got {}", args)));
    };
    let schema = &spec.input_schema;

    let required = schema
        .get("required")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str);
    for key in required {
        if !obj.contains_key(key) {
            return Err(invalid(format!("missing required field: {}", key)));
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };
    for (key, value) in obj {
        let Some(prop) = properties.get(key) else {
            continue;
        };
        let types = expected_types(prop);
        if !types.is_empty() && !types.iter().any(|t| type_matches(t, value)) {
            return Err(invalid(format!("\"{}\" must be {}, got {}", key, types.join(" or "), value)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search_spec() -> ToolSpec {
        ToolSpec {
            name: "search_movie_info".into(),
            description: "search".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string" },
                    "limit": { "type": ["integer", "null"] }
                },
                "required": ["query"]
            }),
        }
    }

    #[test]
    fn accepts_required_and_extra_keys() {
        let spec = search_spec();
        assert!(check_arguments(&spec, &json!({"query": "Heat cast"})).is_ok());
        assert!(check_arguments(&spec, &json!({"query": "Heat", "limit": 3, "lang": "en"})).is_ok());
        assert!(check_arguments(&spec, &json!({"query": "Heat", "limit": null})).is_ok());
    }

    #[test]
    fn missing_key_names_tool_and_field() {
        let err = check_arguments(&search_spec(), &json!({"q": "Heat"})).unwrap_err();
        assert_eq!(
            err,
            ToolSourceError::InvalidInput("search_movie_info: missing required field: query".into())
        );
    }

    #[test]
    fn wrong_types_are_rejected() {
        let spec = search_spec();
        let err = check_arguments(&spec, &json!({"query": 42})).unwrap_err();
        assert!(matches!(err, ToolSourceError::InvalidInput(ref m) if m.contains("\"query\" must be string")));
        let err = check_arguments(&spec, &json!({"query": "x", "limit": 1.5})).unwrap_err();
        assert!(matches!(err, ToolSourceError::InvalidInput(ref m) if m.contains("integer or null")));
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        let err = check_arguments(&search_spec(), &json!(["Heat"])).unwrap_err();
        assert!(matches!(err, ToolSourceError::InvalidInput(ref m) if m.contains("JSON object")));
    }

    #[test]
    fn schema_without_constraints_accepts_any_object() {
        let spec = ToolSpec {
            name: "noop".into(),
            description: String::new(),
            input_schema: json!({"type": "object"}),
        };
        assert!(check_arguments(&spec, &json!({"anything": [1, 2]})).is_ok());
    }
}
