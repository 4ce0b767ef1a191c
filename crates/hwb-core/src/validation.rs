use serde_json::Value;

use crate::errors::ShapeError;

/// Check an API answer and return its `homeworks` list (possibly empty).
///
/// An absent answer (the client already gave up on it) is treated like an
/// empty one.
pub fn check_response(response: Option<&Value>) -> Result<&Vec<Value>, ShapeError> {
    let result = validate(response);
    if let Err(e) = &result {
        tracing::error!("{e}");
    }
    result
}

fn validate(response: Option<&Value>) -> Result<&Vec<Value>, ShapeError> {
    let Some(response) = response.filter(|v| !is_falsy(v)) else {
        return Err(ShapeError::EmptyPayload);
    };
    let Some(map) = response.as_object() else {
        return Err(ShapeError::WrongType(json_type(response)));
    };
    let Some(homeworks) = map.get("homeworks") else {
        return Err(ShapeError::MissingKey);
    };
    homeworks
        .as_array()
        .ok_or_else(|| ShapeError::WrongFormat(json_type(homeworks)))
}

fn is_falsy(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
