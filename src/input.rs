// Conversion between raw DOM control values and state values.
// Kept free of web-sys so it can be tested on the host.

use serde_json::{Number, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlKind {
    Number,
    Toggle,
    Text,
}

impl ControlKind {
    /// Map an `<input type=...>` to how its value is stored.
    pub fn from_input_type(input_type: &str) -> Self {
        match input_type {
            "range" | "number" => ControlKind::Number,
            "checkbox" => ControlKind::Toggle,
            _ => ControlKind::Text,
        }
    }
}

/// Parse a control's raw value. Returns `None` for unparsable numbers so a
/// half-typed field never reaches the store.
pub fn parse_control_value(kind: ControlKind, raw: &str, checked: bool) -> Option<Value> {
    match kind {
        ControlKind::Number => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .and_then(number_value),
        ControlKind::Toggle => Some(Value::Bool(checked)),
        ControlKind::Text => Some(Value::String(raw.to_string())),
    }
}

// Whole numbers are stored as integers so they compare equal to integer defaults.
fn number_value(n: f64) -> Option<Value> {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0; // 2^53 - 1
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE {
        Some(Value::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number)
    }
}

/// Text to put back into a control for a stored value.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
