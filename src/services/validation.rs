use serde_json::{Map, Value};

/// How one input field is checked.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
    /// Inclusive range; numeric strings are coerced to numbers
    NumberRange { min: f64, max: f64 },
    OneOf(&'static [&'static str]),
    Text { min_len: usize, max_len: usize },
    /// `data:<mime>;base64,<payload>`
    DataUri,
    /// Array of `{role: user|assistant, content: string}`
    ChatHistory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub rule: FieldRule,
    pub required: bool,
    pub default: Option<Value>,
}

impl Field {
    pub fn required(name: &'static str, rule: FieldRule) -> Self {
        Self {
            name,
            rule,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: &'static str, rule: FieldRule) -> Self {
        Self {
            name,
            rule,
            required: false,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Declarative input schema: a flat list of field rules checked by [`InputSchema::validate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSchema {
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub reason: String,
}

impl InputSchema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Check `raw` and return a normalized object: defaults filled in,
    /// numeric strings coerced, unknown keys dropped. Every offending field
    /// is reported.
    pub fn validate(&self, raw: &Value) -> Result<Value, Vec<FieldViolation>> {
        let empty = Map::new();
        let object = match raw {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => {
                return Err(vec![FieldViolation {
                    field: "input",
                    reason: "expected an object".to_string(),
                }])
            }
        };

        let mut normalized = Map::new();
        let mut violations = Vec::new();

        for field in &self.fields {
            let value = match object.get(field.name) {
                Some(Value::Null) | None => None,
                Some(Value::String(s)) if s.trim().is_empty() && !field.required => None,
                Some(v) => Some(v),
            };

            let Some(value) = value else {
                if let Some(default) = &field.default {
                    normalized.insert(field.name.to_string(), default.clone());
                } else if field.required {
                    violations.push(FieldViolation {
                        field: field.name,
                        reason: "is required".to_string(),
                    });
                }
                continue;
            };

            match check_rule(&field.rule, value) {
                Ok(v) => {
                    normalized.insert(field.name.to_string(), v);
                }
                Err(reason) => violations.push(FieldViolation {
                    field: field.name,
                    reason,
                }),
            }
        }

        if violations.is_empty() {
            Ok(Value::Object(normalized))
        } else {
            Err(violations)
        }
    }
}

fn check_rule(rule: &FieldRule, value: &Value) -> Result<Value, String> {
    match rule {
        FieldRule::NumberRange { min, max } => {
            let n = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }
            .filter(|n| n.is_finite())
            .ok_or_else(|| "must be a number".to_string())?;

            if n < *min {
                return Err(format!("must be at least {}", min));
            }
            if n > *max {
                return Err(format!("must be at most {}", max));
            }
            serde_json::Number::from_f64(n)
                .map(Value::Number)
                .ok_or_else(|| "must be a number".to_string())
        }
        FieldRule::OneOf(options) => {
            let s = value.as_str().ok_or_else(|| "must be a string".to_string())?;
            if options.contains(&s) {
                Ok(value.clone())
            } else {
                Err(format!("must be one of: {}", options.join(", ")))
            }
        }
        FieldRule::Text { min_len, max_len } => {
            let s = value.as_str().ok_or_else(|| "must be a string".to_string())?;
            let len = s.trim().chars().count();
            if len < *min_len {
                Err(format!("must be at least {} characters", min_len))
            } else if len > *max_len {
                Err(format!("must be at most {} characters", max_len))
            } else {
                Ok(value.clone())
            }
        }
        FieldRule::DataUri => {
            let s = value.as_str().ok_or_else(|| "must be a string".to_string())?;
            if is_data_uri(s) {
                Ok(value.clone())
            } else {
                Err("must be a data URI of the form 'data:<mimetype>;base64,<encoded_data>'".to_string())
            }
        }
        FieldRule::ChatHistory => {
            let turns = value.as_array().ok_or_else(|| "must be a list".to_string())?;
            for (i, turn) in turns.iter().enumerate() {
                let role = turn.get("role").and_then(Value::as_str);
                if !matches!(role, Some("user") | Some("assistant")) {
                    return Err(format!("entry {} must have role 'user' or 'assistant'", i));
                }
                if turn.get("content").and_then(Value::as_str).is_none() {
                    return Err(format!("entry {} must have string content", i));
                }
            }
            Ok(value.clone())
        }
    }
}

fn is_data_uri(s: &str) -> bool {
    let Some(rest) = s.strip_prefix("data:") else {
        return false;
    };
    match rest.split_once(";base64,") {
        Some((mime, payload)) => mime.contains('/') && !payload.is_empty(),
        None => false,
    }
}
