use std::fmt;

use serde_json::{Map, Number, Value};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

/// Field-level violations collected while validating one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    model: String,
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            violations: vec![],
        }
    }

    pub fn single(model: impl Into<String>, field: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut errors = Self::new(model);
        errors.push(field, reason);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.violations.push(FieldViolation {
            field: field.into(),
            reason: reason.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation failed: ", self.model)?;
        let parts: Vec<String> = self
            .violations
            .iter()
            .map(|v| format!("{}: {}", v.field, v.reason))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Closed set of string values a field may take
pub trait FieldEnum: Sized + Copy + Default + 'static {
    const ALLOWED: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn parse(value: &str) -> Option<Self> {
        Self::ALLOWED.iter().copied().find(|v| v.as_str() == value)
    }
}

/// Reads typed fields out of a loosely-typed JSON object, coercing scalars
/// the way form and JSON clients send them and collecting every violation
/// instead of stopping at the first.
///
/// Readers return a placeholder when a field is invalid; [`FieldReader::finish`]
/// discards the built value in that case.
pub struct FieldReader<'a> {
    fields: &'a Map<String, Value>,
    errors: ValidationErrors,
}

impl<'a> FieldReader<'a> {
    pub fn new(model: &str, fields: &'a Map<String, Value>) -> Self {
        Self {
            fields,
            errors: ValidationErrors::new(model),
        }
    }

    /// Present and non-null
    fn raw(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    fn coerce_string(&mut self, field: &str, value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => {
                self.errors.push(field, "Cast to string failed");
                None
            }
        }
    }

    pub fn required_string(&mut self, field: &str) -> String {
        let Some(value) = self.raw(field) else {
            self.errors.push(field, "is required");
            return String::new();
        };
        match self.coerce_string(field, value) {
            Some(s) if s.is_empty() => {
                self.errors.push(field, "is required");
                s
            }
            Some(s) => s,
            None => String::new(),
        }
    }

    pub fn optional_string(&mut self, field: &str) -> Option<String> {
        let value = self.raw(field)?;
        self.coerce_string(field, value)
    }

    pub fn optional_number(&mut self, field: &str) -> Option<Number> {
        match self.raw(field)? {
            Value::Number(n) => Some(n.clone()),
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => match parse_number(s.trim()) {
                Some(n) => Some(n),
                None => {
                    self.errors.push(field, format!("Cast to Number failed for value \"{}\"", s));
                    None
                }
            },
            _ => {
                self.errors.push(field, "Cast to Number failed");
                None
            }
        }
    }

    /// Absent or null takes the default; anything else must be an allowed value
    pub fn enumeration<E: FieldEnum>(&mut self, field: &str) -> E {
        let Some(value) = self.raw(field) else {
            return E::default();
        };
        let parsed = match value {
            Value::String(s) => E::parse(s),
            _ => None,
        };
        parsed.unwrap_or_else(|| {
            let shown = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            self.errors
                .push(field, format!("`{}` is not a valid enum value", shown));
            E::default()
        })
    }

    pub fn optional_reference(&mut self, field: &str) -> Option<Uuid> {
        match self.raw(field)? {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => match Uuid::parse_str(s) {
                Ok(id) => Some(id),
                Err(_) => {
                    self.errors.push(field, format!("Cast to reference failed for value \"{}\"", s));
                    None
                }
            },
            _ => {
                self.errors.push(field, "Cast to reference failed");
                None
            }
        }
    }

    pub fn required_reference(&mut self, field: &str) -> Uuid {
        let before = self.errors.violations.len();
        match self.optional_reference(field) {
            Some(id) => id,
            None => {
                if self.errors.violations.len() == before {
                    self.errors.push(field, "is required");
                }
                Uuid::nil()
            }
        }
    }

    pub fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

fn parse_number(s: &str) -> Option<Number> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::from(i));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}
