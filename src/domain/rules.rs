use std::fmt;

use chrono::NaiveDateTime;

/// A single field value as seen by validation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Integer(i64),
    Null,
}

/// Named field access for records that can be validated by a [`RuleSet`]
pub trait FieldAccess {
    /// Value of `name`, or `None` when the record has no such field
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

/// Declarative per-field validation rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Non-null and not blank
    Required,
    /// Text value must be one of the listed values (exact match)
    OneOf(Vec<String>),
    /// Integer value must be greater than zero
    Positive,
    /// Text value must parse with the given `chrono` format
    Timestamp(String),
}

/// Why a record was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Missing,
    NotAllowed(String),
    NotPositive(i64),
    Unparseable(String),
    TypeMismatch,
    UnknownField,
    Conversion(String),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "value is missing"),
            Self::NotAllowed(v) => write!(f, "value `{}` is not allowed", v),
            Self::NotPositive(v) => write!(f, "must be positive, got {}", v),
            Self::Unparseable(v) => write!(f, "cannot parse `{}`", v),
            Self::TypeMismatch => write!(f, "unexpected value type"),
            Self::UnknownField => write!(f, "no such field"),
            Self::Conversion(msg) => write!(f, "{}", msg),
        }
    }
}

/// Outcome detail for a skipped record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipReason {
    pub field: String,
    pub violation: Violation,
}

impl SkipReason {
    pub fn new(field: impl Into<String>, violation: Violation) -> Self {
        Self {
            field: field.into(),
            violation,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field `{}`: {}", self.field, self.violation)
    }
}

/// Ordered list of field rules; the first violation wins
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<(String, Rule)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, rule: Rule) -> Self {
        self.rules.push((name.into(), rule));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every rule against `record`
    pub fn check<R: FieldAccess + ?Sized>(&self, record: &R) -> Result<(), SkipReason> {
        for (name, rule) in &self.rules {
            let value = record
                .field(name)
                .ok_or_else(|| SkipReason::new(name.as_str(), Violation::UnknownField))?;

            evaluate(rule, value).map_err(|v| SkipReason::new(name.as_str(), v))?;
        }
        Ok(())
    }
}

fn evaluate(rule: &Rule, value: FieldValue<'_>) -> Result<(), Violation> {
    match (rule, value) {
        (_, FieldValue::Null) => Err(Violation::Missing),

        (Rule::Required, FieldValue::Text(s)) if s.trim().is_empty() => Err(Violation::Missing),
        (Rule::Required, _) => Ok(()),

        (Rule::OneOf(allowed), FieldValue::Text(s)) => {
            if allowed.iter().any(|a| a == s) {
                Ok(())
            } else {
                Err(Violation::NotAllowed(s.to_string()))
            }
        }
        (Rule::OneOf(_), FieldValue::Integer(_)) => Err(Violation::TypeMismatch),

        (Rule::Positive, FieldValue::Integer(n)) if n > 0 => Ok(()),
        (Rule::Positive, FieldValue::Integer(n)) => Err(Violation::NotPositive(n)),
        (Rule::Positive, FieldValue::Text(_)) => Err(Violation::TypeMismatch),

        (Rule::Timestamp(format), FieldValue::Text(s)) => parse_timestamp(s, format)
            .map(|_| ())
            .ok_or_else(|| Violation::Unparseable(s.to_string())),
        (Rule::Timestamp(_), FieldValue::Integer(_)) => Err(Violation::TypeMismatch),
    }
}

/// Parse `value` with `format`, requiring the exact field widths of the format
///
/// `chrono` accepts `2025-1-1 9:5:7` for `%Y-%m-%d %H:%M:%S`. Formatting the
/// parsed value back and comparing rejects anything not written in the
/// canonical width.
pub fn parse_timestamp(value: &str, format: &str) -> Option<NaiveDateTime> {
    let at = NaiveDateTime::parse_from_str(value, format).ok()?;
    (at.format(format).to_string() == value).then_some(at)
}
