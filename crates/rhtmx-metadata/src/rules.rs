// File: src/rules.rs
// Purpose: Field-level validation rules and their messages

use regex::Regex;

use crate::error::{MetadataError, Result};
use crate::value::{format_number, Value};

/// What a rule checks
#[derive(Debug, Clone)]
pub enum RuleKind {
    /// Value must be present and, for strings, not blank
    Required,
    /// Numeric value within `[min, max]`
    Range { min: f64, max: f64 },
    /// String (or array) no longer than `n`
    MaxLength(usize),
    /// String (or array) at least `n` long
    MinLength(usize),
    /// String matches the whole expression
    Pattern(Regex),
}

/// A rule attached to a field, with an optional custom message.
///
/// Custom messages may reference `{0}` for the field's display name and
/// `{1}`/`{2}` for the rule's arguments.
#[derive(Debug, Clone)]
pub struct Rule {
    kind: RuleKind,
    message: Option<String>,
}

impl Rule {
    pub fn required() -> Self {
        Self::from_kind(RuleKind::Required)
    }

    pub fn range(min: f64, max: f64) -> Self {
        Self::from_kind(RuleKind::Range { min, max })
    }

    pub fn max_length(n: usize) -> Self {
        Self::from_kind(RuleKind::MaxLength(n))
    }

    pub fn min_length(n: usize) -> Self {
        Self::from_kind(RuleKind::MinLength(n))
    }

    /// Pattern rule anchored to the whole value.
    pub fn pattern(field: &str, pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
            MetadataError::InvalidPattern {
                field: field.to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(Self::from_kind(RuleKind::Pattern(regex)))
    }

    fn from_kind(kind: RuleKind) -> Self {
        Self { kind, message: None }
    }

    /// Replace the default message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        matches!(self.kind, RuleKind::Required)
    }

    /// Check a present value. `Required` is decided by the caller, since it
    /// is the only rule that looks at absent values.
    pub fn check(&self, display: &str, value: &Value) -> std::result::Result<(), String> {
        let ok = match &self.kind {
            RuleKind::Required => !value.is_missing(),
            RuleKind::Range { min, max } => match value.as_number() {
                Some(n) => validate_range(n, *min, *max),
                None => true,
            },
            RuleKind::MaxLength(n) => length_of(value).map_or(true, |len| len <= *n),
            RuleKind::MinLength(n) => length_of(value).map_or(true, |len| len >= *n),
            RuleKind::Pattern(regex) => value.as_str().map_or(true, |s| regex.is_match(s)),
        };

        if ok {
            Ok(())
        } else {
            Err(self.message_for(display))
        }
    }

    /// Message reported when this rule fails for `display`
    pub fn message_for(&self, display: &str) -> String {
        match &self.message {
            Some(template) => {
                let (first, second) = self.arguments();
                template
                    .replace("{0}", display)
                    .replace("{1}", &first)
                    .replace("{2}", &second)
            }
            None => self.default_message(display),
        }
    }

    fn arguments(&self) -> (String, String) {
        match &self.kind {
            RuleKind::Required => (String::new(), String::new()),
            RuleKind::Range { min, max } => (format_number(*min), format_number(*max)),
            RuleKind::MaxLength(n) | RuleKind::MinLength(n) => (n.to_string(), String::new()),
            RuleKind::Pattern(regex) => (pattern_source(regex).to_string(), String::new()),
        }
    }

    fn default_message(&self, display: &str) -> String {
        match &self.kind {
            RuleKind::Required => format!("The {} field is required.", display),
            RuleKind::Range { min, max } => format!(
                "The field {} must be between {} and {}.",
                display,
                format_number(*min),
                format_number(*max)
            ),
            RuleKind::MaxLength(n) => format!(
                "The field {} must be a string with a maximum length of {}.",
                display, n
            ),
            RuleKind::MinLength(n) => format!(
                "The field {} must be a string with a minimum length of {}.",
                display, n
            ),
            RuleKind::Pattern(regex) => format!(
                "The field {} must match the regular expression '{}'.",
                display,
                pattern_source(regex)
            ),
        }
    }
}

/// Validates value is within an inclusive range
pub fn validate_range(value: f64, min: f64, max: f64) -> bool {
    value >= min && value <= max
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

// Strip the anchoring added in `Rule::pattern`
fn pattern_source(regex: &Regex) -> &str {
    let src = regex.as_str();
    src.strip_prefix("^(?:")
        .and_then(|s| s.strip_suffix(")$"))
        .unwrap_or(src)
}
