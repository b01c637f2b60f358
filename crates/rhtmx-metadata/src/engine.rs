// File: src/engine.rs
// Purpose: Validate model values against registered metadata

use std::borrow::Cow;

use tracing::debug;

use crate::context::ValidationContext;
use crate::descriptor::{FieldDescriptor, FieldKind, FieldSource, MetadataDescriptor};
use crate::error::Result;
use crate::registry::MetadataRegistry;
use crate::result::ValidationResult;
use crate::value::Value;

/// Validates models against a [`MetadataRegistry`].
///
/// Validation is a pure function of the model, its metadata and the request
/// context. Failing rules are data in the returned [`ValidationResult`]; the
/// only `Err` is a type with no registered metadata.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'r> {
    registry: &'r MetadataRegistry,
}

impl<'r> Validator<'r> {
    pub fn new(registry: &'r MetadataRegistry) -> Self {
        Self { registry }
    }

    /// Validate `target` as `type_name`, reporting paths under `model_name`.
    ///
    /// A target that is not an object (a `null` body, say) is validated as an
    /// empty object, so every required field is reported missing.
    pub fn validate(
        &self,
        model_name: &str,
        type_name: &str,
        target: &Value,
        ctx: &ValidationContext,
    ) -> Result<ValidationResult> {
        let descriptor = self.registry.resolve(type_name, ctx)?;

        let empty = Value::empty_object();
        let target = if target.as_object().is_some() {
            target
        } else {
            &empty
        };
        let bound = bind_headers(&descriptor, target, ctx);

        let mut result = ValidationResult::success();
        self.validate_object(model_name, &descriptor, &bound, &mut result)?;

        debug!(
            model = model_name,
            type_name = %descriptor.type_name,
            errors = result.len(),
            "model validated"
        );

        Ok(result)
    }

    fn validate_object(
        &self,
        path: &str,
        descriptor: &MetadataDescriptor,
        target: &Value,
        result: &mut ValidationResult,
    ) -> Result<()> {
        let mut own_errors = 0;

        for field in &descriptor.fields {
            let field_path = format!("{}.{}", path, field.name);
            let value = target.field(&field.name);
            if self.validate_field(&field_path, field, value, result)? {
                own_errors += 1;
            }
        }

        // Object-level rules only run once the object's own fields are valid
        if own_errors == 0 {
            if let Some(rule) = &descriptor.class_rule {
                if !rule.is_satisfied_by(target) {
                    result.add(path, rule.message.clone());
                }
            }
        }

        Ok(())
    }

    /// Returns whether an error was recorded at `path` itself.
    fn validate_field(
        &self,
        path: &str,
        field: &FieldDescriptor,
        value: Option<&Value>,
        result: &mut ValidationResult,
    ) -> Result<bool> {
        let display = field.display_name();

        let value = match value {
            Some(v) if !v.is_missing() => v,
            _ => {
                // Absent: only Required speaks, and nothing below is visited
                return Ok(match field.required_rule() {
                    Some(rule) => {
                        result.add(path, rule.message_for(display));
                        true
                    }
                    None => false,
                });
            }
        };

        if !field.kind.accepts(value) {
            result.add(path, conversion_message(value, display));
            return Ok(true);
        }

        // Text rules see what a binder would hold: numbers and bools as strings
        let bound = match (&field.kind, value) {
            (FieldKind::Text, Value::Number(_) | Value::Bool(_)) => {
                Cow::Owned(Value::String(value.to_display()))
            }
            _ => Cow::Borrowed(value),
        };

        for rule in field.rules.iter().filter(|r| !r.is_required()) {
            if let Err(message) = rule.check(display, &bound) {
                result.add(path, message);
                return Ok(true);
            }
        }

        match &field.kind {
            FieldKind::Object(type_name) => {
                let nested = self.registry.descriptor(type_name)?;
                self.validate_object(path, &nested, value, result)?;
            }
            FieldKind::Collection(type_name) => {
                let nested = self.registry.descriptor(type_name)?;
                for (i, item) in value.as_array().unwrap_or_default().iter().enumerate() {
                    let item_path = format!("{}[{}]", path, i);
                    if item.as_object().is_some() {
                        self.validate_object(&item_path, &nested, item, result)?;
                    } else if !item.is_missing() {
                        result.add(item_path, conversion_message(item, display));
                    }
                }
            }
            _ => {}
        }

        Ok(false)
    }
}

fn conversion_message(value: &Value, display: &str) -> String {
    format!("The value '{}' is not valid for {}.", value.to_display(), display)
}

/// Overlay header-bound fields onto the body. Headers win when present.
fn bind_headers<'a>(
    descriptor: &MetadataDescriptor,
    target: &'a Value,
    ctx: &ValidationContext,
) -> Cow<'a, Value> {
    let from_headers: Vec<(&str, &str)> = descriptor
        .fields
        .iter()
        .filter_map(|field| match &field.source {
            FieldSource::Header(header) => ctx.header(header).map(|v| (field.name.as_str(), v)),
            FieldSource::Body => None,
        })
        .collect();

    if from_headers.is_empty() {
        return Cow::Borrowed(target);
    }

    let mut fields = target.as_object().cloned().unwrap_or_default();
    for (name, value) in from_headers {
        fields.insert(name.to_string(), Value::from(value));
    }
    Cow::Owned(Value::Object(fields))
}
