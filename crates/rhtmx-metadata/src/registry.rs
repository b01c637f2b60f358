// File: src/registry.rs
// Purpose: Registration and resolution of type metadata

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::context::ValidationContext;
use crate::descriptor::{MetadataDescriptor, TypeMetadata};
use crate::error::{MetadataError, Result};

/// How a variant's header value is matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderMatch {
    /// Header present with any value
    Present,
    Equals(String),
    /// Header value starts with the given text (`"2."` matches `"2.2"`)
    Prefix(String),
}

impl HeaderMatch {
    fn matches(&self, value: &str) -> bool {
        let value = value.trim();
        match self {
            HeaderMatch::Present => true,
            HeaderMatch::Equals(expected) => value == expected,
            HeaderMatch::Prefix(prefix) => value.starts_with(prefix.as_str()),
        }
    }
}

/// Request-selected alternate metadata for a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub header: String,
    pub matcher: HeaderMatch,
    /// Registered type whose descriptor applies when the header matches
    pub target: String,
}

impl Variant {
    pub fn new(header: impl Into<String>, matcher: HeaderMatch, target: impl Into<String>) -> Self {
        Self {
            header: header.into().to_ascii_lowercase(),
            matcher,
            target: target.into(),
        }
    }

    fn selected_by(&self, ctx: &ValidationContext) -> bool {
        ctx.header(&self.header)
            .map_or(false, |value| self.matcher.matches(value))
    }
}

/// Table of flattened descriptors, keyed by type name.
///
/// Built once at startup through explicit `register` calls, then shared
/// read-only (typically behind an `Arc` in a `OnceCell` static). Derived types are
/// merged with their base at registration, so resolution is a lookup.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    descriptors: HashMap<String, Arc<MetadataDescriptor>>,
    variants: HashMap<String, Vec<Variant>>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type. Its base, if any, must be registered first.
    pub fn register(&mut self, declared: TypeMetadata) -> Result<()> {
        if self.descriptors.contains_key(&declared.type_name) {
            return Err(MetadataError::DuplicateType(declared.type_name));
        }

        let descriptor = match &declared.base {
            Some(base) => {
                let base_descriptor =
                    self.descriptors
                        .get(base)
                        .ok_or_else(|| MetadataError::UnknownBase {
                            derived: declared.type_name.clone(),
                            base: base.clone(),
                        })?;
                MetadataDescriptor::derive(base_descriptor, declared)
            }
            None => MetadataDescriptor::root(declared),
        };

        debug!(
            type_name = %descriptor.type_name,
            fields = descriptor.fields.len(),
            class_rule = descriptor.class_rule.is_some(),
            "registered model metadata"
        );

        self.descriptors
            .insert(descriptor.type_name.clone(), Arc::new(descriptor));
        Ok(())
    }

    /// Builder-style `register`
    pub fn with(mut self, declared: TypeMetadata) -> Result<Self> {
        self.register(declared)?;
        Ok(self)
    }

    /// Add a header-selected variant for `type_name`. Variants are tried in
    /// the order they were added.
    pub fn add_variant(&mut self, type_name: &str, variant: Variant) -> Result<()> {
        if !self.descriptors.contains_key(type_name) {
            return Err(MetadataError::UnknownType(type_name.to_string()));
        }
        if !self.descriptors.contains_key(&variant.target) {
            return Err(MetadataError::UnknownType(variant.target.clone()));
        }

        debug!(
            type_name,
            header = %variant.header,
            target = %variant.target,
            "registered metadata variant"
        );

        self.variants
            .entry(type_name.to_string())
            .or_default()
            .push(variant);
        Ok(())
    }

    /// Descriptor registered under `type_name`, ignoring variants
    pub fn descriptor(&self, type_name: &str) -> Result<Arc<MetadataDescriptor>> {
        self.descriptors
            .get(type_name)
            .cloned()
            .ok_or_else(|| MetadataError::UnknownType(type_name.to_string()))
    }

    /// Descriptor that applies to `type_name` for this request
    pub fn resolve(
        &self,
        type_name: &str,
        ctx: &ValidationContext,
    ) -> Result<Arc<MetadataDescriptor>> {
        let selected = self
            .variants
            .get(type_name)
            .and_then(|variants| variants.iter().find(|v| v.selected_by(ctx)))
            .map(|v| v.target.as_str())
            .unwrap_or(type_name);

        if selected != type_name {
            debug!(type_name, selected, "metadata variant selected");
        }

        self.descriptor(selected)
    }

    /// Check that every nested or collection field names a registered type.
    pub fn verify(&self) -> Result<()> {
        for descriptor in self.descriptors.values() {
            for field in &descriptor.fields {
                if let Some(target) = field.kind.nested_type() {
                    if !self.descriptors.contains_key(target) {
                        return Err(MetadataError::UnknownFieldType {
                            owner: descriptor.type_name.clone(),
                            field: field.name.clone(),
                            target: target.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldDescriptor;
    use crate::rules::Rule;

    fn registry() -> MetadataRegistry {
        let mut registry = MetadataRegistry::new();
        registry
            .register(
                TypeMetadata::new("Product")
                    .field(FieldDescriptor::number("Price").rule(Rule::range(20.0, 100.0))),
            )
            .unwrap();
        registry
            .register(
                TypeMetadata::new("Software")
                    .extends("Product")
                    .field(FieldDescriptor::number("Price").rule(Rule::range(100.0, 200.0))),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_unknown_base_fails() {
        let mut registry = MetadataRegistry::new();
        let err = registry
            .register(TypeMetadata::new("Software").extends("Product"))
            .unwrap_err();
        assert_eq!(
            err,
            MetadataError::UnknownBase {
                derived: "Software".into(),
                base: "Product".into()
            }
        );
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = registry();
        let err = registry.register(TypeMetadata::new("Product")).unwrap_err();
        assert_eq!(err, MetadataError::DuplicateType("Product".into()));
    }

    #[test]
    fn test_unknown_type_fails_resolution() {
        let registry = registry();
        let err = registry
            .resolve("Hardware", &ValidationContext::new())
            .unwrap_err();
        assert_eq!(err, MetadataError::UnknownType("Hardware".into()));
    }

    #[test]
    fn test_variant_selected_by_header() {
        let mut registry = registry();
        registry
            .add_variant(
                "Product",
                Variant::new("Version", HeaderMatch::Prefix("2.".into()), "Software"),
            )
            .unwrap();

        let plain = registry.resolve("Product", &ValidationContext::new()).unwrap();
        assert_eq!(plain.type_name, "Product");

        let ctx = ValidationContext::new().with_header("version", "2.2");
        let selected = registry.resolve("Product", &ctx).unwrap();
        assert_eq!(selected.type_name, "Software");

        let ctx = ValidationContext::new().with_header("version", "1.0");
        let other = registry.resolve("Product", &ctx).unwrap();
        assert_eq!(other.type_name, "Product");
    }

    #[test]
    fn test_variant_target_must_exist() {
        let mut registry = registry();
        let err = registry
            .add_variant(
                "Product",
                Variant::new("version", HeaderMatch::Present, "Hardware"),
            )
            .unwrap_err();
        assert_eq!(err, MetadataError::UnknownType("Hardware".into()));
    }

    #[test]
    fn test_header_match() {
        assert!(HeaderMatch::Present.matches(""));
        assert!(HeaderMatch::Equals("2".into()).matches(" 2 "));
        assert!(!HeaderMatch::Equals("2".into()).matches("2.2"));
        assert!(HeaderMatch::Prefix("2.".into()).matches("2.2"));
        assert!(!HeaderMatch::Prefix("2.".into()).matches("20"));
        assert!(!HeaderMatch::Prefix("2.".into()).matches("1.2"));
    }

    #[test]
    fn test_verify_reports_unregistered_nested_type() {
        let mut registry = MetadataRegistry::new();
        registry
            .register(
                TypeMetadata::new("Product")
                    .field(FieldDescriptor::object("ProductDetails", "ProductDetails")),
            )
            .unwrap();

        let err = registry.verify().unwrap_err();
        assert!(matches!(err, MetadataError::UnknownFieldType { ref target, .. } if target == "ProductDetails"));

        registry
            .register(TypeMetadata::new("ProductDetails"))
            .unwrap();
        assert!(registry.verify().is_ok());
    }
}
