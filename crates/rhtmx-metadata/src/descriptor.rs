// File: src/descriptor.rs
// Purpose: Declared and flattened metadata for validated types

use std::fmt;
use std::sync::Arc;

use crate::rules::Rule;
use crate::value::Value;

/// Declared shape of a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    /// Dates are bound as strings or epoch numbers and are not parsed here
    Date,
    /// Nested object validated against the named type
    Object(String),
    /// Array whose elements are validated against the named type
    Collection(String),
}

impl FieldKind {
    /// Whether a present value can be bound to this kind
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::Text => matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_)),
            FieldKind::Number => value.as_number().is_some(),
            FieldKind::Boolean => value.as_bool().is_some(),
            FieldKind::Date => matches!(value, Value::String(_) | Value::Number(_)),
            FieldKind::Object(_) => value.as_object().is_some(),
            FieldKind::Collection(_) => value.as_array().is_some(),
        }
    }

    /// Registered type this field descends into, if any
    pub fn nested_type(&self) -> Option<&str> {
        match self {
            FieldKind::Object(name) | FieldKind::Collection(name) => Some(name),
            _ => None,
        }
    }
}

/// Where a field's value comes from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldSource {
    #[default]
    Body,
    /// Request header, falling back to the body when the header is absent
    Header(String),
}

/// Metadata for one field: display name, kind, binding source and rules.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub display_name: Option<String>,
    pub kind: FieldKind,
    pub source: FieldSource,
    pub rules: Vec<Rule>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            kind,
            source: FieldSource::Body,
            rules: Vec::new(),
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Date)
    }

    pub fn object(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Object(type_name.into()))
    }

    pub fn collection(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Collection(type_name.into()))
    }

    /// Name used in messages instead of the field name
    pub fn display(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Bind from a request header
    pub fn from_header(mut self, header: impl Into<String>) -> Self {
        self.source = FieldSource::Header(header.into().to_ascii_lowercase());
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn required(self) -> Self {
        self.rule(Rule::required())
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn required_rule(&self) -> Option<&Rule> {
        self.rules.iter().find(|r| r.is_required())
    }
}

/// Predicate over a whole object, reported under the object's own path.
#[derive(Clone)]
pub struct ClassRule {
    pub message: String,
    predicate: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
}

impl ClassRule {
    pub fn new<F>(message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn is_satisfied_by(&self, target: &Value) -> bool {
        (self.predicate)(target)
    }
}

impl fmt::Debug for ClassRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRule")
            .field("message", &self.message)
            .finish()
    }
}

/// Metadata as declared for one type, before it is merged with its base.
#[derive(Debug, Clone)]
pub struct TypeMetadata {
    pub type_name: String,
    pub base: Option<String>,
    pub fields: Vec<FieldDescriptor>,
    pub class_rule: Option<ClassRule>,
}

impl TypeMetadata {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            base: None,
            fields: Vec::new(),
            class_rule: None,
        }
    }

    pub fn extends(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Declare a field. Declaring the same name twice keeps the later one.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        upsert_field(&mut self.fields, field);
        self
    }

    pub fn class_rule(mut self, rule: ClassRule) -> Self {
        self.class_rule = Some(rule);
        self
    }
}

/// Flattened, immutable metadata for a concrete type.
#[derive(Debug, Clone)]
pub struct MetadataDescriptor {
    pub type_name: String,
    /// This type followed by its bases, nearest first
    pub lineage: Vec<String>,
    pub fields: Vec<FieldDescriptor>,
    pub class_rule: Option<ClassRule>,
}

impl MetadataDescriptor {
    /// Descriptor for a type without a base
    pub fn root(declared: TypeMetadata) -> Self {
        Self {
            lineage: vec![declared.type_name.clone()],
            type_name: declared.type_name,
            fields: declared.fields,
            class_rule: declared.class_rule,
        }
    }

    /// Layer a derived declaration over its base. A redeclared field replaces
    /// the base field entirely; the class rule is inherited unless redeclared.
    pub fn derive(base: &MetadataDescriptor, declared: TypeMetadata) -> Self {
        let mut fields = base.fields.clone();
        for field in declared.fields {
            upsert_field(&mut fields, field);
        }

        let mut lineage = Vec::with_capacity(base.lineage.len() + 1);
        lineage.push(declared.type_name.clone());
        lineage.extend(base.lineage.iter().cloned());

        Self {
            type_name: declared.type_name,
            lineage,
            fields,
            class_rule: declared.class_rule.or_else(|| base.class_rule.clone()),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether this type is `type_name` or derives from it
    pub fn is_a(&self, type_name: &str) -> bool {
        self.lineage.iter().any(|t| t == type_name)
    }
}

fn upsert_field(fields: &mut Vec<FieldDescriptor>, field: FieldDescriptor) {
    match fields.iter_mut().find(|f| f.name == field.name) {
        Some(existing) => *existing = field,
        None => fields.push(field),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleKind;

    fn product() -> TypeMetadata {
        TypeMetadata::new("Product")
            .field(FieldDescriptor::text("Contact").display("ContactUs").required())
            .field(FieldDescriptor::number("Price").rule(Rule::range(20.0, 100.0)))
            .class_rule(ClassRule::new("bad product", |_| false))
    }

    #[test]
    fn test_derived_field_replaces_base_field() {
        let base = MetadataDescriptor::root(product());
        let software = MetadataDescriptor::derive(
            &base,
            TypeMetadata::new("Software")
                .extends("Product")
                .field(FieldDescriptor::number("Price").rule(Rule::range(100.0, 200.0)))
                .field(FieldDescriptor::text("Contact").rule(Rule::max_length(10))),
        );

        let price = software.field("Price").unwrap();
        assert_eq!(price.rules.len(), 1);
        assert!(matches!(
            price.rules[0].kind(),
            RuleKind::Range { min, max } if *min == 100.0 && *max == 200.0
        ));

        // Display name and required rule of the base are gone, not merged
        let contact = software.field("Contact").unwrap();
        assert_eq!(contact.display_name(), "Contact");
        assert!(contact.required_rule().is_none());

        // Field order follows the base
        let names: Vec<&str> = software.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Contact", "Price"]);
    }

    #[test]
    fn test_class_rule_inherited_unless_redeclared() {
        let base = MetadataDescriptor::root(product());
        let inherited = MetadataDescriptor::derive(&base, TypeMetadata::new("Software"));
        assert_eq!(inherited.class_rule.unwrap().message, "bad product");

        let own = MetadataDescriptor::derive(
            &base,
            TypeMetadata::new("Software").class_rule(ClassRule::new("bad software", |_| true)),
        );
        assert_eq!(own.class_rule.unwrap().message, "bad software");
    }

    #[test]
    fn test_lineage() {
        let base = MetadataDescriptor::root(product());
        let software = MetadataDescriptor::derive(&base, TypeMetadata::new("Software"));
        assert_eq!(software.lineage, vec!["Software", "Product"]);
        assert!(software.is_a("Product"));
        assert!(!base.is_a("Software"));
    }

    #[test]
    fn test_field_kind_accepts() {
        assert!(FieldKind::Number.accepts(&Value::from("110")));
        assert!(!FieldKind::Number.accepts(&Value::from("abc")));
        assert!(FieldKind::Text.accepts(&Value::from(42)));
        assert!(!FieldKind::Text.accepts(&Value::empty_object()));
        assert!(FieldKind::Object("ProductDetails".into()).accepts(&Value::empty_object()));
        assert!(!FieldKind::Collection("Item".into()).accepts(&Value::empty_object()));
    }

    #[test]
    fn test_header_names_are_lowercased() {
        let field = FieldDescriptor::text("Version").from_header("Version");
        assert_eq!(field.source, FieldSource::Header("version".to_string()));
    }
}
