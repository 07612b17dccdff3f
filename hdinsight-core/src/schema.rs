//! Schema - Define type schemas for resources
//!
//! Providers define a schema for each resource type. The schema drives
//! attribute validation before any remote call and tells the update path
//! which attributes can only change by replacing the resource.

use std::collections::HashMap;
use std::fmt;

use crate::resource::Value;

/// Attribute type
#[derive(Debug, Clone)]
pub enum AttributeType {
    /// String
    String,
    /// Integer
    Int,
    /// Boolean
    Bool,
    /// Enum (list of allowed values)
    Enum(Vec<String>),
    /// Custom type (with validation function)
    Custom {
        name: String,
        base: Box<AttributeType>,
        validate: fn(&Value) -> Result<(), String>,
    },
    /// List, optionally bounded
    List {
        inner: Box<AttributeType>,
        max_items: Option<usize>,
    },
    /// Map
    Map(Box<AttributeType>),
    /// Nested settings block with its own attributes
    Block(HashMap<String, AttributeSchema>),
}

impl AttributeType {
    pub fn list(inner: AttributeType) -> Self {
        AttributeType::List {
            inner: Box::new(inner),
            max_items: None,
        }
    }

    pub fn bounded_list(inner: AttributeType, max_items: usize) -> Self {
        AttributeType::List {
            inner: Box::new(inner),
            max_items: Some(max_items),
        }
    }

    pub fn block(attributes: impl IntoIterator<Item = AttributeSchema>) -> Self {
        AttributeType::Block(
            attributes
                .into_iter()
                .map(|a| (a.name.clone(), a))
                .collect(),
        )
    }

    /// Check if a value conforms to this type
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        match (self, value) {
            (AttributeType::String, Value::String(_)) => Ok(()),
            (AttributeType::Int, Value::Int(_)) => Ok(()),
            (AttributeType::Bool, Value::Bool(_)) => Ok(()),

            (AttributeType::Enum(variants), Value::String(s)) => {
                if variants.iter().any(|v| v == s) {
                    Ok(())
                } else {
                    Err(TypeError::InvalidEnumVariant {
                        value: s.clone(),
                        expected: variants.clone(),
                    })
                }
            }

            (AttributeType::Custom { validate, base, .. }, v) => {
                base.validate(v)?;
                validate(v).map_err(|msg| TypeError::ValidationFailed { message: msg })
            }

            (AttributeType::List { inner, max_items }, Value::List(items)) => {
                if let Some(max) = max_items
                    && items.len() > *max
                {
                    return Err(TypeError::TooManyItems {
                        max: *max,
                        got: items.len(),
                    });
                }
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item).map_err(|e| TypeError::ListItemError {
                        index: i,
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Map(inner), Value::Map(map)) => {
                for (k, v) in map {
                    inner.validate(v).map_err(|e| TypeError::MapValueError {
                        key: k.clone(),
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Block(attributes), Value::Map(map)) => {
                match validate_attributes(attributes, map).into_iter().next() {
                    Some(e) => Err(e),
                    None => Ok(()),
                }
            }

            _ => Err(TypeError::TypeMismatch {
                expected: self.type_name(),
                got: value.type_name(),
            }),
        }
    }

    fn type_name(&self) -> String {
        match self {
            AttributeType::String => "String".to_string(),
            AttributeType::Int => "Int".to_string(),
            AttributeType::Bool => "Bool".to_string(),
            AttributeType::Enum(variants) => format!("Enum({})", variants.join(" | ")),
            AttributeType::Custom { name, .. } => name.clone(),
            AttributeType::List { inner, .. } => format!("List<{}>", inner.type_name()),
            AttributeType::Map(inner) => format!("Map<{}>", inner.type_name()),
            AttributeType::Block(_) => "Block".to_string(),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Type error
#[derive(Debug, Clone, thiserror::Error)]
pub enum TypeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Invalid enum variant '{value}', expected one of: {}", expected.join(", "))]
    InvalidEnumVariant {
        value: String,
        expected: Vec<String>,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Required attribute '{name}' is missing")]
    MissingRequired { name: String },

    #[error("Unknown attribute '{name}'")]
    UnknownAttribute { name: String },

    #[error("Attribute '{name}' is computed and cannot be set")]
    ReadOnly { name: String },

    #[error("Expected at most {max} items, got {got}")]
    TooManyItems { max: usize, got: usize },

    #[error("Attribute '{name}': {inner}")]
    AttributeError { name: String, inner: Box<TypeError> },

    #[error("List item at index {index}: {inner}")]
    ListItemError { index: usize, inner: Box<TypeError> },

    #[error("Map value for key '{key}': {inner}")]
    MapValueError { key: String, inner: Box<TypeError> },
}

impl Value {
    fn type_name(&self) -> String {
        match self {
            Value::String(_) => "String".to_string(),
            Value::Int(_) => "Int".to_string(),
            Value::Bool(_) => "Bool".to_string(),
            Value::List(_) => "List".to_string(),
            Value::Map(_) => "Map".to_string(),
        }
    }
}

/// Attribute schema
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: String,
    pub attr_type: AttributeType,
    pub required: bool,
    /// The remote side may fill the value when the user leaves it out
    pub computed: bool,
    /// Only the remote side sets this value
    pub read_only: bool,
    /// Changing the value requires replacing the resource
    pub force_new: bool,
    /// The value is a secret and never printed
    pub sensitive: bool,
    /// The remote side never returns the value, so it is not reconciled on read
    pub write_only: bool,
    /// String values compare without regard to ASCII case
    pub case_insensitive: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            required: false,
            computed: false,
            read_only: false,
            force_new: false,
            sensitive: false,
            write_only: false,
            case_insensitive: false,
            default: None,
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn write_only(mut self) -> Self {
        self.write_only = true;
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    /// Whether two recorded values differ for this attribute
    pub fn differs(&self, old: Option<&Value>, new: Option<&Value>) -> bool {
        match (old, new) {
            (Some(Value::String(a)), Some(Value::String(b))) if self.case_insensitive => {
                !a.eq_ignore_ascii_case(b)
            }
            _ => old != new,
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }
}

/// Resource schema
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub resource_type: String,
    pub attributes: HashMap<String, AttributeSchema>,
    pub description: Option<String>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: HashMap::new(),
            description: None,
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.insert(schema.name.clone(), schema);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Validate resource attributes
    pub fn validate(&self, attributes: &HashMap<String, Value>) -> Result<(), Vec<TypeError>> {
        let errors = validate_attributes(&self.attributes, attributes);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Top-level attributes that are never read back from the remote side
    pub fn write_only_attributes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .attributes
            .values()
            .filter(|a| a.write_only)
            .map(|a| a.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Dotted paths of ForceNew attributes whose value differs between `from`
    /// and `to`. Blocks that are themselves updatable are descended into.
    /// A computed attribute missing from `to` keeps its recorded value.
    pub fn replacement_paths(
        &self,
        from: &HashMap<String, Value>,
        to: &HashMap<String, Value>,
    ) -> Vec<String> {
        let mut paths = Vec::new();
        collect_replacement_paths(&self.attributes, None, from, to, &mut paths);
        paths.sort();
        paths
    }
}

fn collect_replacement_paths(
    schema: &HashMap<String, AttributeSchema>,
    prefix: Option<&str>,
    from: &HashMap<String, Value>,
    to: &HashMap<String, Value>,
    paths: &mut Vec<String>,
) {
    let empty = HashMap::new();
    for (name, attr) in schema {
        let path = match prefix {
            Some(prefix) => format!("{}.{}", prefix, name),
            None => name.clone(),
        };
        let old = from.get(name);
        let new = to.get(name);
        if new.is_none() && attr.computed {
            continue;
        }
        if attr.force_new {
            if attr.differs(old, new) {
                paths.push(path);
            }
            continue;
        }
        if let AttributeType::Block(inner) = &attr.attr_type {
            let old = old.and_then(Value::as_map).unwrap_or(&empty);
            let new = new.and_then(Value::as_map).unwrap_or(&empty);
            collect_replacement_paths(inner, Some(&path), old, new, paths);
        }
    }
}

fn validate_attributes(
    schema: &HashMap<String, AttributeSchema>,
    attributes: &HashMap<String, Value>,
) -> Vec<TypeError> {
    let mut errors = Vec::new();

    let mut names: Vec<&String> = schema.keys().collect();
    names.sort();
    for name in names {
        let attr = &schema[name];
        if attr.required && !attributes.contains_key(name) && attr.default.is_none() {
            errors.push(TypeError::MissingRequired { name: name.clone() });
        }
    }

    let mut provided: Vec<(&String, &Value)> = attributes.iter().collect();
    provided.sort_by(|a, b| a.0.cmp(b.0));
    for (name, value) in provided {
        match schema.get(name) {
            Some(attr) if attr.read_only => {
                errors.push(TypeError::ReadOnly { name: name.clone() });
            }
            Some(attr) => {
                if let Err(e) = attr.attr_type.validate(value) {
                    errors.push(TypeError::AttributeError {
                        name: name.clone(),
                        inner: Box::new(e),
                    });
                }
            }
            None => errors.push(TypeError::UnknownAttribute { name: name.clone() }),
        }
    }

    errors
}

/// Helper functions for common types
pub mod types {
    use super::*;

    /// Positive integer type
    pub fn positive_int() -> AttributeType {
        AttributeType::Custom {
            name: "PositiveInt".to_string(),
            base: Box::new(AttributeType::Int),
            validate: |value| match value {
                Value::Int(n) if *n > 0 => Ok(()),
                Value::Int(_) => Err("Value must be positive".to_string()),
                _ => Err("Expected integer".to_string()),
            },
        }
    }

    /// String that must not be empty
    pub fn non_empty_string() -> AttributeType {
        AttributeType::Custom {
            name: "NonEmptyString".to_string(),
            base: Box::new(AttributeType::String),
            validate: |value| match value {
                Value::String(s) if !s.trim().is_empty() => Ok(()),
                Value::String(_) => Err("Value must not be empty".to_string()),
                _ => Err("Expected string".to_string()),
            },
        }
    }

    /// Map of string tags
    pub fn tags() -> AttributeType {
        AttributeType::Map(Box::new(AttributeType::String))
    }
}
