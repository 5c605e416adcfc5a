//! Declarative schema of the webhooks integration resource.
//!
//! The declarative engine validates user input against this schema before
//! calling into the lifecycle controller; the controller checks it again
//! when translating desired state so that malformed input surfaces as a
//! [`ErrorKind::Translation`](ddhooks_core::ErrorKind::Translation) error
//! instead of a panic.

use ddhooks_core::{Error, Result};
use serde_json::{Map, Value};

/// Value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    /// A string value.
    String,
    /// A boolean value.
    Bool,
    /// An ordered list of nested blocks, each described by the given attributes.
    List(&'static [Attribute]),
}

impl AttributeType {
    fn describe(&self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Bool => "a boolean",
            Self::List(_) => "a list",
        }
    }
}

/// A single attribute of a resource or nested block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name.
    pub name: &'static str,
    /// Value type.
    pub kind: AttributeType,
    /// Whether the attribute must be set.
    pub required: bool,
    /// Human-readable description.
    pub description: &'static str,
}

impl Attribute {
    /// Declares a required attribute.
    pub const fn required(name: &'static str, kind: AttributeType, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }

    /// Declares an optional attribute.
    pub const fn optional(name: &'static str, kind: AttributeType, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
        }
    }
}

/// Schema of a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSchema {
    /// Resource type name as exposed to users.
    pub type_name: &'static str,
    /// Top-level attributes.
    pub attributes: &'static [Attribute],
}

/// Attributes of one entry of the `hooks` list.
pub const HOOK_ATTRIBUTES: &[Attribute] = &[
    Attribute::required("name", AttributeType::String, "Name of the webhook."),
    Attribute::required("url", AttributeType::String, "URL the webhook posts to."),
];

/// Schema of the webhooks integration resource.
pub static WEBHOOKS_SCHEMA: ResourceSchema = ResourceSchema {
    type_name: "datadog_integration_webhooks",
    attributes: &[
        Attribute::required("name", AttributeType::String, "Name of the integration."),
        Attribute::required("url", AttributeType::String, "Legacy single webhook URL."),
        Attribute::optional(
            "use_custom_payload",
            AttributeType::Bool,
            "Send `custom_payload` instead of the default body.",
        ),
        Attribute::optional(
            "custom_payload",
            AttributeType::String,
            "Payload template for outgoing requests.",
        ),
        Attribute::optional(
            "encode_as_form",
            AttributeType::Bool,
            "Form-encode outgoing bodies instead of sending JSON.",
        ),
        Attribute::optional(
            "headers",
            AttributeType::String,
            "Serialized headers attached to outgoing requests.",
        ),
        Attribute::optional(
            "hooks",
            AttributeType::List(HOOK_ATTRIBUTES),
            "Named webhook endpoints.",
        ),
    ],
};

impl ResourceSchema {
    /// Looks up a top-level attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&'static Attribute> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }

    /// Checks a set of attribute values against the schema.
    ///
    /// `null` counts as unset. Required strings must be non-empty.
    pub fn validate(&self, values: &Map<String, Value>) -> Result<()> {
        validate_block(self.attributes, values, None)
    }
}

fn validate_block(
    attributes: &'static [Attribute],
    values: &Map<String, Value>,
    prefix: Option<&str>,
) -> Result<()> {
    let join = |name: &str| match prefix {
        Some(prefix) => format!("{prefix}.{name}"),
        None => name.to_owned(),
    };

    if let Some(unknown) = values
        .keys()
        .find(|key| !attributes.iter().any(|attribute| attribute.name == key.as_str()))
    {
        return Err(Error::translation()
            .with_message(format!("unsupported attribute `{}`", join(unknown.as_str()))));
    }

    for attribute in attributes {
        let path = join(attribute.name);
        match values.get(attribute.name) {
            None | Some(Value::Null) if attribute.required => {
                return Err(Error::translation()
                    .with_message(format!("missing required attribute `{path}`")));
            }
            None | Some(Value::Null) => {}
            Some(value) => validate_value(attribute, value, &path)?,
        }
    }

    Ok(())
}

fn validate_value(attribute: &Attribute, value: &Value, path: &str) -> Result<()> {
    let mismatch = || {
        Error::translation().with_message(format!(
            "attribute `{path}` must be {}",
            attribute.kind.describe()
        ))
    };

    match (attribute.kind, value) {
        (AttributeType::String, Value::String(s)) if attribute.required && s.is_empty() => {
            Err(Error::translation().with_message(format!("attribute `{path}` must not be empty")))
        }
        (AttributeType::String, Value::String(_)) | (AttributeType::Bool, Value::Bool(_)) => Ok(()),
        (AttributeType::List(nested), Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                let item_path = format!("{path}.{index}");
                let Value::Object(block) = item else {
                    return Err(Error::translation()
                        .with_message(format!("attribute `{item_path}` must be a block")));
                };
                validate_block(nested, block, Some(&item_path))?;
            }
            Ok(())
        }
        _ => Err(mismatch()),
    }
}
