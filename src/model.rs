//! # Data Model
//!
//! Types exchanged with the content management API and written to the
//! output artifacts.
//!
//! Schema records are not typed. `Field` and `Block` wrap the JSON object
//! they were read from and expose the few attributes the remapper reads or
//! rewrites, so a field passes through serialization with its keys and
//! values unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A tenant/workspace in the CMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    /// Human-readable stack name, also used for the output directory.
    pub name: String,
    /// Stack API key.
    pub key: String,
    /// Extension directory known up front. When set, the stack's extensions
    /// are not fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<Extension>>,
}

impl Stack {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            extensions: None,
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<Extension>) -> Self {
        self.extensions = Some(extensions);
        self
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.key)
    }
}

/// Opaque session credential issued by the remote API.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep the token out of logs.
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Login credentials for the password session endpoint.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// A content type definition: the artifact written per target stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentType {
    pub title: String,
    pub uid: String,
    #[serde(default)]
    pub schema: Vec<Field>,
}

impl ContentType {
    /// Whether any field, at any depth, references an extension.
    pub fn references_extensions(&self) -> bool {
        fields_reference_extensions(&self.schema)
    }
}

fn fields_reference_extensions(fields: &[Field]) -> bool {
    fields.iter().any(|field| {
        field.extension_reference().is_some()
            || field
                .schema()
                .is_some_and(|children| fields_reference_extensions(&children))
            || field.blocks().is_some_and(|blocks| {
                blocks.iter().any(|b| {
                    b.schema()
                        .is_some_and(|children| fields_reference_extensions(&children))
                })
            })
    })
}

/// One entry of a content type schema.
///
/// The record is kept as the JSON object it was read from: keys, their
/// order, `null`s and empty strings all survive a round trip. Accessors
/// read the attributes the remapper needs; writers replace a value in
/// place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Field(Map<String, Value>);

impl From<Map<String, Value>> for Field {
    fn from(attributes: Map<String, Value>) -> Self {
        Self(attributes)
    }
}

/// String attribute, or `""` when missing or not a string.
fn str_attr<'a>(attributes: &'a Map<String, Value>, key: &str) -> &'a str {
    attributes.get(key).and_then(Value::as_str).unwrap_or("")
}

/// An array of JSON objects under `key`. Anything else is not a container.
fn object_list<T: From<Map<String, Value>>>(
    attributes: &Map<String, Value>,
    key: &str,
) -> Option<Vec<T>> {
    attributes
        .get(key)?
        .as_array()?
        .iter()
        .map(|item| item.as_object().map(|map| T::from(map.clone())))
        .collect()
}

fn into_array<T: Into<Map<String, Value>>>(items: Vec<T>) -> Value {
    Value::Array(items.into_iter().map(|i| Value::Object(i.into())).collect())
}

impl Field {
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn display_name(&self) -> &str {
        str_attr(&self.0, "display_name")
    }

    pub fn uid(&self) -> &str {
        str_attr(&self.0, "uid")
    }

    /// The raw `extension_uid` string, empty or not.
    pub fn extension_uid(&self) -> Option<&str> {
        self.0.get("extension_uid").and_then(Value::as_str)
    }

    /// The referenced extension uid, if the field carries a non-empty one.
    pub fn extension_reference(&self) -> Option<&str> {
        self.extension_uid().filter(|uid| !uid.is_empty())
    }

    pub fn set_extension_uid(&mut self, uid: &str) {
        self.0
            .insert("extension_uid".to_string(), Value::String(uid.to_string()));
    }

    /// Nested fields of a group or an inlined global field.
    pub fn schema(&self) -> Option<Vec<Field>> {
        object_list(&self.0, "schema")
    }

    pub fn set_schema(&mut self, fields: Vec<Field>) {
        self.0.insert("schema".to_string(), into_array(fields));
    }

    /// Modular block definitions.
    pub fn blocks(&self) -> Option<Vec<Block>> {
        object_list(&self.0, "blocks")
    }

    pub fn set_blocks(&mut self, blocks: Vec<Block>) {
        self.0.insert("blocks".to_string(), into_array(blocks));
    }

    /// Name used in progress output and warnings.
    pub fn label(&self) -> &str {
        match self.display_name() {
            "" => self.uid(),
            name => name,
        }
    }
}

impl From<Field> for Map<String, Value> {
    fn from(field: Field) -> Self {
        field.0
    }
}

/// A block of a modular-blocks field, kept as raw JSON like `Field`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Block(Map<String, Value>);

impl From<Map<String, Value>> for Block {
    fn from(attributes: Map<String, Value>) -> Self {
        Self(attributes)
    }
}

impl From<Block> for Map<String, Value> {
    fn from(block: Block) -> Self {
        block.0
    }
}

impl Block {
    /// Block uid, falling back to its title.
    pub fn name(&self) -> Option<&str> {
        ["uid", "title"]
            .iter()
            .find_map(|key| self.0.get(*key).and_then(Value::as_str))
            .filter(|name| !name.is_empty())
    }

    pub fn schema(&self) -> Option<Vec<Field>> {
        object_list(&self.0, "schema")
    }

    pub fn set_schema(&mut self, fields: Vec<Field>) {
        self.0.insert("schema".to_string(), into_array(fields));
    }
}

/// An installed extension or marketplace app.
///
/// Ids are stack-local; the same capability in two stacks is recognised by
/// its `(title, type)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    pub uid: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Extension {
    pub fn new(uid: &str, title: &str, kind: &str) -> Self {
        Self {
            uid: uid.to_string(),
            title: title.to_string(),
            kind: kind.to_string(),
            extra: Map::new(),
        }
    }

    /// Whether `other` provides the same capability.
    pub fn same_capability(&self, other: &Extension) -> bool {
        self.title == other.title && self.kind == other.kind
    }
}
