//! # Extension Reference Remapping
//!
//! Extension ids are local to a stack, so a schema copied verbatim would
//! point its custom fields at ids that do not exist in the target. This
//! module rewrites every `extension_uid` in a schema to the id of the
//! equivalent extension in the target stack.
//!
//! ## Matching
//!
//! For a field referencing `extension_uid = X`:
//!
//! 1. Find the source extension whose `uid` is `X` (first match). Its
//!    `(title, type)` pair describes the capability the field needs.
//! 2. Find the target extension with the same `(title, type)` (first match).
//! 3. Rewrite the field to that extension's `uid`.
//!
//! Either lookup can come up empty. That is not fatal: the reference is
//! recorded as unresolved, a warning names the field and the extension, and
//! the remaining fields are still processed. The field itself keeps its
//! source reference; whether the result is usable is the caller's decision.
//!
//! ## Guarantees
//!
//! - Field order and count are preserved at every nesting level.
//! - Only `extension_uid` values change. Fields without a reference are
//!   returned equal to their input.
//! - `remap` is pure apart from logging: the same inputs give the same output.
//!
//! Nested containers are walked too: group and global field `schema` lists
//! and the `schema` of every modular block.

use std::fmt;

use log::{debug, warn};

use crate::error::Error;
use crate::model::{Block, ContentType, Extension, Field};

/// Result of an extension lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtensionMatch<'a> {
    Found(&'a Extension),
    NotFound,
}

impl<'a> ExtensionMatch<'a> {
    pub fn found(self) -> Option<&'a Extension> {
        match self {
            ExtensionMatch::Found(ext) => Some(ext),
            ExtensionMatch::NotFound => None,
        }
    }
}

/// First extension whose id is `uid`.
pub fn find_by_uid<'a>(extensions: &'a [Extension], uid: &str) -> ExtensionMatch<'a> {
    match extensions.iter().find(|e| e.uid == uid) {
        Some(ext) => ExtensionMatch::Found(ext),
        None => ExtensionMatch::NotFound,
    }
}

/// First extension providing the same capability as `wanted`.
pub fn find_equivalent<'a>(extensions: &'a [Extension], wanted: &Extension) -> ExtensionMatch<'a> {
    match extensions.iter().find(|e| e.same_capability(wanted)) {
        Some(ext) => ExtensionMatch::Found(ext),
        None => ExtensionMatch::NotFound,
    }
}

/// Why a reference could not be rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// No source extension has the referenced id.
    UnknownInSource,
    /// The source extension has no `(title, type)` twin in the target.
    NoEquivalentInTarget { title: String, kind: String },
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::UnknownInSource => f.write_str("not installed in source stack"),
            UnresolvedReason::NoEquivalentInTarget { title, kind } => write!(
                f,
                "no extension titled '{}' of type '{}' in target stack",
                title, kind
            ),
        }
    }
}

/// A reference left as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    /// Dotted uid path of the field, e.g. `seo.picker`.
    pub path: String,
    /// Display name of the field.
    pub field: String,
    pub extension_uid: String,
    pub reason: UnresolvedReason,
}

impl From<&UnresolvedReference> for Error {
    fn from(unresolved: &UnresolvedReference) -> Self {
        Error::UnmatchedExtension {
            field: unresolved.field.clone(),
            extension_uid: unresolved.extension_uid.clone(),
            reason: unresolved.reason.to_string(),
        }
    }
}

/// A reference that was rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub path: String,
    pub field: String,
    /// Title of the matched extension.
    pub extension: String,
    pub from: String,
    pub to: String,
}

/// Output of `remap`.
#[derive(Debug, Clone, PartialEq)]
pub struct Remapped {
    pub schema: Vec<Field>,
    pub rewrites: Vec<Rewrite>,
    pub unresolved: Vec<UnresolvedReference>,
}

impl Remapped {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Rewrite every extension reference in `schema` from `source` ids to the
/// equivalent `target` ids.
pub fn remap(schema: &[Field], source: &[Extension], target: &[Extension]) -> Remapped {
    let mut remapper = Remapper {
        source,
        target,
        rewrites: Vec::new(),
        unresolved: Vec::new(),
    };
    let schema = remapper.fields(schema, "");
    Remapped {
        schema,
        rewrites: remapper.rewrites,
        unresolved: remapper.unresolved,
    }
}

/// `remap` applied to a whole content type; title and uid are kept.
pub fn remap_content_type(
    content_type: &ContentType,
    source: &[Extension],
    target: &[Extension],
) -> (ContentType, Remapped) {
    let remapped = remap(&content_type.schema, source, target);
    let copy = ContentType {
        title: content_type.title.clone(),
        uid: content_type.uid.clone(),
        schema: remapped.schema.clone(),
    };
    (copy, remapped)
}

struct Remapper<'a> {
    source: &'a [Extension],
    target: &'a [Extension],
    rewrites: Vec<Rewrite>,
    unresolved: Vec<UnresolvedReference>,
}

fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", parent, segment)
    }
}

fn block_name(block: &Block) -> &str {
    block.name().unwrap_or("block")
}

impl<'a> Remapper<'a> {
    fn fields(&mut self, fields: &[Field], parent: &str) -> Vec<Field> {
        fields.iter().map(|f| self.field(f, parent)).collect()
    }

    fn field(&mut self, field: &Field, parent: &str) -> Field {
        let path = join_path(parent, field.uid());
        let mut out = field.clone();

        if let Some(uid) = field.extension_reference() {
            debug!("Field {} refers to extension {}", path, uid);
            match self.resolve(uid) {
                Ok(matched) => {
                    self.rewrites.push(Rewrite {
                        path: path.clone(),
                        field: field.label().to_string(),
                        extension: matched.title.clone(),
                        from: uid.to_string(),
                        to: matched.uid.clone(),
                    });
                    out.set_extension_uid(&matched.uid);
                }
                Err(reason) => {
                    warn!(
                        "Field '{}' ({}) references extension {}: {}",
                        field.label(),
                        path,
                        uid,
                        reason
                    );
                    self.unresolved.push(UnresolvedReference {
                        path: path.clone(),
                        field: field.label().to_string(),
                        extension_uid: uid.to_string(),
                        reason,
                    });
                }
            }
        }

        if let Some(children) = field.schema() {
            out.set_schema(self.fields(&children, &path));
        }
        if let Some(blocks) = field.blocks() {
            let blocks = blocks
                .into_iter()
                .map(|mut block| {
                    if let Some(children) = block.schema() {
                        let block_path = join_path(&path, block_name(&block));
                        block.set_schema(self.fields(&children, &block_path));
                    }
                    block
                })
                .collect();
            out.set_blocks(blocks);
        }
        out
    }

    fn resolve(&self, uid: &str) -> Result<&'a Extension, UnresolvedReason> {
        let source = find_by_uid(self.source, uid)
            .found()
            .ok_or(UnresolvedReason::UnknownInSource)?;
        find_equivalent(self.target, source)
            .found()
            .ok_or_else(|| UnresolvedReason::NoEquivalentInTarget {
                title: source.title.clone(),
                kind: source.kind.clone(),
            })
    }
}
