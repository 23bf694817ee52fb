//! # Stack Schema Copy Library
//!
//! Copies a content type definition from one CMS stack to other stacks.
//! Extension and app references inside the schema are rewritten so that
//! each copy points at the equivalent extension installed in its target.
//!
//! ## Quick Example
//!
//! ```
//! use stack_schema_copy::model::{Extension, Field};
//! use stack_schema_copy::remap::remap;
//!
//! let schema: Vec<Field> = serde_json::from_str(
//!     r#"[{"display_name": "Location", "uid": "location", "extension_uid": "a1"}]"#,
//! )
//! .unwrap();
//! let source = vec![Extension::new("a1", "Map", "widget")];
//! let target = vec![Extension::new("b9", "Map", "widget")];
//!
//! let remapped = remap(&schema, &source, &target);
//! assert_eq!(remapped.schema[0].extension_uid(), Some("b9"));
//! ```
//!
//! ## Execution Flow
//!
//! 1.  **Authentication (`auth`, `credentials`)**: reuse the cached session
//!     token if the API still accepts it, otherwise log in with email and
//!     password and cache the new token.
//! 2.  **Schema (`copy`, `api`)**: fetch the content type from the source
//!     stack, with global fields inlined.
//! 3.  **Extension directories (`api`)**: fetch the extensions and apps
//!     installed in the source stack and in each target.
//! 4.  **Remapping (`remap`)**: match each referenced extension by
//!     `(title, type)` and rewrite the reference.
//! 5.  **Output (`artifact`)**: write `<name>_<key>/<uid>.json` per target.
//!
//! The remote API sits behind the `api::ManagementApi` trait and the token
//! cache behind `credentials::CredentialStore`, so every step can run
//! against in-memory doubles.

pub mod api;
pub mod artifact;
pub mod auth;
pub mod config;
pub mod copy;
pub mod credentials;
pub mod defaults;
pub mod error;
pub mod model;
pub mod output;
pub mod remap;
pub mod suggestions;

#[cfg(test)]
mod remap_proptest;
