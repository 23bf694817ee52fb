//! # Copy Pipeline
//!
//! Runs one copy of a content type from the source stack to every target
//! stack:
//!
//! 1. **Schema**: fetch the content type from the source stack. Any failure
//!    ends the run; there is nothing to copy without it.
//! 2. **Source extensions**: fetch the source stack's extension directory.
//!    A failure ends the run only if the schema references an extension.
//! 3. **Targets**: for each target stack, fetch its extension directory,
//!    remap the schema and write the artifact. Target work runs as futures
//!    that are all awaited before `run` returns; a failure in one target is
//!    recorded in its outcome and does not affect the others.
//!
//! Only the fetched schema and source extension list are shared between
//! targets, and only by shared reference.

use std::path::{Path, PathBuf};

use futures::future::join_all;
use log::{debug, info, warn};

use crate::api::ManagementApi;
use crate::artifact::{self, Format};
use crate::error::Result;
use crate::model::{AuthToken, ContentType, Extension, Stack};
use crate::remap::{remap_content_type, Rewrite, UnresolvedReference};

/// What to do with a target whose schema still has unmatched references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedPolicy {
    /// Write nothing for that target.
    #[default]
    SkipTarget,
    /// Write the artifact; unmatched fields keep the source reference.
    KeepSource,
}

/// Per-run settings.
#[derive(Debug, Clone)]
pub struct CopyOptions {
    pub content_type_uid: String,
    /// Directory the per-target directories are created in.
    pub output_root: PathBuf,
    pub policy: UnresolvedPolicy,
    pub format: Format,
}

/// Progress hooks for the CLI. Every method defaults to doing nothing.
pub trait CopyObserver {
    fn fetching_schema(&self, _stack: &Stack, _content_type_uid: &str) {}
    fn schema_fetched(&self, _content_type: &ContentType) {}
    fn fetching_extensions(&self, _stack: &Stack) {}
    fn extensions_fetched(&self, _stack: &Stack, _count: usize) {}
    fn field_remapped(&self, _stack: &Stack, _rewrite: &Rewrite) {}
    fn field_unresolved(&self, _stack: &Stack, _unresolved: &UnresolvedReference) {}
    fn artifact_written(&self, _stack: &Stack, _path: &Path) {}
    fn target_skipped(&self, _stack: &Stack, _reason: &str) {}
}

/// Observer that reports nothing.
pub struct Quiet;

impl CopyObserver for Quiet {}

/// How a single target ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetStatus {
    Written {
        path: PathBuf,
        rewrites: Vec<Rewrite>,
        unresolved: Vec<UnresolvedReference>,
    },
    /// Recoverable: nothing was written for this target.
    Skipped { reason: String },
    /// The artifact could not be written.
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetOutcome {
    pub stack: Stack,
    pub status: TargetStatus,
}

/// Result of a whole run, targets in configuration order.
#[derive(Debug, Clone)]
pub struct CopyReport {
    pub content_type: ContentType,
    pub targets: Vec<TargetOutcome>,
}

impl CopyReport {
    pub fn written(&self) -> usize {
        self.count(|s| matches!(s, TargetStatus::Written { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, TargetStatus::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, TargetStatus::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&TargetStatus) -> bool) -> usize {
        self.targets.iter().filter(|t| pred(&t.status)).count()
    }
}

/// Copy the content type named in `options` from `source` to every stack
/// in `targets`.
pub async fn run(
    api: &dyn ManagementApi,
    token: &AuthToken,
    source: &Stack,
    targets: &[Stack],
    options: &CopyOptions,
    observer: &dyn CopyObserver,
) -> Result<CopyReport> {
    observer.fetching_schema(source, &options.content_type_uid);
    let content_type = api
        .fetch_content_type(source, token, &options.content_type_uid)
        .await?;
    observer.schema_fetched(&content_type);
    let needs_extensions = content_type.references_extensions();

    observer.fetching_extensions(source);
    let source_extensions = match extension_directory(api, source, token).await {
        Ok(extensions) => {
            observer.extensions_fetched(source, extensions.len());
            extensions
        }
        Err(e) if !needs_extensions => {
            warn!(
                "Could not fetch extensions for source stack {}: {} (schema references none)",
                source, e
            );
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    let tasks = targets.iter().map(|stack| {
        copy_to_target(
            api,
            token,
            &content_type,
            &source_extensions,
            needs_extensions,
            stack,
            options,
            observer,
        )
    });
    let outcomes = join_all(tasks).await;

    Ok(CopyReport {
        content_type,
        targets: outcomes,
    })
}

/// The configured extension list of `stack`, or its fetched directory.
async fn extension_directory(
    api: &dyn ManagementApi,
    stack: &Stack,
    token: &AuthToken,
) -> Result<Vec<Extension>> {
    match &stack.extensions {
        Some(extensions) => {
            debug!("Using {} configured extensions for {}", extensions.len(), stack);
            Ok(extensions.clone())
        }
        None => api.fetch_extensions(stack, token).await,
    }
}

#[allow(clippy::too_many_arguments)]
async fn copy_to_target(
    api: &dyn ManagementApi,
    token: &AuthToken,
    content_type: &ContentType,
    source_extensions: &[Extension],
    needs_extensions: bool,
    stack: &Stack,
    options: &CopyOptions,
    observer: &dyn CopyObserver,
) -> TargetOutcome {
    let skip = |reason: String| {
        warn!("Skipping target stack {}: {}", stack, reason);
        observer.target_skipped(stack, &reason);
        TargetOutcome {
            stack: stack.clone(),
            status: TargetStatus::Skipped { reason },
        }
    };

    observer.fetching_extensions(stack);
    let target_extensions = match extension_directory(api, stack, token).await {
        Ok(extensions) => {
            observer.extensions_fetched(stack, extensions.len());
            extensions
        }
        Err(e) if needs_extensions => {
            return skip(format!("could not fetch extensions: {}", e));
        }
        Err(e) => {
            warn!("Could not fetch extensions for {}: {} (schema references none)", stack, e);
            Vec::new()
        }
    };

    let (copy, remapped) = remap_content_type(content_type, source_extensions, &target_extensions);
    for rewrite in &remapped.rewrites {
        observer.field_remapped(stack, rewrite);
    }
    for unresolved in &remapped.unresolved {
        observer.field_unresolved(stack, unresolved);
    }

    if !remapped.is_complete() && options.policy == UnresolvedPolicy::SkipTarget {
        return skip(format!(
            "{} unresolved extension reference(s)",
            remapped.unresolved.len()
        ));
    }

    match artifact::write(
        &options.output_root,
        stack,
        &options.content_type_uid,
        &copy,
        options.format,
    ) {
        Ok(path) => {
            info!("Wrote {}", path.display());
            observer.artifact_written(stack, &path);
            TargetOutcome {
                stack: stack.clone(),
                status: TargetStatus::Written {
                    path,
                    rewrites: remapped.rewrites,
                    unresolved: remapped.unresolved,
                },
            }
        }
        Err(e) => {
            log::error!("Could not write artifact for {}: {}", stack, e);
            TargetOutcome {
                stack: stack.clone(),
                status: TargetStatus::Failed {
                    error: e.to_string(),
                },
            }
        }
    }
}
