//! Fix Registry
//!
//! One module per scripted fix against the target backend. Dispatch
//! and reporting work like a tool-call surface: every fix prints its
//! own status lines and returns a `FixResult` for aggregation.

mod env_context;
mod resolver_api;
mod resolver_config;
mod resolver_simplify;
mod route_import;
mod schema_import;

use std::path::Path;

use serde::Serialize;

use crate::applier::{ApplyError, PatchApplier, PatchStatus};
use crate::patch::PatchSpec;

/// GraphQL route file in the target backend
pub(crate) const ROUTE_FILE: &str = "packages/hono/src/routes/graphql.ts";
/// Resolvers file in the target backend
pub(crate) const RESOLVERS_FILE: &str = "packages/hono/src/graphql/pure-resolvers.ts";

/// Options shared by every fix
#[derive(Debug, Clone, Copy)]
pub struct FixOptions {
    /// Write a timestamped .bak sibling before overwriting
    pub backup: bool,
    /// Print unified diff previews of applied patches
    pub show_diff: bool,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            backup: true,
            show_diff: false,
        }
    }
}

/// Result of running one fix
#[derive(Debug, Clone, Serialize)]
pub struct FixResult {
    pub name: String,
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
}

impl FixResult {
    pub fn ok(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            success: true,
            message: message.into(),
            error: None,
        }
    }

    pub fn err(name: &str, error: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            message: String::new(),
            error: Some(error.into()),
        }
    }
}

/// Fix names in the order `all` runs them. Later resolver rewrites win:
/// there is no canonical end state, only the edit history.
pub const ALL_FIXES: [&str; 6] = [
    "schema-import",
    "route-import",
    "env-context",
    "resolver-api",
    "resolver-simplify",
    "resolver-config",
];

pub fn execute_fix(workspace_root: &Path, name: &str, options: &FixOptions) -> FixResult {
    let applier = PatchApplier::new(workspace_root, options.backup);

    match name {
        "env-context" => env_context::run(&applier, options),
        "route-import" => route_import::run(&applier, options),
        "schema-import" => schema_import::run(&applier, options),
        "resolver-api" => resolver_api::run(&applier, options),
        "resolver-simplify" => resolver_simplify::run(&applier, options),
        "resolver-config" => resolver_config::run(&applier, options),
        _ => FixResult::err(name, format!("unknown fix: {name}")),
    }
}

/// Apply one spec and print its status line. A no-match run is reported
/// but still counts as success; a missing file aborts this operation
/// while the rest of the run continues.
pub(crate) fn apply_and_report(
    applier: &PatchApplier,
    spec: &PatchSpec,
    options: &FixOptions,
) -> bool {
    match applier.apply(spec) {
        Ok(outcome) => {
            eprintln!("[PATCH] {}", outcome.summary());
            match outcome.status {
                PatchStatus::Applied => println!("✅ {}", spec.description),
                PatchStatus::AlreadyApplied => {
                    println!("✅ {} (already applied)", spec.description)
                }
                PatchStatus::Unchanged => {
                    println!("⚠️  {}: no matching pattern, left as-is", spec.description)
                }
            }
            if options.show_diff {
                if let Some(diff) = &outcome.diff {
                    println!("{diff}");
                }
            }
            true
        }
        Err(ApplyError::FileNotFound(path)) => {
            println!("❌ File not found: {path}");
            false
        }
        Err(e) => {
            println!("❌ {}: {}", spec.description, e);
            false
        }
    }
}

/// Read a target file back for post-apply verification
pub(crate) fn read_target(applier: &PatchApplier, path: &str) -> Result<String, ApplyError> {
    let abs = applier.resolve_existing(path)?;
    Ok(std::fs::read_to_string(abs)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unknown_fix_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = execute_fix(dir.path(), "reticulate-splines", &FixOptions::default());
        assert!(!result.success);
        assert!(result.error.unwrap().contains("unknown fix"));
    }

    #[test]
    fn test_all_fixes_are_dispatchable() {
        let dir = TempDir::new().unwrap();
        for name in ALL_FIXES {
            let result = execute_fix(dir.path(), name, &FixOptions::default());
            // Empty workspace: every fix fails on missing targets, but
            // never because the name was unknown
            assert_eq!(result.name, name);
            match &result.error {
                Some(e) => assert!(!e.contains("unknown fix")),
                None => {}
            }
        }
    }
}
