//! Patch Applier
//!
//! Applies a `PatchSpec` to a file under the workspace root. Handles
//! the idempotency guard, ordered step application, write-if-changed
//! and a timestamped backup of the original before overwriting.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;

use crate::block::replace_block;
use crate::patch::{Guard, PatchSpec, PatchStep};

/// Result of applying a patch
#[derive(Debug, Clone, Serialize)]
pub struct PatchOutcome {
    /// Id of the spec that produced this outcome
    pub spec_id: String,
    /// What happened to the file
    pub status: PatchStatus,
    /// Resolved absolute path of the target file
    pub path: PathBuf,
    /// Number of steps that matched something
    pub steps_matched: usize,
    /// Unified diff of the change (only when content was written)
    pub diff: Option<String>,
}

/// Terminal state of a patch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchStatus {
    /// Content changed and was written back
    Applied,
    /// The guard matched; nothing was touched
    AlreadyApplied,
    /// No step changed the content; nothing was written
    Unchanged,
}

impl PatchOutcome {
    /// One-line human-readable summary
    pub fn summary(&self) -> String {
        match self.status {
            PatchStatus::Applied => format!(
                "{} updated ({} step(s) matched)",
                self.path.display(),
                self.steps_matched
            ),
            PatchStatus::AlreadyApplied => {
                format!("{} already patched, skipped", self.path.display())
            }
            PatchStatus::Unchanged => {
                format!("{} unchanged (no step matched)", self.path.display())
            }
        }
    }
}

/// Errors during patch application
#[derive(Debug)]
pub enum ApplyError {
    FileNotFound(String),
    OutsideWorkspace(String),
    InvalidPattern { pattern: String, message: String },
    Io(std::io::Error),
}

impl std::fmt::Display for ApplyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplyError::FileNotFound(p) => write!(f, "File not found: {}", p),
            ApplyError::OutsideWorkspace(p) => write!(f, "Path is outside workspace: {}", p),
            ApplyError::InvalidPattern { pattern, message } => {
                write!(f, "Invalid pattern '{}': {}", pattern, message)
            }
            ApplyError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ApplyError {}
impl From<std::io::Error> for ApplyError {
    fn from(e: std::io::Error) -> Self {
        ApplyError::Io(e)
    }
}

fn compile(pattern: &str) -> Result<Regex, ApplyError> {
    Regex::new(pattern).map_err(|e| ApplyError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Applies patch specs to files under one workspace root
pub struct PatchApplier {
    workspace_root: PathBuf,
    backup: bool,
}

impl PatchApplier {
    /// Create an applier rooted at `workspace_root`. When `backup` is
    /// set, the original content is copied to a timestamped `.bak`
    /// sibling before any overwrite.
    pub fn new(workspace_root: impl Into<PathBuf>, backup: bool) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            backup,
        }
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Resolve a workspace-relative path to an existing file, rejecting
    /// anything that escapes the workspace root
    pub fn resolve_existing(&self, path: &str) -> Result<PathBuf, ApplyError> {
        let ws = fs::canonicalize(&self.workspace_root)?;

        let requested = Path::new(path);
        let candidate = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            ws.join(requested)
        };

        let candidate =
            fs::canonicalize(&candidate).map_err(|_| ApplyError::FileNotFound(path.to_string()))?;
        if !candidate.starts_with(&ws) {
            return Err(ApplyError::OutsideWorkspace(path.to_string()));
        }

        Ok(candidate)
    }

    /// Apply a patch spec to its target file
    pub fn apply(&self, spec: &PatchSpec) -> Result<PatchOutcome, ApplyError> {
        let abs = self.resolve_existing(&spec.file_path)?;
        let original = fs::read_to_string(&abs)?;

        if let Some(guard) = &spec.guard {
            if self.guard_matches(guard, &original)? {
                eprintln!(
                    "[PATCH] guard hit for '{}' on {}, skipping",
                    spec.description, spec.file_path
                );
                return Ok(PatchOutcome {
                    spec_id: spec.id.clone(),
                    status: PatchStatus::AlreadyApplied,
                    path: abs,
                    steps_matched: 0,
                    diff: None,
                });
            }
        }

        let mut content = original.clone();
        let mut steps_matched = 0;
        for step in &spec.steps {
            if self.apply_step(step, &mut content)? {
                steps_matched += 1;
            }
        }

        if content == original {
            return Ok(PatchOutcome {
                spec_id: spec.id.clone(),
                status: PatchStatus::Unchanged,
                path: abs,
                steps_matched,
                diff: None,
            });
        }

        if self.backup {
            let backup_path = backup_path_for(&abs);
            fs::write(&backup_path, &original)?;
            eprintln!("[PATCH] backup written to {}", backup_path.display());
        }

        let diff = diffy::create_patch(&original, &content).to_string();
        fs::write(&abs, &content)?;

        Ok(PatchOutcome {
            spec_id: spec.id.clone(),
            status: PatchStatus::Applied,
            path: abs,
            steps_matched,
            diff: Some(diff),
        })
    }

    /// Write a generated file under the workspace, creating parent
    /// directories as needed. Overwrites an existing file.
    pub fn create_file(&self, path: &str, content: &str) -> Result<PathBuf, ApplyError> {
        let ws = fs::canonicalize(&self.workspace_root)?;

        let requested = Path::new(path);
        let target = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            ws.join(requested)
        };

        let parent = target
            .parent()
            .ok_or_else(|| ApplyError::OutsideWorkspace(path.to_string()))?;
        fs::create_dir_all(parent)?;

        let parent_canon = fs::canonicalize(parent)?;
        if !parent_canon.starts_with(&ws) {
            return Err(ApplyError::OutsideWorkspace(path.to_string()));
        }
        let file_name = target
            .file_name()
            .ok_or_else(|| ApplyError::OutsideWorkspace(path.to_string()))?;
        let abs = parent_canon.join(file_name);

        fs::write(&abs, content)?;
        Ok(abs)
    }

    fn guard_matches(&self, guard: &Guard, content: &str) -> Result<bool, ApplyError> {
        match guard {
            Guard::Contains(marker) => Ok(content.contains(marker)),
            Guard::Pattern(pattern) => Ok(compile(pattern)?.is_match(content)),
        }
    }

    /// Apply one step in place; returns whether it matched anything.
    /// A step that matches nothing is a no-op, not an error.
    fn apply_step(&self, step: &PatchStep, content: &mut String) -> Result<bool, ApplyError> {
        match step {
            PatchStep::ReplaceLiteral {
                find,
                replace,
                count,
            } => {
                if !content.contains(find.as_str()) {
                    return Ok(false);
                }
                *content = match count {
                    Some(n) => content.replacen(find.as_str(), replace, *n),
                    None => content.replace(find.as_str(), replace),
                };
                Ok(true)
            }
            PatchStep::ReplacePattern {
                pattern,
                replace,
                count,
            } => {
                let re = compile(pattern)?;
                if !re.is_match(content) {
                    return Ok(false);
                }
                *content = re
                    .replacen(content, count.unwrap_or(0), replace.as_str())
                    .into_owned();
                Ok(true)
            }
            PatchStep::ReplaceBlock {
                anchor,
                replacement,
            } => match replace_block(content, anchor, replacement) {
                Some(updated) => {
                    *content = updated;
                    Ok(true)
                }
                None => Ok(false),
            },
            PatchStep::InsertAfter { pattern, content: inserted } => {
                let re = compile(pattern)?;
                let end = match re.find_iter(content).last() {
                    Some(m) => m.end(),
                    None => return Ok(false),
                };
                content.insert_str(end, inserted);
                Ok(true)
            }
        }
    }
}

fn backup_path_for(abs: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
    let name = abs
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    abs.with_file_name(format!("{}.{}.bak", name, stamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::PatchSpec;
    use std::fs;
    use tempfile::TempDir;

    fn write_target(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_literal_replace_writes_back() {
        let dir = TempDir::new().unwrap();
        let path = write_target(&dir, "graphql.ts", "import { schema } from './pure-schema'\n");
        let applier = PatchApplier::new(dir.path(), false);

        let spec = PatchSpec::new("graphql.ts", "swap schema module")
            .replace_literal("./pure-schema", "../graphql/schema");
        let outcome = applier.apply(&spec).unwrap();

        assert_eq!(outcome.status, PatchStatus::Applied);
        assert_eq!(outcome.steps_matched, 1);
        assert!(outcome.diff.is_some());
        let updated = fs::read_to_string(&path).unwrap();
        assert_eq!(updated, "import { schema } from '../graphql/schema'\n");
    }

    #[test]
    fn test_guard_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let content = "interface Env {}\ncontext: (c) => (c)\n";
        let path = write_target(&dir, "graphql.ts", content);
        let applier = PatchApplier::new(dir.path(), false);

        let spec = PatchSpec::new("graphql.ts", "guarded")
            .guard_contains("interface Env")
            .replace_literal("context", "ctx");
        let outcome = applier.apply(&spec).unwrap();

        assert_eq!(outcome.status, PatchStatus::AlreadyApplied);
        // Byte-for-byte unchanged
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_guarded_fix_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = write_target(&dir, "a.ts", "const x = 1\n");
        let applier = PatchApplier::new(dir.path(), false);

        let spec = PatchSpec::new("a.ts", "bump")
            .guard_contains("const x = 2")
            .replace_literal("const x = 1", "const x = 2");

        assert_eq!(applier.apply(&spec).unwrap().status, PatchStatus::Applied);
        let after_first = fs::read_to_string(&path).unwrap();

        assert_eq!(
            applier.apply(&spec).unwrap().status,
            PatchStatus::AlreadyApplied
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
    }

    #[test]
    fn test_no_match_is_noop_not_error() {
        let dir = TempDir::new().unwrap();
        let content = "const y = 1\n";
        let path = write_target(&dir, "a.ts", content);
        let applier = PatchApplier::new(dir.path(), false);

        let spec = PatchSpec::new("a.ts", "nothing to do")
            .replace_literal("absent", "present")
            .replace_pattern(r"also\s+absent", "x");
        let outcome = applier.apply(&spec).unwrap();

        assert_eq!(outcome.status, PatchStatus::Unchanged);
        assert_eq!(outcome.steps_matched, 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_missing_file_reports_not_found() {
        let dir = TempDir::new().unwrap();
        let applier = PatchApplier::new(dir.path(), false);

        let spec = PatchSpec::new("does/not/exist.ts", "noop").replace_literal("a", "b");
        match applier.apply(&spec) {
            Err(ApplyError::FileNotFound(p)) => assert_eq!(p, "does/not/exist.ts"),
            other => panic!("expected FileNotFound, got {:?}", other.map(|o| o.status)),
        }
        // Nothing was created
        assert!(!dir.path().join("does").exists());
    }

    #[test]
    fn test_path_escape_rejected() {
        let dir = TempDir::new().unwrap();
        let outer = TempDir::new().unwrap();
        let outside = outer.path().join("secret.ts");
        fs::write(&outside, "x\n").unwrap();
        let applier = PatchApplier::new(dir.path(), false);

        let spec = PatchSpec::new(outside.to_str().unwrap(), "escape").replace_literal("x", "y");
        assert!(matches!(
            applier.apply(&spec),
            Err(ApplyError::OutsideWorkspace(_))
        ));
    }

    #[test]
    fn test_steps_apply_in_order_on_memory_content() {
        let dir = TempDir::new().unwrap();
        write_target(&dir, "a.ts", "alpha\n");
        let applier = PatchApplier::new(dir.path(), false);

        // Second step only matches the output of the first
        let spec = PatchSpec::new("a.ts", "chained")
            .replace_literal("alpha", "beta")
            .replace_literal("beta", "gamma");
        let outcome = applier.apply(&spec).unwrap();

        assert_eq!(outcome.steps_matched, 2);
        let updated = fs::read_to_string(dir.path().join("a.ts")).unwrap();
        assert_eq!(updated, "gamma\n");
    }

    #[test]
    fn test_backup_written_before_overwrite() {
        let dir = TempDir::new().unwrap();
        write_target(&dir, "a.ts", "old\n");
        let applier = PatchApplier::new(dir.path(), true);

        let spec = PatchSpec::new("a.ts", "edit").replace_literal("old", "new");
        applier.apply(&spec).unwrap();

        let backups: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".bak"))
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(backups[0].path()).unwrap(), "old\n");
    }

    #[test]
    fn test_invalid_pattern_is_loud() {
        let dir = TempDir::new().unwrap();
        write_target(&dir, "a.ts", "x\n");
        let applier = PatchApplier::new(dir.path(), false);

        let spec = PatchSpec::new("a.ts", "bad regex").replace_pattern("([unclosed", "y");
        assert!(matches!(
            applier.apply(&spec),
            Err(ApplyError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_insert_after_last_match() {
        let dir = TempDir::new().unwrap();
        write_target(
            &dir,
            "a.ts",
            "import a from 'a'\nimport b from 'b'\n\nconst x = 1\n",
        );
        let applier = PatchApplier::new(dir.path(), false);

        let spec = PatchSpec::new("a.ts", "add header")
            .insert_after(r"(?m)^import .*$", "\n\ninterface Env {}");
        applier.apply(&spec).unwrap();

        let updated = fs::read_to_string(dir.path().join("a.ts")).unwrap();
        assert_eq!(
            updated,
            "import a from 'a'\nimport b from 'b'\n\ninterface Env {}\n\nconst x = 1\n"
        );
    }

    #[test]
    fn test_create_file_makes_parents() {
        let dir = TempDir::new().unwrap();
        let applier = PatchApplier::new(dir.path(), false);

        let abs = applier
            .create_file("packages/hono/src/schema/bridge.ts", "export {}\n")
            .unwrap();
        assert!(abs.starts_with(fs::canonicalize(dir.path()).unwrap()));
        assert_eq!(fs::read_to_string(&abs).unwrap(), "export {}\n");
    }

    #[test]
    fn test_create_file_rejects_escape() {
        let dir = TempDir::new().unwrap();
        let outer = TempDir::new().unwrap();
        let applier = PatchApplier::new(dir.path(), false);

        let target = outer.path().join("evil.ts");
        assert!(matches!(
            applier.create_file(target.to_str().unwrap(), "x"),
            Err(ApplyError::OutsideWorkspace(_))
        ));
        assert!(!target.exists());
    }
}
