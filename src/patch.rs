//! Patch Types
//!
//! Defines the structure of text patches applied to files in the
//! target workspace. A spec references exactly one file and applies
//! its steps in order against the in-memory content.

use serde::{Deserialize, Serialize};

/// A patch spec describes an ordered set of edits to one file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchSpec {
    /// Unique identifier for the patch
    pub id: String,
    /// Human-readable description
    pub description: String,
    /// Target file path, relative to the workspace root
    pub file_path: String,
    /// Edits to apply, in order
    pub steps: Vec<PatchStep>,
    /// Idempotency guard: if it matches the current content,
    /// the patch is considered already applied and no step runs
    pub guard: Option<Guard>,
}

/// One find/replace rule applied to file content
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "params")]
pub enum PatchStep {
    /// Replace occurrences of a literal substring
    ReplaceLiteral {
        find: String,
        replace: String,
        /// Cap on replacements (None = all occurrences)
        count: Option<usize>,
    },
    /// Replace regex matches; `replace` may use $n capture references
    ReplacePattern {
        pattern: String,
        replace: String,
        count: Option<usize>,
    },
    /// Replace the balanced-brace block whose opening line contains `anchor`
    ReplaceBlock { anchor: String, replacement: String },
    /// Insert content immediately after the last match of `pattern`
    InsertAfter { pattern: String, content: String },
}

/// Marker whose presence means a patch was already applied
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Guard {
    /// Literal substring check
    Contains(String),
    /// Regex check
    Pattern(String),
}

impl PatchSpec {
    /// Create an empty spec targeting one file
    pub fn new(file_path: &str, description: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            description: description.to_string(),
            file_path: file_path.to_string(),
            steps: Vec::new(),
            guard: None,
        }
    }

    /// Add a literal find/replace step (all occurrences)
    pub fn replace_literal(mut self, find: &str, replace: &str) -> Self {
        self.steps.push(PatchStep::ReplaceLiteral {
            find: find.to_string(),
            replace: replace.to_string(),
            count: None,
        });
        self
    }

    /// Add a regex find/replace step (all matches)
    pub fn replace_pattern(mut self, pattern: &str, replace: &str) -> Self {
        self.steps.push(PatchStep::ReplacePattern {
            pattern: pattern.to_string(),
            replace: replace.to_string(),
            count: None,
        });
        self
    }

    /// Add a regex find/replace step capped at `count` matches
    pub fn replace_pattern_n(mut self, pattern: &str, replace: &str, count: usize) -> Self {
        self.steps.push(PatchStep::ReplacePattern {
            pattern: pattern.to_string(),
            replace: replace.to_string(),
            count: Some(count),
        });
        self
    }

    /// Add a balanced-block replacement step
    pub fn replace_block(mut self, anchor: &str, replacement: &str) -> Self {
        self.steps.push(PatchStep::ReplaceBlock {
            anchor: anchor.to_string(),
            replacement: replacement.to_string(),
        });
        self
    }

    /// Add an insertion step after the last match of `pattern`
    pub fn insert_after(mut self, pattern: &str, content: &str) -> Self {
        self.steps.push(PatchStep::InsertAfter {
            pattern: pattern.to_string(),
            content: content.to_string(),
        });
        self
    }

    /// Skip the whole patch when `marker` is already in the file
    pub fn guard_contains(mut self, marker: &str) -> Self {
        self.guard = Some(Guard::Contains(marker.to_string()));
        self
    }

    /// Skip the whole patch when `pattern` already matches the file
    pub fn guard_pattern(mut self, pattern: &str) -> Self {
        self.guard = Some(Guard::Pattern(pattern.to_string()));
        self
    }
}
