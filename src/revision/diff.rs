//! revision::diff
//!
//! Turns unified-diff lines into aligned rows for side-by-side display.
//!
//! # Algorithm
//!
//! A single forward pass with greedy adjacent pairing:
//!
//! - `---` / `+++` file headers are skipped.
//! - A `-` line immediately followed by a `+` line becomes one `Change`
//!   row; a `-` line otherwise becomes a `Del` row.
//! - A lone `+` line becomes an `Add` row.
//! - Everything else is `Context` with identical sides.
//!
//! The `-`/`+` marker is stripped from row text, and one leading space is
//! stripped from context lines. Hunk headers (`@@ ... @@`) and
//! `\ No newline at end of file` pass through verbatim as context.
//!
//! Pairing is positional, not content-based: in `-a -b +c` only `b` and
//! `c` are paired.
//!
//! # Example
//!
//! ```
//! use confrev::revision::{align, DiffRowKind};
//!
//! let rows = align(&["--- a/x", "+++ b/x", "@@ -1 +1 @@", "-old", "+new"]);
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[0].kind, DiffRowKind::Context);
//! assert_eq!(rows[1].kind, DiffRowKind::Change);
//! assert_eq!(rows[1].left.as_deref(), Some("old"));
//! assert_eq!(rows[1].right.as_deref(), Some("new"));
//! ```

use serde::Serialize;

/// Classification of an aligned row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffRowKind {
    /// Only the right side is present.
    Add,
    /// Only the left side is present.
    Del,
    /// Both sides present and equal.
    Context,
    /// Both sides present, paired by adjacency.
    Change,
}

/// One row of the side-by-side view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffRow {
    pub left: Option<String>,
    pub right: Option<String>,
    pub kind: DiffRowKind,
}

impl DiffRow {
    fn context(text: &str) -> Self {
        Self {
            left: Some(text.to_string()),
            right: Some(text.to_string()),
            kind: DiffRowKind::Context,
        }
    }

    fn del(text: &str) -> Self {
        Self {
            left: Some(text.to_string()),
            right: None,
            kind: DiffRowKind::Del,
        }
    }

    fn add(text: &str) -> Self {
        Self {
            left: None,
            right: Some(text.to_string()),
            kind: DiffRowKind::Add,
        }
    }

    fn change(old: &str, new: &str) -> Self {
        Self {
            left: Some(old.to_string()),
            right: Some(new.to_string()),
            kind: DiffRowKind::Change,
        }
    }
}

fn is_header(line: &str) -> bool {
    line.starts_with("---") || line.starts_with("+++")
}

fn is_addition(line: &str) -> bool {
    line.starts_with('+') && !is_header(line)
}

/// Align unified-diff lines into rows.
pub fn align<S: AsRef<str>>(lines: &[S]) -> Vec<DiffRow> {
    let mut rows = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].as_ref();

        if is_header(line) {
            i += 1;
        } else if let Some(old) = line.strip_prefix('-') {
            match lines.get(i + 1).map(AsRef::as_ref) {
                Some(next) if is_addition(next) => {
                    rows.push(DiffRow::change(old, &next[1..]));
                    i += 2;
                }
                _ => {
                    rows.push(DiffRow::del(old));
                    i += 1;
                }
            }
        } else if let Some(new) = line.strip_prefix('+') {
            rows.push(DiffRow::add(new));
            i += 1;
        } else {
            rows.push(DiffRow::context(line.strip_prefix(' ').unwrap_or(line)));
            i += 1;
        }
    }

    rows
}

/// Split a diff payload into lines and align them.
///
/// An empty payload yields no rows.
pub fn align_text(diff: &str) -> Vec<DiffRow> {
    let lines: Vec<&str> = diff.lines().collect();
    align(&lines)
}

/// Row counts by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub added: usize,
    pub deleted: usize,
    pub changed: usize,
    pub context: usize,
}

impl DiffStats {
    pub fn from_rows(rows: &[DiffRow]) -> Self {
        rows.iter().fold(Self::default(), |mut stats, row| {
            match row.kind {
                DiffRowKind::Add => stats.added += 1,
                DiffRowKind::Del => stats.deleted += 1,
                DiffRowKind::Change => stats.changed += 1,
                DiffRowKind::Context => stats.context += 1,
            }
            stats
        })
    }

    /// Whether any row differs between the sides.
    pub fn has_changes(&self) -> bool {
        self.added + self.deleted + self.changed > 0
    }
}

impl std::fmt::Display for DiffStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} added, {} deleted, {} changed",
            self.added, self.deleted, self.changed
        )
    }
}
