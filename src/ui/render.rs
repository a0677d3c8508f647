//! ui::render
//!
//! Plain-text rendering of listings, histories and diffs.
//!
//! Every function returns a `String` so commands decide where it goes
//! and tests can assert on it directly.

use crate::core::types::BranchName;
use crate::forge::{Branch, CommitDetail, CommitRecord, FileEntry, FileKind};
use crate::revision::{DiffRow, DiffRowKind, DiffView};

/// Default total width of the side-by-side view.
pub const DEFAULT_WIDTH: usize = 120;

/// Shown instead of an empty diff.
pub const NO_CHANGES: &str = "No changes.";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Directory listing, directories first with a trailing `/`.
pub fn file_listing(entries: &[FileEntry]) -> String {
    let mut sorted: Vec<&FileEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        (a.kind != FileKind::Dir)
            .cmp(&(b.kind != FileKind::Dir))
            .then_with(|| a.name.cmp(&b.name))
    });
    sorted
        .iter()
        .map(|e| match e.kind {
            FileKind::Dir => format!("{}/", e.name),
            _ => e.name.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per commit: short id, timestamp, author, summary.
pub fn commit_log(commits: &[CommitRecord]) -> String {
    let author_width = commits
        .iter()
        .map(|c| c.author.chars().count())
        .max()
        .unwrap_or(0);
    commits
        .iter()
        .map(|c| {
            format!(
                "{}  {}  {:<width$}  {}",
                c.short(),
                c.timestamp.format(TIMESTAMP_FORMAT),
                c.author,
                c.summary(),
                width = author_width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full description of one commit.
pub fn commit_detail(detail: &CommitDetail) -> String {
    let mut out = format!(
        "commit {}\nAuthor: {}\nDate:   {}\n\n",
        detail.id,
        detail.author,
        detail.timestamp.format(TIMESTAMP_FORMAT)
    );
    for line in detail.message.lines() {
        out.push_str("    ");
        out.push_str(line);
        out.push('\n');
    }
    if !detail.files.is_empty() {
        out.push('\n');
        for file in &detail.files {
            out.push_str(&format!(
                "  {:<9} {} (+{} -{})\n",
                file.status, file.path, file.additions, file.deletions
            ));
        }
    }
    out.trim_end().to_string()
}

/// Branch names, marking `current` with `*` and protected branches.
pub fn branch_list(branches: &[Branch], current: &BranchName) -> String {
    branches
        .iter()
        .map(|b| {
            let marker = if &b.name == current { '*' } else { ' ' };
            let protected = if b.protected { " (protected)" } else { "" };
            format!("{} {}{}", marker, b.name, protected)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate or pad `text` to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{}{}", text, " ".repeat(width - count))
    } else if width == 0 {
        String::new()
    } else {
        let mut cut: String = text.chars().take(width - 1).collect();
        cut.push('…');
        cut
    }
}

fn gutter(kind: DiffRowKind) -> char {
    match kind {
        DiffRowKind::Context => ' ',
        DiffRowKind::Change => '|',
        DiffRowKind::Del => '<',
        DiffRowKind::Add => '>',
    }
}

fn render_row(row: &DiffRow, column: usize) -> String {
    let left = fit(row.left.as_deref().unwrap_or(""), column);
    let right = row.right.as_deref().unwrap_or("");
    format!("{} {} {}", left, gutter(row.kind), right)
        .trim_end()
        .to_string()
}

/// Two-column view of an aligned diff with a stats footer.
///
/// An empty diff renders as `No changes.`.
pub fn side_by_side(view: &DiffView, width: usize) -> String {
    if view.is_empty() {
        return NO_CHANGES.to_string();
    }
    // "left | right": three separator characters between the columns
    let column = width.saturating_sub(3) / 2;

    let mut lines = Vec::with_capacity(view.rows.len() + 3);
    lines.push(format!(
        "{} {} {}",
        fit(view.old.short(), column),
        ' ',
        view.new.short()
    ));
    lines.push("-".repeat(width));
    lines.extend(view.rows.iter().map(|row| render_row(row, column)));
    lines.push(String::new());
    lines.push(view.stats.to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CommitId, RepoPath};
    use crate::forge::ChangedFile;
    use crate::revision::{align_text, DiffStats};
    use chrono::{TimeZone, Utc};

    fn view(diff: &str) -> DiffView {
        let rows = align_text(diff);
        DiffView {
            path: RepoPath::new("app.toml").unwrap(),
            old: CommitId::new("aaaaaa111").unwrap(),
            new: CommitId::new("bbbbbb222").unwrap(),
            stats: DiffStats::from_rows(&rows),
            rows,
        }
    }

    #[test]
    fn empty_diff_says_no_changes() {
        assert_eq!(side_by_side(&view(""), 80), "No changes.");
    }

    #[test]
    fn side_by_side_columns() {
        let diff = "--- a/app.toml\n+++ b/app.toml\n port = 1\n-a = 1\n+a = 2\n-gone\n";
        // 10-character columns
        let out = side_by_side(&view(diff), 23);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], format!("aaaaaa{}bbbbbb", " ".repeat(7)));
        assert_eq!(lines[2], format!("port = 1{}port = 1", " ".repeat(5)));
        assert_eq!(lines[3], format!("a = 1{}| a = 2", " ".repeat(6)));
        assert_eq!(lines[4], format!("gone{}<", " ".repeat(7)));
        assert_eq!(lines.last().copied(), Some("0 added, 1 deleted, 1 changed"));
    }

    #[test]
    fn long_lines_are_truncated() {
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("ab", 4), "ab  ");
        assert_eq!(fit("ab", 0), "");
    }

    #[test]
    fn listing_puts_dirs_first() {
        let entry = |name: &str, kind| FileEntry {
            name: name.into(),
            kind,
            path: RepoPath::new(name).unwrap(),
            last_modified: None,
        };
        let out = file_listing(&[
            entry("z.yaml", FileKind::File),
            entry("envs", FileKind::Dir),
            entry("a.yaml", FileKind::File),
        ]);
        assert_eq!(out, "envs/\na.yaml\nz.yaml");
    }

    #[test]
    fn log_lines() {
        let commits = vec![CommitRecord {
            id: CommitId::new("abc123def456").unwrap(),
            author: "ops".into(),
            message: "Raise limits\n\nlong body".into(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
            path: RepoPath::new("limits.yaml").unwrap(),
        }];
        assert_eq!(
            commit_log(&commits),
            "abc123  2024-03-01 09:30  ops  Raise limits"
        );
    }

    #[test]
    fn detail_lists_files() {
        let detail = CommitDetail {
            id: CommitId::new("abc123def456").unwrap(),
            author: "ops".into(),
            message: "Raise limits".into(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
            parents: vec![],
            files: vec![ChangedFile {
                path: "limits.yaml".into(),
                status: "modified".into(),
                additions: 1,
                deletions: 1,
            }],
        };
        let out = commit_detail(&detail);
        assert!(out.starts_with("commit abc123def456\n"));
        assert!(out.contains("    Raise limits"));
        assert!(out.ends_with("modified  limits.yaml (+1 -1)"));
    }

    #[test]
    fn branches_mark_current() {
        let branches = vec![
            Branch {
                name: BranchName::main(),
                tip: None,
                protected: true,
            },
            Branch {
                name: BranchName::new("staging").unwrap(),
                tip: None,
                protected: false,
            },
        ];
        assert_eq!(
            branch_list(&branches, &BranchName::new("staging").unwrap()),
            "  main (protected)\n* staging"
        );
    }
}
