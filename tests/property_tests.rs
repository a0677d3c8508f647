//! Property-based tests for commit resolution and diff alignment.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use confrev::core::types::{CommitId, RepoPath};
use confrev::forge::CommitRecord;
use confrev::revision::{align, resolve, DiffRowKind, DiffStats, LATEST};

fn history(ids: &[String]) -> Vec<CommitRecord> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| CommitRecord {
            id: CommitId::new(id.clone()).unwrap(),
            author: "ops".into(),
            message: format!("change {}", i),
            timestamp: Utc.timestamp_opt(1_704_067_200 + i as i64 * 60, 0).unwrap(),
            path: RepoPath::new("app.toml").unwrap(),
        })
        .collect()
}

fn commit_ids() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[0-9a-f]{40}", 1..12)
}

/// A diff body line: context, deletion or addition.
fn diff_line() -> impl Strategy<Value = String> {
    (prop::sample::select(vec![' ', '-', '+']), "[a-z =0-9]{0,12}")
        .prop_map(|(prefix, text)| format!("{}{}", prefix, text))
}

proptest! {
    #[test]
    fn latest_is_always_the_first_entry(ids in commit_ids()) {
        let commits = history(&ids);
        let newest = resolve(LATEST, &commits).unwrap();
        prop_assert_eq!(newest.as_str(), ids[0].as_str());
    }

    #[test]
    fn short_id_resolves_to_first_matching_commit(ids in commit_ids(), pick in any::<prop::sample::Index>()) {
        let commits = history(&ids);
        let chosen = &commits[pick.index(commits.len())];

        let resolved = resolve(chosen.id.short(), &commits).unwrap();
        prop_assert!(resolved.starts_with(chosen.id.short()));

        let first = commits
            .iter()
            .find(|c| c.id.starts_with(chosen.id.short()))
            .unwrap();
        prop_assert_eq!(&resolved, &first.id);
    }

    #[test]
    fn resolution_is_idempotent(ids in commit_ids(), pick in any::<prop::sample::Index>()) {
        let commits = history(&ids);
        let chosen = &commits[pick.index(commits.len())];

        let once = resolve(chosen.id.short(), &commits).unwrap();
        let twice = resolve(once.as_str(), &commits).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn foreign_prefix_never_resolves(ids in commit_ids(), prefix in "[g-z]{6}") {
        let commits = history(&ids);
        prop_assert!(resolve(&prefix, &commits).is_err());
    }

    #[test]
    fn context_only_diff_has_equal_sides(texts in prop::collection::vec("[a-z =0-9]{0,12}", 0..30)) {
        let lines: Vec<String> = texts.iter().map(|t| format!(" {}", t)).collect();
        let rows = align(&lines);

        prop_assert_eq!(rows.len(), lines.len());
        for (row, text) in rows.iter().zip(&texts) {
            prop_assert_eq!(row.kind, DiffRowKind::Context);
            prop_assert_eq!(row.left.as_deref(), Some(text.as_str()));
            prop_assert_eq!(&row.left, &row.right);
        }
    }

    #[test]
    fn every_line_lands_in_exactly_one_row(lines in prop::collection::vec(diff_line(), 0..40)) {
        let rows = align(&lines);
        let stats = DiffStats::from_rows(&rows);

        let count = |prefix: char| lines.iter().filter(|l| l.starts_with(prefix)).count();
        prop_assert_eq!(stats.context, count(' '));
        prop_assert_eq!(stats.deleted + stats.changed, count('-'));
        prop_assert_eq!(stats.added + stats.changed, count('+'));

        prop_assert!(rows.len() <= lines.len());
        prop_assert!(rows.len() * 2 >= lines.len());
    }

    #[test]
    fn change_rows_have_both_sides(lines in prop::collection::vec(diff_line(), 0..40)) {
        for row in align(&lines) {
            match row.kind {
                DiffRowKind::Change | DiffRowKind::Context => {
                    prop_assert!(row.left.is_some() && row.right.is_some())
                }
                DiffRowKind::Del => prop_assert!(row.left.is_some() && row.right.is_none()),
                DiffRowKind::Add => prop_assert!(row.left.is_none() && row.right.is_some()),
            }
        }
    }
}
