//! Candidate file filtering.
//!
//! Fixed precedence: extension (always first) → `key` exact-stem match
//! OR `include`/`exclude` substrings → `skip` → `keep_latest`. The input
//! listing is newest-first, which gives `skip` and `keep_latest` their
//! meaning.

use std::path::{Path, PathBuf};

use tabflow_types::FilterSpec;

/// Basename stem: everything before the first `.`.
pub(crate) fn stem(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
        .split('.')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().into_owned())
}

/// Apply the filter specification to a newest-first candidate list.
pub(crate) fn apply_filters(
    mut files: Vec<PathBuf>,
    file_ext: &str,
    spec: &FilterSpec,
) -> Vec<PathBuf> {
    tracing::info!("filter 'file_ext': {file_ext}");
    files.retain(|file| extension(file).as_deref() == Some(file_ext));
    tracing::info!("keep {} file(s) with 'file_ext': {file_ext}", files.len());

    match spec.key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => {
            tracing::info!("ignore filter options 'include' and 'exclude'");
            tracing::info!("filter 'key': {key}");
            files.retain(|file| stem(file) == key);
            tracing::info!("keep {} file(s) with 'key': {key}", files.len());
        }
        _ => {
            if !spec.include.is_empty() {
                tracing::info!("filter 'include': {:?}", spec.include);
                files.retain(|file| {
                    let s = stem(file);
                    spec.include.iter().any(|token| s.contains(token.as_str()))
                });
                tracing::info!(
                    "keep {} file(s) with 'include': {:?}",
                    files.len(),
                    spec.include
                );
            }
            if !spec.exclude.is_empty() {
                tracing::info!("filter 'exclude': {:?}", spec.exclude);
                files.retain(|file| {
                    let s = stem(file);
                    !spec.exclude.iter().any(|token| s.contains(token.as_str()))
                });
                tracing::info!(
                    "keep {} file(s) with 'exclude': {:?}",
                    files.len(),
                    spec.exclude
                );
            }
        }
    }

    // skip and keep_latest only mean anything once something survived.
    if !files.is_empty() {
        if let Some(skip) = spec.skip.filter(|n| *n > 0) {
            tracing::info!("skip {skip} file(s)");
            files.drain(..skip.min(files.len()));
            tracing::info!("keep {} file(s) with 'skip': {skip}", files.len());
        }
        if spec.keep_latest && !files.is_empty() {
            files.truncate(1);
            tracing::info!("keep 1 file, the latest {:?}", files);
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from(format!("/in/{n}"))).collect()
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn extension_filter_always_applies_first() {
        let out = apply_filters(
            paths(&["a.csv", "b.parquet", "c.csv", "notes.txt"]),
            "csv",
            &FilterSpec::default(),
        );
        assert_eq!(names(&out), vec!["a.csv", "c.csv"]);
    }

    #[test]
    fn stem_stops_at_the_first_dot() {
        assert_eq!(stem(Path::new("/in/users.2024.csv")), "users");
        assert_eq!(stem(Path::new("orders.csv")), "orders");
    }

    #[test]
    fn key_is_an_exact_stem_match() {
        let spec = FilterSpec {
            key: Some("users".to_string()),
            ..FilterSpec::default()
        };
        let out = apply_filters(
            paths(&["users.csv", "users_old.csv", "orders.csv"]),
            "csv",
            &spec,
        );
        assert_eq!(names(&out), vec!["users.csv"]);
    }

    #[test]
    fn key_suppresses_include_and_exclude() {
        let spec = FilterSpec {
            key: Some("users".to_string()),
            include: vec!["orders".to_string()],
            exclude: vec!["users".to_string()],
            ..FilterSpec::default()
        };
        let out = apply_filters(paths(&["users.csv", "orders.csv"]), "csv", &spec);
        assert_eq!(names(&out), vec!["users.csv"]);
    }

    #[test]
    fn blank_key_falls_back_to_include_exclude() {
        let spec = FilterSpec {
            key: Some("  ".to_string()),
            include: vec!["ord".to_string()],
            ..FilterSpec::default()
        };
        let out = apply_filters(paths(&["users.csv", "orders.csv"]), "csv", &spec);
        assert_eq!(names(&out), vec!["orders.csv"]);
    }

    #[test]
    fn include_keeps_any_match_exclude_drops_any_match() {
        let spec = FilterSpec {
            include: vec!["daily".to_string(), "weekly".to_string()],
            exclude: vec!["tmp".to_string()],
            ..FilterSpec::default()
        };
        let out = apply_filters(
            paths(&[
                "daily_users.csv",
                "weekly_orders.csv",
                "daily_tmp.csv",
                "monthly.csv",
            ]),
            "csv",
            &spec,
        );
        assert_eq!(names(&out), vec!["daily_users.csv", "weekly_orders.csv"]);
    }

    #[test]
    fn include_produces_no_duplicates_for_multiple_matching_tokens() {
        let spec = FilterSpec {
            include: vec!["users".to_string(), "daily".to_string()],
            ..FilterSpec::default()
        };
        let out = apply_filters(paths(&["daily_users.csv"]), "csv", &spec);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn skip_drops_the_newest_then_keep_latest_takes_the_head() {
        // Input is newest-first: f0 is the most recent.
        let spec = FilterSpec {
            skip: Some(1),
            ..FilterSpec::default()
        };
        let out = apply_filters(paths(&["f0.csv", "f1.csv", "f2.csv"]), "csv", &spec);
        assert_eq!(names(&out), vec!["f1.csv", "f2.csv"]);

        let spec = FilterSpec {
            skip: Some(1),
            keep_latest: true,
            ..FilterSpec::default()
        };
        let out = apply_filters(paths(&["f0.csv", "f1.csv", "f2.csv"]), "csv", &spec);
        assert_eq!(names(&out), vec!["f1.csv"]);
    }

    #[test]
    fn skip_of_zero_is_a_no_op() {
        let spec = FilterSpec {
            skip: Some(0),
            ..FilterSpec::default()
        };
        let out = apply_filters(paths(&["f0.csv", "f1.csv"]), "csv", &spec);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn skip_past_the_end_leaves_nothing() {
        let spec = FilterSpec {
            skip: Some(5),
            keep_latest: true,
            ..FilterSpec::default()
        };
        let out = apply_filters(paths(&["f0.csv", "f1.csv"]), "csv", &spec);
        assert!(out.is_empty());
    }

    #[test]
    fn keep_latest_alone_takes_the_newest() {
        let spec = FilterSpec {
            keep_latest: true,
            ..FilterSpec::default()
        };
        let out = apply_filters(paths(&["f0.csv", "f1.csv", "f2.csv"]), "csv", &spec);
        assert_eq!(names(&out), vec!["f0.csv"]);
    }
}
