//! Artifact file names
//!
//! A file name format is free text with `{placeholder}` and
//! `{placeholder(strftime)}` substitutions, e.g.
//! `{resourceLabel}_{kind}_{now(%Y%m%d)}`. Substituted values are cleaned
//! to `[A-Za-z0-9_.-]` so they never introduce separators.

use crate::domain::{ResourceRepresentation, TimeWindow};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Days, Utc};
use regex::{Captures, Regex};
use std::fmt::Write;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z]+)(?:\(([^)]*)\))?\}").expect("placeholder pattern is valid")
});

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";
const FALLBACK_FORMAT: &str = "%Y%m%d";

/// Builds the file name of an artifact, appending its extension when the
/// format did not produce it
pub fn artifact_filename(
    format: &str,
    representation: &ResourceRepresentation,
    window: &TimeWindow,
    now: DateTime<Utc>,
) -> String {
    let identifier = &representation.identifier;
    let yesterday = now.checked_sub_days(Days::new(1)).unwrap_or(now);
    let end = window.end().unwrap_or(now);

    let name = PLACEHOLDER.replace_all(format, |caps: &Captures<'_>| {
        let pattern = caps.get(2).map(|m| m.as_str());
        let value = match (&caps[1], pattern) {
            ("resourceLabel", None) => identifier.label.clone(),
            ("resourceName", None) => identifier.source_path.name().to_string(),
            ("resourcePath", None) => identifier
                .source_path
                .as_str()
                .trim_start_matches('/')
                .replace('/', "_"),
            ("kind", None) => representation.artifact_kind.clone(),
            ("today", None) => format_instant(now, DATE_FORMAT),
            ("yesterday", None) => format_instant(yesterday, DATE_FORMAT),
            ("now", None) => format_instant(now, TIMESTAMP_FORMAT),
            ("period", None) => format!(
                "{}_{}",
                format_instant(window.start(), DATE_FORMAT),
                window
                    .end()
                    .map_or_else(|| "now".to_string(), |e| format_instant(e, DATE_FORMAT))
            ),
            ("now", Some(p)) => format_instant(now, p),
            ("yesterday", Some(p)) => format_instant(yesterday, p),
            ("start", Some(p)) => format_instant(window.start(), p),
            ("end", Some(p)) => format_instant(end, p),
            _ => return caps[0].to_string(),
        };
        clean(&value)
    });

    let suffix = format!(".{}", representation.extension);
    if representation.extension.is_empty() || name.ends_with(&suffix) {
        name.into_owned()
    } else {
        format!("{name}{suffix}")
    }
}

fn format_instant(instant: DateTime<Utc>, pattern: &str) -> String {
    let pattern = if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        tracing::warn!(pattern = %pattern, "Invalid date format in file name, using {FALLBACK_FORMAT}");
        FALLBACK_FORMAT
    } else {
        pattern
    };
    let mut out = String::new();
    if write!(out, "{}", instant.format(pattern)).is_err() {
        out.clear();
        let _ = write!(out, "{}", instant.format(FALLBACK_FORMAT));
    }
    out
}

/// Replaces every character outside `[A-Za-z0-9_.-]` with `_`
pub fn clean(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NodePath, ResourceIdentifier};
    use chrono::TimeZone;
    use test_case::test_case;

    fn representation() -> ResourceRepresentation {
        ResourceRepresentation {
            identifier: ResourceIdentifier::new(
                NodePath::new("/Subjects/s1").unwrap(),
                "P 0001/a",
                "/Subjects/s1.data",
            ),
            content: Vec::new(),
            mime_type: "application/json".to_string(),
            contents_summary: Vec::new(),
            artifact_kind: "data".to_string(),
            extension: "json".to_string(),
        }
    }

    fn window() -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(2024, 5, 9, 0, 0, 0).unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap()),
        )
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 2, 30, 0).unwrap()
    }

    #[test_case("{resourceLabel}_{kind}_{now(%Y%m%d)}", "P_0001_a_data_20240510.json" ; "default format")]
    #[test_case("{resourceName}-{today}", "s1-2024-05-10.json" ; "name and today")]
    #[test_case("{resourcePath}_{yesterday}", "Subjects_s1_2024-05-09.json" ; "path and yesterday")]
    #[test_case("{period}", "2024-05-09_2024-05-10.json" ; "period")]
    #[test_case("{start(%d%m)}_{end(%d%m)}", "0905_1005.json" ; "window bounds")]
    #[test_case("{now}", "2024-05-10T02-30-00.json" ; "now timestamp")]
    #[test_case("export.json", "export.json" ; "extension kept")]
    #[test_case("{unknown}_{kind}", "{unknown}_data.json" ; "unknown placeholder kept")]
    fn test_artifact_filename(format: &str, expected: &str) {
        assert_eq!(artifact_filename(format, &representation(), &window(), now()), expected);
    }

    #[test]
    fn test_open_window_period_and_end() {
        let window = TimeWindow::since(Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap());
        assert_eq!(
            artifact_filename("{period}_{end(%H%M)}", &representation(), &window, now()),
            "2024-05-10_now_0230.json"
        );
    }

    #[test]
    fn test_invalid_date_format_falls_back() {
        assert_eq!(
            artifact_filename("{now(%Q)}", &representation(), &window(), now()),
            "20240510.json"
        );
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean("a b/c:d.e-f_g"), "a_b_c_d.e-f_g");
    }
}
