//! Identifier and task-name canonicalization.
//!
//! The training plan and the flight-log system encode student identifiers
//! differently (`"101AB - Jane Doe"` vs `"101AB-JANE DOE-C172"`), and
//! administrative accounts use an `OZ` prefix with their own dash layout.
//! Everything here is total: missing input normalizes to `""`.

use regex::Regex;
use std::sync::OnceLock;

const ADMIN_PREFIX: &str = "OZ";

/// Canonical student code from the training-plan side.
///
/// `OZ` codes are kept whole; anything else is cut at the first `-`.
pub fn normalize_plan_code(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    let trimmed = raw.trim();
    if trimmed.starts_with(ADMIN_PREFIX) {
        return trimmed.to_string();
    }
    left_of_first_dash(trimmed)
}

/// Canonical student code from the flight-log side.
///
/// `OZ` codes with two or more dashes are cut at the second dash; `OZ` codes
/// with fewer dashes are returned as-is.
pub fn normalize_log_code(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    let trimmed = raw.trim();
    if trimmed.starts_with(ADMIN_PREFIX) {
        return match trimmed.match_indices('-').nth(1) {
            Some((second_dash, _)) => trimmed[..second_dash].trim_end().to_string(),
            None => trimmed.to_string(),
        };
    }
    left_of_first_dash(trimmed)
}

fn left_of_first_dash(s: &str) -> String {
    s.split('-').next().unwrap_or_default().trim().to_string()
}

static TASK_SEPARATORS_RE: OnceLock<Regex> = OnceLock::new();

fn task_separators_re() -> &'static Regex {
    TASK_SEPARATORS_RE.get_or_init(|| Regex::new(r"[\s-]+").unwrap())
}

/// Canonical task name for group lookups: whitespace and dashes removed,
/// uppercased. Exact-name matching in the matcher does NOT use this.
pub fn normalize_task(name: Option<&str>) -> String {
    let Some(name) = name else {
        return String::new();
    };
    task_separators_re().replace_all(name, "").to_uppercase()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
