//! Environment-driven harness configuration.
//!
//! `ARBORTEST_LOG=<path>` enables the JSONL run log; unset or empty
//! disables it. The variable is read once per process and cached.

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::OnceLock;

fn parse_log_var(raw: Option<OsString>) -> Option<PathBuf> {
    let raw = raw?;
    if raw.is_empty() {
        return None;
    }
    Some(PathBuf::from(raw))
}

/// Path of the JSONL run log, if configured.
#[must_use]
pub fn run_log_path() -> Option<&'static PathBuf> {
    static CACHE: OnceLock<Option<PathBuf>> = OnceLock::new();
    CACHE
        .get_or_init(|| parse_log_var(std::env::var_os("ARBORTEST_LOG")))
        .as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_and_empty_values_disable_the_log() {
        assert_eq!(parse_log_var(None), None);
        assert_eq!(parse_log_var(Some(OsString::new())), None);
    }

    #[test]
    fn a_path_value_enables_the_log() {
        assert_eq!(
            parse_log_var(Some(OsString::from("run.jsonl"))),
            Some(PathBuf::from("run.jsonl"))
        );
    }
}
