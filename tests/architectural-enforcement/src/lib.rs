//! Architectural Enforcement Integration Tests
//!
//! Repository policy checks run as ordinary tests:
//! - The session core never sleeps; time only moves through the delay queue
//! - Only the runtime driver waits, and only on a scheduler deadline
//!
//! This library holds the source-scanning helpers the tests share.

use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root, resolved from this crate's manifest
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// All `.rs` files under `dir` (relative to the workspace root)
///
/// # Panics
///
/// Panics if the directory does not exist, so a moved crate cannot make a
/// policy test pass vacuously.
#[must_use]
pub fn rust_sources(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root().join(dir);
    assert!(root.exists(), "policy target {} is missing", root.display());

    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect()
}

/// Production lines of a source file: everything before `#[cfg(test)]`,
/// with line comments stripped, as `(line number, code)`
#[must_use]
pub fn production_lines(path: &Path) -> Vec<(usize, String)> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };

    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .map(|(idx, line)| (idx + 1, code_part(line).to_string()))
        .filter(|(_, code)| !code.trim().is_empty())
        .collect()
}

/// Part of a line before any `//` comment
#[must_use]
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Whether `code` calls a sleep function
#[must_use]
pub fn calls_sleep(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(".sleep(")
}

/// Whether `code` waits on an absolute deadline
#[must_use]
pub fn calls_sleep_until(code: &str) -> bool {
    code.contains("sleep_until(")
}

/// Whether any of the `window` lines before `idx` mention `needle`
#[must_use]
pub fn mentioned_nearby(lines: &[(usize, String)], idx: usize, window: usize, needle: &str) -> bool {
    lines[idx.saturating_sub(window)..=idx]
        .iter()
        .any(|(_, code)| code.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_part_strips_comments() {
        assert_eq!(code_part("let a = 1; // sleep(5)"), "let a = 1; ");
        assert!(!calls_sleep(code_part("// tokio::time::sleep(d)")));
    }

    #[test]
    fn test_sleep_detection() {
        assert!(calls_sleep("tokio::time::sleep(Duration::from_millis(10)).await;"));
        assert!(calls_sleep("std::thread::sleep(d);"));
        assert!(!calls_sleep("tokio::time::sleep_until(deadline).await;"));
        assert!(calls_sleep_until("tokio::time::sleep_until(deadline)"));
    }

    #[test]
    fn test_mentioned_nearby() {
        let lines = vec![
            (1, "let linger = Duration::from_millis(ms);".to_string()),
            (2, "render();".to_string()),
            (3, "tokio::time::sleep(linger)".to_string()),
        ];
        assert!(mentioned_nearby(&lines, 2, 5, "linger"));
        assert!(!mentioned_nearby(&lines, 1, 0, "linger"));
    }

    #[test]
    fn test_workspace_root_holds_the_core() {
        assert!(workspace_root().join("engine/core/src/lib.rs").exists());
    }
}
