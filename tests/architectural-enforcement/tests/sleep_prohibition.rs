//! Integration Test: Sleep Prohibition
//!
//! **Policy**: The session core never sleeps. Time moves only through the
//! delay queue, so every timeline can be replayed on a virtual clock.
//! **Exceptions**: the runtime driver (`runtime.rs`) may wait with
//! `sleep_until` on the next scheduler deadline; the CLI may sleep for its
//! post-EOF linger window; test code.

use std::path::Path;

use architectural_enforcement::{
    calls_sleep, calls_sleep_until, mentioned_nearby, production_lines, rust_sources,
};

/// Test that the core contains no sleep calls and waits only in the runtime
#[test]
fn test_no_sleep_in_session_core() {
    let mut violations = Vec::new();

    for path in rust_sources("engine/core/src") {
        let is_runtime = path.ends_with("runtime.rs");
        for (line_number, code) in production_lines(&path) {
            if calls_sleep(&code) {
                violations.push(describe(&path, line_number, &code));
            } else if calls_sleep_until(&code) && !is_runtime {
                violations.push(describe(&path, line_number, &code));
            }
        }
    }

    report(&violations);
}

/// Test that the CLI only sleeps for its linger window
#[test]
fn test_cli_sleeps_only_to_linger() {
    let mut violations = Vec::new();

    for path in rust_sources("engine/cli/src") {
        let lines = production_lines(&path);
        for (idx, (line_number, code)) in lines.iter().enumerate() {
            if calls_sleep(code) && !mentioned_nearby(&lines, idx, 3, "linger") {
                violations.push(describe(&path, *line_number, code));
            }
        }
    }

    report(&violations);
}

/// Test that the runtime really does wait on the scheduler deadline
#[test]
fn test_runtime_waits_on_deadline() {
    let runtime = rust_sources("engine/core/src")
        .into_iter()
        .find(|p| p.ends_with("runtime.rs"))
        .expect("runtime.rs is missing");

    let lines = production_lines(&runtime);
    let waits: Vec<_> = lines
        .iter()
        .enumerate()
        .filter(|(_, (_, code))| calls_sleep_until(code))
        .collect();

    assert_eq!(waits.len(), 1, "runtime should wait in exactly one place");
    let (idx, _) = waits[0];
    assert!(
        mentioned_nearby(&lines, idx, 12, "next_deadline"),
        "runtime wait must be driven by the scheduler deadline"
    );
}

fn describe(path: &Path, line_number: usize, code: &str) -> String {
    format!("{}:{} - {}", path.display(), line_number, code.trim())
}

fn report(violations: &[String]) {
    if !violations.is_empty() {
        eprintln!("\n❌ Sleep calls found in production code!\n");
        for violation in violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ ACCEPTABLE:");
        eprintln!("  - tokio::time::sleep_until(<scheduler deadline>) in runtime.rs");
        eprintln!("  - the CLI's post-EOF linger window");
        eprintln!("  - test code (#[cfg(test)] modules, tests/ directories)");
        eprintln!("\n❌ FORBIDDEN:");
        eprintln!("  - sleeping inside the session, engine or scheduler");
        eprintln!("  - sleep as a stand-in for the delay queue");

        panic!(
            "\nFound {} sleep violation(s) in production code.",
            violations.len()
        );
    }
}
