//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT sleep.
//! **Exceptions**: the demo's simulated job latency (`herald/cli/src/job.rs`).
//!
//! The emitter paces frames with a re-armed `sleep_until` deadline that is
//! polled alongside the consumer's pull; it never parks a thread or loops on
//! a fixed sleep.

use std::path::Path;

use architectural_enforcement::{production_lines, rust_files};

struct SleepPolicy {
    dir: &'static str,
    /// Files allowed to await `tokio::time::sleep`
    allowed_async_sleep: &'static [&'static str],
}

const POLICIES: &[SleepPolicy] = &[
    SleepPolicy {
        dir: "herald/core/src",
        allowed_async_sleep: &[],
    },
    SleepPolicy {
        dir: "herald/cli/src",
        allowed_async_sleep: &["job.rs"],
    },
];

#[test]
fn test_no_sleep_in_production_code() {
    let violations = find_sleep_violations();

    if !violations.is_empty() {
        eprintln!("\nSleep calls found in production code:\n");
        for violation in &violations {
            eprintln!("  {violation}");
        }
        eprintln!("\nAcceptable: a timer deadline polled by the stream (sleep_until + reset),");
        eprintln!("simulated latency in the demo jobs, and test code.");

        panic!(
            "\nFound {} sleep violation(s) in production code.",
            violations.len()
        );
    }
}

fn find_sleep_violations() -> Vec<String> {
    let mut violations = Vec::new();

    for policy in POLICIES {
        for path in rust_files(policy.dir) {
            let allowed = is_allowed(&path, policy);

            for line in production_lines(&path) {
                if line.code.contains("thread::sleep") {
                    violations.push(format!("{line} (blocks the runtime)"));
                } else if is_async_sleep(&line.code) && !allowed {
                    violations.push(line.to_string());
                }
            }
        }
    }

    violations
}

fn is_allowed(path: &Path, policy: &SleepPolicy) -> bool {
    policy
        .allowed_async_sleep
        .iter()
        .any(|file| path.file_name().is_some_and(|name| name == *file))
}

fn is_async_sleep(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(" sleep(") || code.contains(".sleep(")
}

#[test]
fn test_detector_flags_sleep_calls() {
    assert!(is_async_sleep("    tokio::time::sleep(Duration::from_millis(10)).await;"));
    assert!(is_async_sleep("    sleep(delay).await;"));
    assert!(!is_async_sleep("    Some(Box::pin(sleep_until(deadline)))"));
}

#[test]
fn test_emitter_uses_deadline_timer() {
    let emitter = rust_files("herald/core/src")
        .into_iter()
        .find(|p| p.ends_with("emitter.rs"))
        .expect("emitter.rs not found");

    assert!(production_lines(&emitter)
        .iter()
        .any(|line| line.code.contains("sleep_until(")));
}
