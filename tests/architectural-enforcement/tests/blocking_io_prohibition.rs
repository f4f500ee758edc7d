//! Integration Test: Blocking Terminal Output Prohibition
//!
//! **Policy**: The core library MUST NOT write to the terminal itself. Frames
//! leave through `FrameStream` or an `AsyncWrite` sink handed to `pipe`, and
//! diagnostics go through `tracing`. A stray print would land inside the
//! redrawn block and break the line accounting of the next erase.
//!
//! The demo binary owns the terminal and is not scanned.

use architectural_enforcement::{production_lines, rust_files};

const FORBIDDEN: &[(&str, &str)] = &[
    ("println!", "print macro"),
    ("print!(", "print macro"),
    ("dbg!(", "debug macro"),
    ("std::io::stdout", "blocking stdout"),
    ("std::io::stderr", "blocking stderr"),
    ("io::stdout()", "blocking stdout"),
    ("io::stderr()", "blocking stderr"),
    ("block_on(", "blocking on a future"),
];

#[test]
fn test_no_terminal_writes_in_core() {
    let violations = find_violations("herald/core/src");

    if !violations.is_empty() {
        eprintln!("\nBlocking terminal output found in herald-core:\n");
        for violation in &violations {
            eprintln!("  {violation}");
        }
        eprintln!("\nUse tracing for diagnostics and Reporter::pipe for frames.");

        panic!(
            "\nFound {} blocking output violation(s) in herald-core.",
            violations.len()
        );
    }
}

fn find_violations(dir: &str) -> Vec<String> {
    let mut violations = Vec::new();

    for path in rust_files(dir) {
        for line in production_lines(&path) {
            for (pattern, kind) in FORBIDDEN {
                if line.code.contains(pattern) {
                    violations.push(format!("{line} ({kind})"));
                }
            }
        }
    }

    violations
}

#[test]
fn test_core_has_sources_to_scan() {
    assert!(!rust_files("herald/core/src").is_empty());
}
