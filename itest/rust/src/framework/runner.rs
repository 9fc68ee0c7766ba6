/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::panic::AssertUnwindSafe;
use std::time::Instant;

use crate::framework::{RustTestCase, TestContext};

/// Runs all `#[itest]` functions whose name contains one of `filters` (all, if empty). Returns whether all of them passed.
pub fn run_all_tests(filters: &[String]) -> bool {
    println!("{FMT_CYAN_BOLD}Run{FMT_END} godot-rust integration tests...");

    let (rust_tests, rust_files, focus_run) = super::collect_rust_tests(filters);
    if focus_run {
        println!("  {FMT_CYAN}Focused run{FMT_END} -- execute only selected Rust tests.")
    }
    println!(
        "  Rust: found {} tests in {} files.",
        rust_tests.len(),
        rust_files.len()
    );

    let ctx = TestContext::new(super::engine());
    let mut stats = TestStats::default();

    let clock = Instant::now();
    let mut last_file = None;
    for test in rust_tests {
        print_test_pre(test.name, test.file, &mut last_file);
        let outcome = run_rust_test(&test, &ctx);

        stats.update(&outcome, test.file, test.name);
        print_test_post(test.name, outcome);
    }

    stats.conclude(clock.elapsed().as_secs_f32(), focus_run)
}

fn run_rust_test(test: &RustTestCase, ctx: &TestContext) -> TestOutcome {
    if test.skipped {
        return TestOutcome::Skipped;
    }

    // Explicit type to prevent tests from returning a value
    let err_context = || format!("itest `{}` failed", test.name);
    let success: Result<(), String> =
        godot::private::handle_panic(err_context, AssertUnwindSafe(|| (test.function)(ctx)));

    // The next test starts with a loaded library and an engine without injected failures, even if this one panicked midway.
    fake_engine::reset_failures();
    ctx.engine().initialize();

    TestOutcome::from_bool(success.is_ok())
}

#[derive(Default)]
struct TestStats {
    total: usize,
    passed: usize,
    skipped: usize,
    failed_list: Vec<String>,
}

impl TestStats {
    fn update(&mut self, outcome: &TestOutcome, test_file: &str, test_name: &str) {
        self.total += 1;
        match outcome {
            TestOutcome::Passed => self.passed += 1,
            TestOutcome::Failed => self.failed_list.push(format!(
                "{} > {}",
                extract_file_subtitle(test_file),
                test_name
            )),
            TestOutcome::Skipped => self.skipped += 1,
        }
    }

    fn conclude(&self, rust_time: f32, focused_run: bool) -> bool {
        let Self {
            total,
            passed,
            skipped,
            ..
        } = *self;

        // Consider 0 tests run as a failure too, because it's probably a problem with the run itself.
        let failed = total - passed - skipped;
        let all_passed = failed == 0 && total != 0;

        let outcome = TestOutcome::from_bool(all_passed);

        let extra = if skipped > 0 {
            format!(", {skipped} skipped")
        } else if focused_run {
            " (focused run)".to_string()
        } else {
            "".to_string()
        };

        println!("\nTest result: {outcome}. {passed} passed; {failed} failed{extra}.");
        println!("  Time: {rust_time:.2}s.");

        if !all_passed {
            println!("\n  Failed tests:");
            let max = 10;
            for test in self.failed_list.iter().take(max) {
                println!("  * {test}");
            }

            if self.failed_list.len() > max {
                println!("  * ... and {} more.", self.failed_list.len() - max);
            }

            println!();
        }

        all_passed
    }
}

// For more colors, see https://stackoverflow.com/a/54062826
const FMT_CYAN_BOLD: &str = "\x1b[36;1;1m";
const FMT_CYAN: &str = "\x1b[36m";
const FMT_GREEN: &str = "\x1b[32m";
const FMT_YELLOW: &str = "\x1b[33m";
const FMT_RED: &str = "\x1b[31m";
const FMT_END: &str = "\x1b[0m";

fn print_test_pre(test_case: &str, test_file: &'static str, last_file: &mut Option<&'static str>) {
    // Check if we need to open a new category for a file.
    if *last_file != Some(test_file) {
        println!("\n   {}:", extract_file_subtitle(test_file));
    }
    *last_file = Some(test_file);

    print!("   -- {test_case} ... ");
    godot::private::flush_stdout();
}

fn extract_file_subtitle(file: &str) -> &str {
    if let Some(sep_pos) = file.rfind(['/', '\\']) {
        &file[sep_pos + 1..]
    } else {
        file
    }
}

/// Prints a test name and its outcome.
fn print_test_post(test_case: &str, outcome: TestOutcome) {
    // If test failed, something was printed (e.g. assertion), so we can print the entire line again; otherwise just outcome on same line.
    if matches!(outcome, TestOutcome::Failed) {
        println!("   -- {test_case} ... {outcome}");
    } else {
        println!("{outcome}");
    }
}

#[must_use]
enum TestOutcome {
    Passed,
    Failed,
    Skipped,
}

impl TestOutcome {
    fn from_bool(success: bool) -> Self {
        if success {
            Self::Passed
        } else {
            Self::Failed
        }
    }
}

impl std::fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let end = FMT_END;
        let (col, outcome) = match self {
            TestOutcome::Passed => (FMT_GREEN, "ok"),
            TestOutcome::Failed => (FMT_RED, "FAILED"),
            TestOutcome::Skipped => (FMT_YELLOW, "skipped"),
        };

        write!(f, "{col}{outcome}{end}")
    }
}
