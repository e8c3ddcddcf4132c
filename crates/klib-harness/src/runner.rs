//! Test execution engine.

use klib_membrane::{SafetyLevel, global_healing_policy};

use crate::diff;
use crate::executor::execute_fixture_case;
use crate::fixtures::{FixtureCase, FixtureSet};
use crate::verify::VerificationResult;

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
    /// Mode being tested (strict or hardened).
    pub mode: String,
}

impl TestRunner {
    /// Create a new test runner.
    #[must_use]
    pub fn new(campaign: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
            mode: mode.into(),
        }
    }

    /// Run all fixtures in a set and return results.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set
            .cases
            .iter()
            .filter(|case| mode_matches(&self.mode, &case.mode))
            .map(|case| {
                let before = global_healing_policy().snapshot();
                let (actual, diff) = execute_case(case, &self.mode);
                // Strict never heals; counter movement there belongs to another thread.
                let healing_action = (SafetyLevel::from_str_loose(&self.mode)
                    == SafetyLevel::Hardened)
                    .then(|| global_healing_policy().snapshot().action_since(&before))
                    .flatten()
                    .map(str::to_string);
                let case_name = if case.mode.eq_ignore_ascii_case("both") {
                    format!("{} [{}]", case.name, self.mode)
                } else {
                    case.name.clone()
                };
                VerificationResult {
                    case_name,
                    family: fixture_set.family.clone(),
                    symbol: case.function.clone(),
                    mode: self.mode.clone(),
                    spec_section: case.spec_section.clone(),
                    passed: actual == case.expected_output,
                    expected: case.expected_output.clone(),
                    actual,
                    diff,
                    healing_action,
                }
            })
            .collect()
    }
}

fn mode_matches(active_mode: &str, case_mode: &str) -> bool {
    case_mode.eq_ignore_ascii_case(active_mode) || case_mode.eq_ignore_ascii_case("both")
}

fn execute_case(case: &FixtureCase, active_mode: &str) -> (String, Option<String>) {
    // Fixture cases with mode=both execute under the runner's active mode.
    match execute_fixture_case(&case.function, &case.inputs, active_mode) {
        Ok(actual) => {
            let diff_out = (actual != case.expected_output)
                .then(|| diff::render_diff(&case.expected_output, &actual));
            (actual, diff_out)
        }
        Err(err) => {
            let actual = format!("unsupported:{err}");
            let diff_out = Some(diff::render_diff(&case.expected_output, &actual));
            (actual, diff_out)
        }
    }
}
