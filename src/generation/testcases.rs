//! Execution of LLM-authored test-case generator scripts.
//!
//! The generator source is untrusted code. It runs in a separate interpreter
//! process: a harness execs it in a scope exposing only the `random` module,
//! lowers the recursion ceiling around the call (restored in a `finally`),
//! and reports results as JSON on stdout. The parent enforces a wall-clock
//! timeout and kills the child when it expires, so a runaway generator can
//! never touch this process's state.

use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::GeneratorConfig;

/// Parallel input/output pairs produced by one generator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCases {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("Test case generation timed out after {0} seconds")]
    Timeout(u64),
    #[error("Failed to run generator interpreter: {0}")]
    Spawn(String),
    /// The generator broke its contract: missing function, wrong return
    /// shape, mismatched lengths, or an empty case set.
    #[error("{0}")]
    Contract(String),
}

#[derive(Deserialize)]
struct HarnessOutput {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    inputs: Vec<String>,
    #[serde(default)]
    outputs: Vec<String>,
}

/// Run `generate_test_cases(n)` from the supplied source under the configured
/// bounds. Callers fall back to [`fallback_cases`] on any error.
pub async fn execute_generator(
    config: &GeneratorConfig,
    generator_source: &str,
    n: usize,
) -> Result<TestCases, GeneratorError> {
    let harness = build_harness(generator_source, n, config.recursion_limit);

    let mut child = Command::new(&config.python_bin)
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| GeneratorError::Spawn(format!("{}: {e}", config.python_bin)))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| GeneratorError::Spawn("child stdin unavailable".to_string()))?;
    stdin
        .write_all(harness.as_bytes())
        .await
        .map_err(|e| GeneratorError::Spawn(format!("failed to write harness: {e}")))?;
    drop(stdin);

    let output = timeout(
        Duration::from_secs(config.timeout_secs),
        child.wait_with_output(),
    )
    .await
    .map_err(|_| GeneratorError::Timeout(config.timeout_secs))?
    .map_err(|e| GeneratorError::Spawn(format!("failed to collect output: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GeneratorError::Contract(format!(
            "Generator interpreter exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: HarnessOutput = serde_json::from_str(stdout.trim()).map_err(|e| {
        GeneratorError::Contract(format!("Unreadable generator output: {e}"))
    })?;

    if let Some(error) = parsed.error {
        return Err(GeneratorError::Contract(error));
    }

    validate_cases(parsed.inputs, parsed.outputs)
}

/// Contract checks shared by the subprocess path and its tests.
fn validate_cases(inputs: Vec<String>, outputs: Vec<String>) -> Result<TestCases, GeneratorError> {
    if inputs.len() != outputs.len() {
        return Err(GeneratorError::Contract(format!(
            "Mismatch: {} inputs vs {} outputs",
            inputs.len(),
            outputs.len()
        )));
    }
    if inputs.is_empty() {
        return Err(GeneratorError::Contract(
            "No test cases generated".to_string(),
        ));
    }
    Ok(TestCases { inputs, outputs })
}

/// Trivial deterministic generator used when the real one fails:
/// input[i] = i+1, output[i] = (i+1)*2. Guarantees every generation request
/// ships with a non-empty test set.
pub fn fallback_cases(n: usize) -> TestCases {
    let inputs: Vec<String> = (1..=n).map(|i| i.to_string()).collect();
    let outputs: Vec<String> = (1..=n).map(|i| (i * 2).to_string()).collect();
    TestCases { inputs, outputs }
}

/// Build the harness program fed to the child interpreter on stdin. The
/// generator source is embedded as a JSON string literal (valid Python too),
/// so no temp files are involved.
fn build_harness(source: &str, n: usize, recursion_limit: u32) -> String {
    let source_literal =
        serde_json::to_string(source).expect("string serialization cannot fail");
    format!(
        r#"import json
import random
import sys

SOURCE = {source_literal}

def fail(msg):
    print(json.dumps({{"error": msg}}))
    sys.exit(0)

scope = {{"random": random}}
try:
    exec(SOURCE, scope)
except Exception as e:
    fail("Generator code failed to execute: %s" % e)

fn = scope.get("generate_test_cases")
if fn is None:
    fail("Function 'generate_test_cases' not found in generator code")

old_limit = sys.getrecursionlimit()
sys.setrecursionlimit({recursion_limit})
try:
    result = fn({n})
except Exception as e:
    fail("Test case generation failed: %s" % e)
finally:
    sys.setrecursionlimit(old_limit)

try:
    inputs, outputs = result
except Exception:
    fail("generate_test_cases must return two lists: (inputs, outputs)")

if not isinstance(inputs, list) or not isinstance(outputs, list):
    fail("generate_test_cases must return two lists: (inputs, outputs)")

print(json.dumps({{"inputs": [str(x) for x in inputs], "outputs": [str(x) for x in outputs]}}))
"#
    )
}
