//! Integration tests for the tasksmith pipelines.
//!
//! These tests exercise the full offline path — parsing a canned LLM blob,
//! sanitizing the task name, falling back to trivial test cases, assembling
//! the bundle, and zipping it — without requiring a running LLM, database,
//! or PDF renderer.

use std::io::Read;

use tasksmith::api::tasks::{build_zip, clean_path};
use tasksmith::generation::parse::{split_sections, ParseError, SECTION_DELIMITER};
use tasksmith::generation::testcases::fallback_cases;
use tasksmith::generation::{assemble_bundle, sanitize_task_name};
use tasksmith::llm::query_expand::combine_for_embedding;
use tasksmith::slug::{create_unique_slug, slugify, SlugifyOptions};
use tasksmith::update::generate_problem_id;

/// Helper: a well-formed five-section LLM response for a small task.
fn canned_llm_output() -> String {
    [
        "🚀 Two Sum!!",
        "```python\ndef generate_test_cases(n):\n    inputs = [str(i + 1) for i in range(n)]\n    outputs = [str((i + 1) * 2) for i in range(n)]\n    return inputs, outputs\n```",
        "# Two Sum\n\nGiven an array, find two numbers that sum to a target.\n\n## Input\nOne line with n integers.\n\n## Output\nTwo indices.",
        "```cpp\n#include <vector>\nint main() { return 0; }\n```",
        "```json\n{\"time_limit_ms\": 1000, \"memory_limit_mb\": 256}\n```",
    ]
    .join(&format!("\n{SECTION_DELIMITER}\n"))
}

#[test]
fn test_full_offline_generation_flow() {
    let sections = split_sections(&canned_llm_output()).unwrap();
    assert_eq!(sections.task_name, "🚀 Two Sum!!");
    assert!(sections.generator_code.starts_with("def generate_test_cases"));
    assert!(sections.solution_code.contains("#include <vector>"));
    assert!(sections.config_json.contains("time_limit_ms"));

    let task_name = sanitize_task_name(&sections.task_name);
    assert_eq!(task_name, "two_sum");

    // Generator execution is environment-dependent; the pipeline guarantees
    // a test set either way via the fallback.
    let cases = fallback_cases(5);
    assert_eq!(cases.inputs.len(), 5);
    for (i, output) in cases.outputs.iter().enumerate() {
        assert_eq!(output, &(2 * (i + 1)).to_string());
    }

    let bundle = assemble_bundle(&task_name, &sections, &cases, b"%PDF-1.4 stub".to_vec());

    // 5 fixed files + 5 inputs + 5 outputs
    assert_eq!(bundle.files.len(), 15);

    let zip_bytes = build_zip(&bundle).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();
    assert_eq!(archive.len(), 15);

    // Spot-check one text entry round-trips through the archive
    let mut statement = String::new();
    archive
        .by_name("two_sum/Problems/two_sum.md")
        .unwrap()
        .read_to_string(&mut statement)
        .unwrap();
    assert!(statement.starts_with("# Two Sum"));

    let mut pdf = Vec::new();
    archive
        .by_name("two_sum/Problems/two_sum.pdf")
        .unwrap()
        .read_to_end(&mut pdf)
        .unwrap();
    assert_eq!(pdf, b"%PDF-1.4 stub");
}

#[test]
fn test_malformed_llm_output_is_rejected() {
    // 4 sections (3 delimiters)
    let blob = ["name", "gen", "statement", "solution"].join(SECTION_DELIMITER);
    assert!(matches!(
        split_sections(&blob),
        Err(ParseError::MalformedOutput { segments: 4 })
    ));

    // 6 sections (5 delimiters)
    let blob = ["a", "b", "c", "d", "e", "f"].join(SECTION_DELIMITER);
    assert!(matches!(
        split_sections(&blob),
        Err(ParseError::MalformedOutput { segments: 6 })
    ));
}

#[test]
fn test_slug_pipeline_properties() {
    let options = SlugifyOptions::default();

    // Idempotence over a batch of messy names
    for name in [
        "🚀 Two Sum!!",
        "text_Binary Search",
        "Dijkstra's Shortest Path",
        "Café Scheduling",
    ] {
        let once = slugify(name, &options);
        assert_eq!(slugify(&once, &options), once);
        assert!(!once.is_empty());
        assert!(once.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
    }

    // Unique slugs never collide with the existing set
    let existing = vec!["two_sum".to_string(), "two_sum_1".to_string()];
    let unique = create_unique_slug("Two Sum", &existing, &options);
    assert!(!existing.contains(&unique));
    assert_eq!(unique, "two_sum_2");
}

#[test]
fn test_problem_identity_is_content_addressed() {
    let id1 = generate_problem_id("# Statement", "int main() {}");
    let id2 = generate_problem_id("# Statement", "int main() {}");
    let id3 = generate_problem_id("# Statement!", "int main() {}");
    assert_eq!(id1, id2);
    assert_ne!(id1, id3);
}

#[test]
fn test_search_embedding_input_keeps_original_query() {
    let combined = combine_for_embedding("graph shortest path", "dijkstra,bfs,weighted graph");
    assert!(combined.starts_with("graph shortest path "));
    assert!(combined.contains("dijkstra"));
    assert!(!combined.contains(','));
}

#[test]
fn test_zip_entry_paths_are_sanitized() {
    assert_eq!(clean_path("evil\\path?.txt"), "evil_path_.txt");
    assert_eq!(clean_path("two_sum/Problems/two_sum.md"), "two_sum/Problems/two_sum.md");
    assert_eq!(clean_path("../escape.txt"), "escape.txt");
}
