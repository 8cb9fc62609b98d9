//! Parsing of the single LLM blob into the five task sections.

use std::sync::LazyLock;

use regex::Regex;

/// Exact section separator the generation prompt asks the model to emit.
pub const SECTION_DELIMITER: &str = "________________________________________";

/// The five cleaned sections of one generation response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSections {
    pub task_name: String,
    pub generator_code: String,
    pub statement_markdown: String,
    pub solution_code: String,
    pub config_json: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Expected 5 sections in LLM output, but got {segments}")]
    MalformedOutput { segments: usize },
}

static FENCED_WRAPPER: LazyLock<Regex> = LazyLock::new(|| {
    // One non-greedy multiline match: opening fence with optional language
    // tag, inner content, closing fence.
    Regex::new(r"(?s)```(?:[a-z]+\n)?(.*?)\n?```").expect("fence regex")
});

static BARE_FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.-]+\.[a-zA-Z]+$").expect("filename regex"));

/// Split the raw LLM output on the fixed delimiter and clean each section.
/// Exactly five sections are required; anything else is a contract breach by
/// the model and surfaces as [`ParseError::MalformedOutput`].
pub fn split_sections(llm_output: &str) -> Result<ParsedSections, ParseError> {
    let parts: Vec<&str> = llm_output.split(SECTION_DELIMITER).collect();
    if parts.len() != 5 {
        return Err(ParseError::MalformedOutput {
            segments: parts.len(),
        });
    }

    Ok(ParsedSections {
        task_name: clean_content(parts[0]),
        generator_code: clean_content(parts[1]),
        statement_markdown: clean_content(parts[2]),
        solution_code: clean_content(parts[3]),
        config_json: clean_content(parts[4]),
    })
}

/// Strip the wrappers models love to add: fenced code blocks, a literal
/// `TaskName` label, and a first line that is just a filename.
pub fn clean_content(content: &str) -> String {
    let cleaned = FENCED_WRAPPER.replace_all(content, "$1");
    let cleaned = cleaned.replace("TaskName:", "").replace("TaskName", "");
    let cleaned = cleaned.trim();

    let mut lines: Vec<&str> = cleaned.lines().collect();
    let first_is_filename = lines
        .first()
        .map(|line| BARE_FILENAME.is_match(line.trim()))
        .unwrap_or(false);
    if first_is_filename {
        lines.remove(0);
    }

    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_section_blob() -> String {
        [
            "Two Sum",
            "```python\ndef generate_test_cases(n):\n    return [], []\n```",
            "# Two Sum\n\nFind two numbers.",
            "```cpp\nint main() { return 0; }\n```",
            "{\"time_limit\": 1}",
        ]
        .join(SECTION_DELIMITER)
    }

    #[test]
    fn test_five_sections_parse() {
        let parsed = split_sections(&five_section_blob()).unwrap();
        assert_eq!(parsed.task_name, "Two Sum");
        assert!(parsed.generator_code.starts_with("def generate_test_cases"));
        assert!(parsed.statement_markdown.starts_with("# Two Sum"));
        assert_eq!(parsed.solution_code, "int main() { return 0; }");
        assert_eq!(parsed.config_json, "{\"time_limit\": 1}");
    }

    #[test]
    fn test_four_sections_fail() {
        let blob = ["a", "b", "c", "d"].join(SECTION_DELIMITER);
        let err = split_sections(&blob).unwrap_err();
        assert!(matches!(err, ParseError::MalformedOutput { segments: 4 }));
    }

    #[test]
    fn test_six_sections_fail() {
        let blob = ["a", "b", "c", "d", "e", "f"].join(SECTION_DELIMITER);
        let err = split_sections(&blob).unwrap_err();
        assert!(matches!(err, ParseError::MalformedOutput { segments: 6 }));
    }

    #[test]
    fn test_clean_strips_fence_with_language_tag() {
        assert_eq!(clean_content("```python\nprint(1)\n```"), "print(1)");
    }

    #[test]
    fn test_clean_strips_fence_without_language_tag() {
        assert_eq!(clean_content("```\nx = 1\n```"), "x = 1");
    }

    #[test]
    fn test_clean_strips_task_name_label() {
        assert_eq!(clean_content("TaskName: Two Sum"), "Two Sum");
        assert_eq!(clean_content("TaskName Two Sum"), "Two Sum");
    }

    #[test]
    fn test_clean_drops_leading_filename_line() {
        assert_eq!(clean_content("generate.py\nimport random"), "import random");
        assert_eq!(clean_content("solution.cpp\nint main() {}"), "int main() {}");
    }

    #[test]
    fn test_clean_keeps_normal_first_line() {
        assert_eq!(
            clean_content("# Heading\nbody text"),
            "# Heading\nbody text"
        );
    }

    #[test]
    fn test_clean_trims_whitespace() {
        assert_eq!(clean_content("  \n  hello  \n  "), "hello");
    }
}
