//! Task generation pipeline: one LLM call, then file assembly.
//!
//! Two steps, run in order, terminal on the first error:
//! 1. **Generate** — render the five-section prompt and call the LLM.
//! 2. **CreateFiles** — parse the sections, sanitize the task name, produce
//!    test cases (with fallback), render the statement PDF, and assemble the
//!    bundle file list.
//!
//! Each step is a typed function returning `Result`; there is no shared
//! scratch state, so an error in one step structurally prevents the next
//! from running.

pub mod parse;
pub mod pdf;
pub mod testcases;

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{GeneratorConfig, LlmConfig, PdfConfig};
use crate::llm::chat;
use crate::models::{FileCategory, GeneratedFile, TaskBundle, TaskRequest};
use crate::slug::{log_name_transformation, slugify, SlugifyOptions};

use parse::{ParsedSections, SECTION_DELIMITER};
use testcases::TestCases;

/// Terminal pipeline failure carrying the full diagnostic string.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct GenerationError(pub String);

static NAME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(text_|task_generated_)").expect("prefix regex"));

/// Run the full pipeline for one request.
pub async fn generate_task(
    client: &reqwest::Client,
    llm: &LlmConfig,
    generator: &GeneratorConfig,
    pdf_config: &PdfConfig,
    req: &TaskRequest,
) -> Result<TaskBundle, GenerationError> {
    // ── Step 1: Generate ─────────────────────────────────
    tracing::info!("Generating task content for '{}'", req.content_name);
    let llm_output = generate_content(client, llm, req)
        .await
        .map_err(|e| GenerationError(format!("LLM generation failed: {e:#}")))?;

    // ── Step 2: CreateFiles ──────────────────────────────
    match create_files(generator, pdf_config, &llm_output, req.cases_size).await {
        Ok(bundle) => Ok(bundle),
        Err(e) => Err(GenerationError(file_creation_diagnostic(&llm_output, &e))),
    }
}

/// The five-section prompt. The model must separate sections with the exact
/// underscore delimiter the parser splits on.
async fn generate_content(
    client: &reqwest::Client,
    llm: &LlmConfig,
    req: &TaskRequest,
) -> anyhow::Result<String> {
    let detail = req.detail.as_deref().unwrap_or("None");
    let prompt = format!(
        "You are a competitive programming task author. Create a complete task \
         for the topic below.\n\n\
         Topic: {content_name}\n\
         Number of test cases: {cases_size}\n\
         Additional constraints: {detail}\n\n\
         Produce EXACTLY five sections, in this order, separated by a line \
         containing exactly this delimiter:\n{delim}\n\n\
         Section 1: the task name (a short title, nothing else).\n\
         Section 2: a Python script defining generate_test_cases(n) that \
         returns two lists (inputs, outputs) of n strings each, using only \
         the random module.\n\
         Section 3: the full problem statement in markdown (story, input \
         format, output format, constraints, examples).\n\
         Section 4: a reference solution in C++.\n\
         Section 5: a JSON object with task configuration \
         (time_limit_ms, memory_limit_mb).\n\n\
         Do not add any text before the first section or after the last.",
        content_name = req.content_name,
        cases_size = req.cases_size,
        detail = detail,
        delim = SECTION_DELIMITER,
    );

    chat::complete(client, llm, &prompt, 0.7).await
}

async fn create_files(
    generator: &GeneratorConfig,
    pdf_config: &PdfConfig,
    llm_output: &str,
    cases_size: usize,
) -> anyhow::Result<TaskBundle> {
    let sections = parse::split_sections(llm_output)?;

    let task_name = sanitize_task_name(&sections.task_name);

    // Generator failures are survivable: fall back to the trivial cases so
    // every request ships with a non-empty test set.
    let cases = match testcases::execute_generator(generator, &sections.generator_code, cases_size)
        .await
    {
        Ok(cases) => cases,
        Err(e) => {
            tracing::warn!("Test case generation failed, using fallback: {e}");
            testcases::fallback_cases(cases_size)
        }
    };

    tracing::info!("Rendering statement PDF for task '{task_name}'");
    let pdf_bytes = pdf::markdown_to_pdf(pdf_config, &sections.statement_markdown).await?;

    Ok(assemble_bundle(&task_name, &sections, &cases, pdf_bytes))
}

/// Strip generation prefixes, then slugify for filesystem/bucket safety.
pub fn sanitize_task_name(raw_name: &str) -> String {
    let cleaned = NAME_PREFIX.replace(raw_name.trim(), "");
    let slug = slugify(&cleaned, &SlugifyOptions::default());
    log_name_transformation(raw_name, &slug);
    slug
}

/// Lay out the bundle file list: the five fixed files plus one input and one
/// output file per test case (zero-padded two-digit index).
pub fn assemble_bundle(
    task_name: &str,
    sections: &ParsedSections,
    cases: &TestCases,
    pdf_bytes: Vec<u8>,
) -> TaskBundle {
    let mut files = vec![
        GeneratedFile::text(
            FileCategory::Solution,
            format!("Solutions/{task_name}.cpp"),
            format!("{task_name}.cpp"),
            sections.solution_code.clone(),
        ),
        GeneratedFile::text(
            FileCategory::Problem,
            format!("Problems/{task_name}.md"),
            format!("{task_name}.md"),
            sections.statement_markdown.clone(),
        ),
        GeneratedFile {
            category: FileCategory::Problem,
            file_path: format!("Problems/{task_name}.pdf"),
            file_name: format!("{task_name}.pdf"),
            content: pdf_bytes,
        },
        GeneratedFile::text(
            FileCategory::Config,
            "config.json",
            "config.json",
            sections.config_json.clone(),
        ),
        GeneratedFile::text(
            FileCategory::Script,
            "Scripts/generate.py",
            "generate.py",
            sections.generator_code.clone(),
        ),
    ];

    for (i, input) in cases.inputs.iter().enumerate() {
        let file_name = format!("input{i:02}.txt");
        files.push(GeneratedFile::text(
            FileCategory::TestCaseInput,
            format!("TestCases/Inputs/{file_name}"),
            file_name.clone(),
            input.clone(),
        ));
    }
    for (i, output) in cases.outputs.iter().enumerate() {
        let file_name = format!("output{i:02}.txt");
        files.push(GeneratedFile::text(
            FileCategory::TestCaseOutput,
            format!("TestCases/Outputs/{file_name}"),
            file_name.clone(),
            output.clone(),
        ));
    }

    TaskBundle {
        task_name: task_name.to_string(),
        files,
    }
}

/// Build the terminal diagnostic for a CreateFiles failure: the error chain
/// plus the cleaned generator code that likely caused it.
fn file_creation_diagnostic(llm_output: &str, error: &anyhow::Error) -> String {
    let raw_parts: Vec<&str> = llm_output.split(SECTION_DELIMITER).collect();
    let problematic_code = raw_parts
        .get(1)
        .map(|part| parse::clean_content(part))
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        "An error occurred during file creation.\n\
         --- Error ---\n{error:#}\n\
         --- Problematic generator code ---\n{problematic_code}\n\
         ------------------------"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> ParsedSections {
        ParsedSections {
            task_name: "Two Sum".to_string(),
            generator_code: "def generate_test_cases(n):\n    return [], []".to_string(),
            statement_markdown: "# Two Sum".to_string(),
            solution_code: "int main() { return 0; }".to_string(),
            config_json: "{\"time_limit_ms\": 1000}".to_string(),
        }
    }

    #[test]
    fn test_sanitize_strips_generation_prefixes() {
        assert_eq!(sanitize_task_name("text_Two Sum"), "two_sum");
        assert_eq!(sanitize_task_name("task_generated_Two Sum"), "two_sum");
        assert_eq!(sanitize_task_name("TASK_GENERATED_Graph Walk"), "graph_walk");
    }

    #[test]
    fn test_sanitize_handles_emoji_title() {
        assert_eq!(sanitize_task_name("🚀 Two Sum!!"), "two_sum");
    }

    #[test]
    fn test_bundle_has_fixed_plus_case_files() {
        let cases = testcases::fallback_cases(5);
        let bundle = assemble_bundle("two_sum", &sections(), &cases, vec![1, 2, 3]);
        assert_eq!(bundle.files.len(), 15);

        let paths: Vec<&str> = bundle.files.iter().map(|f| f.file_path.as_str()).collect();
        assert!(paths.contains(&"Solutions/two_sum.cpp"));
        assert!(paths.contains(&"Problems/two_sum.md"));
        assert!(paths.contains(&"Problems/two_sum.pdf"));
        assert!(paths.contains(&"config.json"));
        assert!(paths.contains(&"Scripts/generate.py"));
        assert!(paths.contains(&"TestCases/Inputs/input00.txt"));
        assert!(paths.contains(&"TestCases/Outputs/output04.txt"));
    }

    #[test]
    fn test_bundle_test_case_contents_match() {
        let cases = testcases::fallback_cases(2);
        let bundle = assemble_bundle("t", &sections(), &cases, Vec::new());
        let input0 = bundle
            .files
            .iter()
            .find(|f| f.file_path == "TestCases/Inputs/input00.txt")
            .unwrap();
        let output1 = bundle
            .files
            .iter()
            .find(|f| f.file_path == "TestCases/Outputs/output01.txt")
            .unwrap();
        assert_eq!(input0.content, b"1");
        assert_eq!(output1.content, b"4");
    }

    #[test]
    fn test_diagnostic_embeds_generator_code() {
        let blob = [
            "Name",
            "```python\nbroken(\n```",
            "# Statement",
            "int main() {}",
            "{}",
        ]
        .join(SECTION_DELIMITER);
        let err = anyhow::anyhow!("boom");
        let diagnostic = file_creation_diagnostic(&blob, &err);
        assert!(diagnostic.contains("boom"));
        assert!(diagnostic.contains("broken("));
        assert!(diagnostic.contains("file creation"));
    }

    #[test]
    fn test_diagnostic_without_generator_section() {
        let diagnostic = file_creation_diagnostic("no delimiter here", &anyhow::anyhow!("x"));
        assert!(diagnostic.contains("N/A"));
    }
}
