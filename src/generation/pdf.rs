//! Problem statement rendering: markdown → styled HTML → PDF.
//!
//! The PDF itself comes from an external `wkhtmltopdf` process reading HTML
//! on stdin and writing PDF bytes to stdout; this module only prepares the
//! HTML and supervises the subprocess.

use pulldown_cmark::{html, Options, Parser};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::PdfConfig;

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("Failed to start PDF renderer '{bin}': {reason}. Is wkhtmltopdf installed?")]
    Spawn { bin: String, reason: String },
    #[error("PDF rendering timed out after {0} seconds")]
    Timeout(u64),
    #[error("PDF renderer failed: {0}")]
    Render(String),
}

/// Page shell around the rendered statement body.
const HTML_TEMPLATE_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
body {
    font-family: 'DejaVu Sans', 'Tahoma', sans-serif;
    font-size: 16px;
    line-height: 1.6;
}
h1, h2, h3 { font-weight: bold; }
table {
    border-collapse: collapse;
    width: 100%;
    margin: 16px 0;
    border: 1px solid #ddd;
}
th, td {
    border: 1px solid #ddd;
    padding: 8px 12px;
    text-align: left;
    vertical-align: top;
}
th { background-color: #f2f2f2; }
code, pre {
    font-family: 'DejaVu Sans Mono', 'Courier New', monospace;
    background-color: #f5f5f5;
    padding: 2px 4px;
    border-radius: 4px;
}
pre { padding: 1rem; overflow-x: auto; }
</style>
</head>
<body>
"#;

const HTML_TEMPLATE_TAIL: &str = "</body>\n</html>\n";

/// Render statement markdown (tables and fenced code enabled) into the full
/// HTML page handed to the PDF renderer.
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(markdown, options);

    let mut body = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut body, parser);

    let mut page = String::with_capacity(HTML_TEMPLATE_HEAD.len() + body.len() + HTML_TEMPLATE_TAIL.len());
    page.push_str(HTML_TEMPLATE_HEAD);
    page.push_str(&body);
    page.push_str(HTML_TEMPLATE_TAIL);
    page
}

/// Convert statement markdown into PDF bytes via the configured renderer.
pub async fn markdown_to_pdf(config: &PdfConfig, markdown: &str) -> Result<Vec<u8>, PdfError> {
    let html_page = markdown_to_html(markdown);

    let mut child = Command::new(&config.wkhtmltopdf_bin)
        .args(["--encoding", "utf-8", "--quiet", "-", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| PdfError::Spawn {
            bin: config.wkhtmltopdf_bin.clone(),
            reason: e.to_string(),
        })?;

    let mut stdin = child.stdin.take().ok_or_else(|| PdfError::Spawn {
        bin: config.wkhtmltopdf_bin.clone(),
        reason: "child stdin unavailable".to_string(),
    })?;
    stdin
        .write_all(html_page.as_bytes())
        .await
        .map_err(|e| PdfError::Render(format!("failed to write HTML: {e}")))?;
    drop(stdin);

    let output = timeout(
        Duration::from_secs(config.timeout_secs),
        child.wait_with_output(),
    )
    .await
    .map_err(|_| PdfError::Timeout(config.timeout_secs))?
    .map_err(|e| PdfError::Render(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PdfError::Render(format!(
            "renderer exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    if output.stdout.is_empty() {
        return Err(PdfError::Render("renderer produced no output".to_string()));
    }

    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_to_html_renders_heading_and_code() {
        let html = markdown_to_html("# Two Sum\n\n```\nn = 5\n```\n");
        assert!(html.contains("<h1>Two Sum</h1>"));
        assert!(html.contains("<code>n = 5"));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_markdown_to_html_renders_tables() {
        let md = "| a | b |\n|---|---|\n| 1 | 2 |\n";
        let html = markdown_to_html(md);
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }
}
