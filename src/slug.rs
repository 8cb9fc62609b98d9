//! Slug generation for task and file naming.
//!
//! Raw task names come straight out of an LLM and can contain emoji,
//! markdown fragments, and arbitrary Unicode. Everything that ends up in a
//! bucket path or zip filename goes through [`slugify`] first.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStyle {
    Camel,
    Pascal,
    Snake,
    Kebab,
}

#[derive(Debug, Clone)]
pub struct SlugifyOptions {
    pub case_style: CaseStyle,
    pub max_length: usize,
    pub preserve_numbers: bool,
    pub replacement: char,
}

impl Default for SlugifyOptions {
    fn default() -> Self {
        Self {
            case_style: CaseStyle::Snake,
            max_length: 50,
            preserve_numbers: true,
            replacement: '_',
        }
    }
}

/// Placeholder when sanitization eats the entire input.
const EMPTY_SLUG: &str = "unnamed_task";

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[\s\S]*?```").expect("fenced block regex"));
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("inline code regex"));
static MD_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("link regex"));
static MD_EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*_]{1,2}([^*_]+)[*_]{1,2}").expect("emphasis regex"));
static PREVIEW_METADATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Preview generated with \d+ files for").expect("preview metadata regex")
});
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Emoji and pictographic code points stripped before any other cleanup.
fn is_emoji(c: char) -> bool {
    matches!(c,
        '\u{1F600}'..='\u{1F64F}' // emoticons
        | '\u{1F300}'..='\u{1F5FF}' // symbols & pictographs
        | '\u{1F680}'..='\u{1F6FF}' // transport & map symbols
        | '\u{1F1E0}'..='\u{1F1FF}' // regional indicators (flags)
        | '\u{2600}'..='\u{26FF}' // miscellaneous symbols
        | '\u{2700}'..='\u{27BF}' // dingbats
        | '\u{1F900}'..='\u{1F9FF}' // supplemental symbols
        | '\u{1F018}'..='\u{1F270}' // assorted pictographs
    )
}

fn remove_emojis(text: &str) -> String {
    text.chars().filter(|c| !is_emoji(*c)).collect()
}

fn remove_markdown_artifacts(text: &str) -> String {
    let text = FENCED_BLOCK.replace_all(text, "");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = MD_LINK.replace_all(&text, "$1");
    let text = MD_EMPHASIS.replace_all(&text, "$1");
    let text = PREVIEW_METADATA.replace_all(&text, "");
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    text.trim().to_string()
}

/// Decompose, drop combining marks, and substitute the letters NFD cannot
/// reduce to ASCII on its own.
fn normalize_unicode(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.nfd().filter(|c| !is_combining_mark(*c)) {
        match c {
            'æ' => result.push_str("ae"),
            'Æ' => result.push_str("AE"),
            'œ' => result.push_str("oe"),
            'Œ' => result.push_str("OE"),
            'ß' => result.push_str("ss"),
            'ð' => result.push('d'),
            'Ð' => result.push('D'),
            'þ' => result.push_str("th"),
            'Þ' => result.push_str("TH"),
            'ø' => result.push('o'),
            'Ø' => result.push('O'),
            'ł' => result.push('l'),
            'Ł' => result.push('L'),
            other => result.push(other),
        }
    }
    result
}

fn apply_case_style(text: &str, case_style: CaseStyle, replacement: char) -> String {
    match case_style {
        CaseStyle::Snake => text.to_lowercase(),
        CaseStyle::Kebab => text.to_lowercase().replace(replacement, "-"),
        CaseStyle::Camel | CaseStyle::Pascal => {
            let words: Vec<&str> = text.split(replacement).filter(|w| !w.is_empty()).collect();
            let mut out = String::with_capacity(text.len());
            for (i, word) in words.iter().enumerate() {
                if i == 0 && case_style == CaseStyle::Camel {
                    out.push_str(&word.to_lowercase());
                } else {
                    let mut chars = word.chars();
                    if let Some(first) = chars.next() {
                        out.extend(first.to_uppercase());
                        out.push_str(&chars.as_str().to_lowercase());
                    }
                }
            }
            out
        }
    }
}

/// Turn arbitrary text into a filesystem-safe identifier.
///
/// The phases run in a fixed order: emoji strip, markdown strip, Unicode
/// normalization, non-alphanumeric replacement, run collapsing, edge
/// trimming, case styling, truncation. An input that sanitizes to nothing
/// yields `"unnamed_task"` rather than an empty string.
pub fn slugify(input: &str, options: &SlugifyOptions) -> String {
    let result = remove_emojis(input);
    let result = remove_markdown_artifacts(&result);
    let result = normalize_unicode(&result);

    // Replace everything outside the allowed set, collapsing runs of the
    // replacement character as we go.
    let mut replaced = String::with_capacity(result.len());
    for c in result.chars() {
        let keep = c.is_ascii_alphabetic() || (options.preserve_numbers && c.is_ascii_digit());
        if keep {
            replaced.push(c);
        } else if !replaced.ends_with(options.replacement) {
            replaced.push(options.replacement);
        }
    }

    let trimmed = replaced
        .trim_matches(options.replacement)
        .to_string();

    let styled = apply_case_style(&trimmed, options.case_style, options.replacement);

    let mut truncated: String = styled.chars().take(options.max_length).collect();
    while truncated.ends_with(options.replacement) {
        truncated.pop();
    }

    if truncated.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        truncated
    }
}

/// Slugify and append `_1`, `_2`, … until the result is absent from
/// `existing_slugs`.
pub fn create_unique_slug(input: &str, existing_slugs: &[String], options: &SlugifyOptions) -> String {
    let base = slugify(input, options);
    if !existing_slugs.iter().any(|s| s == &base) {
        return base;
    }

    let mut counter = 1usize;
    loop {
        let candidate = format!("{base}_{counter}");
        if !existing_slugs.iter().any(|s| s == &candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Check whether a string already satisfies the slug contract.
pub fn is_valid_slug(slug: &str, options: &SlugifyOptions) -> bool {
    if slug.is_empty() || slug.chars().count() > options.max_length {
        return false;
    }
    let charset_ok = slug.chars().all(|c| {
        c.is_ascii_alphabetic()
            || (options.preserve_numbers && c.is_ascii_digit())
            || c == '_'
            || c == '-'
    });
    if !charset_ok {
        return false;
    }
    let edge = |c: char| c == '_' || c == '-';
    if slug.starts_with(edge) || slug.ends_with(edge) {
        return false;
    }
    // No doubled separators
    !slug
        .chars()
        .zip(slug.chars().skip(1))
        .any(|(a, b)| edge(a) && edge(b))
}

/// Audit log of name rewrites; no behavioral effect.
pub fn log_name_transformation(original: &str, sanitized: &str) {
    if original != sanitized {
        tracing::info!("Task name sanitized: '{original}' -> '{sanitized}'");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snake() -> SlugifyOptions {
        SlugifyOptions::default()
    }

    #[test]
    fn test_emoji_and_punctuation_stripped() {
        assert_eq!(slugify("🚀 Two Sum!!", &snake()), "two_sum");
    }

    #[test]
    fn test_idempotent() {
        for input in ["🚀 Two Sum!!", "Café au Lait", "  shortest   path  ", "a--b__c"] {
            let once = slugify(input, &snake());
            let twice = slugify(&once, &snake());
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_never_empty_and_snake_charset() {
        for input in ["", "!!!", "🚀🚀", "___", "絵文字"] {
            let slug = slugify(input, &snake());
            assert!(!slug.is_empty());
            assert!(
                slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
                "bad slug {slug:?}"
            );
        }
    }

    #[test]
    fn test_unsluggable_input_gets_placeholder() {
        assert_eq!(slugify("!!!", &snake()), "unnamed_task");
    }

    #[test]
    fn test_unicode_normalization() {
        assert_eq!(slugify("Café au Lait", &snake()), "cafe_au_lait");
        assert_eq!(slugify("Straße", &snake()), "strasse");
        assert_eq!(slugify("Søren Ærø", &snake()), "soren_aero");
    }

    #[test]
    fn test_markdown_artifacts_removed() {
        assert_eq!(slugify("**Bold** `code` [link](http://x)", &snake()), "bold_code_link");
        assert_eq!(
            slugify("```py\nprint(1)\n```Title", &snake()),
            "title"
        );
    }

    #[test]
    fn test_max_length_trims_partial_run() {
        let opts = SlugifyOptions {
            max_length: 7,
            ..SlugifyOptions::default()
        };
        // "two_sum_problem" cut at 7 is "two_sum"; cut at 8 would leave a
        // trailing underscore which must be trimmed
        assert_eq!(slugify("Two Sum Problem", &opts), "two_sum");
        let opts8 = SlugifyOptions {
            max_length: 8,
            ..SlugifyOptions::default()
        };
        let slug = slugify("Two Sum Problem", &opts8);
        assert!(!slug.ends_with('_'));
        assert!(slug.chars().count() <= 8);
    }

    #[test]
    fn test_numbers_dropped_when_not_preserved() {
        let opts = SlugifyOptions {
            preserve_numbers: false,
            ..SlugifyOptions::default()
        };
        assert_eq!(slugify("Sum 2 Numbers", &opts), "sum_numbers");
    }

    #[test]
    fn test_case_styles() {
        let kebab = SlugifyOptions {
            case_style: CaseStyle::Kebab,
            ..SlugifyOptions::default()
        };
        assert_eq!(slugify("Two Sum", &kebab), "two-sum");

        let camel = SlugifyOptions {
            case_style: CaseStyle::Camel,
            ..SlugifyOptions::default()
        };
        assert_eq!(slugify("Two Sum Problem", &camel), "twoSumProblem");

        let pascal = SlugifyOptions {
            case_style: CaseStyle::Pascal,
            ..SlugifyOptions::default()
        };
        assert_eq!(slugify("two sum problem", &pascal), "TwoSumProblem");
    }

    #[test]
    fn test_unique_slug_appends_counter() {
        let existing = vec!["two_sum".to_string(), "two_sum_1".to_string()];
        assert_eq!(create_unique_slug("Two Sum", &existing, &snake()), "two_sum_2");
    }

    #[test]
    fn test_unique_slug_no_collision_returns_base() {
        let existing = vec!["other".to_string()];
        assert_eq!(create_unique_slug("Two Sum", &existing, &snake()), "two_sum");
    }

    #[test]
    fn test_unique_slug_never_in_existing() {
        let existing: Vec<String> =
            (0..5).map(|i| if i == 0 { "x".into() } else { format!("x_{i}") }).collect();
        let slug = create_unique_slug("x", &existing, &snake());
        assert!(!existing.contains(&slug));
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("two_sum", &snake()));
        assert!(is_valid_slug("a-b-c", &snake()));
        assert!(!is_valid_slug("", &snake()));
        assert!(!is_valid_slug("_leading", &snake()));
        assert!(!is_valid_slug("trailing_", &snake()));
        assert!(!is_valid_slug("double__sep", &snake()));
        assert!(!is_valid_slug("has space", &snake()));
    }
}
