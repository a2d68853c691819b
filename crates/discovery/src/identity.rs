//! Best-effort identity extraction from free-form workspace documents.
//!
//! `SOUL.md` files are written by hand in wildly different shapes: some carry
//! `name:` / `title:` metadata lines, some only a heading, some a paragraph of
//! prose. Extraction is an ordered chain of heuristics that degrades to
//! "field absent" — it never fails on malformed input.

use std::sync::LazyLock;

use regex::Regex;

/// Identity fields extracted from one document. Absence of a match yields an
/// absent field, never an error.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Descriptions are clipped to this many characters.
const DESCRIPTION_LIMIT: usize = 200;

/// Compile a hard-coded pattern. Patterns are literals, so a failure here is
/// a programming error caught by the unit tests.
fn compiled(pattern: &str) -> Regex {
    #[allow(clippy::expect_used)]
    Regex::new(pattern).expect("hard-coded pattern compiles")
}

static NAME_LABELED: LazyLock<Regex> = LazyLock::new(|| compiled(r"(?im)^\s*name\s*:\s*(\S.*)$"));
static NAME_I_AM: LazyLock<Regex> = LazyLock::new(|| compiled(r"(?i)\bI am (\w+)"));
static NAME_MY_NAME: LazyLock<Regex> = LazyLock::new(|| compiled(r"(?i)\bmy name is (\w+)"));
static NAME_DOC_HEADING: LazyLock<Regex> =
    LazyLock::new(|| compiled(r"(?im)^#\s+SOUL\.md\s+-\s+(.+?)\s*$"));
static NAME_ANY_HEADING: LazyLock<Regex> = LazyLock::new(|| compiled(r"(?m)^#\s+(.+?)\s*$"));

static TITLE_RULES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        compiled(r"(?im)^\s*title\s*:\s*(\S.*)$"),
        compiled(r"(?im)^\s*role\s*:\s*(\S.*)$"),
        compiled(r"(?im)^\s*position\s*:\s*(\S.*)$"),
    ]
});

/// Extract name, title, and description from a single identity document.
pub fn extract_identity(text: &str) -> Identity {
    Identity {
        name: extract_name(text),
        title: extract_title(text),
        description: extract_description(text),
    }
}

/// Ordered name rules: explicit label, self-referential phrase, document
/// heading with the filename prefix stripped, any heading verbatim. First
/// non-generic match wins.
fn extract_name(text: &str) -> Option<String> {
    let rules: [fn(&str) -> Option<String>; 4] = [
        |t| capture(&NAME_LABELED, t),
        |t| capture(&NAME_I_AM, t).or_else(|| capture(&NAME_MY_NAME, t)),
        |t| capture(&NAME_DOC_HEADING, t),
        |t| capture(&NAME_ANY_HEADING, t),
    ];

    rules
        .iter()
        .filter_map(|rule| rule(text))
        .find(|candidate| !is_generic_heading(candidate))
}

/// Section headers like "Who You Are" match the heading rules but are not
/// identities. Rejecting one falls through to the next rule.
fn is_generic_heading(candidate: &str) -> bool {
    let lower = candidate.to_lowercase();
    lower.contains("who you are") || lower.contains("what you are")
}

fn extract_title(text: &str) -> Option<String> {
    TITLE_RULES.iter().find_map(|rule| capture(rule, text))
}

/// First non-empty line that is neither a heading nor a metadata line.
/// Lines containing a colon are skipped so `key: value` pairs are never
/// mistaken for prose.
fn extract_description(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#') && !line.contains(':'))
        .map(|line| line.chars().take(DESCRIPTION_LIMIT).collect())
}

fn capture(rule: &Regex, text: &str) -> Option<String> {
    rule.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labeled_name_wins_over_headings() {
        let text = "# Some Heading\nname: Alex\n";
        assert_eq!(extract_name(text), Some("Alex".into()));
    }

    #[test]
    fn labeled_name_is_trimmed() {
        assert_eq!(extract_name("name:   Lena  \n"), Some("Lena".into()));
        assert_eq!(extract_name("NAME: Kevin\n"), Some("Kevin".into()));
    }

    #[test]
    fn self_referential_phrases() {
        assert_eq!(extract_name("Hello. I am Kevin, your helper."), Some("Kevin".into()));
        assert_eq!(extract_name("my name is Lena and I write."), Some("Lena".into()));
    }

    #[test]
    fn doc_heading_prefix_is_stripped() {
        assert_eq!(
            extract_name("# SOUL.md - SecGuard\n\nbody\n"),
            Some("SecGuard".into())
        );
    }

    #[test]
    fn plain_heading_taken_verbatim() {
        assert_eq!(extract_name("# Writer\n\nprose\n"), Some("Writer".into()));
    }

    #[test]
    fn generic_headings_are_rejected() {
        assert_eq!(extract_name("# Who You Are\n"), None);
        assert_eq!(extract_name("# WHAT YOU ARE\n"), None);
        // A rejected candidate falls through to the next rule, not to None.
        assert_eq!(
            extract_name("# Who You Are\nI am Alex.\n"),
            Some("Alex".into())
        );
    }

    #[test]
    fn title_priority_order() {
        let text = "position: Intern\nrole: Engineer\ntitle: Lead\n";
        assert_eq!(extract_title(text), Some("Lead".into()));
        assert_eq!(extract_title("Role: Engineer\n"), Some("Engineer".into()));
        assert_eq!(extract_title("position: Intern\n"), Some("Intern".into()));
        assert_eq!(extract_title("no metadata here"), None);
    }

    #[test]
    fn description_skips_headings_and_metadata() {
        let text = "# Heading\nname: Alex\ntitle: Engineer\n\nKeeps the build green.\n";
        assert_eq!(
            extract_description(text),
            Some("Keeps the build green.".into())
        );
    }

    #[test]
    fn description_truncated_to_limit() {
        let long = "x".repeat(500);
        let desc = extract_description(&long).unwrap();
        assert_eq!(desc.chars().count(), 200);
    }

    #[test]
    fn description_truncation_is_char_safe() {
        let long = "日".repeat(500);
        let desc = extract_description(&long).unwrap();
        assert_eq!(desc.chars().count(), 200);
    }

    #[test]
    fn empty_and_garbage_input_yield_absent_fields() {
        assert_eq!(extract_identity(""), Identity::default());
        let id = extract_identity("::::\n####\n\x00\u{fffd}");
        assert_eq!(id.name, None);
        assert_eq!(id.title, None);
    }

    #[test]
    fn full_document_extraction() {
        let text = "# SOUL.md - Alex\nname: Alex\ntitle: Engineer\n\nFixes everything quietly.\n";
        let id = extract_identity(text);
        assert_eq!(id.name, Some("Alex".into()));
        assert_eq!(id.title, Some("Engineer".into()));
        assert_eq!(id.description, Some("Fixes everything quietly.".into()));
    }
}
