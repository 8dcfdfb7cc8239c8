//! Page-artifact cleanup for raw extracted text.
//!
//! Each pass is a function `&str -> String` applied in sequence. The pipeline
//! repeats until the text stops changing; every pass only deletes, so this
//! terminates and `clean(clean(x)) == clean(x)`.

use std::sync::LazyLock;

use regex::Regex;

/// Clean one raw text blob from a reader. `None` and `""` both yield `""`.
pub fn clean<'a>(text: impl Into<Option<&'a str>>) -> String {
    let Some(text) = text.into() else {
        return String::new();
    };

    let mut current = run_pipeline(text);
    loop {
        let next = run_pipeline(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn run_pipeline(text: &str) -> String {
    let mut result = strip_page_number_lines(text);

    result = strip_page_residue(&result);
    result = strip_page_labels(&result);
    result = collapse_blank_lines(&result);

    result.trim().to_string()
}

// ---------------------------------------------------------------------------
// Pass 1: Lines that are only a page number
// ---------------------------------------------------------------------------

fn strip_page_number_lines(text: &str) -> String {
    static NUMBER_LINE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^[^\S\n]*\d+[^\S\n]*$").expect("valid regex"));

    NUMBER_LINE_RE.replace_all(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 2: "P123" residue left by some readers
// ---------------------------------------------------------------------------

fn strip_page_residue(text: &str) -> String {
    static RESIDUE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\bP\d+\b").expect("valid regex"));

    RESIDUE_RE.replace_all(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 3: Page labels ("Page 3", "p. 12", "pg: 7")
// ---------------------------------------------------------------------------

fn strip_page_labels(text: &str) -> String {
    static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)\b(?:page|pagina|pag|pg|p)\s*[.:]*\s*\d+\b").expect("valid regex")
    });

    LABEL_RE.replace_all(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 4: Blank line runs
// ---------------------------------------------------------------------------

fn collapse_blank_lines(text: &str) -> String {
    static BLANK_RUN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

    BLANK_RUN_RE.replace_all(text, "\n").to_string()
}
