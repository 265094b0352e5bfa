//! Snippet highlighter for PlanSentry.
//!
//! Maps AI findings back onto the original document by wrapping each
//! finding's verbatim source snippet in a tagged, severity-styled span.
//! The document is escaped for HTML first so the injected tags survive,
//! and findings are applied longest-snippet-first so a snippet that is a
//! substring of another never fragments the longer span.
//!
//! A snippet that cannot be located (the AI did not quote verbatim, or a
//! prior replacement consumed the region) is skipped silently; partial
//! annotation is acceptable and this function never fails.

use crate::finding::{Finding, Severity};
use uuid::Uuid;

/// Hover/selection state for highlight emphasis.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighlightState {
    /// Finding currently hovered in the findings list, if any.
    pub hovered: Option<Uuid>,
    /// Finding currently selected, if any.
    pub selected: Option<Uuid>,
}

impl HighlightState {
    fn is_focused(&self, id: Uuid) -> bool {
        self.hovered == Some(id) || self.selected == Some(id)
    }
}

/// Annotates a document with highlight spans for the given findings.
///
/// Returns valid HTML whose text content (ignoring the inserted tags) is
/// exactly the escaped original document, whitespace included.
pub fn highlight(document: &str, findings: &[Finding], state: HighlightState) -> String {
    let mut markup = html_escape::encode_text(document).into_owned();

    // Longest snippet first: when one snippet contains another, the more
    // specific one must be wrapped before the substring can split it.
    let mut ordered: Vec<&Finding> = findings.iter().collect();
    ordered.sort_by(|a, b| b.source_snippet.len().cmp(&a.source_snippet.len()));

    for finding in ordered {
        if finding.source_snippet.is_empty() {
            continue;
        }
        let needle = html_escape::encode_text(&finding.source_snippet).into_owned();
        if !markup.contains(&needle) {
            // Non-verbatim quote or region already consumed; skip.
            continue;
        }
        let span = wrap_span(&needle, finding, state.is_focused(finding.id));
        markup = markup.replace(&needle, &span);
    }

    markup
}

fn wrap_span(escaped_snippet: &str, finding: &Finding, focused: bool) -> String {
    let severity_class = match finding.severity {
        Severity::Critical => "highlight-critical",
        Severity::Warning => "highlight-warning",
    };
    let mut classes = format!("highlight {}", severity_class);
    if focused {
        classes.push_str(" highlight-focus");
    }
    format!(
        "<span id=\"finding-{}\" class=\"{}\">{}</span>",
        finding.id, classes, escaped_snippet
    )
}
