//! Line and word diff engine for PlanSentry.
//!
//! Computes a minimal edit script between the pre-enhancement and
//! post-enhancement versions of a plan document using a longest common
//! subsequence dynamic program. The same walk runs at two granularities:
//! line level for the accept/discard review screen, and word level for the
//! inline enhancement preview.
//!
//! The edit script is reversible in both directions: keeping unchanged and
//! added segments reconstructs the new text exactly, keeping unchanged and
//! removed segments reconstructs the old text exactly.

use serde::{Deserialize, Serialize};

/// Classification of a diff segment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    /// Present in both versions.
    Unchanged,
    /// Present only in the new version.
    Added,
    /// Present only in the old version.
    Removed,
}

/// One line (or word token) of the edit script.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffSegment {
    /// Whether this segment was kept, inserted, or deleted.
    pub kind: DiffKind,
    /// The segment text. Lines carry no trailing newline; word tokens carry
    /// their trailing whitespace.
    pub text: String,
}

impl DiffSegment {
    fn new(kind: DiffKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
        }
    }
}

/// Computes a line-level edit script between two texts.
///
/// Both texts are split on `'\n'`. Ties between an addition and a removal
/// are broken in favor of the addition, so the same inputs always produce
/// the same script.
pub fn diff_lines(old: &str, new: &str) -> Vec<DiffSegment> {
    let old_lines: Vec<&str> = old.split('\n').collect();
    let new_lines: Vec<&str> = new.split('\n').collect();
    diff_tokens(&old_lines, &new_lines)
}

/// Computes a word-level edit script between two texts.
///
/// Tokens are words with their trailing whitespace attached, so the
/// concatenation of all tokens reproduces the input exactly. Used for the
/// inline enhancement preview rather than the full document re-render.
pub fn diff_words(old: &str, new: &str) -> Vec<DiffSegment> {
    let old_words = tokenize_words(old);
    let new_words = tokenize_words(new);
    let old_refs: Vec<&str> = old_words.iter().map(String::as_str).collect();
    let new_refs: Vec<&str> = new_words.iter().map(String::as_str).collect();
    diff_tokens(&old_refs, &new_refs)
}

/// LCS walk shared by both granularities.
///
/// `dp[i][j]` holds the LCS length of `old[i..]` and `new[j..]`, computed
/// bottom-up from `dp[m][n] = 0`.
fn diff_tokens(old: &[&str], new: &[&str]) -> Vec<DiffSegment> {
    let m = old.len();
    let n = new.len();

    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for i in (0..m).rev() {
        for j in (0..n).rev() {
            dp[i][j] = if old[i] == new[j] {
                dp[i + 1][j + 1] + 1
            } else {
                dp[i + 1][j].max(dp[i][j + 1])
            };
        }
    }

    let mut segments = Vec::with_capacity(m.max(n));
    let (mut i, mut j) = (0, 0);
    while i < m && j < n {
        if old[i] == new[j] {
            segments.push(DiffSegment::new(DiffKind::Unchanged, old[i]));
            i += 1;
            j += 1;
        } else if dp[i][j + 1] >= dp[i + 1][j] {
            segments.push(DiffSegment::new(DiffKind::Added, new[j]));
            j += 1;
        } else {
            segments.push(DiffSegment::new(DiffKind::Removed, old[i]));
            i += 1;
        }
    }
    while j < n {
        segments.push(DiffSegment::new(DiffKind::Added, new[j]));
        j += 1;
    }
    while i < m {
        segments.push(DiffSegment::new(DiffKind::Removed, old[i]));
        i += 1;
    }

    segments
}

/// Splits text into words carrying their trailing whitespace.
///
/// A leading whitespace run becomes its own token so concatenation of the
/// tokens is lossless.
fn tokenize_words(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_whitespace = false;

    for c in text.chars() {
        if c.is_whitespace() {
            in_whitespace = true;
            current.push(c);
        } else {
            if in_whitespace {
                tokens.push(std::mem::take(&mut current));
                in_whitespace = false;
            }
            current.push(c);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Applies the edit script in the "accept" direction: keep unchanged and
/// added lines, reconstructing the new text.
pub fn apply_accept(segments: &[DiffSegment]) -> String {
    join_lines(segments, DiffKind::Added)
}

/// Applies the edit script in the "discard" direction: keep unchanged and
/// removed lines, reconstructing the old text.
pub fn apply_discard(segments: &[DiffSegment]) -> String {
    join_lines(segments, DiffKind::Removed)
}

fn join_lines(segments: &[DiffSegment], keep: DiffKind) -> String {
    segments
        .iter()
        .filter(|s| s.kind == DiffKind::Unchanged || s.kind == keep)
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders a line-level edit script as read-only preview HTML.
///
/// Added lines are wrapped in an inserted style, removed lines in a
/// strikethrough style. Text content is HTML-escaped.
pub fn render_html(segments: &[DiffSegment]) -> String {
    segments
        .iter()
        .map(|s| {
            let text = html_escape::encode_text(&s.text);
            match s.kind {
                DiffKind::Unchanged => text.into_owned(),
                DiffKind::Added => format!("<ins class=\"diff-added\">{}</ins>", text),
                DiffKind::Removed => format!("<del class=\"diff-removed\">{}</del>", text),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders a word-level edit script as inline HTML.
///
/// Unlike [`render_html`], segments are concatenated without line breaks;
/// word tokens already carry their whitespace.
pub fn render_inline_html(segments: &[DiffSegment]) -> String {
    segments
        .iter()
        .map(|s| {
            let text = html_escape::encode_text(&s.text);
            match s.kind {
                DiffKind::Unchanged => text.into_owned(),
                DiffKind::Added => format!("<ins class=\"diff-added-inline\">{}</ins>", text),
                DiffKind::Removed => format!("<del class=\"diff-removed-inline\">{}</del>", text),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit_count(segments: &[DiffSegment]) -> usize {
        segments
            .iter()
            .filter(|s| s.kind != DiffKind::Unchanged)
            .count()
    }

    #[test]
    fn test_identical_texts_all_unchanged() {
        let text = "alpha\nbeta\ngamma";
        let segments = diff_lines(text, text);
        assert_eq!(segments.len(), 3);
        assert!(segments.iter().all(|s| s.kind == DiffKind::Unchanged));
        assert_eq!(edit_count(&segments), 0);
    }

    #[test]
    fn test_accept_reconstructs_new() {
        let old = "keep\nremove me\nalso keep";
        let new = "keep\nadded line\nalso keep\ntrailing";
        let segments = diff_lines(old, new);
        assert_eq!(apply_accept(&segments), new);
    }

    #[test]
    fn test_discard_reconstructs_old() {
        let old = "keep\nremove me\nalso keep";
        let new = "keep\nadded line\nalso keep\ntrailing";
        let segments = diff_lines(old, new);
        assert_eq!(apply_discard(&segments), old);
    }

    #[test]
    fn test_round_trip_with_empty_and_trailing_newlines() {
        let cases = [
            ("", ""),
            ("", "a"),
            ("a", ""),
            ("a\n", "a"),
            ("a\nb\n", "a\nc\n"),
            ("x\n\n\ny", "x\ny"),
        ];
        for (old, new) in cases {
            let segments = diff_lines(old, new);
            assert_eq!(apply_accept(&segments), new, "accept for {:?}", (old, new));
            assert_eq!(
                apply_discard(&segments),
                old,
                "discard for {:?}",
                (old, new)
            );
        }
    }

    #[test]
    fn test_edit_count_bounded() {
        let old = "a\nb\nc";
        let new = "x\ny\nz\nw";
        let segments = diff_lines(old, new);
        let old_len = old.split('\n').count();
        let new_len = new.split('\n').count();
        assert!(edit_count(&segments) <= old_len + new_len);
    }

    #[test]
    fn test_tie_break_prefers_addition() {
        // "a" -> "b": one removal and one addition; the addition must come
        // first so the script is deterministic.
        let segments = diff_lines("a", "b");
        assert_eq!(segments[0].kind, DiffKind::Added);
        assert_eq!(segments[0].text, "b");
        assert_eq!(segments[1].kind, DiffKind::Removed);
        assert_eq!(segments[1].text, "a");
    }

    #[test]
    fn test_minimal_script_keeps_common_lines() {
        let old = "intro\nshared one\nold only\nshared two";
        let new = "intro\nshared one\nnew only\nshared two";
        let segments = diff_lines(old, new);
        let unchanged: Vec<&str> = segments
            .iter()
            .filter(|s| s.kind == DiffKind::Unchanged)
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(unchanged, vec!["intro", "shared one", "shared two"]);
        assert_eq!(edit_count(&segments), 2);
    }

    #[test]
    fn test_word_diff_lossless_tokens() {
        let old = "The plan  covers basic\tdeployment.";
        let new = "The plan  covers staged\tdeployment.";
        let segments = diff_words(old, new);
        let accepted: String = segments
            .iter()
            .filter(|s| s.kind != DiffKind::Removed)
            .map(|s| s.text.as_str())
            .collect();
        let discarded: String = segments
            .iter()
            .filter(|s| s.kind != DiffKind::Added)
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(accepted, new);
        assert_eq!(discarded, old);
    }

    #[test]
    fn test_word_diff_marks_changed_word() {
        let segments = diff_words("fast rollout", "fast rollback");
        assert!(segments
            .iter()
            .any(|s| s.kind == DiffKind::Added && s.text == "rollback"));
        assert!(segments
            .iter()
            .any(|s| s.kind == DiffKind::Removed && s.text == "rollout"));
    }

    #[test]
    fn test_render_html_wraps_and_escapes() {
        let segments = diff_lines("a < b", "a & b");
        let html = render_html(&segments);
        assert!(html.contains("<ins class=\"diff-added\">a &amp; b</ins>"));
        assert!(html.contains("<del class=\"diff-removed\">a &lt; b</del>"));
    }

    #[test]
    fn test_render_inline_html() {
        let segments = diff_words("one two", "one three");
        let html = render_inline_html(&segments);
        assert!(html.starts_with("one "));
        assert!(html.contains("<ins class=\"diff-added-inline\">three</ins>"));
        assert!(html.contains("<del class=\"diff-removed-inline\">two</del>"));
    }
}
