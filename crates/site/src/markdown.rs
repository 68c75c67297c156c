//! Markdown rendering for free-text catalog fields.
//!
//! Descriptions and use-case fields are authored as markdown and rendered to
//! HTML fragments at request time. The renderer is the sanitization boundary:
//! raw HTML in the input is escaped, so the output can be inserted into pages
//! unescaped. Code fences carry a `language-*` class and are highlighted
//! client-side.

use comrak::{Options, markdown_to_html};

/// Render markdown to an HTML fragment.
///
/// Empty or whitespace-only input yields an empty fragment. GFM-style
/// extensions (tables, strikethrough, autolinks, task lists) and wikilinks
/// are enabled; single newlines become hard breaks, matching how the fields
/// are edited in plain textareas.
#[must_use]
pub fn render(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.wikilinks_title_after_pipe = true;

    // Textarea-authored content: honor single newlines, escape raw HTML.
    options.render.hardbreaks = true;
    options.render.escape = true;

    markdown_to_html(text, &options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_renders_empty() {
        assert_eq!(render(""), "");
        assert_eq!(render("   \n\t"), "");
    }

    #[test]
    fn test_bold() {
        let html = render("**bold**");
        assert!(html.contains("<strong>bold</strong>"), "got: {html}");
    }

    #[test]
    fn test_fenced_code_block_carries_language_class() {
        let html = render("```python\nimport torch\n```");
        assert!(html.contains("<pre>"), "got: {html}");
        assert!(html.contains("language-python"), "got: {html}");
        assert!(html.contains("import torch"), "got: {html}");
    }

    #[test]
    fn test_table() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"), "got: {html}");
    }

    #[test]
    fn test_hard_line_breaks() {
        let html = render("first\nsecond");
        assert!(html.contains("<br"), "got: {html}");
    }

    #[test]
    fn test_autolink() {
        let html = render("see https://example.com for details");
        assert!(html.contains("<a href=\"https://example.com\""), "got: {html}");
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = render("before <script>alert(1)</script> after");
        assert!(!html.contains("<script>"), "got: {html}");
        assert!(html.contains("&lt;script&gt;"), "got: {html}");
    }

    #[test]
    fn test_wikilink() {
        let html = render("see [[spike-sorting|Spike Sorting]]");
        assert!(html.contains("<a"), "got: {html}");
        assert!(html.contains("Spike Sorting"), "got: {html}");
    }
}
