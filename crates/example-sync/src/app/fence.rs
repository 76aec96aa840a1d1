//! Fenced code block scanning and splicing.
//!
//! The scanner is line based: the first line consisting of the fence token immediately followed by
//! the language tag opens the block, and the first later line holding only a bare fence token closes
//! it. Anything in between, including fences tagged with other languages, is block content.

use std::ops::Range;

/// Markdown fence token.
pub const FENCE: &str = "```";

/// Byte ranges of a fenced block within its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedBlock {
    /// From the opening fence token through the end of the closing fence token.
    pub span: Range<usize>,
    /// Block contents, excluding the line break before the closing fence.
    pub body: Range<usize>,
    /// Whitespace before the closing fence token.
    pub closing_indent: Range<usize>,
    /// Line terminator of the opening fence line, reused when the block is rewritten.
    pub newline: &'static str,
}

/// Locate the first block tagged with `language`.
pub fn find_block(text: &str, language: &str) -> Option<FencedBlock> {
    let mut lines = Lines::new(text);

    let (open_at, body_start, newline) = lines.by_ref().find_map(|line| {
        let indent = indent_len(line.content);
        let tag = line.content[indent..].strip_prefix(FENCE)?;
        (tag == language && line.terminated).then_some((
            line.start + indent,
            line.next,
            line.terminator(),
        ))
    })?;

    let close = lines.find(|line| line.content.trim() == FENCE)?;
    let close_at = close.start + indent_len(close.content);

    let body_end = if close.start == body_start {
        body_start
    } else {
        let without_newline = close.start - 1;
        if without_newline > body_start && text.as_bytes()[without_newline - 1] == b'\r' {
            without_newline - 1
        } else {
            without_newline
        }
    };

    Some(FencedBlock {
        span: open_at..close_at + FENCE.len(),
        body: body_start..body_end,
        closing_indent: close.start..close_at,
        newline,
    })
}

/// Block contents with trailing whitespace collapsed to a single newline.
pub fn extract_code(text: &str, language: &str) -> Option<String> {
    let block = find_block(text, language)?;
    let mut code = text[block.body].trim_end().to_owned();
    code.push_str(block.newline);
    Some(code)
}

/// Replace the first `language` block, fences included, with a fresh block holding `code`.
///
/// Text before and after the block is copied unchanged.
pub fn replace_code(text: &str, language: &str, code: &str) -> Option<String> {
    let block = find_block(text, language)?;
    let replacement = render_block(text, &block, language, code);

    let mut updated = String::with_capacity(text.len() - block.span.len() + replacement.len());
    updated.push_str(&text[..block.span.start]);
    updated.push_str(&replacement);
    updated.push_str(&text[block.span.end..]);
    Some(updated)
}

/// Rebuild a block in the style of the one it replaces: same line terminator, same closing indent.
fn render_block(text: &str, block: &FencedBlock, language: &str, code: &str) -> String {
    let newline = block.newline;
    let body = code.trim_end().lines().collect::<Vec<_>>().join(newline);
    let closing_indent = &text[block.closing_indent.clone()];
    format!("{FENCE}{language}{newline}{body}{newline}{closing_indent}{FENCE}")
}

fn indent_len(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

struct Line<'a> {
    start: usize,
    /// Line text without its `\n` or `\r\n` terminator.
    content: &'a str,
    next: usize,
    terminated: bool,
}

impl Line<'_> {
    fn terminator(&self) -> &'static str {
        if self.terminated && self.next - self.start > self.content.len() + 1 {
            "\r\n"
        } else {
            "\n"
        }
    }
}

struct Lines<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.text.len() {
            return None;
        }

        let start = self.pos;
        let rest = &self.text[start..];
        let (raw, next, terminated) = match rest.find('\n') {
            Some(idx) => (&rest[..idx], start + idx + 1, true),
            None => (rest, self.text.len(), false),
        };
        self.pos = next;

        Some(Line {
            start,
            content: raw.strip_suffix('\r').unwrap_or(raw),
            next,
            terminated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# Hello\n\nIntro text.\n\n```csharp\nConsole.WriteLine(\"hi\");\n```\n\nOutro.\n";

    #[test]
    fn finds_first_tagged_block() {
        let block = find_block(DOC, "csharp").expect("block present");
        assert_eq!(&DOC[block.body.clone()], "Console.WriteLine(\"hi\");");
        assert_eq!(
            &DOC[block.span],
            "```csharp\nConsole.WriteLine(\"hi\");\n```"
        );
    }

    #[test]
    fn skips_blocks_with_other_tags() {
        let doc = "```text\nnot this\n```\n\n```csharp\nvar x = 1;\n```\n";
        assert_eq!(extract_code(doc, "csharp").as_deref(), Some("var x = 1;\n"));
    }

    #[test]
    fn closes_on_first_bare_fence() {
        let doc = "```csharp\nfirst\n```\nbetween\n```\n```csharp\nsecond\n```\n";
        assert_eq!(extract_code(doc, "csharp").as_deref(), Some("first\n"));
    }

    #[test]
    fn tagged_fences_inside_block_are_content() {
        let doc = "```csharp\n// ```json\nvar s = \"{}\";\n```\n";
        assert_eq!(
            extract_code(doc, "csharp").as_deref(),
            Some("// ```json\nvar s = \"{}\";\n")
        );
    }

    #[test]
    fn tag_must_match_exactly() {
        assert!(find_block("```csharpish\nx\n```\n", "csharp").is_none());
        assert!(find_block("``` csharp\nx\n```\n", "csharp").is_none());
    }

    #[test]
    fn unclosed_block_is_missing() {
        assert!(find_block("```csharp\nvar x = 1;\n", "csharp").is_none());
        assert!(find_block("no code here", "csharp").is_none());
    }

    #[test]
    fn trailing_whitespace_collapses_to_one_newline() {
        let doc = "```csharp\nvar x = 1;   \n\n\t\n```";
        assert_eq!(extract_code(doc, "csharp").as_deref(), Some("var x = 1;\n"));
    }

    #[test]
    fn empty_block_extracts_a_single_newline() {
        let doc = "```csharp\n```\n";
        let block = find_block(doc, "csharp").expect("empty block");
        assert!(block.body.is_empty());
        assert_eq!(extract_code(doc, "csharp").as_deref(), Some("\n"));
    }

    #[test]
    fn handles_crlf_documents() {
        let doc = "Intro\r\n```csharp\r\nvar x = 1;\r\n```\r\nOutro\r\n";
        let block = find_block(doc, "csharp").expect("block present");
        assert_eq!(&doc[block.body], "var x = 1;");
        assert_eq!(block.newline, "\r\n");

        let updated = replace_code(doc, "csharp", "var y = 2;\nvar z = 3;\n").unwrap();
        assert_eq!(
            updated,
            "Intro\r\n```csharp\r\nvar y = 2;\r\nvar z = 3;\r\n```\r\nOutro\r\n"
        );
    }

    #[test]
    fn crlf_round_trip_is_stable() {
        let doc = "Intro\r\n```csharp\r\nvar x = 1;\r\nvar y = 2;\r\n```\r\nOutro\r\n";
        let code = extract_code(doc, "csharp").unwrap();
        assert_eq!(code, "var x = 1;\r\nvar y = 2;\r\n");
        assert_eq!(replace_code(doc, "csharp", &code).as_deref(), Some(doc));
    }

    #[test]
    fn indented_fences_keep_their_indent() {
        let doc = "- step\n  ```csharp\n  var x = 1;\n  ```\n";
        let updated = replace_code(doc, "csharp", "var y = 2;\n").unwrap();
        assert_eq!(updated, "- step\n  ```csharp\nvar y = 2;\n  ```\n");
    }

    #[test]
    fn indented_round_trip_is_stable() {
        let doc = "- step\n  ```csharp\n  var x = 1;\n  ```\nafter\n";
        let code = extract_code(doc, "csharp").unwrap();
        assert_eq!(code, "  var x = 1;\n");
        assert_eq!(replace_code(doc, "csharp", &code).as_deref(), Some(doc));
    }

    #[test]
    fn replace_preserves_surrounding_text() {
        let updated = replace_code(DOC, "csharp", "Console.WriteLine(1);\n").unwrap();
        assert_eq!(
            updated,
            "# Hello\n\nIntro text.\n\n```csharp\nConsole.WriteLine(1);\n```\n\nOutro.\n"
        );
    }

    #[test]
    fn replace_only_touches_first_block() {
        let doc = "```csharp\none\n```\n```csharp\ntwo\n```\n";
        let updated = replace_code(doc, "csharp", "uno").unwrap();
        assert_eq!(updated, "```csharp\nuno\n```\n```csharp\ntwo\n```\n");
    }

    #[test]
    fn extract_then_replace_is_stable() {
        let code = extract_code(DOC, "csharp").unwrap();
        assert_eq!(replace_code(DOC, "csharp", &code).as_deref(), Some(DOC));
    }
}
