// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Markdown to HTML
//!
//! Covers the subset of markdown that generated posts use: ATX headings,
//! paragraphs, flat bullet and numbered lists, fenced code, block quotes,
//! horizontal rules, and inline code, bold, italic and links. All text is
//! HTML-escaped.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            Self::Unordered => "ul",
            Self::Ordered => "ol",
        }
    }
}

/// Render markdown to an HTML fragment
#[must_use]
pub fn to_html(input: &str) -> String {
    let lines: Vec<&str> = input.lines().collect();
    let mut out = String::with_capacity(input.len() * 2);
    let mut paragraph: Vec<&str> = Vec::new();
    let mut list: Option<ListKind> = None;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        // Fenced code block
        if trimmed.starts_with("```") {
            flush_paragraph(&mut out, &mut paragraph);
            close_list(&mut out, &mut list);
            let lang = trimmed.trim_start_matches('`').trim();
            if lang.is_empty() {
                out.push_str("<pre><code>");
            } else {
                out.push_str(&format!(
                    "<pre><code class=\"language-{}\">",
                    escape_html(lang)
                ));
            }
            i += 1;
            while i < lines.len() && !lines[i].trim_start().starts_with("```") {
                out.push_str(&escape_html(lines[i]));
                out.push('\n');
                i += 1;
            }
            out.push_str("</code></pre>\n");
            i += 1;
            continue;
        }

        if trimmed.is_empty() {
            flush_paragraph(&mut out, &mut paragraph);
            close_list(&mut out, &mut list);
            i += 1;
            continue;
        }

        if let Some((level, text)) = parse_heading(trimmed) {
            flush_paragraph(&mut out, &mut paragraph);
            close_list(&mut out, &mut list);
            out.push_str(&format!("<h{level}>{}</h{level}>\n", inline_to_html(text)));
            i += 1;
            continue;
        }

        if is_rule(trimmed) {
            flush_paragraph(&mut out, &mut paragraph);
            close_list(&mut out, &mut list);
            out.push_str("<hr>\n");
            i += 1;
            continue;
        }

        if trimmed.starts_with('>') {
            flush_paragraph(&mut out, &mut paragraph);
            close_list(&mut out, &mut list);
            let mut quoted: Vec<&str> = Vec::new();
            while i < lines.len() {
                let Some(rest) = lines[i].trim_start().strip_prefix('>') else {
                    break;
                };
                quoted.push(rest.strip_prefix(' ').unwrap_or(rest));
                i += 1;
            }
            out.push_str("<blockquote>\n");
            out.push_str(&to_html(&quoted.join("\n")));
            out.push_str("</blockquote>\n");
            continue;
        }

        if let Some((kind, content)) = parse_list_item(trimmed) {
            flush_paragraph(&mut out, &mut paragraph);
            if list != Some(kind) {
                close_list(&mut out, &mut list);
                out.push_str(&format!("<{}>\n", kind.tag()));
                list = Some(kind);
            }
            out.push_str(&format!("<li>{}</li>\n", inline_to_html(content)));
            i += 1;
            continue;
        }

        close_list(&mut out, &mut list);
        paragraph.push(trimmed);
        i += 1;
    }

    flush_paragraph(&mut out, &mut paragraph);
    close_list(&mut out, &mut list);
    out
}

/// Escape text for use in HTML bodies and attribute values
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn flush_paragraph(out: &mut String, paragraph: &mut Vec<&str>) {
    if paragraph.is_empty() {
        return;
    }
    out.push_str("<p>");
    out.push_str(&inline_to_html(&paragraph.join(" ")));
    out.push_str("</p>\n");
    paragraph.clear();
}

fn close_list(out: &mut String, list: &mut Option<ListKind>) {
    if let Some(kind) = list.take() {
        out.push_str(&format!("</{}>\n", kind.tag()));
    }
}

fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &line[level..];
    if !rest.is_empty() && !rest.starts_with(' ') {
        return None;
    }
    Some((level, rest.trim().trim_end_matches('#').trim_end()))
}

fn is_rule(line: &str) -> bool {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() >= 3
        && ['-', '*', '_']
            .iter()
            .any(|&m| compact.chars().all(|c| c == m))
}

fn parse_list_item(line: &str) -> Option<(ListKind, &str)> {
    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some((ListKind::Unordered, rest.trim()));
        }
    }
    let after_digits = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if after_digits.len() == line.len() {
        return None;
    }
    after_digits
        .strip_prefix(". ")
        .or_else(|| after_digits.strip_prefix(") "))
        .map(|rest| (ListKind::Ordered, rest.trim()))
}

fn inline_to_html(input: &str) -> String {
    let tokens = tokenize_inline(input);
    render_inline_tokens(&tokens)
}

#[derive(Debug)]
enum InlineToken<'a> {
    Text(&'a str),
    Bold(Vec<InlineToken<'a>>),
    Italic(Vec<InlineToken<'a>>),
    Code(&'a str),
    Link { text: &'a str, href: &'a str },
}

fn tokenize_inline(input: &str) -> Vec<InlineToken<'_>> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    let bytes = input.as_bytes();

    while pos < bytes.len() {
        if bytes[pos] == b'`' {
            let start = pos + 1;
            if let Some(end) = input[start..].find('`') {
                tokens.push(InlineToken::Code(&input[start..start + end]));
                pos = start + end + 1;
                continue;
            }
        }

        if bytes[pos] == b'*' && bytes.get(pos + 1) == Some(&b'*') {
            let start = pos + 2;
            if let Some(end) = input[start..].find("**") {
                let inner = &input[start..start + end];
                tokens.push(InlineToken::Bold(tokenize_inline(inner)));
                pos = start + end + 2;
                continue;
            }
        }

        if bytes[pos] == b'*' && bytes.get(pos + 1) != Some(&b'*') {
            let start = pos + 1;
            if let Some(end) = input[start..].find('*')
                && end > 0
            {
                let inner = &input[start..start + end];
                tokens.push(InlineToken::Italic(tokenize_inline(inner)));
                pos = start + end + 1;
                continue;
            }
        }

        if bytes[pos] == b'['
            && let Some((text, href, consumed)) = parse_link(&input[pos..])
        {
            tokens.push(InlineToken::Link { text, href });
            pos += consumed;
            continue;
        }

        let start = pos;
        pos += 1;
        while pos < bytes.len() && !matches!(bytes[pos], b'`' | b'*' | b'[') {
            pos += 1;
        }
        tokens.push(InlineToken::Text(&input[start..pos]));
    }

    tokens
}

/// Parse `[text](href)` at the start of `rest`, returning bytes consumed
fn parse_link(rest: &str) -> Option<(&str, &str, usize)> {
    let bracket_end = rest.find(']')?;
    let text = &rest[1..bracket_end];
    let after = rest[bracket_end + 1..].strip_prefix('(')?;
    let paren_end = after.find(')')?;
    let href = after[..paren_end].trim();
    Some((text, href, bracket_end + 1 + 1 + paren_end + 1))
}

fn render_inline_tokens(tokens: &[InlineToken<'_>]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            InlineToken::Text(t) => out.push_str(&escape_html(t)),
            InlineToken::Bold(inner) => {
                out.push_str("<strong>");
                out.push_str(&render_inline_tokens(inner));
                out.push_str("</strong>");
            }
            InlineToken::Italic(inner) => {
                out.push_str("<em>");
                out.push_str(&render_inline_tokens(inner));
                out.push_str("</em>");
            }
            InlineToken::Code(c) => {
                out.push_str("<code>");
                out.push_str(&escape_html(c));
                out.push_str("</code>");
            }
            InlineToken::Link { text, href } => {
                out.push_str(&format!(
                    "<a href=\"{}\">{}</a>",
                    escape_html(href),
                    inline_to_html(text)
                ));
            }
        }
    }
    out
}
