use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::AppResult;

/// Decode a base64 README payload into UTF-8 text.
///
/// The GitHub contents API wraps base64 across lines, so embedded whitespace
/// is stripped before decoding.
pub fn decode_base64_content(raw: &str) -> AppResult<String> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64.decode(compact.as_bytes())?;
    Ok(String::from_utf8(bytes)?)
}

/// Reduce markdown to displayable plain text.
///
/// Fenced code blocks are dropped wholesale; inline markers (emphasis,
/// backticks, headings, list bullets, blockquotes) are stripped; links keep
/// their label and lose the URL. Whitespace is collapsed to single spaces.
pub fn strip_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_fence = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        let line = trimmed
            .trim_start_matches('#')
            .trim_start_matches('>')
            .trim_start();
        let line = strip_list_marker(line);
        strip_inline(line, &mut out);
        out.push(' ');
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_list_marker(line: &str) -> &str {
    if let Some(rest) = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("+ "))
    {
        return rest;
    }
    // Numbered list: digits followed by a dot and a space.
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix(". ") {
            return rest;
        }
    }
    line
}

fn strip_inline(line: &str, out: &mut String) {
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' | '_' | '`' | '~' => {}
            '!' if chars.peek() == Some(&'[') => {
                // Image marker: drop the '!', the bracket is handled next.
            }
            '[' => {
                // Copy the label, then skip a directly attached "(url)".
                for inner in chars.by_ref() {
                    if inner == ']' {
                        break;
                    }
                    out.push(inner);
                }
                if chars.peek() == Some(&'(') {
                    for inner in chars.by_ref() {
                        if inner == ')' {
                            break;
                        }
                    }
                }
            }
            _ => out.push(c),
        }
    }
}

/// Truncate to at most `max_words` whitespace-delimited tokens.
///
/// An ellipsis is attached to the final token when anything was dropped, so
/// the result still splits into `max_words` tokens.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return words.join(" ");
    }
    let mut truncated = words[..max_words].join(" ");
    truncated.push('…');
    truncated
}
