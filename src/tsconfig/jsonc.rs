//! JSON-with-comments reader for tsconfig text.
//!
//! tsconfig files accept `//` and `/* */` comments and trailing commas.
//! Both are blanked out with spaces (newlines kept) so serde_json's
//! line/column positions still point into the original text.

use serde_json::Value;
use thiserror::Error;

/// Why tsconfig text could not be read as JSON.
#[derive(Debug, Error)]
pub enum JsoncError {
    /// A `/*` comment runs to the end of the text.
    #[error("'*/' expected.")]
    UnterminatedComment,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Parse tsconfig text into a JSON value.
pub fn parse(text: &str) -> Result<Value, JsoncError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let cleaned = strip_trailing_commas(&strip_comments(text)?);
    Ok(serde_json::from_str(&cleaned)?)
}

/// Blank out `//` line and `/* */` block comments while respecting strings.
pub fn strip_comments(input: &str) -> Result<String, JsoncError> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut out: Vec<u8> = Vec::with_capacity(len);
    let mut i = 0;

    while i < len {
        let ch = bytes[i];

        // String literal, copy verbatim until the closing quote
        if ch == b'"' {
            let end = string_end(bytes, i);
            out.extend_from_slice(&bytes[i..end]);
            i = end;
            continue;
        }

        if ch == b'/' && i + 1 < len && bytes[i + 1] == b'/' {
            while i < len && bytes[i] != b'\n' {
                out.push(b' ');
                i += 1;
            }
            continue;
        }

        if ch == b'/' && i + 1 < len && bytes[i + 1] == b'*' {
            out.extend_from_slice(b"  ");
            i += 2;
            while i < len && !(bytes[i] == b'*' && i + 1 < len && bytes[i + 1] == b'/') {
                out.push(blank(bytes[i]));
                i += 1;
            }
            if i >= len {
                return Err(JsoncError::UnterminatedComment);
            }
            out.extend_from_slice(b"  ");
            i += 2;
            continue;
        }

        out.push(ch);
        i += 1;
    }

    // Only ASCII bytes outside strings were replaced, and only with ASCII.
    Ok(String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
}

/// Blank out commas that directly precede `}` or `]` (ignoring whitespace).
pub fn strip_trailing_commas(input: &str) -> String {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut out: Vec<u8> = Vec::with_capacity(len);
    let mut i = 0;

    while i < len {
        let ch = bytes[i];

        if ch == b'"' {
            let end = string_end(bytes, i);
            out.extend_from_slice(&bytes[i..end]);
            i = end;
            continue;
        }

        if ch == b',' {
            let next = bytes[i + 1..]
                .iter()
                .find(|b| !b.is_ascii_whitespace())
                .copied();
            if matches!(next, Some(b'}') | Some(b']')) {
                out.push(b' ');
                i += 1;
                continue;
            }
        }

        out.push(ch);
        i += 1;
    }

    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Index one past the closing quote of the string starting at `start`.
fn string_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn blank(byte: u8) -> u8 {
    match byte {
        b'\n' | b'\r' => byte,
        // UTF-8 continuation and lead bytes inside comments become spaces too
        _ => b' ',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_line_comments() {
        let input = "{\n  // comment\n  \"key\": \"value\"\n}";
        let result = strip_comments(input).unwrap();
        assert!(!result.contains("//"));
        assert!(result.contains("\"key\": \"value\""));
        assert_eq!(result.lines().count(), input.lines().count());
    }

    #[test]
    fn test_strip_block_comments_keeps_lines() {
        let input = "{\n  /* multi\n     line */\n  \"key\": 1\n}";
        let result = strip_comments(input).unwrap();
        assert!(!result.contains("/*"));
        assert_eq!(result.lines().count(), input.lines().count());
        assert_eq!(result.len(), input.len());
    }

    #[test]
    fn test_strings_with_slashes_preserved() {
        let input = r#"{ "url": "https://example.com/*api*/", "glob": "src/**/*" }"#;
        assert_eq!(strip_comments(input).unwrap(), input);
    }

    #[test]
    fn test_escaped_quote_in_string() {
        let input = r#"{ "a": "say \"// hi\"" }"#;
        assert_eq!(strip_comments(input).unwrap(), input);
    }

    #[test]
    fn test_non_ascii_in_comments_and_strings() {
        let value = parse("{ /* café */ \"name\": \"naïve\" }").unwrap();
        assert_eq!(value, json!({"name": "naïve"}));
    }

    #[test]
    fn test_trailing_commas() {
        let value = parse(r#"{ "include": ["src",], "compilerOptions": { "strict": true, }, }"#).unwrap();
        assert_eq!(value, json!({"include": ["src"], "compilerOptions": {"strict": true}}));
    }

    #[test]
    fn test_comma_inside_string_untouched() {
        let value = parse(r#"{ "a": ",]" }"#).unwrap();
        assert_eq!(value, json!({"a": ",]"}));
    }

    #[test]
    fn test_bom_is_skipped() {
        let value = parse("\u{feff}{}").unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_syntax_error_reports_position() {
        let err = parse("{\n  \"files\": [\n    \"a.ts\"\n    \"b.ts\"\n  ]\n}").unwrap_err();
        match err {
            JsoncError::Json(e) => assert_eq!(e.line(), 4),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_block_comment_is_an_error() {
        let err = parse("{ \"files\": [\"a.ts\"] } /* never closed").unwrap_err();
        assert!(matches!(err, JsoncError::UnterminatedComment));
        assert_eq!(err.to_string(), "'*/' expected.");

        assert!(strip_comments("{ /* a */ } /*").is_err());
        assert!(strip_comments("{ \"a\": \"/* inside a string\" }").is_ok());
    }
}
