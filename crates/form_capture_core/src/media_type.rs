//! `Content-Type` parsing: `type/subtype` followed by `; name=value` parameters.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid media type {value:?}")]
pub struct MediaTypeError {
    pub value: String,
}

impl MediaTypeError {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Lowercased `type/subtype` of `raw`. Parameters must be well formed but are dropped.
pub fn essence(raw: &str) -> Result<String, MediaTypeError> {
    let invalid = || MediaTypeError::new(raw);

    let (head, mut rest) = match raw.find(';') {
        Some(index) => raw.split_at(index),
        None => (raw, ""),
    };
    let essence = head.trim().to_ascii_lowercase();
    let well_formed = match essence.split_once('/') {
        Some((kind, subtype)) => is_token(kind) && is_token(subtype),
        None => is_token(&essence),
    };
    if !well_formed {
        return Err(invalid());
    }

    let mut seen: Vec<String> = Vec::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let (name, remainder) = consume_parameter(rest).ok_or_else(invalid)?;
        if let Some(name) = name {
            let name = name.to_ascii_lowercase();
            if seen.contains(&name) {
                return Err(invalid());
            }
            seen.push(name);
        }
        rest = remainder;
    }

    Ok(essence)
}

/// Consumes one `; name=value` parameter. A lone trailing `;` yields no name.
fn consume_parameter(input: &str) -> Option<(Option<&str>, &str)> {
    let rest = input.strip_prefix(';')?.trim_start();
    if rest.is_empty() {
        return Some((None, rest));
    }

    let (name, rest) = split_token(rest);
    if name.is_empty() {
        return None;
    }
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let rest = match rest.strip_prefix('"') {
        Some(quoted) => skip_quoted_string(quoted)?,
        None => {
            let (value, rest) = split_token(rest);
            if value.is_empty() {
                return None;
            }
            rest
        }
    };
    Some((Some(name), rest))
}

/// `input` starts just after the opening quote; returns what follows the closing one.
fn skip_quoted_string(input: &str) -> Option<&str> {
    let mut chars = input.char_indices();
    while let Some((index, ch)) = chars.next() {
        match ch {
            '"' => return Some(&input[index + 1..]),
            '\\' => {
                chars.next();
            }
            _ => {}
        }
    }
    None
}

fn split_token(input: &str) -> (&str, &str) {
    let end = input
        .find(|ch: char| !is_token_char(ch))
        .unwrap_or(input.len());
    input.split_at(end)
}

fn is_token(value: &str) -> bool {
    !value.is_empty() && value.chars().all(is_token_char)
}

fn is_token_char(ch: char) -> bool {
    ch.is_ascii() && !ch.is_ascii_control() && ch != ' ' && !"()<>@,;:\\\"/[]?=".contains(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_drops_parameters() {
        assert_eq!(
            essence("Application/X-WWW-Form-Urlencoded; charset=UTF-8").unwrap(),
            "application/x-www-form-urlencoded"
        );
        assert_eq!(essence("  text/plain  ").unwrap(), "text/plain");
    }

    #[test]
    fn accepts_quoted_values_and_trailing_semicolon() {
        assert_eq!(
            essence("multipart/form-data; boundary=\"a;b \\\" c\"").unwrap(),
            "multipart/form-data"
        );
        assert_eq!(essence("text/plain;").unwrap(), "text/plain");
        assert_eq!(essence("text/plain ; charset = utf-8 ; ").unwrap(), "text/plain");
    }

    #[test]
    fn rejects_malformed_media_types() {
        for raw in [
            "",
            " ",
            "/",
            "text/",
            "/plain",
            "text plain",
            "text/plain; charset",
            "text/plain; =utf-8",
            "text/plain; charset=",
            "text/plain; charset=\"utf-8",
            "text/plain; a=1 b=2",
            "text/plain;;",
            "text/plain; charset=utf-8; CHARSET=latin1",
        ] {
            assert_eq!(essence(raw), Err(MediaTypeError::new(raw)), "{raw:?}");
        }
    }
}
