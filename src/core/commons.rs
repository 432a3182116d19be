// src/core/commons.rs

use anyhow::{Context, Result};
use std::str::Chars;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnquoteError {
    #[error("missing closing quote")]
    Unterminated,
    #[error("unexpected characters after the closing quote")]
    TrailingCharacters,
    #[error("newline inside a quoted value")]
    Newline,
    #[error("backquote inside a raw value")]
    InnerBackquote,
    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),
    #[error("escape sequence does not encode a valid character")]
    InvalidCharacter,
}

/// Strips the quoting from a substituted value.
///
/// A double-quoted value is decoded with the usual escape sequences, a
/// backquoted value is taken as is without its backquotes, and anything
/// that is not quoted comes back unchanged. Malformed quoting is an error.
pub fn escape_value(value: &str) -> Result<String> {
    if value.starts_with('"') {
        return unquote_double(value).context("failed to unquote value");
    }
    if value.len() >= 2 && value.starts_with('`') && value.ends_with('`') {
        return unquote_raw(value).context("failed to unquote value");
    }
    Ok(value.to_string())
}

fn unquote_raw(value: &str) -> Result<String, UnquoteError> {
    let inner = value
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
        .ok_or(UnquoteError::Unterminated)?;
    if inner.contains('`') {
        return Err(UnquoteError::InnerBackquote);
    }
    Ok(inner.to_string())
}

fn unquote_double(value: &str) -> Result<String, UnquoteError> {
    let mut chars = value.chars();
    chars.next();

    // Octal and hex escapes produce single bytes, so decode into bytes first.
    let mut out = Vec::with_capacity(value.len());
    loop {
        match chars.next().ok_or(UnquoteError::Unterminated)? {
            '"' => break,
            '\n' => return Err(UnquoteError::Newline),
            '\\' => decode_escape(&mut chars, &mut out)?,
            c => push_char(&mut out, c),
        }
    }

    if chars.next().is_some() {
        return Err(UnquoteError::TrailingCharacters);
    }
    String::from_utf8(out).map_err(|_| UnquoteError::InvalidCharacter)
}

fn decode_escape(chars: &mut Chars<'_>, out: &mut Vec<u8>) -> Result<(), UnquoteError> {
    let c = chars.next().ok_or(UnquoteError::Unterminated)?;
    let decoded = match c {
        'a' => '\u{07}',
        'b' => '\u{08}',
        'f' => '\u{0c}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\u{0b}',
        '\\' | '\'' | '"' => c,
        'x' => {
            let byte = read_digits(chars, c, 2, 16)?;
            let byte = u8::try_from(byte)
                .map_err(|_| UnquoteError::InvalidEscape(c))?;
            out.push(byte);
            return Ok(());
        }
        '0'..='7' => {
            let first = c.to_digit(8).ok_or(UnquoteError::InvalidEscape(c))?;
            let rest = read_digits(chars, c, 2, 8)?;
            let byte = u8::try_from(first * 64 + rest)
                .map_err(|_| UnquoteError::InvalidEscape(c))?;
            out.push(byte);
            return Ok(());
        }
        'u' => code_point(read_digits(chars, c, 4, 16)?)?,
        'U' => code_point(read_digits(chars, c, 8, 16)?)?,
        other => return Err(UnquoteError::InvalidEscape(other)),
    };
    push_char(out, decoded);
    Ok(())
}

fn read_digits(
    chars: &mut Chars<'_>,
    escape: char,
    count: usize,
    radix: u32,
) -> Result<u32, UnquoteError> {
    (0..count).try_fold(0u32, |acc, _| {
        let digit = chars
            .next()
            .and_then(|d| d.to_digit(radix))
            .ok_or(UnquoteError::InvalidEscape(escape))?;
        Ok(acc * radix + digit)
    })
}

fn code_point(value: u32) -> Result<char, UnquoteError> {
    char::from_u32(value).ok_or(UnquoteError::InvalidCharacter)
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}
