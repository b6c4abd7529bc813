//! Flag encoding for persisted experiments
//!
//! Flags are stored as whitespace-separated `key=value` tokens in key order.
//! Values containing whitespace, `"` or `\` are double-quoted with backslash
//! escapes. Decoding additionally accepts a leading `--` on keys and treats a
//! bare `key` as `key=true`, which is how no-arg flags are written by hand.

use std::collections::BTreeMap;

/// Parameter map of an experiment action
pub type FlagMap = BTreeMap<String, String>;

/// Flag text could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlagError {
    /// A token had no key before `=`
    #[error("empty flag key in token `{0}`")]
    EmptyKey(String),

    /// A quoted value was not closed
    #[error("unterminated quote in value of `{0}`")]
    UnterminatedQuote(String),

    /// Escape at end of input
    #[error("dangling escape in value of `{0}`")]
    DanglingEscape(String),
}

/// Encode `flags`; entries with empty values are omitted
#[must_use]
pub fn encode_flags(flags: &FlagMap) -> String {
    let mut out = String::new();
    for (key, value) in flags {
        if value.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(key);
        out.push('=');
        if needs_quoting(value) {
            out.push('"');
            for ch in value.chars() {
                if ch == '"' || ch == '\\' {
                    out.push('\\');
                }
                out.push(ch);
            }
            out.push('"');
        } else {
            out.push_str(value);
        }
    }
    out
}

fn needs_quoting(value: &str) -> bool {
    value
        .chars()
        .any(|c| c.is_whitespace() || c == '"' || c == '\\')
}

/// Decode text produced by [`encode_flags`]
pub fn decode_flags(input: &str) -> Result<FlagMap, FlagError> {
    let mut flags = FlagMap::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' || c.is_whitespace() {
                break;
            }
            key.push(c);
            chars.next();
        }
        let key = key.trim_start_matches("--").to_string();

        if chars.peek() != Some(&'=') {
            if key.is_empty() {
                return Err(FlagError::EmptyKey(key));
            }
            flags.insert(key, "true".to_string());
            continue;
        }
        chars.next();
        if key.is_empty() {
            return Err(FlagError::EmptyKey(format!("={}", peek_token(&chars))));
        }

        let mut value = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' => match chars.next() {
                        Some(escaped) => value.push(escaped),
                        None => return Err(FlagError::DanglingEscape(key)),
                    },
                    '"' => {
                        closed = true;
                        break;
                    }
                    other => value.push(other),
                }
            }
            if !closed {
                return Err(FlagError::UnterminatedQuote(key));
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                value.push(c);
                chars.next();
            }
        }
        flags.insert(key, value);
    }

    Ok(flags)
}

fn peek_token(chars: &std::iter::Peekable<std::str::Chars<'_>>) -> String {
    chars.clone().take_while(|c| !c.is_whitespace()).collect()
}
