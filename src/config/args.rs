// src/config/args.rs

//! Tokenizer for argument strings (child program arguments, main files).

/// Split a raw argument string into an ordered list of tokens.
///
/// Rules, applied left to right:
/// - a space ends the current token, unless inside a quoted span;
/// - `=` also ends the current token outside quotes, so `key=value` becomes
///   `["key", "value"]`;
/// - `"` opens or closes a quoted span. Opening flushes whatever unquoted
///   text is pending; closing flushes the quoted text as one token, keeping
///   its inner spaces and `=` characters;
/// - every token is trimmed and empty tokens are dropped.
///
/// An unterminated quote is flushed at the end of the input. There is no
/// escape character.
pub fn split_args(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                flush(&mut tokens, &mut current);
                quoted = !quoted;
            }
            ' ' | '=' if !quoted => flush(&mut tokens, &mut current),
            _ => current.push(ch),
        }
    }

    flush(&mut tokens, &mut current);
    tokens
}

fn flush(tokens: &mut Vec<String>, current: &mut String) {
    let token = current.trim();
    if !token.is_empty() {
        tokens.push(token.to_string());
    }
    current.clear();
}
