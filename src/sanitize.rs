//! Text sanitization ahead of PDF rendering.
//!
//! The renderer writes text with a standard Type1 font in a single-byte
//! encoding, so anything outside Latin-1 has to go before it reaches the page.
//! Sanitizing happens in two steps:
//!
//! 1. A fixed table maps typographic punctuation (curly quotes, dashes,
//!    bullets, ellipses, word joiners) to ASCII look-alikes.
//! 2. The result is encoded into Latin-1, replacing whatever is still not
//!    representable with a placeholder.
//!
//! If step 2 cannot be carried out, the text is encoded as UTF-8 with
//! unencodable characters dropped, and if that fails as well the original
//! input is returned. Sanitizing never fails.

use crate::error::{ArchiveError, Result};
use std::fmt;
use tracing::warn;

/// Punctuation substitutions applied before encoding.
pub const PUNCTUATION_SUBSTITUTIONS: &[(char, &str)] = &[
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{201E}', "\""),
    ('\u{2060}', " "),
    ('\u{2013}', "-"),
    ('\u{2014}', "--"),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{2022}', "*"),
    ('\u{2026}', "..."),
];

/// Character sets the sanitizer can encode into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// ISO-8859-1, one byte per character.
    Latin1,
    /// UTF-8, which can represent every `char`.
    Utf8,
}

impl Charset {
    pub fn can_encode(self, c: char) -> bool {
        match self {
            Charset::Latin1 => (c as u32) <= 0xFF,
            Charset::Utf8 => true,
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Charset::Latin1 => write!(f, "latin-1"),
            Charset::Utf8 => write!(f, "utf-8"),
        }
    }
}

/// What to do with a character the target charset cannot represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unencodable {
    Replace(char),
    Ignore,
}

/// Encode `text` into `charset`, returning the text as it round-trips.
///
/// Fails only when the replacement character is itself unrepresentable.
pub fn encode(text: &str, charset: Charset, policy: Unencodable) -> Result<String> {
    if let Unencodable::Replace(placeholder) = policy {
        if !charset.can_encode(placeholder) {
            return Err(ArchiveError::Encode(format!(
                "placeholder {placeholder:?} is not representable in {charset}"
            )));
        }
    }

    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if charset.can_encode(c) {
            out.push(c);
        } else if let Unencodable::Replace(placeholder) = policy {
            out.push(placeholder);
        }
    }
    Ok(out)
}

/// Replace typographic punctuation with ASCII equivalents.
pub fn normalize_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match PUNCTUATION_SUBSTITUTIONS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => out.push_str(to),
            None => out.push(c),
        }
    }
    out
}

/// Sanitizer for text bound for the PDF renderer.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    placeholder: char,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self { placeholder: '?' }
    }
}

impl Sanitizer {
    /// Normalize punctuation, then encode with the Latin-1 → UTF-8 → original fallback chain.
    pub fn sanitize(&self, text: &str) -> String {
        let normalized = normalize_punctuation(text);

        match encode(&normalized, Charset::Latin1, Unencodable::Replace(self.placeholder)) {
            Ok(narrow) => narrow,
            Err(e) => {
                warn!(error = %e, "latin-1 encoding failed; falling back to utf-8");
                match encode(&normalized, Charset::Utf8, Unencodable::Ignore) {
                    Ok(wide) => wide,
                    Err(e) => {
                        warn!(error = %e, "utf-8 encoding failed; keeping original text");
                        text.to_string()
                    }
                }
            }
        }
    }
}
