//! Extraction of bracketed lists from model prose
//!
//! The completion backend is asked for a JSON array but routinely wraps it in
//! commentary or code fences. Only the outermost `[ ... ]` span is used and it
//! is split on commas without any JSON awareness: nested brackets and escaped
//! commas are not supported.

use thiserror::Error;

/// Why no list could be extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ListParseError {
    #[error("no bracket pair found in model output")]
    NoBrackets,
    #[error("closing bracket precedes opening bracket")]
    ReversedBrackets,
}

/// Parse the items between the first `[` and the last `]` of `raw`.
///
/// Items are trimmed, lose one layer of matching `"` or `'` quotes, and are
/// dropped when empty. A bracket pair with nothing usable inside yields
/// `Ok(vec![])`.
pub fn parse_list(raw: &str) -> Result<Vec<String>, ListParseError> {
    let Some(open) = raw.find('[') else {
        return Err(ListParseError::NoBrackets);
    };
    let Some(close) = raw.rfind(']') else {
        return Err(ListParseError::NoBrackets);
    };
    if close < open {
        return Err(ListParseError::ReversedBrackets);
    }

    // Both indices sit on single-byte ASCII brackets
    let interior = raw.get(open + 1..close).unwrap_or_default();

    Ok(interior
        .split(',')
        .map(|item| strip_quotes(item.trim()).trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect())
}

fn strip_quotes(item: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = item
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    item
}
