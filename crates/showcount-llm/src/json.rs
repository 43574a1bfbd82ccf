//! Helpers for pulling JSON out of model text output.

/// Strip a surrounding Markdown code fence (with or without a language tag).
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();
    if body.starts_with("```") {
        body = match body.find('\n') {
            Some(newline) => &body[newline + 1..],
            None => body.trim_start_matches('`'),
        };
    }
    if body.ends_with("```") {
        if let Some(fence) = body.rfind("```") {
            body = &body[..fence];
        }
    }
    body.trim()
}
