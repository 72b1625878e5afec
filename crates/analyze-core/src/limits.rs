//! Size ceilings checked before expensive work runs.
//!
//! Two independent limits guard the pipeline: a request-body byte ceiling
//! (checked against the declared Content-Length before the body is read)
//! and a post-extraction character ceiling. Both must pass before the
//! analyzer is invoked; the analyzer call is billed per request.

/// Hard request-body ceiling: 15 MiB.
pub const MAX_PAYLOAD_BYTES: u64 = 15 * 1024 * 1024;

/// Default document character ceiling, overridable via `MAX_CHAR_COUNT`.
pub const DEFAULT_MAX_CHAR_COUNT: usize = 100_000;

/// True when the declared request body length fits under the byte ceiling.
pub fn payload_within_limit(declared_content_length: u64, limit_bytes: u64) -> bool {
    declared_content_length <= limit_bytes
}

/// True when the extracted text fits under the character ceiling.
///
/// Counted in `char`s, independent of the original encoding or compression.
pub fn document_within_limit(text: &str, max_chars: usize) -> bool {
    text.chars().count() <= max_chars
}
