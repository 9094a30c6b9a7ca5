//! Response status classification

/// Whether a status code means the request failed.
///
/// Redirects (300-399), client errors (400-499), server errors (500-599)
/// and anything at or above 600 are failures. Everything below 300 counts
/// as success; redirects are never followed.
#[must_use]
pub fn is_error_status(code: u16) -> bool {
    match code {
        300..=399 => true,
        400..=499 => true,
        500..=599 => true,
        _ => code >= 600,
    }
}
