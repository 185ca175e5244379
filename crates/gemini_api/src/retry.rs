use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

/// Maximum retry attempts after the initial request.
pub const MAX_RETRIES: u32 = 3;

const BASE_DELAY: Duration = Duration::from_millis(750);

fn transient_error_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(
            r"(?i)resource.?exhausted|unavailable|deadline.?exceeded|overloaded|internal.?error|connection.?refused",
        )
        .expect("retry regex must compile")
    })
}

/// Retry policy over HTTP status and error text. Throttling and server
/// errors retry; transient upstream status strings retry regardless of the
/// HTTP code they arrive with.
pub fn is_retryable_http_error(status: u16, error_text: &str) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504) || transient_error_regex().is_match(error_text)
}

/// Exponential backoff delay for one retry attempt.
pub fn retry_delay_ms(attempt: u32) -> Duration {
    BASE_DELAY.saturating_mul(1u32 << attempt.min(8))
}
