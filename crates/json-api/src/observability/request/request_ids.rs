//! Request ids: accepted from the caller when sane, generated otherwise.

use salvo::{http::header::HeaderValue, prelude::Response};
use uuid::Uuid;

pub(super) const HEADER: &str = "x-request-id";

/// Longest caller-supplied id that is kept.
const MAX_LEN: usize = 128;

pub(super) fn resolve(supplied: Option<String>) -> String {
    supplied
        .map(|value| value.trim().to_owned())
        .filter(|value| is_acceptable(value))
        .unwrap_or_else(|| Uuid::now_v7().to_string())
}

pub(super) fn echo(res: &mut Response, request_id: &str) {
    // Ids are either uuids or pass `is_acceptable`, so this only fails on a bug.
    if let Ok(value) = HeaderValue::from_str(request_id) {
        res.headers_mut().insert(HEADER, value);
    }
}

/// Keeps log lines and response headers clean of caller-controlled junk.
fn is_acceptable(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_LEN
        && value
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b':'))
}
