use http::header::{HeaderValue, AUTHORIZATION};
use tracing::warn;

use crate::adapters::ApiRequest;

/// Attach the bearer credential to an outgoing request.
///
/// Any existing `Authorization` header is replaced, so the request carries
/// exactly one. Without a token the request goes out unauthenticated.
pub fn authorize(request: &mut ApiRequest, access_token: Option<&str>) {
    request.headers.remove(AUTHORIZATION);

    let Some(token) = access_token.filter(|t| !t.is_empty()) else {
        return;
    };

    match HeaderValue::from_str(&format!("Bearer {token}")) {
        Ok(mut value) => {
            value.set_sensitive(true);
            request.headers.insert(AUTHORIZATION, value);
        }
        Err(_) => {
            warn!(path = %request.path, "Access token is not a valid header value, sending unauthenticated");
        }
    }
}
