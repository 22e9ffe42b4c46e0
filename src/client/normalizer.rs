use serde::de::DeserializeOwned;

use crate::adapters::SimpleHttpResponse;
use crate::error::{ClientError, ClientResult};

/// Turn a response into the caller's payload or a normalized error
pub fn normalize<T: DeserializeOwned>(response: SimpleHttpResponse) -> ClientResult<T> {
    if response.is_success() {
        decode(response)
    } else {
        Err(into_error(response))
    }
}

/// Decode a success body. An empty body decodes as JSON `null`, which lets
/// `()` and `Option<T>` stand in for 204 responses.
pub fn decode<T: DeserializeOwned>(response: SimpleHttpResponse) -> ClientResult<T> {
    let body = response.body();
    if body.trim().is_empty() {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_str(body)?)
}

/// Failure response as an error, status and raw body preserved
pub fn into_error(response: SimpleHttpResponse) -> ClientError {
    let status = response.status();
    ClientError::from_status(status, response.text())
}
