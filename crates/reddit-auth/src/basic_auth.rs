//! Basic authentication header for the token endpoint

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Build `Basic base64(client_id:client_secret)`.
///
/// Installed apps have no secret; Reddit expects an empty password then, so
/// the colon is still emitted.
pub fn basic_auth_header(client_id: &str, client_secret: Option<&str>) -> String {
    let raw = format!("{client_id}:{}", client_secret.unwrap_or_default());
    format!("Basic {}", STANDARD.encode(raw))
}
