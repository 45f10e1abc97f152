//! Share-token generation.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand_core::{OsRng, RngCore as _};

/// Entropy per token: 256 bits from the OS generator.
pub const SHARE_TOKEN_BYTES: usize = 32;

/// Length of an encoded token; anything else cannot be a token we issued.
pub const SHARE_TOKEN_LEN: usize = 43;

/// A fresh, URL-safe, unguessable share token.
pub fn generate_share_token() -> String {
  let mut bytes = [0u8; SHARE_TOKEN_BYTES];
  OsRng.fill_bytes(&mut bytes);
  URL_SAFE_NO_PAD.encode(bytes)
}

/// `{base}/shared/{token}`, tolerating a trailing slash on `base`.
pub fn share_url(base: &str, token: &str) -> String {
  format!("{}/shared/{token}", base.trim_end_matches('/'))
}
