//! OAuth 1.0a request signing for the stream subscription.
//!
//! The filtered stream endpoint requires an OAuth 1.0a user-context
//! signature (HMAC-SHA1) over the request method, URL, and parameters.
//! Only the pieces needed to sign one POST are implemented here; token
//! acquisition is the operator's problem.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::Rng;
use sha1::Sha1;

use crate::config::Config;

/// RFC 3986 unreserved characters pass through; everything else is escaped.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Length of the random nonce.
const NONCE_LEN: usize = 32;

type HmacSha1 = Hmac<Sha1>;

/// Signs requests with the four OAuth 1.0a credential values.
#[derive(Debug, Clone)]
pub struct OAuthSigner {
    consumer_key: String,
    consumer_secret: String,
    access_token: String,
    access_token_secret: String,
}

impl OAuthSigner {
    /// Creates a signer from the connector configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            consumer_key: config.consumer_key.clone(),
            consumer_secret: config.consumer_secret.clone(),
            access_token: config.access_token.clone(),
            access_token_secret: config.access_token_secret.clone(),
        }
    }

    /// Builds the `Authorization` header value for one request.
    ///
    /// `params` must contain every query and form parameter of the request,
    /// unencoded; they participate in the signature base string.
    #[must_use]
    pub fn authorization_header(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, String)],
    ) -> String {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            .to_string();
        let nonce = nonce();

        let oauth_fields: [(&str, &str); 6] = [
            ("oauth_consumer_key", &self.consumer_key),
            ("oauth_nonce", &nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", &timestamp),
            ("oauth_token", &self.access_token),
            ("oauth_version", "1.0"),
        ];

        // Parameter string: all parameters, percent-encoded, sorted by
        // encoded key then encoded value.
        let mut encoded: Vec<(String, String)> = oauth_fields
            .iter()
            .map(|(key, value)| (encode(key), encode(value)))
            .chain(params.iter().map(|(key, value)| (encode(key), encode(value))))
            .collect();
        encoded.sort();

        let parameter_string = encoded
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");

        let base_string = format!(
            "{}&{}&{}",
            method.to_ascii_uppercase(),
            encode(url),
            encode(&parameter_string)
        );
        let signing_key = format!(
            "{}&{}",
            encode(&self.consumer_secret),
            encode(&self.access_token_secret)
        );
        let signature = hmac_sha1(&signing_key, &base_string);

        let rendered = oauth_fields
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .chain(std::iter::once(("oauth_signature".to_string(), signature)))
            .map(|(key, value)| format!("{}=\"{}\"", encode(&key), encode(&value)))
            .collect::<Vec<_>>()
            .join(", ");

        format!("OAuth {rendered}")
    }
}

/// Percent-encodes a string per RFC 3986.
fn encode(s: &str) -> String {
    utf8_percent_encode(s, UNRESERVED).to_string()
}

/// Generates a random alphanumeric nonce.
fn nonce() -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    let mut rng = rand::rng();
    (0..NONCE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Computes a base64-encoded HMAC-SHA1 signature.
fn hmac_sha1(key: &str, data: &str) -> String {
    let mut mac = HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(data.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}
