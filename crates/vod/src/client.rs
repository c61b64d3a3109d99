use std::collections::HashMap;

use reqwest::header::{COOKIE, HeaderValue};
use reqwest::{Client, RequestBuilder};
use tracing::debug;
use url::Url;

use crate::config::FetchConfig;
use crate::error::VodError;

/// HTTP client bound to one rendition's CDN credential set.
///
/// The playback API hands out per-rendition auth cookies; those are folded
/// into a single `Cookie` header here and attached to every manifest and
/// segment request, together with the configured headers and timeout.
pub struct MediaClient {
    http: Client,
    config: FetchConfig,
    cookie_header: Option<HeaderValue>,
}

impl MediaClient {
    pub fn new(config: FetchConfig, cookies: &HashMap<String, String>) -> Result<Self, VodError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self {
            http,
            cookie_header: build_cookie_header(cookies),
            config,
        })
    }

    pub fn get(&self, url: &Url) -> RequestBuilder {
        let mut request = self
            .http
            .get(url.clone())
            .headers(self.config.headers.clone());
        if let Some(cookie) = &self.cookie_header {
            request = request.header(COOKIE, cookie.clone());
        }
        if let Some(timeout) = self.config.timeout {
            request = request.timeout(timeout);
        }
        request
    }
}

/// Folds a cookie map into a `Cookie` header value. A value that does not
/// survive header encoding is skipped rather than poisoning the request.
fn build_cookie_header(cookies: &HashMap<String, String>) -> Option<HeaderValue> {
    if cookies.is_empty() {
        return None;
    }

    let mut header = String::with_capacity(
        cookies
            .iter()
            .map(|(name, value)| name.len() + 1 + value.len() + 2)
            .sum(),
    );

    for (name, value) in cookies {
        if !header.is_empty() {
            header.push_str("; ");
        }
        header.push_str(name);
        header.push('=');
        header.push_str(value);
    }

    match HeaderValue::from_str(&header) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "failed to build Cookie header; sending without cookies");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_header_joins_name_value_pairs() {
        let mut cookies = HashMap::new();
        cookies.insert("CloudFront-Signature".to_string(), "abc123".to_string());

        let header = build_cookie_header(&cookies).expect("header should build");
        assert_eq!(header.to_str().expect("ascii"), "CloudFront-Signature=abc123");
    }

    #[test]
    fn empty_cookie_set_yields_no_header() {
        assert!(build_cookie_header(&HashMap::new()).is_none());
    }

    #[test]
    fn unencodable_cookie_value_is_dropped() {
        let mut cookies = HashMap::new();
        cookies.insert("bad".to_string(), "line\nbreak".to_string());

        assert!(build_cookie_header(&cookies).is_none());
    }
}
