//! Effective-URL derivation.

use framewall_protocol::{IsolationMode, ProxyConfig};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything except RFC 3986 unreserved characters, so a full URL survives
/// embedding as a single query value.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'_')
	.remove(b'.')
	.remove(b'~');

/// Builds the URL a rendering surface should load for one session.
///
/// Pure given `now_ms`; the caller supplies the clock so cache-bust values
/// stay testable. Never fails: the only normalization applied is trimming
/// and scheme prepending, and an empty input yields an empty output
/// (nothing to load).
///
/// Uniqueness parameters (`_uid`, `_cb`) are appended to the inner target
/// URL before any proxy wrapping, so a proxied fetch still sees the
/// cache-busted, identity-tagged target.
pub fn effective_url(
	raw: &str,
	mode: IsolationMode,
	identity: &str,
	proxy: Option<&ProxyConfig>,
	now_ms: u64,
) -> String {
	let trimmed = raw.trim();
	if trimmed.is_empty() {
		return String::new();
	}

	let mut url = if has_scheme(trimmed) {
		trimmed.to_string()
	} else {
		format!("https://{trimmed}")
	};

	if mode.unique_identity {
		push_param(&mut url, "_uid", identity);
	}
	if mode.cache_bust {
		push_param(&mut url, "_cb", &now_ms.to_string());
	}

	if mode.proxied {
		if let Some(proxy) = proxy {
			let target = utf8_percent_encode(&url, COMPONENT).to_string();
			url = format!("{}{}", proxy.prefix, target);
		}
	}

	url
}

fn has_scheme(url: &str) -> bool {
	url.starts_with("http://") || url.starts_with("https://")
}

fn push_param(url: &mut String, key: &str, value: &str) {
	let separator = if url.contains('?') { '&' } else { '?' };
	url.push(separator);
	url.push_str(key);
	url.push('=');
	url.push_str(value);
}
