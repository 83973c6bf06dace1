//! URL utilities for endpoint construction
//!
//! Deployment endpoints hang off a single configurable server address, and a
//! successful deployment hands the chat session a query URL derived from the
//! host the user typed. Both paths go through the helpers here so trailing
//! slashes never produce `//` in the final URL.

const QUERY_SUFFIX: &str = "/query";

/// Remove trailing slashes from a base URL.
///
/// # Examples
///
/// ```
/// use modeldeck::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:8000/"), "http://localhost:8000");
/// assert_eq!(normalize_base_url("http://localhost:8000///"), "http://localhost:8000");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash between them.
///
/// # Examples
///
/// ```
/// use modeldeck::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:8000/", "/upload-ssh-key"),
///     "http://localhost:8000/upload-ssh-key"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

/// Derive the chat query URL for a freshly deployed host.
///
/// A scheme is added when the host has none and `/query` is appended unless
/// the address already ends with it.
///
/// # Examples
///
/// ```
/// use modeldeck::utils::url::derive_query_url;
///
/// assert_eq!(derive_query_url("1.2.3.4"), "http://1.2.3.4/query");
/// assert_eq!(derive_query_url("https://gpu.example.com/query"), "https://gpu.example.com/query");
/// ```
pub fn derive_query_url(host: &str) -> String {
    let host = host.trim();
    let with_scheme = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    };

    let base = normalize_base_url(&with_scheme);
    if base.ends_with(QUERY_SUFFIX) {
        base
    } else {
        format!("{base}{QUERY_SUFFIX}")
    }
}

/// Whether requests to `url` should be consumed as a raw text stream.
///
/// The decision is purely lexical: the URL must end with `stream`.
pub fn is_streaming_url(url: &str) -> bool {
    url.ends_with("stream")
}
