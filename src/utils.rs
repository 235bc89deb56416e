//! String and link helpers shared by the sources and the renderer.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Matches a `url=` parameter anywhere in a link's query string.
static REDIRECT_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]url=([^&#]+)").expect("static regex"));

/// Collapse every run of whitespace into one space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip a redirect wrapper such as `https://news.google.com/...?url=<real-link>`.
///
/// The wrapped value is percent-decoded and only used when it is itself an
/// absolute http(s) URL; anything else leaves the link untouched.
pub fn unwrap_redirect(link: &str) -> String {
    let Some(caps) = REDIRECT_PARAM.captures(link) else {
        return link.to_string();
    };
    let encoded = &caps[1];
    let decoded = urlencoding::decode(encoded)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| encoded.to_string());
    match Url::parse(&decoded) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => decoded,
        _ => link.to_string(),
    }
}

/// Resolve `href` against `base`, returning an absolute URL string.
pub fn resolve_link(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).ok().map(|u| u.to_string())
}

/// Truncate a string for logging purposes.
///
/// Counts characters rather than bytes so multi-byte text never splits.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}
