//! Shared User-Agent strings for probe, search, and render HTTP clients.
//!
//! Single source for project URL and UA format so pipeline traffic stays
//! consistent and easy to update (good citizenship; RFC 9308).

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/nicksrandall/Linkscout";

/// Browser User-Agent used by search providers and the render engine.
///
/// Search result pages and many candidate hosts gate on bot detection;
/// these clients send a browser-like UA from the first request. The
/// metadata probe keeps the identifying UA since it never fetches bodies.
pub(crate) const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Default User-Agent for metadata-probe requests (identifies the tool).
#[must_use]
pub(crate) fn default_probe_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("linkscout/{version} (link-verification-tool; +{PROJECT_UA_URL})")
}
