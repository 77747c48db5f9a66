//! Search query construction from a request's mode and allowlists.

use crate::model::{SearchMode, SearchRequest};

/// High-quality free repositories to prioritize in `free` mode.
pub const FREE_REPOSITORIES: &[&str] = &[
    "archive.org",
    "gutenberg.org",
    "libgen.is",
    "libgen.rs",
    "annas-archive.org",
    "pdfdrive.com",
    "scholar.google.com",
];

/// Commercial retailers searched in `paid` mode.
pub const PAID_RETAILERS: &[&str] = &[
    "amazon.com",
    "springer.com",
    "wiley.com",
    "sciencedirect.com",
    "books.google.com",
    "oreilly.com",
    "shop.elsevier.com",
];

/// Builds the provider query string for a request.
///
/// Free mode OR-combines the repository allowlist with an exact-title
/// match and the filetype keyword. Paid mode OR-combines the retailer
/// allowlist with purchase-intent keywords.
#[must_use]
pub fn build_query(request: &SearchRequest) -> String {
    match request.mode {
        SearchMode::Free => {
            let sites = site_filter(FREE_REPOSITORIES);
            format!(
                "({sites}) intitle:\"{title}\" {filetype}",
                title = request.filename,
                filetype = request.filetype,
            )
        }
        SearchMode::Paid => {
            let sites = site_filter(PAID_RETAILERS);
            format!(
                "\"{title}\" book {filetype} (buy OR purchase OR download) ({sites})",
                title = request.filename,
                filetype = request.filetype,
            )
        }
    }
}

fn site_filter(domains: &[&str]) -> String {
    domains
        .iter()
        .map(|domain| format!("site:{domain}"))
        .collect::<Vec<_>>()
        .join(" OR ")
}
