//! URL handling module for Seller-Sweep
//!
//! This module resolves scraped hrefs against the page they came from,
//! compares merchant links for identity, and expands seed URL templates.

mod normalize;

use crate::{UrlError, UrlResult};
use url::Url;

pub use normalize::normalize_url;

/// Placeholder substituted by [`expand_seed_url`]
pub const CATEGORY_PLACEHOLDER: &str = "{category}";

/// Resolves a scraped href against the URL of the page it was found on
///
/// Returns None for empty hrefs, fragment-only anchors, non-HTTP schemes
/// (`javascript:`, `mailto:`, ...) and anything that does not parse.
///
/// # Examples
///
/// ```
/// use seller_sweep::url::resolve_href;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/list/phones").unwrap();
/// assert_eq!(
///     resolve_href("/p/123", &base),
///     Some("https://example.com/p/123".to_string())
/// );
/// ```
pub fn resolve_href(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}

/// Returns true if two URLs address the same page
///
/// Both sides are normalized first, so a trailing slash or a fragment does
/// not make a merchant's own link look like a third party's. Unparseable
/// input falls back to comparing the trimmed strings.
pub fn same_page(a: &str, b: &str) -> bool {
    match (normalize_url(a), normalize_url(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a.trim() == b.trim(),
    }
}

/// Substitutes a category into a seed URL template
///
/// The category is percent-encoded as a single path segment or query value,
/// so `"celulares e telefones"` cannot escape into other URL components.
///
/// # Examples
///
/// ```
/// use seller_sweep::url::expand_seed_url;
///
/// let url = expand_seed_url("https://lista.example.com/{category}", "fones").unwrap();
/// assert_eq!(url.as_str(), "https://lista.example.com/fones");
/// ```
pub fn expand_seed_url(template: &str, category: &str) -> UrlResult<Url> {
    if !template.contains(CATEGORY_PLACEHOLDER) {
        return Err(UrlError::MissingPlaceholder(template.to_string()));
    }

    let encoded: String = url::form_urlencoded::byte_serialize(category.trim().as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    let expanded = template.replace(CATEGORY_PLACEHOLDER, &encoded);

    let url = Url::parse(&expanded).map_err(|e| UrlError::Parse(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    Ok(url)
}
