use crate::UrlError;
use url::Url;

/// Normalizes a URL for identity comparison
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or not HTTP(S)
/// 2. Lowercase the host (done by the parser)
/// 3. Remove dot segments and the trailing slash (except for root /)
/// 4. Remove the fragment
///
/// Query parameters are kept as-is: listing pages are frequently addressed
/// by query string, so dropping or reordering them could merge distinct pages.
///
/// # Examples
///
/// ```
/// use seller_sweep::url::normalize_url;
///
/// let url = normalize_url("https://220.LV/lv/veikals/acme/#top").unwrap();
/// assert_eq!(url.as_str(), "https://220.lv/lv/veikals/acme");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);
    url.set_fragment(None);

    Ok(url)
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}
