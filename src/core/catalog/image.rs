/// Prefix the hosting panel leaks into stored image paths.
const PUBLIC_HTML_PREFIX: &str = "/public_html/";

/// Build the URL of a train's header image.
///
/// Absolute `http(s)` paths are kept, server-side paths are rewritten
/// relative to the API base. A non-empty `cache_bust` is appended as `cb=`.
pub fn build_image_url(
    base_url: &str,
    path: Option<&str>,
    cache_bust: Option<&str>,
) -> Option<String> {
    let path = path.map(str::trim).filter(|p| !p.is_empty())?;

    let url = if path.starts_with("http") {
        path.to_string()
    } else {
        let path = match path.strip_prefix(PUBLIC_HTML_PREFIX) {
            Some(rest) => format!("/{rest}"),
            None => path.to_string(),
        };
        let origin = base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{origin}{path}")
        } else {
            format!("{origin}/{path}")
        }
    };

    let cb = cache_bust
        .map(str::trim)
        .filter(|cb| !cb.is_empty() && *cb != "0");
    Some(match cb {
        Some(cb) => {
            let sep = if url.contains('?') { '&' } else { '?' };
            format!("{url}{sep}cb={cb}")
        }
        None => url,
    })
}
