use crate::{UrlError, UrlResult};
use url::Url;

/// Parses an absolute URL, mapping failures into [`UrlError`]
pub fn parse_url(raw: &str) -> UrlResult<Url> {
    Url::parse(raw).map_err(|source| UrlError::Parse {
        url: raw.to_string(),
        source,
    })
}

/// Returns the host of a URL, including the port when one is explicit
///
/// # Examples
///
/// ```
/// use sumi_lens::url::host_with_port;
/// use url::Url;
///
/// let url = Url::parse("http://example.com:8080/page").unwrap();
/// assert_eq!(host_with_port(&url), "example.com:8080");
/// ```
pub fn host_with_port(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        _ => String::new(),
    }
}

/// Renders `{scheme}://{host}` for a URL
pub fn origin_of(url: &Url) -> String {
    format!("{}://{}", url.scheme(), host_with_port(url))
}

/// The conventional favicon location for the host of `url`
pub fn default_icon(url: &Url) -> String {
    format!("{}/favicon.ico", origin_of(url))
}

/// Resolves a reference found in markup against the scheme and host of `base`
///
/// Absolute references are returned as parsed. Anything without a scheme,
/// including protocol-relative and path-relative references, is joined onto
/// `{scheme}://{host}/`, so the path of `base` never leaks into the result.
///
/// # Examples
///
/// ```
/// use sumi_lens::url::absolutize;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/blog/post").unwrap();
/// let image = absolutize("img/cover.png", &base).unwrap();
/// assert_eq!(image.as_str(), "https://example.com/img/cover.png");
/// ```
pub fn absolutize(reference: &str, base: &Url) -> UrlResult<Url> {
    let reference = reference.trim();
    match Url::parse(reference) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let origin = parse_url(&format!("{}/", origin_of(base)))?;
            origin.join(reference).map_err(|source| UrlError::Parse {
                url: reference.to_string(),
                source,
            })
        }
        Err(source) => Err(UrlError::Parse {
            url: reference.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/section/page?x=1").unwrap()
    }

    #[test]
    fn test_host_without_port() {
        assert_eq!(host_with_port(&base()), "example.com");
    }

    #[test]
    fn test_default_port_is_omitted() {
        let url = Url::parse("https://example.com:443/").unwrap();
        assert_eq!(host_with_port(&url), "example.com");
    }

    #[test]
    fn test_default_icon() {
        let url = Url::parse("http://127.0.0.1:3000/a/b").unwrap();
        assert_eq!(default_icon(&url), "http://127.0.0.1:3000/favicon.ico");
    }

    #[test]
    fn test_absolutize_absolute() {
        let url = absolutize("https://cdn.example.org/a.png", &base()).unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.org/a.png");
    }

    #[test]
    fn test_absolutize_root_relative() {
        let url = absolutize("/favicon.png", &base()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/favicon.png");
    }

    #[test]
    fn test_absolutize_path_relative_ignores_base_path() {
        let url = absolutize("cover.jpg", &base()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/cover.jpg");
    }

    #[test]
    fn test_absolutize_protocol_relative() {
        let url = absolutize("//cdn.example.org/a.png", &base()).unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.org/a.png");
    }

    #[test]
    fn test_absolutize_keeps_query() {
        let url = absolutize("/img?id=4", &base()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/img?id=4");
    }

    #[test]
    fn test_absolutize_invalid_port() {
        assert!(absolutize("http://example.com:99999/", &base()).is_err());
    }
}
