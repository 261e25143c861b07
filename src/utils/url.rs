// src/utils/url.rs

//! URL manipulation utilities.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

/// Hostname and path of a page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    pub domain: String,
    pub path: String,
}

fn scheme_prefix() -> &'static Regex {
    static SCHEME: OnceLock<Regex> = OnceLock::new();
    SCHEME.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("static regex"))
}

/// Split a raw URL into hostname and path.
///
/// Input without a scheme is read as `https://<raw>`. When the result still
/// does not parse as a URL with a host, the text is split on its first `/`.
///
/// # Examples
/// ```
/// use page_expiry::utils::url::split_url;
///
/// let parts = split_url("www.example.com/blog/post");
/// assert_eq!(parts.domain, "www.example.com");
/// assert_eq!(parts.path, "/blog/post");
/// ```
pub fn split_url(raw: &str) -> UrlParts {
    let absolute = if scheme_prefix().is_match(raw) {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    match Url::parse(&absolute) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => UrlParts {
                domain: host.to_string(),
                path: parsed.path().to_string(),
            },
            None => naive_split(raw),
        },
        Err(_) => naive_split(raw),
    }
}

fn naive_split(raw: &str) -> UrlParts {
    match raw.split_once('/') {
        Some((domain, rest)) => UrlParts {
            domain: if domain.is_empty() { raw } else { domain }.to_string(),
            path: format!("/{rest}"),
        },
        None => UrlParts {
            domain: raw.to_string(),
            path: "/".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_absolute() {
        let parts = split_url("https://legal.example.com/products/widget?x=1");
        assert_eq!(parts.domain, "legal.example.com");
        assert_eq!(parts.path, "/products/widget");
    }

    #[test]
    fn test_split_drops_port_and_lowercases_host() {
        let parts = split_url("http://Example.COM:8080/About");
        assert_eq!(parts.domain, "example.com");
        assert_eq!(parts.path, "/About");
    }

    #[test]
    fn test_split_schemeless() {
        let parts = split_url("example.com");
        assert_eq!(parts.domain, "example.com");
        assert_eq!(parts.path, "/");
    }

    #[test]
    fn test_split_falls_back_on_unparseable_host() {
        let parts = split_url("bad host/some/page");
        assert_eq!(parts.domain, "bad host");
        assert_eq!(parts.path, "/some/page");
    }

    #[test]
    fn test_naive_split_without_slash() {
        assert_eq!(
            naive_split("no-slash"),
            UrlParts {
                domain: "no-slash".into(),
                path: "/".into()
            }
        );
    }
}
