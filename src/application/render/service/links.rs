use url::{Host, Url};

const APP_SCHEME: &str = "tg";

/// Whether the chat API accepts `raw` as the target of a text link.
///
/// Accepts the in-app deep-link scheme, or http(s) URLs whose host is a
/// public dotted domain or a non-loopback IPv4 address. Fragments, relative
/// paths and loopback hosts are rejected and the link renders as plain text.
pub(crate) fn is_linkable(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw.trim()) else {
        return false;
    };

    match url.scheme() {
        APP_SCHEME => true,
        "http" | "https" => match url.host() {
            Some(Host::Domain(domain)) => {
                let domain = domain.to_ascii_lowercase();
                domain != "localhost" && domain.contains('.')
            }
            Some(Host::Ipv4(addr)) => !addr.is_loopback() && !addr.is_unspecified(),
            Some(Host::Ipv6(_)) | None => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::is_linkable;

    #[test]
    fn accepts_public_http_urls() {
        assert!(is_linkable("https://example.com"));
        assert!(is_linkable("http://docs.rs/url/latest/url/"));
        assert!(is_linkable("HTTPS://Example.COM/path?q=1"));
        assert!(is_linkable("http://192.168.1.10/status"));
    }

    #[test]
    fn accepts_app_deep_links() {
        assert!(is_linkable("tg://resolve?domain=rustlang"));
    }

    #[test]
    fn rejects_local_and_relative_targets() {
        assert!(!is_linkable("#anchor"));
        assert!(!is_linkable("/relative/path"));
        assert!(!is_linkable("http://localhost:8080"));
        assert!(!is_linkable("http://127.0.0.1"));
        assert!(!is_linkable("http://0.0.0.0"));
        assert!(!is_linkable("http://[::1]/"));
        assert!(!is_linkable("http://intranet/"));
        assert!(!is_linkable("mailto:user@example.com"));
        assert!(!is_linkable("ftp://files.example.com"));
        assert!(!is_linkable(""));
    }
}
