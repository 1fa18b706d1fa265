//! Domain normalization
//!
//! Every lookup and every storage key uses the normalized form: the hostname
//! without a leading `www.` label. `www.example.com` and `example.com` are the
//! same domain for all purposes.

use url::Url;

const WWW_PREFIX: &str = "www.";

/// Normalized domain usable as a profile key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Domain(String);

impl Domain {
    /// Normalize a hostname
    ///
    /// Returns `None` for an empty hostname.
    pub fn normalize(hostname: &str) -> Option<Self> {
        let lowered = hostname.trim().to_ascii_lowercase();
        let host = lowered
            .strip_prefix(WWW_PREFIX)
            .unwrap_or(&lowered)
            .trim_end_matches('.');
        if host.is_empty() {
            return None;
        }
        Some(Self(host.to_string()))
    }

    /// Registrable parent: the last two labels of a domain with more than two
    ///
    /// `m.example.com` yields `example.com`; `example.com` has no parent.
    pub fn parent(&self) -> Option<Self> {
        let labels: Vec<&str> = self.0.split('.').collect();
        if labels.len() <= 2 {
            return None;
        }
        Some(Self(labels[labels.len() - 2..].join(".")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Domain of the page a context is attached to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageDomain {
    Resolved(Domain),

    /// The URL could not be parsed or has no host
    Unknown,
}

impl PageDomain {
    /// Derive the page domain from a full URL
    pub fn from_url(url: &str) -> Self {
        match Url::parse(url) {
            Ok(parsed) => parsed
                .host_str()
                .and_then(Domain::normalize)
                .map_or(Self::Unknown, Self::Resolved),
            Err(_) => Self::Unknown,
        }
    }

    /// Derive the page domain from a bare hostname
    pub fn from_hostname(hostname: &str) -> Self {
        Domain::normalize(hostname).map_or(Self::Unknown, Self::Resolved)
    }

    pub fn domain(&self) -> Option<&Domain> {
        match self {
            Self::Resolved(domain) => Some(domain),
            Self::Unknown => None,
        }
    }

    /// Label shown to the user
    pub fn label(&self) -> &str {
        match self {
            Self::Resolved(domain) => domain.as_str(),
            Self::Unknown => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn www_prefix_is_stripped() {
        assert_eq!(
            Domain::normalize("www.example.com"),
            Domain::normalize("example.com")
        );
        assert_eq!(
            Domain::normalize("www.example.com").unwrap().as_str(),
            "example.com"
        );
    }

    #[test]
    fn only_leading_www_label_is_stripped() {
        assert_eq!(
            Domain::normalize("cdn.www.example.com").unwrap().as_str(),
            "cdn.www.example.com"
        );
        assert_eq!(Domain::normalize("wwwexample.com").unwrap().as_str(), "wwwexample.com");
    }

    #[test]
    fn empty_hostname_has_no_domain() {
        assert_eq!(Domain::normalize(""), None);
        assert_eq!(Domain::normalize("www."), None);
    }

    #[test]
    fn parent_is_last_two_labels() {
        let domain = Domain::normalize("m.example.com").unwrap();
        assert_eq!(domain.parent().unwrap().as_str(), "example.com");

        let deep = Domain::normalize("a.b.c.example.com").unwrap();
        assert_eq!(deep.parent().unwrap().as_str(), "example.com");

        assert_eq!(Domain::normalize("example.com").unwrap().parent(), None);
        assert_eq!(Domain::normalize("localhost").unwrap().parent(), None);
    }

    #[test]
    fn page_domain_from_url() {
        assert_eq!(
            PageDomain::from_url("https://www.youtube.com/watch?v=1"),
            PageDomain::Resolved(Domain::normalize("youtube.com").unwrap())
        );
        assert_eq!(PageDomain::from_url("not a url"), PageDomain::Unknown);
        assert_eq!(PageDomain::from_url("about:blank"), PageDomain::Unknown);
        assert_eq!(PageDomain::from_url("not a url").label(), "Unknown");
    }
}
