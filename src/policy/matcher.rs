//! Allow-list matching logic.
//!
//! # Responsibilities
//! - Match the request path against regex patterns (unanchored search)
//!   in the backtracking dialect of `fancy-regex`, so look-around and
//!   backreferences such as `^/(?!admin)` are accepted
//! - Match the client address against single addresses and CIDR blocks
//! - Combine allow-list entries with OR semantics
//!
//! # Design Decisions
//! - Patterns are searched, not fully matched: `admin` allows `/admin/users`
//! - A client address that does not parse never matches an IP entry
//! - Entries are compiled once per settings load, never per request
//! - A pattern that exceeds the backtrack limit on some path does not match it

use fancy_regex::Regex;
use ipnet::IpNet;
use std::net::IpAddr;

use crate::http::RequestView;

/// Trait for matching requests against an allow-list entry.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request is covered by this entry.
    fn matches(&self, view: &RequestView) -> bool;
}

/// Returns true if at least one matcher covers the request.
pub fn any_match<M: Matcher>(matchers: &[M], view: &RequestView) -> bool {
    matchers.iter().any(|m| m.matches(view))
}

/// Matches the request path with an unanchored regular expression.
#[derive(Debug, Clone)]
pub struct PathPatternMatcher {
    pattern: Regex,
}

impl PathPatternMatcher {
    /// Compile a path pattern.
    pub fn new(pattern: &str) -> Result<Self, fancy_regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Matcher for PathPatternMatcher {
    fn matches(&self, view: &RequestView) -> bool {
        match self.pattern.is_match(view.path()) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::warn!(
                    pattern = self.pattern.as_str(),
                    path = view.path(),
                    error = %e,
                    "Allowed path pattern failed to run"
                );
                false
            }
        }
    }
}

/// Allowed client range: one address or a network block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IpRange {
    Host(IpAddr),
    Net(IpNet),
}

/// Matches the client address against a single IP or a CIDR block.
#[derive(Debug, Clone)]
pub struct IpRangeMatcher {
    range: IpRange,
}

impl IpRangeMatcher {
    /// Parse an allow-list entry such as `127.0.0.1`, `10.0.0.0/8` or `fd00::/8`.
    ///
    /// Host bits in a CIDR entry are ignored, so `10.1.2.3/8` covers `10.0.0.0/8`.
    pub fn new(entry: &str) -> Result<Self, ipnet::AddrParseError> {
        let entry = entry.trim();
        let range = match entry.parse::<IpNet>() {
            Ok(net) => IpRange::Net(net.trunc()),
            Err(net_err) => match entry.parse::<IpAddr>() {
                Ok(addr) => IpRange::Host(addr),
                Err(_) => return Err(net_err),
            },
        };
        Ok(Self { range })
    }

    /// Returns true if the address falls in this range.
    pub fn contains(&self, addr: &IpAddr) -> bool {
        match &self.range {
            IpRange::Host(host) => host == addr,
            IpRange::Net(net) => net.contains(addr),
        }
    }
}

impl Matcher for IpRangeMatcher {
    fn matches(&self, view: &RequestView) -> bool {
        view.ip().is_some_and(|addr| self.contains(&addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(path: &str, addr: &str) -> RequestView {
        RequestView::new(path, addr)
    }

    #[test]
    fn test_path_pattern_is_unanchored() {
        let matcher = PathPatternMatcher::new("admin").unwrap();

        assert!(matcher.matches(&view("/admin", "")));
        assert!(matcher.matches(&view("/users/admin/edit", "")));
        assert!(!matcher.matches(&view("/users", "")));
    }

    #[test]
    fn test_path_pattern_honours_explicit_anchors() {
        let matcher = PathPatternMatcher::new("^/health$").unwrap();

        assert!(matcher.matches(&view("/health", "")));
        assert!(!matcher.matches(&view("/health/deep", "")));
        assert!(!matcher.matches(&view("/api/health", "")));
    }

    #[test]
    fn test_negative_lookahead_pattern() {
        let matcher = PathPatternMatcher::new("^/(?!admin)").unwrap();

        assert!(matcher.matches(&view("/orders", "")));
        assert!(matcher.matches(&view("/", "")));
        assert!(!matcher.matches(&view("/admin/users", "")));
    }

    #[test]
    fn test_lookbehind_pattern() {
        let matcher = PathPatternMatcher::new("(?<=/api/)status").unwrap();

        assert!(matcher.matches(&view("/api/status", "")));
        assert!(!matcher.matches(&view("/status", "")));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        assert!(PathPatternMatcher::new("(unclosed").is_err());
    }

    #[test]
    fn test_cidr_block() {
        let matcher = IpRangeMatcher::new("10.0.0.0/8").unwrap();

        assert!(matcher.matches(&view("/", "10.1.2.3")));
        assert!(!matcher.matches(&view("/", "192.168.1.1")));
    }

    #[test]
    fn test_single_address() {
        let matcher = IpRangeMatcher::new("127.0.0.1").unwrap();

        assert!(matcher.matches(&view("/", "127.0.0.1")));
        assert!(!matcher.matches(&view("/", "127.0.0.2")));
    }

    #[test]
    fn test_host_bits_in_cidr_ignored() {
        let matcher = IpRangeMatcher::new("10.9.9.9/8").unwrap();
        assert!(matcher.matches(&view("/", "10.1.2.3")));
    }

    #[test]
    fn test_ipv6_block() {
        let matcher = IpRangeMatcher::new("2001:db8::/32").unwrap();

        assert!(matcher.matches(&view("/", "2001:db8::1")));
        assert!(!matcher.matches(&view("/", "2001:db9::1")));
        assert!(!matcher.matches(&view("/", "10.1.2.3")));
    }

    #[test]
    fn test_malformed_client_address_never_matches() {
        let matcher = IpRangeMatcher::new("0.0.0.0/0").unwrap();

        assert!(!matcher.matches(&view("/", "")));
        assert!(!matcher.matches(&view("/", "not-an-ip")));
        assert!(!matcher.matches(&view("/", "10.0.0.1:8080")));
    }

    #[test]
    fn test_invalid_entry_rejected() {
        assert!(IpRangeMatcher::new("10.0.0.0/33").is_err());
        assert!(IpRangeMatcher::new("office").is_err());
    }

    #[test]
    fn test_any_match() {
        let matchers = vec![
            PathPatternMatcher::new("^/status").unwrap(),
            PathPatternMatcher::new("\\.css$").unwrap(),
        ];

        assert!(any_match(&matchers, &view("/assets/site.css", "")));
        assert!(!any_match(&matchers, &view("/checkout", "")));
        assert!(!any_match::<PathPatternMatcher>(&[], &view("/status", "")));
    }
}
