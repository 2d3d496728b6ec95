//! Static access policy
//!
//! A fixed, ordered rule table deciding whether a request requires
//! authentication. Exact-path rules take precedence over prefix rules, and
//! method-scoped rules take precedence over method-agnostic ones for the
//! same path. Unmatched requests default to protected.

use axum::http::Method;

/// Whether a route requires authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No authentication required; credentials are optional, not rejected
    Public,

    /// Allowed only with verified credentials
    Protected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathPattern {
    Exact(String),
    /// A trailing-wildcard rule (`"/foo/*"`) matching any sub-path
    Prefix(String),
}

impl PathPattern {
    fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/*") {
            Some(prefix) => PathPattern::Prefix(prefix.to_string()),
            None => PathPattern::Exact(pattern.to_string()),
        }
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(p) => path == p,
            PathPattern::Prefix(p) => path == p || path.starts_with(&format!("{}/", p)),
        }
    }

    fn is_exact(&self) -> bool {
        matches!(self, PathPattern::Exact(_))
    }
}

#[derive(Debug, Clone)]
struct Rule {
    /// `None` means the rule applies to every method
    method: Option<Method>,
    pattern: PathPattern,
    access: Access,
}

impl Rule {
    fn matches(&self, method: &Method, path: &str) -> bool {
        let method_ok = match &self.method {
            Some(m) => m == method,
            None => true,
        };
        method_ok && self.pattern.matches(path)
    }

    /// Specificity used to rank overlapping matches: exact beats prefix,
    /// method-scoped beats method-agnostic.
    fn specificity(&self) -> u8 {
        let exact = if self.pattern.is_exact() { 2 } else { 0 };
        let scoped = if self.method.is_some() { 1 } else { 0 };
        exact + scoped
    }
}

/// The static rule table consulted by the authentication gate
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    rules: Vec<Rule>,
}

impl AccessPolicy {
    /// Create an empty policy (every request is protected)
    pub fn new() -> Self {
        Self::default()
    }

    /// The rule table used by the service: login, the user preview and the
    /// health endpoint are public; everything else requires authentication.
    pub fn service_defaults() -> Self {
        Self::new()
            .public(Method::POST, "/auth/login")
            .public(Method::GET, "/user")
            .public(Method::GET, "/health")
    }

    /// Add a method-scoped public rule
    pub fn public(mut self, method: Method, pattern: &str) -> Self {
        self.rules.push(Rule {
            method: Some(method),
            pattern: PathPattern::parse(pattern),
            access: Access::Public,
        });
        self
    }

    /// Add a public rule applying to every method
    pub fn public_any_method(mut self, pattern: &str) -> Self {
        self.rules.push(Rule {
            method: None,
            pattern: PathPattern::parse(pattern),
            access: Access::Public,
        });
        self
    }

    /// Add a method-scoped protected rule
    pub fn protected(mut self, method: Method, pattern: &str) -> Self {
        self.rules.push(Rule {
            method: Some(method),
            pattern: PathPattern::parse(pattern),
            access: Access::Protected,
        });
        self
    }

    /// Add a protected rule applying to every method
    pub fn protected_any_method(mut self, pattern: &str) -> Self {
        self.rules.push(Rule {
            method: None,
            pattern: PathPattern::parse(pattern),
            access: Access::Protected,
        });
        self
    }

    /// Classify a request
    ///
    /// The most specific matching rule wins; among equally specific rules
    /// the earliest wins. With no match the request is protected.
    pub fn classify(&self, method: &Method, path: &str) -> Access {
        let mut best: Option<&Rule> = None;
        for rule in self.rules.iter().filter(|r| r.matches(method, path)) {
            match best {
                // strictly greater, so the earliest rule wins ties
                Some(current) if rule.specificity() <= current.specificity() => {}
                _ => best = Some(rule),
            }
        }
        best.map(|r| r.access).unwrap_or(Access::Protected)
    }
}
