//! Path classification for the session gate.

/// Access bucket a request path falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Sign-in and sign-up pages; authenticated visitors are sent away
    PublicOnly,
    /// Requires a verified session token
    Protected,
    /// Not guarded, passed through unchanged
    Unclassified,
}

/// Static route policy.
///
/// Public-only paths match exactly, protected paths match by prefix. A path
/// listed in both is public-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    public_only: Vec<String>,
    protected_prefixes: Vec<String>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(["/", "/signup"], ["/dashboard", "/api/v1/"])
    }
}

impl RouteTable {
    pub fn new<P, Q>(
        public_only: impl IntoIterator<Item = P>,
        protected_prefixes: impl IntoIterator<Item = Q>,
    ) -> Self
    where
        P: Into<String>,
        Q: Into<String>,
    {
        Self {
            public_only: public_only.into_iter().map(Into::into).collect(),
            protected_prefixes: protected_prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        if self.public_only.iter().any(|p| p == path) {
            RouteClass::PublicOnly
        } else if self
            .protected_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            RouteClass::Protected
        } else {
            RouteClass::Unclassified
        }
    }
}
