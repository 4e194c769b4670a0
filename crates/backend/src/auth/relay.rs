//! Cookie relay: auth backend `Set-Cookie` strings to hardened cookies on our response.

use axum::http::{header, HeaderMap, HeaderValue};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use cookie::time::{Duration, OffsetDateTime};
use cookie::{Cookie, SameSite};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CookieParseError {
    #[error("cookie string has no name=value pair")]
    MissingPair,

    #[error("cookie name is empty")]
    EmptyName,

    #[error("invalid Max-Age {0:?}")]
    InvalidMaxAge(String),

    #[error("invalid Expires {0:?}")]
    InvalidExpires(String),

    #[error("cookie {0:?} contains characters not allowed in a header")]
    InvalidHeader(String),
}

/// One parsed auth cookie, ready to be written back out.
///
/// Name and value are carried verbatim. `Max-Age`, `Path` and `Expires` come
/// from the source string; the security attributes are always forced on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieDirective {
    pub name: String,
    pub value: String,
    pub max_age: Option<i64>,
    pub path: Option<String>,
    pub expires: Option<DateTime<Utc>>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl CookieDirective {
    /// Parse a raw `Set-Cookie` string.
    ///
    /// Absent attributes stay `None`. A present but malformed `Max-Age` or
    /// `Expires` rejects the whole cookie.
    pub fn parse(raw: &str) -> Result<Self, CookieParseError> {
        let pair = Cookie::parse(raw).map_err(|e| match e {
            cookie::ParseError::EmptyName => CookieParseError::EmptyName,
            _ => CookieParseError::MissingPair,
        })?;

        let mut directive = Self {
            name: pair.name().to_string(),
            value: pair.value().to_string(),
            max_age: None,
            path: None,
            expires: None,
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
        };

        for attr in raw.split(';').skip(1) {
            let (key, value) = match attr.split_once('=') {
                Some((k, v)) => (k.trim(), v.trim()),
                None => (attr.trim(), ""),
            };

            if key.eq_ignore_ascii_case("max-age") {
                let seconds = value
                    .parse::<i64>()
                    .map_err(|_| CookieParseError::InvalidMaxAge(value.to_string()))?;
                directive.max_age = Some(seconds);
            } else if key.eq_ignore_ascii_case("path") {
                if !value.is_empty() {
                    directive.path = Some(value.to_string());
                }
            } else if key.eq_ignore_ascii_case("expires") {
                let at = parse_http_date(value)
                    .ok_or_else(|| CookieParseError::InvalidExpires(value.to_string()))?;
                directive.expires = Some(at);
            }
        }

        Ok(directive)
    }

    pub fn to_cookie(&self) -> Cookie<'static> {
        let mut builder = Cookie::build((self.name.clone(), self.value.clone()))
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(self.same_site);

        if let Some(seconds) = self.max_age {
            builder = builder.max_age(Duration::seconds(seconds));
        }
        if let Some(path) = &self.path {
            builder = builder.path(path.clone());
        }
        if let Some(at) = self.expires.and_then(to_offset_datetime) {
            builder = builder.expires(at);
        }

        builder.build()
    }

    /// Value for an outgoing `Set-Cookie` header.
    pub fn to_set_cookie(&self) -> String {
        self.to_cookie().to_string()
    }
}

/// Outcome of one relay pass.
#[derive(Debug, Default)]
pub struct RelayReport {
    /// Names of the cookies written to the response
    pub relayed: Vec<String>,
    pub rejected: Vec<CookieParseError>,
}

/// Append one `Set-Cookie` header per valid raw cookie string.
///
/// Blank strings are skipped. Malformed cookies are logged and left out;
/// the remaining cookies are still relayed.
pub fn relay_cookies<I, S>(raw_cookies: I, headers: &mut HeaderMap) -> RelayReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut report = RelayReport::default();

    for raw in raw_cookies {
        let raw = raw.as_ref();
        if raw.trim().is_empty() {
            continue;
        }

        let parsed = CookieDirective::parse(raw).and_then(|directive| {
            match HeaderValue::from_str(&directive.to_set_cookie()) {
                Ok(value) => Ok((directive.name, value)),
                Err(_) => Err(CookieParseError::InvalidHeader(directive.name)),
            }
        });

        match parsed {
            Ok((name, value)) => {
                headers.append(header::SET_COOKIE, value);
                report.relayed.push(name);
            }
            Err(e) => {
                tracing::warn!("Dropping auth cookie from upstream: {}", e);
                report.rejected.push(e);
            }
        }
    }

    report
}

/// Raw `Set-Cookie` strings from an upstream response.
pub fn upstream_set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

/// RFC 1123 dates, falling back to the dashed RFC 850 form some servers emit.
fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let at = DateTime::parse_from_rfc2822(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%a, %d-%b-%Y %H:%M:%S GMT")
                .ok()
                .map(|naive| Utc.from_utc_datetime(&naive))
        })?;

    // Cookie expiry must also be representable on the outgoing side
    to_offset_datetime(at).map(|_| at)
}

fn to_offset_datetime(at: DateTime<Utc>) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(at.timestamp()).ok()
}
