// src/checker/resolve.rs
// =============================================================================
// Turns raw href/src attribute values into absolute links.
//
// A Link is immutable: it is parsed once and then only read. It compares and
// hashes by its URL string, so two links are "the same link" exactly when
// their serialized URLs are identical.
// =============================================================================

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::error::ResolutionError;

// Characters a browser's encodeURI leaves untouched. Everything else
// (spaces, non-ASCII, quotes, a stray '%') gets percent-encoded.
const URI_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#');

/// A fully resolved absolute URL plus the parts the crawler keeps asking for.
#[derive(Debug, Clone)]
pub struct Link {
    url: Url,
    host: String,
}

impl Link {
    /// Parses an already absolute URL.
    pub fn parse(raw: &str) -> Result<Self, ResolutionError> {
        Url::parse(raw).map(Self::from).map_err(|source| ResolutionError {
            raw: raw.to_string(),
            source,
        })
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Host including an explicit port, e.g. `example.com:8080`.
    /// Empty for URLs without a host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The first value of the named query parameter, if present.
    pub fn query_value(&self, name: &str) -> Option<Cow<'_, str>> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

impl From<Url> for Link {
    fn from(url: Url) -> Self {
        let host = host_with_port(&url);
        Self { url, host }
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Link {}

impl Hash for Link {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host plus explicit port, the way a browser's `URL.host` reports it.
fn host_with_port(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}

// Resolves a raw attribute value against the page it was found on
//
// Parameters:
//   raw: the href/src value exactly as written in the markup
//   page: the URL of the page containing it
//
// Returns: the absolute Link, or ResolutionError if it cannot be resolved
//
// Examples:
//   page = "https://example.com/docs/"
//   raw = "intro.html" -> "https://example.com/docs/intro.html"
//   raw = "/a b" -> "https://example.com/a%20b"
//   raw = "/a%20b" -> "https://example.com/a%20b" (not "%2520")
pub fn resolve(raw: &str, page: &Url) -> Result<Link, ResolutionError> {
    let raw = raw.trim();
    let encoded = encode_uri(raw);

    page.join(&encoded)
        .map(Link::from)
        .map_err(|source| ResolutionError {
            raw: raw.to_string(),
            source,
        })
}

// Percent-encodes a URI unless it already carries an encoded octet,
// which would otherwise get encoded a second time.
fn encode_uri(raw: &str) -> Cow<'_, str> {
    if has_encoded_octet(raw) {
        Cow::Borrowed(raw)
    } else {
        utf8_percent_encode(raw, URI_SET).into()
    }
}

fn has_encoded_octet(raw: &str) -> bool {
    raw.as_bytes().windows(3).any(|window| {
        window[0] == b'%' && window[1].is_ascii_hexdigit() && window[2].is_ascii_hexdigit()
    })
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why implement PartialEq and Hash by hand?
//    - Two Links are the same link when their URL strings match
//    - The cached host is derived from the URL, so comparing it too adds
//      nothing
//    - HashSet<Link> needs Hash and Eq to agree
//
// 2. What is an AsciiSet?
//    - A bitmap of the ASCII bytes that must be percent-encoded
//    - NON_ALPHANUMERIC.remove(b'/') means "everything except letters,
//      digits and '/'"
// -----------------------------------------------------------------------------
