//! Fast URL slicing utilities
//!
//! These functions avoid allocations and work directly on string slices.
//! Nothing here lowercases, decodes or re-encodes: the slices handed back are
//! the exact bytes of the input, which is what the rewriter relies on.

use std::borrow::Cow;

/// Error type for absolute URL parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("missing scheme separator \"://\"")]
    MissingScheme,
    #[error("invalid scheme: {0}")]
    InvalidScheme(String),
    #[error("empty host")]
    EmptyHost,
    #[error("invalid character at byte {0}")]
    InvalidCharacter(usize),
}

// =============================================================================
// Scheme Extraction
// =============================================================================

/// URL schemes the extension cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

/// Fast scheme extraction without URL parsing.
/// Returns None for anything that is not http(s).
#[inline]
pub fn extract_scheme(url: &str) -> Option<Scheme> {
    let bytes = url.as_bytes();
    if bytes.len() >= 8 && bytes[..8].eq_ignore_ascii_case(b"https://") {
        Some(Scheme::Https)
    } else if bytes.len() >= 7 && bytes[..7].eq_ignore_ascii_case(b"http://") {
        Some(Scheme::Http)
    } else {
        None
    }
}

/// Get the position after "://".
#[inline]
pub fn get_scheme_end(url: &str) -> Option<usize> {
    let bytes = url.as_bytes();

    // Find ':'
    let colon_pos = bytes.iter().position(|&b| b == b':')?;

    // Check for "://"
    if bytes.len() > colon_pos + 2
        && bytes[colon_pos + 1] == b'/'
        && bytes[colon_pos + 2] == b'/'
    {
        return Some(colon_pos + 3);
    }

    None
}

// =============================================================================
// Host Extraction
// =============================================================================

/// End of the authority component: first of '/', '?', '#', or end of string.
#[inline]
fn authority_end(bytes: &[u8], scheme_end: usize) -> usize {
    bytes[scheme_end..]
        .iter()
        .position(|&b| b == b'/' || b == b'?' || b == b'#')
        .map_or(bytes.len(), |i| scheme_end + i)
}

/// Extract host with port if present (the URL "host" in browser terms).
/// Userinfo is skipped.
#[inline]
pub fn extract_host_with_port(url: &str) -> Option<&str> {
    let scheme_end = get_scheme_end(url)?;
    let host_end = authority_end(url.as_bytes(), scheme_end);
    let authority = &url[scheme_end..host_end];

    // Handle userinfo
    match authority.rfind('@') {
        Some(at_pos) => Some(&authority[at_pos + 1..]),
        None => Some(authority),
    }
}

/// Fast host extraction without allocations.
/// Returns a slice into the input URL, without port.
#[inline]
pub fn extract_host(url: &str) -> Option<&str> {
    let host_with_port = extract_host_with_port(url)?;
    Some(strip_port(host_with_port))
}

fn strip_port(host_with_port: &str) -> &str {
    // Bracketed IPv6 literal keeps its colons
    if host_with_port.starts_with('[') {
        return match host_with_port.find(']') {
            Some(end) => &host_with_port[..=end],
            None => host_with_port,
        };
    }
    match host_with_port.find(':') {
        Some(colon) => &host_with_port[..colon],
        None => host_with_port,
    }
}

// =============================================================================
// Path Extraction
// =============================================================================

/// Extract the path portion of a URL.
#[inline]
pub fn extract_path(url: &str) -> &str {
    let scheme_end = match get_scheme_end(url) {
        Some(pos) => pos,
        None => return "/",
    };

    let bytes = url.as_bytes();
    let path_start = authority_end(bytes, scheme_end);
    if path_start >= bytes.len() || bytes[path_start] != b'/' {
        return "/";
    }

    // Find path end
    let path_end = bytes[path_start..]
        .iter()
        .position(|&b| b == b'?' || b == b'#')
        .map_or(bytes.len(), |i| path_start + i);

    &url[path_start..path_end]
}

/// Extract path + query + fragment exactly as written.
///
/// A URL without a path (`https://host?q`) gets the implicit `/`, matching
/// what a browser reports as its pathname.
pub fn extract_tail(url: &str) -> Cow<'_, str> {
    let scheme_end = match get_scheme_end(url) {
        Some(pos) => pos,
        None => return Cow::Borrowed("/"),
    };

    let bytes = url.as_bytes();
    let tail_start = authority_end(bytes, scheme_end);
    let tail = &url[tail_start..];

    if tail.starts_with('/') {
        Cow::Borrowed(tail)
    } else {
        Cow::Owned(format!("/{}", tail))
    }
}

// =============================================================================
// Absolute URL Validation
// =============================================================================

/// Borrowed view of the components of an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts<'a> {
    pub scheme: &'a str,
    /// Host including port, without userinfo
    pub host_with_port: &'a str,
    /// Host without port
    pub host: &'a str,
    pub path: &'a str,
    /// Path + query + fragment
    pub tail: Cow<'a, str>,
}

/// Validate and split an absolute URL.
pub fn parse_absolute(url: &str) -> Result<UrlParts<'_>, UrlError> {
    if let Some(pos) = url.bytes().position(|b| b.is_ascii_whitespace() || b.is_ascii_control()) {
        return Err(UrlError::InvalidCharacter(pos));
    }

    let scheme_end = get_scheme_end(url).ok_or(UrlError::MissingScheme)?;
    let scheme = &url[..scheme_end - 3];
    let valid_scheme = scheme
        .bytes()
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic())
        && scheme
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'));
    if !valid_scheme {
        return Err(UrlError::InvalidScheme(scheme.to_string()));
    }

    let host_with_port = extract_host_with_port(url).ok_or(UrlError::MissingScheme)?;
    let host = strip_port(host_with_port);
    if host.is_empty() {
        return Err(UrlError::EmptyHost);
    }

    Ok(UrlParts {
        scheme,
        host_with_port,
        host,
        path: extract_path(url),
        tail: extract_tail(url),
    })
}
