// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use url::Url;

use crate::config::consts::WWW_PREFIX;
use crate::config::ValidateLocation;

/// Host of `href` without port or credentials. `None` when `href` is not an absolute URL.
pub fn host_of(href: &str) -> Option<String> {
    let url = Url::parse(href).ok()?;
    url.host_str().map(str::to_string)
}

/// Path of `href` without query and fragment; `/` for an empty path.
pub fn path_of(href: &str) -> Option<String> {
    let url = Url::parse(href).ok()?;
    match url.path() {
        "" => Some("/".to_string()),
        path => Some(path.to_string()),
    }
}

/// Domain name without a leading `www.`.
///
/// `None` for unparsable hrefs and for hosts that are IP addresses.
pub fn domain_of(href: &str) -> Option<String> {
    let url = Url::parse(href).ok()?;
    let domain = url.domain()?;
    let domain = domain.strip_prefix(WWW_PREFIX).unwrap_or(domain);
    (!domain.is_empty()).then(|| domain.to_ascii_lowercase())
}

impl ValidateLocation {
    /// Whether two hrefs belong to the same page under this strategy.
    ///
    /// With [`ValidateLocation::None`] the page never counts as navigated.
    /// Hrefs that do not parse are compared as a whole.
    pub fn is_same_page(&self, previous: &str, current: &str) -> bool {
        match self {
            ValidateLocation::None => true,
            ValidateLocation::Href => previous == current,
            ValidateLocation::Path => match (path_of(previous), path_of(current)) {
                (Some(previous), Some(current)) => previous == current,
                _ => previous == current,
            },
        }
    }
}
