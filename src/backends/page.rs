// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Mutex;

use crate::traits::PageEnvironment;
use crate::utils::sync::lock;

/// A page whose location only changes through [`StaticPage::navigate`].
#[derive(Debug)]
pub struct StaticPage {
    href: Mutex<String>,
}

impl StaticPage {
    pub fn new(href: &str) -> Self {
        Self {
            href: Mutex::new(href.to_string()),
        }
    }

    /// Client-side navigation to `href`.
    pub fn navigate(&self, href: &str) {
        *lock(&self.href) = href.to_string();
    }
}

impl PageEnvironment for StaticPage {
    fn href(&self) -> String {
        lock(&self.href).clone()
    }
}
