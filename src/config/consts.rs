// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Key-value key carrying the A/B test bucket of the current page view
pub const AB_TEST_KEY: &str = "ABtest";
/// Lower bound of the A/B test bucket range (inclusive)
pub const AB_TEST_MIN: u32 = 1;
/// Upper bound of the A/B test bucket range (inclusive)
pub const AB_TEST_MAX: u32 = 100;
/// Key-value key carrying the page's domain label
pub const DOMAIN_KEY: &str = "domain";
/// Hostname prefix stripped when deriving the domain label
pub const WWW_PREFIX: &str = "www.";
