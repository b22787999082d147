// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

/// Replace `{name}` placeholders in an ad unit path.
///
/// Placeholders without a matching variable are left untouched so that a
/// misconfigured path is still visible in the ad server's reports.
pub fn resolve_ad_unit_path(path: &str, variables: &HashMap<String, String>) -> String {
    let mut resolved = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(start) = rest.find('{') {
        resolved.push_str(&rest[..start]);
        let after_open = &rest[start + 1..];
        match after_open.find('}') {
            Some(end) => {
                let name = &after_open[..end];
                match variables.get(name) {
                    Some(value) => resolved.push_str(value),
                    None => {
                        resolved.push('{');
                        resolved.push_str(name);
                        resolved.push('}');
                    }
                }
                rest = &after_open[end + 1..];
            }
            None => {
                resolved.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    resolved.push_str(rest);
    resolved
}
