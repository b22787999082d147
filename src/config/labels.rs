// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::AdSlot;
use std::collections::HashSet;

/// Decides slot availability from the labels active for a request.
#[derive(Debug, Clone, Default)]
pub struct LabelFilter {
    labels: HashSet<String>,
}

impl LabelFilter {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// A slot is available when every `label_all` label is active and, if
    /// `label_any` is non-empty, at least one of those is active too.
    pub fn is_slot_available(&self, slot: &AdSlot) -> bool {
        let all = slot.label_all.iter().all(|label| self.labels.contains(label));
        let any = slot.label_any.is_empty()
            || slot.label_any.iter().any(|label| self.labels.contains(label));
        all && any
    }

    pub fn labels(&self) -> &HashSet<String> {
        &self.labels
    }
}
