// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;

use crate::config::{Hooks, RuntimeConfig, StaticConfig};

/// Publicly observable state of the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Configurable,
    Configured,
    RequestAds,
    SpaRequestAds,
    SpaFinished,
    Finished,
    Error,
}

impl StateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKind::Configurable => "configurable",
            StateKind::Configured => "configured",
            StateKind::RequestAds => "requestAds",
            StateKind::SpaRequestAds => "spa-requestAds",
            StateKind::SpaFinished => "spa-finished",
            StateKind::Finished => "finished",
            StateKind::Error => "error",
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The tag's state together with the data that only exists in that state.
///
/// A runtime config held by value is still collecting publisher calls; one
/// held in an `Arc` is frozen and belongs to a running or settled cycle.
#[derive(Debug)]
pub(crate) enum TagState {
    Configurable {
        runtime: RuntimeConfig,
        /// `requestAds()` was called before `configure()`
        initialize: bool,
    },
    Configured {
        config: Arc<StaticConfig>,
        runtime: RuntimeConfig,
    },
    RequestAds {
        config: Arc<StaticConfig>,
        runtime: Arc<RuntimeConfig>,
    },
    SpaRequestAds {
        config: Arc<StaticConfig>,
        runtime: Arc<RuntimeConfig>,
        next: RuntimeConfig,
        href: String,
        cycle: u64,
    },
    SpaFinished {
        config: Arc<StaticConfig>,
        runtime: RuntimeConfig,
        /// Frozen config of the settled cycle; refreshes run against it
        cycle_runtime: Arc<RuntimeConfig>,
        href: String,
    },
    Finished {
        config: Arc<StaticConfig>,
        runtime: Arc<RuntimeConfig>,
    },
    Error {
        config: Arc<StaticConfig>,
        runtime: Arc<RuntimeConfig>,
    },
}

impl TagState {
    pub(crate) fn initial() -> Self {
        TagState::Configurable {
            runtime: RuntimeConfig::new(),
            initialize: false,
        }
    }

    pub(crate) fn kind(&self) -> StateKind {
        match self {
            TagState::Configurable { .. } => StateKind::Configurable,
            TagState::Configured { .. } => StateKind::Configured,
            TagState::RequestAds { .. } => StateKind::RequestAds,
            TagState::SpaRequestAds { .. } => StateKind::SpaRequestAds,
            TagState::SpaFinished { .. } => StateKind::SpaFinished,
            TagState::Finished { .. } => StateKind::Finished,
            TagState::Error { .. } => StateKind::Error,
        }
    }

    pub(crate) fn config(&self) -> Option<&Arc<StaticConfig>> {
        match self {
            TagState::Configurable { .. } => None,
            TagState::Configured { config, .. }
            | TagState::RequestAds { config, .. }
            | TagState::SpaRequestAds { config, .. }
            | TagState::SpaFinished { config, .. }
            | TagState::Finished { config, .. }
            | TagState::Error { config, .. } => Some(config),
        }
    }

    /// Id of the SPA cycle in flight, if one is.
    pub(crate) fn active_spa_cycle(&self) -> Option<u64> {
        match self {
            TagState::SpaRequestAds { cycle, .. } => Some(*cycle),
            _ => None,
        }
    }

    /// The runtime config publisher calls currently land on, if any.
    pub(crate) fn pending_runtime_mut(&mut self) -> Option<&mut RuntimeConfig> {
        match self {
            TagState::Configurable { runtime, .. }
            | TagState::Configured { runtime, .. }
            | TagState::SpaFinished { runtime, .. } => Some(runtime),
            TagState::SpaRequestAds { next, .. } => Some(next),
            TagState::RequestAds { .. }
            | TagState::Finished { .. }
            | TagState::Error { .. } => None,
        }
    }

    /// Hooks stay registrable in every state; a frozen runtime config is copied on write.
    pub(crate) fn hooks_mut(&mut self) -> &mut Hooks {
        match self {
            TagState::Configurable { runtime, .. }
            | TagState::Configured { runtime, .. }
            | TagState::SpaFinished { runtime, .. } => &mut runtime.hooks,
            TagState::SpaRequestAds { next, .. } => &mut next.hooks,
            TagState::RequestAds { runtime, .. }
            | TagState::Finished { runtime, .. }
            | TagState::Error { runtime, .. } => &mut Arc::make_mut(runtime).hooks,
        }
    }

    /// The runtime config a reader should see: the pending one, else the frozen one.
    pub(crate) fn visible_runtime(&self) -> RuntimeConfig {
        match self {
            TagState::Configurable { runtime, .. }
            | TagState::Configured { runtime, .. }
            | TagState::SpaFinished { runtime, .. } => runtime.clone(),
            TagState::SpaRequestAds { next, .. } => next.clone(),
            TagState::RequestAds { runtime, .. }
            | TagState::Finished { runtime, .. }
            | TagState::Error { runtime, .. } => runtime.as_ref().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names_match_public_contract() {
        let names: Vec<&str> = [
            StateKind::Configurable,
            StateKind::Configured,
            StateKind::RequestAds,
            StateKind::SpaRequestAds,
            StateKind::SpaFinished,
            StateKind::Finished,
            StateKind::Error,
        ]
        .iter()
        .map(StateKind::as_str)
        .collect();
        assert_eq!(
            names,
            vec![
                "configurable",
                "configured",
                "requestAds",
                "spa-requestAds",
                "spa-finished",
                "finished",
                "error"
            ]
        );
    }

    #[test]
    fn frozen_states_take_no_mutations() {
        let config = Arc::new(StaticConfig::default());
        let mut finished = TagState::Finished {
            config: config.clone(),
            runtime: Arc::new(RuntimeConfig::new()),
        };
        assert!(finished.pending_runtime_mut().is_none());

        let mut spa = TagState::SpaRequestAds {
            config,
            runtime: Arc::new(RuntimeConfig::new()),
            next: RuntimeConfig::new(),
            href: "https://example.com/".into(),
            cycle: 1,
        };
        if let Some(next) = spa.pending_runtime_mut() {
            next.set_targeting("k", "v");
        }
        assert!(spa.visible_runtime().key_values.contains_key("k"));
        assert_eq!(spa.active_spa_cycle(), Some(1));
        assert_eq!(finished.active_spa_cycle(), None);
    }
}
