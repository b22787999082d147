// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Mutex;

use crate::observability::messages::tag::CommandQueueDrained;
use crate::tag::Tag;
use crate::utils::sync::lock;

pub type TagCommand = Box<dyn FnOnce(&Tag) + Send>;

enum QueueState {
    Buffering(Vec<TagCommand>),
    Installed(Tag),
}

/// Publisher commands issued before the tag exists.
///
/// Commands are buffered until [`CommandQueue::install`], drained in order at
/// that point, and run immediately afterwards.
pub struct CommandQueue {
    state: Mutex<QueueState>,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState::Buffering(Vec::new())),
        }
    }

    pub fn push(&self, command: impl FnOnce(&Tag) + Send + 'static) {
        let tag = {
            let mut state = lock(&self.state);
            match &mut *state {
                QueueState::Buffering(commands) => {
                    commands.push(Box::new(command));
                    return;
                }
                QueueState::Installed(tag) => tag.clone(),
            }
        };
        command(&tag);
    }

    /// Drain buffered commands against `tag`. Returns `false` if a tag was already installed.
    pub fn install(&self, tag: Tag) -> bool {
        let pending = {
            let mut state = lock(&self.state);
            match std::mem::replace(&mut *state, QueueState::Installed(tag.clone())) {
                QueueState::Buffering(commands) => commands,
                installed @ QueueState::Installed(_) => {
                    *state = installed;
                    return false;
                }
            }
        };

        let command_count = pending.len();
        for command in pending {
            command(&tag);
        }
        tag.emit(&CommandQueueDrained { command_count });
        true
    }

    pub fn is_installed(&self) -> bool {
        matches!(*lock(&self.state), QueueState::Installed(_))
    }
}
