// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;      // in-process host + stub steps
pub mod config;        // static + runtime configuration
pub mod engine;        // phase-ordered ad pipeline
pub mod errors;        // error handling
pub mod events;        // event sources, throttling, render tracking
pub mod observability;
pub mod tag;           // publisher-facing state machine
pub mod traits;        // step + host seams
pub mod utils;
