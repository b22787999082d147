// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod host;
pub mod module;
pub mod steps;

pub use host::{EventHost, EventScope, ListenerHandle, NativeEvent, NativeListener, PageEnvironment};
pub use module::{PipelineContribution, TagModule};
pub use steps::{
    ConfigureStep, DefineSlotsStep, InitStep, PrepareRequestAdsStep, RequestAdsStep,
    RequestBidsStep,
};
