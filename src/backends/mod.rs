// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process backends for the host seams and the pipeline steps.
//!
//! # Available Backends
//!
//! ## Page
//! [`page::StaticPage`] implements `PageEnvironment` with a location that
//! changes only through explicit client-side navigation.
//!
//! ## Event Host
//! [`event_host::InMemoryEventHost`] implements `EventHost`: elements are
//! registered by selector and events are dispatched synchronously.
//!
//! ## Stub Steps (Test-Only)
//! Recording step implementations for pipeline and tag tests (only available
//! in test builds):
//! - **RecordingInitStep / RecordingConfigureStep**: count calls and request ids
//! - **PassThroughDefineSlots**: defines every slot that passes the label filter
//! - **RecordingPrepareStep / RecordingRequestBids**: journal completions, with optional
//!   delay or failure
//! - **RecordingRequestAds**: records each ad request's dom ids and key-values
//!
//! # Examples
//!
//! ```rust
//! use tag_pipeline::backends::page::StaticPage;
//! use tag_pipeline::traits::PageEnvironment;
//!
//! let page = StaticPage::new("https://example.com/news");
//! page.navigate("https://example.com/sport");
//! assert_eq!(page.href(), "https://example.com/sport");
//! ```

pub mod event_host;
pub mod page;
#[cfg(test)]
pub mod stub;
