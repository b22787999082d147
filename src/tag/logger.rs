// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use tracing::Level;

use crate::observability::messages::StructuredLog;

/// Publisher-supplied logger installed with `setLogger`.
///
/// Tag messages are always emitted through `tracing`; an installed logger
/// additionally receives their rendered text.
pub trait TagLogger: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Route a message to the logger method matching its level.
pub(crate) fn forward(logger: &dyn TagLogger, message: &dyn StructuredLog) {
    let text = message.to_string();
    match message.level() {
        Level::ERROR => logger.error(&text),
        Level::WARN => logger.warn(&text),
        Level::INFO => logger.info(&text),
        _ => logger.debug(&text),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingLogger;
    use super::*;
    use crate::observability::messages::tag::LocationUnchanged;

    #[test]
    fn forwards_by_level() {
        let logger = RecordingLogger::default();
        forward(
            &logger,
            &LocationUnchanged {
                href: "https://example.com/",
            },
        );
        let lines = logger.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, "warn");
        assert!(lines[0].1.contains("https://example.com/"));
    }
}
