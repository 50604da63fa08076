//! Segment extraction strategies

use std::fmt;

use serde::Serialize;

/// How one segment is cut out of the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Repackage existing streams (fast, cuts land on keyframes)
    StreamCopy,
    /// Decode and encode the range (slow, always cuttable)
    Reencode,
}

impl ExtractionStrategy {
    /// Attempt order for every segment
    pub const LADDER: [ExtractionStrategy; 2] =
        [ExtractionStrategy::StreamCopy, ExtractionStrategy::Reencode];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStrategy::StreamCopy => "stream_copy",
            ExtractionStrategy::Reencode => "reencode",
        }
    }
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
