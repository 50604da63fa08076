//! Stream copy implementation

use std::path::Path;
use std::time::Duration;

use crate::domain::model::*;
use crate::engine::seconds_arg;

/// Cut `range` out of `source` without re-encoding
///
/// Timestamps are shifted so the segment starts at zero.
pub fn stream_copy_invocation(
    source: &Path,
    range: &TimeRange,
    output: &Path,
    timeout: Duration,
) -> Invocation {
    Invocation::new(Tool::Ffmpeg, timeout)
        .arg("-y")
        .arg("-i")
        .path_arg(source)
        .arg("-ss")
        .arg(seconds_arg(range.start))
        .arg("-t")
        .arg(seconds_arg(range.duration()))
        .args(["-c", "copy", "-avoid_negative_ts", "make_zero"])
        .path_arg(output)
}
