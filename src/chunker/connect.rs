//! Gap closing between packed ranges.
use super::range::ByteRange;

/// Make `ranges` tile `span` exactly.
///
/// Each range absorbs the gap that follows it, the first range is pulled
/// back to `span.start` and the last one extended to `span.end`.
pub fn connect_ranges(ranges: &mut [ByteRange], span: ByteRange) {
    for i in 1..ranges.len() {
        ranges[i - 1].end = ranges[i].start;
    }
    if let Some(first) = ranges.first_mut() {
        first.start = first.start.min(span.start);
    }
    if let Some(last) = ranges.last_mut() {
        last.end = last.end.max(span.end);
    }
}
