//! Coalescing of connected ranges up to a minimum line count.
use super::Result;
use super::range::{Accumulator, ByteRange};
use super::source_index::SourceIndex;

/// Fold consecutive contiguous ranges into groups holding at least
/// `min_lines` non-blank lines. The trailing group is kept even when short.
pub fn merge_by_lines(
    ranges: &[ByteRange],
    index: &SourceIndex,
    min_lines: u32,
) -> Result<Vec<ByteRange>> {
    let mut merged = Vec::new();
    let mut group = Accumulator::Empty;

    for &range in ranges {
        group.absorb(range);
        if let Accumulator::Active(current) = group {
            if index.non_blank_line_count(current)? >= min_lines {
                merged.extend(group.take());
            }
        }
    }

    merged.extend(group.take());
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_ranges(text: &str) -> Vec<ByteRange> {
        let mut ranges = Vec::new();
        let mut pos = 0;
        for line in text.split_inclusive('\n') {
            ranges.push(ByteRange::new(pos, pos + line.len()));
            pos += line.len();
        }
        ranges
    }

    #[test]
    fn test_groups_reach_line_floor() {
        let text = "a\nb\nc\nd\ne\n";
        let index = SourceIndex::new(text);
        let merged = merge_by_lines(&line_ranges(text), &index, 2).unwrap();
        assert_eq!(
            merged,
            vec![
                ByteRange::new(0, 4),
                ByteRange::new(4, 8),
                ByteRange::new(8, 10),
            ]
        );
    }

    #[test]
    fn test_blank_lines_do_not_count() {
        let text = "a\n\n\nb\nc\n";
        let index = SourceIndex::new(text);
        let merged = merge_by_lines(&line_ranges(text), &index, 2).unwrap();
        assert_eq!(merged, vec![ByteRange::new(0, 6), ByteRange::new(6, 8)]);
    }

    #[test]
    fn test_short_trailing_group_is_kept() {
        let text = "only\n";
        let index = SourceIndex::new(text);
        let merged = merge_by_lines(&line_ranges(text), &index, 5).unwrap();
        assert_eq!(merged, vec![ByteRange::new(0, 5)]);
    }

    #[test]
    fn test_first_group_keeps_true_start() {
        let text = "xx\na\nb\nc\n";
        let index = SourceIndex::new(text);
        let ranges = vec![ByteRange::new(3, 5), ByteRange::new(5, 7), ByteRange::new(7, 9)];
        let merged = merge_by_lines(&ranges, &index, 2).unwrap();
        assert_eq!(merged[0].start, 3);
        assert_eq!(merged, vec![ByteRange::new(3, 7), ByteRange::new(7, 9)]);
    }

    #[test]
    fn test_out_of_range_propagates() {
        let index = SourceIndex::new("abc");
        let err = merge_by_lines(&[ByteRange::new(0, 9)], &index, 1).unwrap_err();
        assert!(matches!(err, crate::chunker::ChunkError::OutOfRange { .. }));
    }
}
