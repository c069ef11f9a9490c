//! Paragraph merging for raw text spans.
//!
//! Text sources return spans that are often single physical lines or
//! fragments. This module groups them into logical paragraphs with a
//! greedy single-pass walk in reading order. The algorithm is not
//! globally optimal by design: documents are read top-to-bottom, so only
//! the directly-next span in sort order is ever considered as a merge
//! candidate.

use crate::core::MergeConfig;
use crate::domain::TextSpan;

/// Groups raw text spans into paragraphs.
///
/// Spans are sorted by `(top, left)` and walked with a single
/// accumulator. The next span is merged into the current paragraph when
/// all three hold:
///
/// 1. the vertical gap (next top minus current bottom) is below
///    `max_gap_ratio` times the current paragraph's height,
/// 2. the gap is at least `min_gap_px` (slightly negative, tolerating
///    marginal overlap between stacked lines),
/// 3. the left edges differ by less than `max_left_offset_px`.
///
/// Merging concatenates text with a single space and takes the union of
/// both boxes; each merge produces a new span value.
///
/// The operation is idempotent: running it on its own output yields the
/// same output.
pub fn merge_paragraphs(spans: &[TextSpan], config: &MergeConfig) -> Vec<TextSpan> {
    if spans.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<TextSpan> = spans.to_vec();
    sorted.sort_by_key(|span| (span.bbox.top(), span.bbox.left()));

    let mut merged = Vec::with_capacity(sorted.len());
    let mut iter = sorted.into_iter();
    let Some(mut current) = iter.next() else {
        return Vec::new();
    };

    for next in iter {
        if should_merge(&current, &next, config) {
            current = current.merged_with(&next);
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);

    merged
}

/// Decides whether `next` continues the paragraph accumulated in
/// `current`.
fn should_merge(current: &TextSpan, next: &TextSpan, config: &MergeConfig) -> bool {
    let vertical_gap = (next.bbox.top() - current.bbox.bottom()) as f32;
    let left_offset = (next.bbox.left() - current.bbox.left()).abs() as f32;
    let line_height = current.bbox.height as f32;

    vertical_gap < line_height * config.max_gap_ratio
        && vertical_gap >= config.min_gap_px
        && left_offset < config.max_left_offset_px
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::BoundingBox;

    fn span(text: &str, x: i32, y: i32, w: u32, h: u32) -> TextSpan {
        TextSpan::new(text, BoundingBox::new(x, y, w, h))
    }

    #[test]
    fn stacked_lines_merge_into_one_paragraph() {
        // Two lines, 8px apart with 30px line height: gap ratio 0.27.
        let spans = vec![
            span("wrapped across", 100, 200, 300, 30),
            span("two lines", 100, 238, 290, 30),
        ];
        let merged = merge_paragraphs(&spans, &MergeConfig::strict());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "wrapped across two lines");
        assert_eq!(merged[0].bbox, BoundingBox::new(100, 200, 300, 68));
    }

    #[test]
    fn distant_blocks_stay_separate() {
        let spans = vec![
            span("title", 100, 50, 300, 40),
            span("body", 100, 300, 300, 30),
        ];
        let merged = merge_paragraphs(&spans, &MergeConfig::strict());
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn bullet_points_do_not_merge_under_strict_preset() {
        // One full line height between bullets: ratio 1.0 > 0.3.
        let spans = vec![
            span("first bullet", 120, 100, 250, 24),
            span("second bullet", 120, 148, 260, 24),
        ];
        let merged = merge_paragraphs(&spans, &MergeConfig::strict());
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn misaligned_columns_do_not_merge() {
        let spans = vec![
            span("left column", 100, 100, 200, 30),
            span("right column", 500, 135, 200, 30),
        ];
        let merged = merge_paragraphs(&spans, &MergeConfig::loose());
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn marginal_overlap_still_merges() {
        // Boxes overlapping by 3px vertically; within the -5px tolerance.
        let spans = vec![
            span("over", 100, 100, 200, 30),
            span("lapping", 100, 127, 200, 30),
        ];
        let merged = merge_paragraphs(&spans, &MergeConfig::strict());
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn merge_is_idempotent() {
        let spans = vec![
            span("heading", 80, 40, 400, 44),
            span("first line of body", 80, 130, 420, 28),
            span("second line of body", 80, 164, 410, 28),
            span("a caption far below", 80, 600, 300, 20),
        ];
        let once = merge_paragraphs(&spans, &MergeConfig::strict());
        let twice = merge_paragraphs(&once, &MergeConfig::strict());
        assert_eq!(once, twice);
    }

    #[test]
    fn unsorted_input_is_handled() {
        let spans = vec![
            span("second", 100, 238, 290, 30),
            span("first", 100, 200, 300, 30),
        ];
        let merged = merge_paragraphs(&spans, &MergeConfig::strict());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "first second");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(merge_paragraphs(&[], &MergeConfig::strict()).is_empty());
    }
}
