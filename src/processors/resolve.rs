//! Duplicate and overlap resolution between competing text spans.
//!
//! Two independent duties live here:
//!
//! * hidden-layer duplicate removal, used before paragraph merging when
//!   the source may stack an invisible text layer exactly on top of the
//!   visible one (a common artifact of exported documents), and
//! * post-merge overlap collapse, which fixes OCR "double vision"
//!   artifacts where the same paragraph is reported twice with slightly
//!   shifted boxes.

use crate::core::ResolverConfig;
use crate::domain::TextSpan;

/// Removes hidden-layer duplicates from raw spans.
///
/// A span is a duplicate when its intersection with a previously
/// accepted span exceeds `hidden_duplicate_threshold` of the span's own
/// area. Accepted spans are kept in arrival order; runs before paragraph
/// merging.
pub fn remove_hidden_duplicates(spans: &[TextSpan], config: &ResolverConfig) -> Vec<TextSpan> {
    let mut accepted: Vec<TextSpan> = Vec::with_capacity(spans.len());

    for span in spans {
        let own_area = span.bbox.area();
        if own_area == 0 {
            continue;
        }

        let is_duplicate = accepted.iter().any(|seen| {
            let intersection = span.bbox.intersection_area(&seen.bbox);
            intersection as f32 / own_area as f32 > config.hidden_duplicate_threshold
        });

        if !is_duplicate {
            accepted.push(span.clone());
        }
    }

    accepted
}

/// Collapses colliding paragraphs after merging.
///
/// Pairs are visited in area-descending order; when the intersection
/// exceeds `collapse_threshold` of the smaller box's area, the smaller
/// box is dropped. A removal set guarantees a dropped paragraph is never
/// re-considered. Survivors keep their input (reading) order.
pub fn collapse_overlaps(spans: &[TextSpan], config: &ResolverConfig) -> Vec<TextSpan> {
    if spans.len() < 2 {
        return spans.to_vec();
    }

    // Indices into `spans`, largest area first.
    let mut by_area: Vec<usize> = (0..spans.len()).collect();
    by_area.sort_by(|&a, &b| spans[b].bbox.area().cmp(&spans[a].bbox.area()));

    let mut removed = vec![false; spans.len()];

    for i in 0..by_area.len() {
        let larger = by_area[i];
        if removed[larger] {
            continue;
        }
        for &smaller in by_area.iter().skip(i + 1) {
            if removed[smaller] {
                continue;
            }
            let intersection = spans[larger].bbox.intersection_area(&spans[smaller].bbox);
            if intersection == 0 {
                continue;
            }
            let smaller_area = spans[smaller].bbox.area();
            if smaller_area > 0
                && intersection as f32 / smaller_area as f32 > config.collapse_threshold
            {
                removed[smaller] = true;
            }
        }
    }

    spans
        .iter()
        .zip(removed.iter())
        .filter(|&(_, &gone)| !gone)
        .map(|(span, _)| span.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::BoundingBox;

    fn span(text: &str, x: i32, y: i32, w: u32, h: u32) -> TextSpan {
        TextSpan::new(text, BoundingBox::new(x, y, w, h))
    }

    #[test]
    fn stacked_invisible_layer_keeps_exactly_one() {
        let spans = vec![
            span("visible", 100, 100, 200, 30),
            span("visible", 101, 101, 199, 29),
        ];
        let kept = remove_hidden_duplicates(&spans, &ResolverConfig::default());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text, "visible");
    }

    #[test]
    fn partially_overlapping_spans_both_survive_dedup() {
        // 50% overlap is below the 80% duplicate threshold.
        let spans = vec![
            span("left", 0, 0, 100, 40),
            span("right", 50, 0, 100, 40),
        ];
        let kept = remove_hidden_duplicates(&spans, &ResolverConfig::default());
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn collapse_drops_the_smaller_of_two_colliding_boxes() {
        let spans = vec![
            span("small ghost", 110, 105, 80, 20),
            span("large paragraph", 100, 100, 400, 60),
        ];
        let kept = collapse_overlaps(&spans, &ResolverConfig::default());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text, "large paragraph");
    }

    #[test]
    fn collapse_ignores_disjoint_boxes() {
        let spans = vec![
            span("top", 0, 0, 200, 40),
            span("bottom", 0, 500, 200, 40),
        ];
        let kept = collapse_overlaps(&spans, &ResolverConfig::default());
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn collapse_respects_threshold() {
        // Intersection is 10% of the smaller area; below the 20% default.
        let spans = vec![
            span("big", 0, 0, 300, 100),
            span("edge", 290, 0, 100, 100),
        ];
        let kept = collapse_overlaps(&spans, &ResolverConfig::default());
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn collapse_preserves_reading_order() {
        let spans = vec![
            span("first", 0, 0, 300, 40),
            span("second", 0, 100, 300, 40),
            span("ghost of second", 10, 105, 100, 20),
            span("third", 0, 200, 300, 40),
        ];
        let kept = collapse_overlaps(&spans, &ResolverConfig::default());
        let texts: Vec<&str> = kept.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }
}
