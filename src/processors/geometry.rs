//! Geometric primitives for slide layer separation.
//!
//! This module provides the axis-aligned bounding box used throughout the
//! pipeline, together with the pure coordinate operations the rest of the
//! engine is built on: bounds validation, scaling between pixel spaces,
//! overlap-ratio computation, and point containment tests.
//!
//! Every box is expressed in the pixel space of one rendered page image.
//! Boxes from different pages must never be compared directly; re-derive
//! them against the target page first.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in image pixel space.
///
/// The origin is the top-left corner of the image; `y` grows downward.
/// Width and height are guaranteed positive after any clamping step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X-coordinate of the left edge.
    pub x: i32,
    /// Y-coordinate of the top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl BoundingBox {
    /// Creates a new bounding box.
    #[inline]
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a bounding box from left/top/right/bottom edge coordinates.
    ///
    /// Degenerate extents collapse to a 1x1 box at the top-left corner
    /// rather than producing a zero or negative dimension.
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        let width = (right - left).max(1) as u32;
        let height = (bottom - top).max(1) as u32;
        Self {
            x: left,
            y: top,
            width,
            height,
        }
    }

    /// Left edge (same as `x`).
    #[inline]
    pub fn left(&self) -> i32 {
        self.x
    }

    /// Top edge (same as `y`).
    #[inline]
    pub fn top(&self) -> i32 {
        self.y
    }

    /// Right edge (exclusive): `x + width`.
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Bottom edge (exclusive): `y + height`.
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Center point of the box.
    #[inline]
    pub fn center(&self) -> (i32, i32) {
        (
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }

    /// Area of the box in square pixels.
    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns true when the given point lies inside the box.
    ///
    /// Both edges are inclusive, matching the convention used when testing
    /// whether a text-span center falls inside a graphic region.
    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        px >= self.left() && px <= self.right() && py >= self.top() && py <= self.bottom()
    }

    /// Computes the intersection of two boxes, if any.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= left || bottom <= top {
            return None;
        }

        Some(BoundingBox {
            x: left,
            y: top,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }

    /// Area of the intersection of two boxes, zero when disjoint.
    pub fn intersection_area(&self, other: &BoundingBox) -> u64 {
        self.intersection(other).map_or(0, |b| b.area())
    }

    /// Computes the union (smallest enclosing box) of two boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::from_edges(
            self.left().min(other.left()),
            self.top().min(other.top()),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Expands the box by `padding` pixels on every side, clamped to the
    /// image bounds.
    pub fn padded(&self, padding: u32, image_width: u32, image_height: u32) -> BoundingBox {
        let pad = padding as i32;
        let left = (self.left() - pad).max(0);
        let top = (self.top() - pad).max(0);
        let right = (self.right() + pad).min(image_width as i32);
        let bottom = (self.bottom() + pad).min(image_height as i32);
        BoundingBox::from_edges(left, top, right, bottom)
    }
}

/// Clamps a bounding box to image bounds.
///
/// Negative origins are moved to zero, extents beyond the image are cut
/// off, and width/height are forced to at least one pixel so degenerate
/// geometry never propagates downstream.
///
/// # Arguments
///
/// * `bbox` - The box to validate.
/// * `max_width` - Image width in pixels.
/// * `max_height` - Image height in pixels.
///
/// # Returns
///
/// A box with `x + width <= max_width` and `y + height <= max_height`.
pub fn validate_bbox_in_bounds(bbox: &BoundingBox, max_width: u32, max_height: u32) -> BoundingBox {
    let x = bbox.x.max(0);
    let y = bbox.y.max(0);

    let mut width = bbox.width as i64;
    let mut height = bbox.height as i64;

    if x as i64 + width > max_width as i64 {
        width = max_width as i64 - x as i64;
    }
    if y as i64 + height > max_height as i64 {
        height = max_height as i64 - y as i64;
    }

    BoundingBox {
        x,
        y,
        width: width.max(1) as u32,
        height: height.max(1) as u32,
    }
}

/// Scales a bounding box from one image resolution to another.
///
/// Useful when text was located on a page rendered at a different DPI
/// than the page used for background export. X and Y are scaled by
/// independent factors.
pub fn scale_bbox_to_image(
    bbox: &BoundingBox,
    original_width: u32,
    original_height: u32,
    target_width: u32,
    target_height: u32,
) -> BoundingBox {
    let scale_x = target_width as f32 / original_width as f32;
    let scale_y = target_height as f32 / original_height as f32;

    BoundingBox {
        x: (bbox.x as f32 * scale_x) as i32,
        y: (bbox.y as f32 * scale_y) as i32,
        width: ((bbox.width as f32 * scale_x) as u32).max(1),
        height: ((bbox.height as f32 * scale_y) as u32).max(1),
    }
}

/// Calculates the overlap ratio between two boxes.
///
/// The ratio is the intersection area divided by the area of the
/// *smaller* box, from 0.0 (disjoint) to 1.0 (the smaller box is fully
/// contained in the larger one).
pub fn calculate_overlap_ratio(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let intersection = a.intersection_area(b);
    if intersection == 0 {
        return 0.0;
    }

    let smaller = a.area().min(b.area());
    if smaller == 0 {
        return 0.0;
    }

    intersection as f32 / smaller as f32
}

/// Returns true when `point` lies inside `bbox` (inclusive edges).
pub fn point_in_bbox(point: (i32, i32), bbox: &BoundingBox) -> bool {
    bbox.contains_point(point.0, point.1)
}

/// Computes the axis-aligned bounding rectangle of a point polygon.
///
/// Returns `None` for an empty polygon. Detection polygons from OCR
/// engines are reduced to rectangles this way before entering the
/// pipeline.
pub fn polygon_bounding_rect(points: &[(f32, f32)]) -> Option<BoundingBox> {
    if points.is_empty() {
        return None;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for &(x, y) in points {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    Some(BoundingBox::from_edges(
        min_x.floor() as i32,
        min_y.floor() as i32,
        max_x.ceil() as i32,
        max_y.ceil() as i32,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_bbox_doubles_exactly() {
        let bbox = BoundingBox::new(100, 100, 200, 150);
        let scaled = scale_bbox_to_image(&bbox, 1920, 1080, 3840, 2160);
        assert_eq!(scaled, BoundingBox::new(200, 200, 400, 300));
    }

    #[test]
    fn validate_clamps_to_bounds() {
        let bbox = BoundingBox::new(1800, 1000, 200, 150);
        let validated = validate_bbox_in_bounds(&bbox, 1920, 1080);
        assert!(validated.x + validated.width as i32 <= 1920);
        assert!(validated.y + validated.height as i32 <= 1080);
        assert_eq!(validated.width, 120);
        assert_eq!(validated.height, 80);
    }

    #[test]
    fn validate_moves_negative_origin() {
        let bbox = BoundingBox::new(-10, -20, 100, 100);
        let validated = validate_bbox_in_bounds(&bbox, 1920, 1080);
        assert_eq!(validated.x, 0);
        assert_eq!(validated.y, 0);
    }

    #[test]
    fn validate_forces_minimum_dimensions() {
        // A box starting at the far edge degenerates; it must come back
        // with at least 1px in each dimension.
        let bbox = BoundingBox::new(1920, 1080, 50, 50);
        let validated = validate_bbox_in_bounds(&bbox, 1920, 1080);
        assert!(validated.width >= 1);
        assert!(validated.height >= 1);
    }

    #[test]
    fn overlap_ratio_quarter() {
        let a = BoundingBox::new(0, 0, 100, 100);
        let b = BoundingBox::new(50, 50, 100, 100);
        let ratio = calculate_overlap_ratio(&a, &b);
        assert!((ratio - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn overlap_ratio_disjoint_is_zero() {
        let a = BoundingBox::new(0, 0, 10, 10);
        let b = BoundingBox::new(100, 100, 10, 10);
        assert_eq!(calculate_overlap_ratio(&a, &b), 0.0);
    }

    #[test]
    fn overlap_ratio_contained_is_one() {
        let a = BoundingBox::new(0, 0, 100, 100);
        let b = BoundingBox::new(25, 25, 10, 10);
        assert!((calculate_overlap_ratio(&a, &b) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn point_containment_is_inclusive() {
        let bbox = BoundingBox::new(10, 10, 20, 20);
        assert!(point_in_bbox((10, 10), &bbox));
        assert!(point_in_bbox((30, 30), &bbox));
        assert!(point_in_bbox((20, 15), &bbox));
        assert!(!point_in_bbox((31, 15), &bbox));
        assert!(!point_in_bbox((9, 15), &bbox));
    }

    #[test]
    fn union_encloses_both() {
        let a = BoundingBox::new(0, 0, 10, 10);
        let b = BoundingBox::new(20, 5, 10, 10);
        let u = a.union(&b);
        assert_eq!(u, BoundingBox::new(0, 0, 30, 15));
    }

    #[test]
    fn padded_clamps_to_image() {
        let bbox = BoundingBox::new(5, 5, 100, 100);
        let padded = bbox.padded(10, 110, 110);
        assert_eq!(padded.x, 0);
        assert_eq!(padded.y, 0);
        assert_eq!(padded.right(), 110);
        assert_eq!(padded.bottom(), 110);
    }

    #[test]
    fn polygon_rect_covers_points() {
        let rect =
            polygon_bounding_rect(&[(10.0, 20.0), (110.0, 22.0), (108.0, 60.0), (11.0, 58.0)])
                .unwrap();
        assert_eq!(rect.x, 10);
        assert_eq!(rect.y, 20);
        assert_eq!(rect.right(), 110);
        assert_eq!(rect.bottom(), 60);
    }

    #[test]
    fn polygon_rect_empty_is_none() {
        assert!(polygon_bounding_rect(&[]).is_none());
    }
}
