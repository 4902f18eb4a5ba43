//! Axis-Aligned Bounding Box
//!
//! Plain data plus free functions; no behaviour lives on the struct itself.

use cgmath::{Point3, Vector3};

/// Axis-Aligned Bounding Box - pure data structure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

/// Hashable identity of a box: the bit patterns of its six corner floats.
///
/// `-0.0` is folded into `0.0` so that structurally equal boxes always share a key.
pub type AabbKey = [u32; 6];

/// Create new AABB from min/max points
pub fn create_aabb(min: Point3<f32>, max: Point3<f32>) -> AABB {
    AABB { min, max }
}

/// Create AABB from center point and half extents
pub fn aabb_from_center_half_extents(center: Point3<f32>, half_extents: Vector3<f32>) -> AABB {
    AABB {
        min: center - half_extents,
        max: center + half_extents,
    }
}

/// Smallest AABB containing every point, or `None` for an empty slice
pub fn aabb_from_points<I>(points: I) -> Option<AABB>
where
    I: IntoIterator<Item = Point3<f32>>,
{
    let mut points = points.into_iter();
    let first = points.next()?;
    let mut aabb = AABB { min: first, max: first };
    for p in points {
        aabb.min.x = aabb.min.x.min(p.x);
        aabb.min.y = aabb.min.y.min(p.y);
        aabb.min.z = aabb.min.z.min(p.z);
        aabb.max.x = aabb.max.x.max(p.x);
        aabb.max.y = aabb.max.y.max(p.y);
        aabb.max.z = aabb.max.z.max(p.z);
    }
    Some(aabb)
}

/// Get center point of AABB
pub fn aabb_center(aabb: &AABB) -> Point3<f32> {
    Point3::new(
        (aabb.min.x + aabb.max.x) * 0.5,
        (aabb.min.y + aabb.max.y) * 0.5,
        (aabb.min.z + aabb.max.z) * 0.5,
    )
}

/// The eight corners, ordered with X varying fastest, then Y, then Z
pub fn aabb_corners(aabb: &AABB) -> [Point3<f32>; 8] {
    let (lo, hi) = (aabb.min, aabb.max);
    [
        Point3::new(lo.x, lo.y, lo.z),
        Point3::new(hi.x, lo.y, lo.z),
        Point3::new(lo.x, hi.y, lo.z),
        Point3::new(hi.x, hi.y, lo.z),
        Point3::new(lo.x, lo.y, hi.z),
        Point3::new(hi.x, lo.y, hi.z),
        Point3::new(lo.x, hi.y, hi.z),
        Point3::new(hi.x, hi.y, hi.z),
    ]
}

/// Test if `object` shares volume with `region`.
///
/// Boxes that only touch along a face do not overlap.
/// An axis on which `object` is flat falls back to a closed containment test so
/// degenerate boxes still land somewhere.
pub fn aabb_overlaps(region: &AABB, object: &AABB) -> bool {
    axis_overlaps(region.min.x, region.max.x, object.min.x, object.max.x)
        && axis_overlaps(region.min.y, region.max.y, object.min.y, object.max.y)
        && axis_overlaps(region.min.z, region.max.z, object.min.z, object.max.z)
}

fn axis_overlaps(region_min: f32, region_max: f32, object_min: f32, object_max: f32) -> bool {
    if object_min == object_max {
        object_min >= region_min && object_min <= region_max
    } else {
        object_min < region_max && object_max > region_min
    }
}

/// Test if AABB contains a point
pub fn aabb_contains_point(aabb: &AABB, point: Point3<f32>) -> bool {
    point.x >= aabb.min.x && point.x <= aabb.max.x &&
    point.y >= aabb.min.y && point.y <= aabb.max.y &&
    point.z >= aabb.min.z && point.z <= aabb.max.z
}

/// Create translated copy of AABB
pub fn aabb_translated(aabb: &AABB, offset: Vector3<f32>) -> AABB {
    AABB {
        min: aabb.min + offset,
        max: aabb.max + offset,
    }
}

/// Create a copy with both corners scaled about the origin
pub fn aabb_scaled(aabb: &AABB, factor: f32) -> AABB {
    let a = Point3::new(aabb.min.x * factor, aabb.min.y * factor, aabb.min.z * factor);
    let b = Point3::new(aabb.max.x * factor, aabb.max.y * factor, aabb.max.z * factor);
    // A negative factor swaps the corners
    aabb_from_points([a, b]).unwrap_or(AABB { min: a, max: b })
}

pub fn aabb_key(aabb: &AABB) -> AabbKey {
    let bits = |v: f32| if v == 0.0 { 0.0f32.to_bits() } else { v.to_bits() };
    [
        bits(aabb.min.x),
        bits(aabb.min.y),
        bits(aabb.min.z),
        bits(aabb.max.x),
        bits(aabb.max.y),
        bits(aabb.max.z),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box_at(x: f32, y: f32, z: f32) -> AABB {
        create_aabb(Point3::new(x, y, z), Point3::new(x + 1.0, y + 1.0, z + 1.0))
    }

    #[test]
    fn test_touching_boxes_do_not_overlap() {
        let a = unit_box_at(0.0, 0.0, 0.0);
        let b = unit_box_at(1.0, 0.0, 0.0);
        assert!(!aabb_overlaps(&a, &b));
        assert!(aabb_overlaps(&a, &unit_box_at(0.5, 0.0, 0.0)));
    }

    #[test]
    fn test_straddling_box_overlaps() {
        let region = create_aabb(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 4.0, 4.0));
        let straddler = unit_box_at(3.5, 1.0, 1.0);
        assert!(aabb_overlaps(&region, &straddler));
    }

    #[test]
    fn test_flat_box_overlaps_containing_region() {
        let region = create_aabb(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 4.0, 4.0));
        let flat = create_aabb(Point3::new(1.0, 4.0, 1.0), Point3::new(2.0, 4.0, 2.0));
        assert!(aabb_overlaps(&region, &flat));
    }

    #[test]
    fn test_from_points() {
        let aabb = aabb_from_points([
            Point3::new(1.0, -2.0, 3.0),
            Point3::new(-1.0, 2.0, 0.0),
        ])
        .unwrap();
        assert_eq!(aabb.min, Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Point3::new(1.0, 2.0, 3.0));
        assert!(aabb_from_points(Vec::new()).is_none());
    }

    #[test]
    fn test_key_ignores_sign_of_zero() {
        let a = create_aabb(Point3::new(-0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = create_aabb(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(aabb_key(&a), aabb_key(&b));
    }

    #[test]
    fn test_scaled_and_corners() {
        let aabb = create_aabb(Point3::new(-4.0, -4.0, -4.0), Point3::new(4.0, 4.0, 4.0));
        let half = aabb_scaled(&aabb, 0.5);
        assert_eq!(half.min, Point3::new(-2.0, -2.0, -2.0));
        assert_eq!(aabb_center(&half), Point3::new(0.0, 0.0, 0.0));
        let corners = aabb_corners(&aabb);
        assert_eq!(corners[0], aabb.min);
        assert_eq!(corners[7], aabb.max);
    }

    #[test]
    fn test_center_half_extents_and_containment() {
        let aabb = aabb_from_center_half_extents(Point3::new(1.0, 2.0, 3.0), Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(aabb.max - aabb.min, Vector3::new(2.0, 2.0, 2.0));
        assert!(aabb_contains_point(&aabb, Point3::new(2.0, 2.0, 3.0)));
        assert!(!aabb_contains_point(&aabb, Point3::new(2.1, 2.0, 3.0)));
        let moved = aabb_translated(&aabb, Vector3::new(-1.0, -2.0, -3.0));
        assert_eq!(aabb_center(&moved), Point3::new(0.0, 0.0, 0.0));
    }
}
