use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3};

use super::aabb::AABB;
use crate::constants::picking::PARALLEL_EPSILON;

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Build a ray; the direction is normalized so hit distances are world units
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// True when the direction is zero or not finite. Such a ray hits nothing.
    pub fn is_degenerate(&self) -> bool {
        let finite = |v: [f32; 3]| v.iter().all(|c| c.is_finite());
        !finite(self.direction.into())
            || !finite(self.origin.into())
            || self.direction.magnitude2() == 0.0
    }

    pub fn point_at(&self, distance: f32) -> Point3<f32> {
        self.origin + self.direction * distance
    }

    /// Same direction, origin shifted by `offset`
    pub fn translated(&self, offset: Vector3<f32>) -> Self {
        Self {
            origin: self.origin + offset,
            direction: self.direction,
        }
    }
}

/// Plane with unit normal `normal`; points on it satisfy `normal · p + d = 0`
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    pub normal: Vector3<f32>,
    pub d: f32,
}

impl Plane {
    pub fn new(normal: Vector3<f32>, d: f32) -> Self {
        Self { normal, d }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockFace {
    Right,  // +X
    Left,   // -X
    Top,    // +Y
    Bottom, // -Y
    Front,  // +Z
    Back,   // -Z
}

impl BlockFace {
    /// Order in which faces are tested when resolving a pick
    pub const PICK_ORDER: [BlockFace; 6] = [
        BlockFace::Top,
        BlockFace::Bottom,
        BlockFace::Left,
        BlockFace::Right,
        BlockFace::Back,
        BlockFace::Front,
    ];

    pub fn normal(&self) -> Vector3<f32> {
        match self {
            BlockFace::Right => Vector3::new(1.0, 0.0, 0.0),
            BlockFace::Left => Vector3::new(-1.0, 0.0, 0.0),
            BlockFace::Top => Vector3::new(0.0, 1.0, 0.0),
            BlockFace::Bottom => Vector3::new(0.0, -1.0, 0.0),
            BlockFace::Front => Vector3::new(0.0, 0.0, 1.0),
            BlockFace::Back => Vector3::new(0.0, 0.0, -1.0),
        }
    }

    pub fn offset(&self) -> Vector3<i32> {
        match self {
            BlockFace::Right => Vector3::new(1, 0, 0),
            BlockFace::Left => Vector3::new(-1, 0, 0),
            BlockFace::Top => Vector3::new(0, 1, 0),
            BlockFace::Bottom => Vector3::new(0, -1, 0),
            BlockFace::Front => Vector3::new(0, 0, 1),
            BlockFace::Back => Vector3::new(0, 0, -1),
        }
    }

    /// Plane of this face for an origin-centred cube with the given half edge
    pub fn plane(&self, half_size: f32) -> Plane {
        Plane::new(self.normal(), -half_size)
    }
}

/// Distance along `ray` to the first point inside `aabb`.
///
/// Returns `Some(0.0)` when the origin is already inside and `None` when the
/// box is missed, lies entirely behind the origin, or the ray is degenerate.
pub fn ray_aabb_intersection(ray: &Ray, aabb: &AABB) -> Option<f32> {
    if ray.is_degenerate() {
        return None;
    }
    let origin = [ray.origin.x, ray.origin.y, ray.origin.z];
    let dir = [ray.direction.x, ray.direction.y, ray.direction.z];
    let box_min = [aabb.min.x, aabb.min.y, aabb.min.z];
    let box_max = [aabb.max.x, aabb.max.y, aabb.max.z];

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for i in 0..3 {
        if dir[i].abs() < PARALLEL_EPSILON {
            // Ray is parallel to this slab
            if origin[i] < box_min[i] || origin[i] > box_max[i] {
                return None;
            }
        } else {
            let t1 = (box_min[i] - origin[i]) / dir[i];
            let t2 = (box_max[i] - origin[i]) / dir[i];

            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));

            if t_min > t_max {
                return None;
            }
        }
    }

    if t_max < 0.0 {
        return None;
    }
    Some(t_min.max(0.0))
}

/// Distance along `ray` to `plane`, or `None` if parallel or behind the origin
pub fn ray_plane_intersection(ray: &Ray, plane: &Plane) -> Option<f32> {
    if ray.is_degenerate() {
        return None;
    }
    let denominator = ray.direction.dot(plane.normal);
    if denominator.abs() < PARALLEL_EPSILON {
        return None;
    }
    let distance = (-plane.d - plane.normal.dot(ray.origin.to_vec())) / denominator;
    if distance < 0.0 {
        if distance < -PARALLEL_EPSILON {
            return None;
        }
        return Some(0.0);
    }
    Some(distance)
}
