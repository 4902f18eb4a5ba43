//! Geometric primitives shared by the octree and the world store
//!
//! Boxes, rays, planes and the intersection tests between them.

pub mod aabb;
pub mod ray;

pub use aabb::{
    aabb_center, aabb_contains_point, aabb_corners, aabb_from_center_half_extents,
    aabb_from_points, aabb_key, aabb_overlaps, aabb_scaled, aabb_translated, create_aabb, AabbKey,
    AABB,
};
pub use ray::{ray_aabb_intersection, ray_plane_intersection, BlockFace, Plane, Ray};
