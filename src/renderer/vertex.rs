use bytemuck::{Pod, Zeroable};
use cgmath::{Point3, Vector3};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coords,
        }
    }

    pub fn position_point(&self) -> Point3<f32> {
        Point3::from(self.position)
    }

    /// Copy of this vertex moved by `offset`; normal and texture coordinate are unchanged
    pub fn translated(&self, offset: Vector3<f32>) -> Self {
        Self {
            position: [
                self.position[0] + offset.x,
                self.position[1] + offset.y,
                self.position[2] + offset.z,
            ],
            ..*self
        }
    }

    /// Size in bytes of one vertex in an upload buffer
    pub const fn stride() -> usize {
        std::mem::size_of::<Vertex>()
    }
}
