use glam::Vec3;

use crate::{
    binaries::{BinaryData, ByteCursor},
    error::Result,
};

/// Bounding box of a render node plus three values nobody has identified yet.
#[repr(C, packed)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RenderNode {
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
    pub reserved: [u32; 3],
}

#[derive(Clone, Debug, Default)]
pub struct RenderBranch {
    pub nodes: Vec<RenderNode>,
    /// Short point lists, at most 255 points each. Kept in stored axis order.
    pub point_sets: Vec<Vec<Vec3>>,
}

impl BinaryData for RenderBranch {
    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let [node_count, set_count] = cursor.read_array::<u32, 2>()?;

        let node_count = cursor.ensure_count(
            "render node",
            node_count as u64,
            std::mem::size_of::<RenderNode>() as u64,
        )?;
        let nodes = (0..node_count)
            .map(|_| cursor.read::<RenderNode>())
            .collect::<Result<Vec<_>>>()?;

        let set_count = cursor.ensure_count("render point set", set_count as u64, 1)?;
        let mut point_sets = Vec::with_capacity(set_count);
        for _ in 0..set_count {
            let count = cursor.read_u8()?;
            let points = (0..count)
                .map(|_| cursor.read_vec3())
                .collect::<Result<Vec<_>>>()?;
            point_sets.push(points);
        }

        Ok(Self { nodes, point_sets })
    }
}

/// Render node hierarchy trailing the render section, one per section count slot.
#[derive(Clone, Debug, Default)]
pub struct RenderTree {
    pub branches: Vec<RenderBranch>,
}

impl BinaryData for RenderTree {
    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let count = cursor.read_u32()?;
        // two counts per branch at minimum
        let count = cursor.ensure_count("render branch", count as u64, 8)?;
        let branches = (0..count)
            .map(|_| RenderBranch::read(cursor))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { branches })
    }
}
