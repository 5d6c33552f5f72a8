use glam::Vec3;

use super::{
    consts::{POLYGON_HEADER_SIZE, WORLD_MODEL_HEADER_SIZE},
    BspPolygon, WorldVersion,
};
use crate::{binaries::ByteCursor, coords::swap_yz, error::Result};

/// Entry of the node table following the polygons. Meaning unknown, kept as stored.
///
/// The two signed values are 32-bit in the 113 layout and 16-bit in 126, both
/// widen losslessly to `i32`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NodeEntry {
    pub value: u32,
    pub a: i32,
    pub b: i32,
}

impl NodeEntry {
    pub fn read(cursor: &mut ByteCursor<'_>, version: WorldVersion) -> Result<Self> {
        let value = cursor.read_u32()?;
        let (a, b) = match version {
            WorldVersion::V113 => (cursor.read_i32()?, cursor.read_i32()?),
            WorldVersion::V126 => (cursor.read_i16()? as i32, cursor.read_i16()? as i32),
        };
        Ok(Self { value, a, b })
    }

    pub fn size(version: WorldVersion) -> usize {
        match version {
            WorldVersion::V113 => 12,
            WorldVersion::V126 => 8,
        }
    }
}

/// A BSP model: named convex polygons over a private vertex list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldModel {
    /// From the section's string table. The first one is the model's name.
    pub names: Vec<String>,
    pub reserved: u32,
    pub unknown_count: u32,
    pub half_extent: Vec3,
    pub center: Vec3,
    /// Only stored by the 113 layout.
    pub trailing: Option<u32>,
    pub polygons: Vec<BspPolygon>,
    pub nodes: Vec<NodeEntry>,
    /// Axis swapped.
    pub vertices: Vec<Vec3>,
}

impl WorldModel {
    pub fn read(cursor: &mut ByteCursor<'_>, version: WorldVersion) -> Result<Self> {
        let [reserved, vertex_count, polygon_count, unknown_count, node_count] =
            cursor.read_array::<u32, 5>()?;
        let half_extent = cursor.read_vec3()?;
        let center = cursor.read_vec3()?;

        let trailing = match version {
            WorldVersion::V113 => Some(cursor.read_u32()?),
            WorldVersion::V126 => None,
        };

        let polygon_count = cursor.ensure_count(
            "polygon",
            polygon_count as u64,
            1 + POLYGON_HEADER_SIZE as u64,
        )?;
        let vertex_counts = cursor.read_bytes(polygon_count)?;

        // headers and vertex id lists together must fit in what is left
        let id_total: u64 = vertex_counts.iter().map(|&n| n as u64).sum();
        let polygon_bytes = polygon_count as u64 * POLYGON_HEADER_SIZE as u64 + id_total * 4;
        cursor.ensure_count("polygon data", polygon_bytes, 1)?;

        let polygons = vertex_counts
            .iter()
            .map(|&n| BspPolygon::read(cursor, n))
            .collect::<Result<Vec<_>>>()?;

        let node_count =
            cursor.ensure_count("node", node_count as u64, NodeEntry::size(version) as u64)?;
        let nodes = (0..node_count)
            .map(|_| NodeEntry::read(cursor, version))
            .collect::<Result<Vec<_>>>()?;

        let vertex_count = cursor.ensure_count("vertex", vertex_count as u64, 12)?;
        let vertices = (0..vertex_count)
            .map(|_| cursor.read_vec3().map(swap_yz))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            names: Vec::new(),
            reserved,
            unknown_count,
            half_extent,
            center,
            trailing,
            polygons,
            nodes,
            vertices,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    /// Polygons whose vertex ids all fall inside this model.
    pub fn valid_polygons(&self) -> impl Iterator<Item = &BspPolygon> {
        self.polygons
            .iter()
            .filter(|p| p.is_within(self.vertices.len()))
    }

    /// Smallest number of bytes a model can occupy.
    pub(crate) fn min_size(version: WorldVersion) -> usize {
        WORLD_MODEL_HEADER_SIZE + usize::from(version == WorldVersion::V113) * 4
    }
}
