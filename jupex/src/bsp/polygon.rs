use crate::{binaries::ByteCursor, error::Result};

#[repr(C, packed)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct PolygonHeader {
    reserved: [i8; 2],
    surface_flags: u16,
    plane_id: u32,
    plane_distance: f32,
}

/// Convex polygon of a world model.
///
/// The vertex count is not stored with the polygon but in a byte array ahead of
/// the polygon list, so reading needs it passed in.
#[derive(Clone, Debug, PartialEq)]
pub struct BspPolygon {
    /// Purpose unknown, kept as stored.
    pub reserved: [i8; 2],
    pub surface_flags: u16,
    pub plane_id: u32,
    pub plane_distance: f32,
    /// Indices into the owning model's vertices.
    pub vertex_ids: Vec<u32>,
}

impl BspPolygon {
    pub fn read(cursor: &mut ByteCursor<'_>, vertex_count: u8) -> Result<Self> {
        let header = cursor.read::<PolygonHeader>()?;
        let vertex_ids = (0..vertex_count)
            .map(|_| cursor.read_u32())
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            reserved: header.reserved,
            surface_flags: header.surface_flags,
            plane_id: header.plane_id,
            plane_distance: header.plane_distance,
            vertex_ids,
        })
    }

    /// Whether every vertex id points inside a model with `vertex_count` vertices.
    pub fn is_within(&self, vertex_count: usize) -> bool {
        self.vertex_ids.iter().all(|&id| (id as usize) < vertex_count)
    }
}

#[cfg(test)]
mod polygon_tests {
    use super::*;
    use crate::{binaries::Writer, error::ErrorKind};

    #[test]
    fn reads_polygon() {
        let mut w = Writer::new();
        w.write_i8(-1).write_i8(2).write_u16(0x8001);
        w.write_u32(7).write_f32(-64.0);
        w.write_u32(0).write_u32(1).write_u32(2).write_u32(3);
        w.write_u8(0xee);
        let data = w.into_bytes();

        let mut cursor = ByteCursor::new(&data);
        let polygon = BspPolygon::read(&mut cursor, 4).unwrap();

        assert_eq!(polygon.reserved, [-1, 2]);
        assert_eq!(polygon.surface_flags, 0x8001);
        assert_eq!(polygon.plane_id, 7);
        assert_eq!(polygon.plane_distance, -64.0);
        assert_eq!(polygon.vertex_ids, [0, 1, 2, 3]);
        assert!(polygon.is_within(4));
        assert!(!polygon.is_within(3));
        assert_eq!(cursor.read_u8().unwrap(), 0xee);
    }

    #[test]
    fn short_vertex_list() {
        let mut w = Writer::new();
        w.write_bytes(&[0; 12]).write_u32(0);
        let data = w.into_bytes();

        let err = BspPolygon::read(&mut ByteCursor::new(&data), 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Truncated);
    }
}
