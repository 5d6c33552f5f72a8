use std::fmt;

use glam::Vec3;

use crate::{
    binaries::{BinaryData, ByteCursor},
    error::{JupexError, Result},
};

use super::consts::WORLD_VERSION;

#[repr(C, packed)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct RawWorldHeader {
    render_section: u32,
    sector_section: u32,
    object_section: u32,
    unknown_section: u32,
    bounds_min: Vec3,
    bounds_max: Vec3,
    world_offset: Vec3,
}

/// Top of a `.world00p` container.
///
/// Section offsets are absolute byte positions in the file. Every other decoder
/// expects the caller to seek to the matching offset first.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorldHeader {
    pub version: u32,
    pub render_section: u32,
    pub sector_section: u32,
    pub object_section: u32,
    /// Not decoded by anything yet.
    pub unknown_section: u32,
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
    pub world_offset: Vec3,
}

impl WorldHeader {
    pub fn section_offsets(&self) -> [u32; 4] {
        [
            self.render_section,
            self.sector_section,
            self.object_section,
            self.unknown_section,
        ]
    }
}

impl fmt::Display for WorldHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Header: {} [{:#08x} {:#08x} {:#08x} {:#08x}] [{} {}] {}",
            self.version,
            self.render_section,
            self.sector_section,
            self.object_section,
            self.unknown_section,
            self.bounds_min,
            self.bounds_max,
            self.world_offset
        )
    }
}

impl BinaryData for WorldHeader {
    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let offset = cursor.absolute_position();
        let version = cursor.read_u32()?;

        // nothing past the version is trusted until it checks out
        if version != WORLD_VERSION {
            return Err(JupexError::UnsupportedVersion {
                offset,
                found: version,
            });
        }

        let raw = cursor.read::<RawWorldHeader>()?;

        Ok(Self {
            version,
            render_section: raw.render_section,
            sector_section: raw.sector_section,
            object_section: raw.object_section,
            unknown_section: raw.unknown_section,
            bounds_min: raw.bounds_min,
            bounds_max: raw.bounds_max,
            world_offset: raw.world_offset,
        })
    }
}

#[cfg(test)]
mod header_tests {
    use glam::vec3;

    use super::*;
    use crate::{binaries::Writer, error::ErrorKind};

    fn header_bytes(version: u32) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_u32(version);
        for offset in [0x40, 0x1000, 0x2000, 0x3000] {
            w.write_u32(offset);
        }
        w.write_vec3(vec3(-1.0, -2.0, -3.0));
        w.write_vec3(vec3(1.0, 2.0, 3.0));
        w.write_vec3(vec3(0.5, 0.0, 0.0));
        w.into_bytes()
    }

    #[test]
    fn reads_offsets_and_bounds() {
        let data = header_bytes(WORLD_VERSION);
        let mut cursor = ByteCursor::new(&data);
        let header = WorldHeader::read(&mut cursor).unwrap();

        assert_eq!(header.section_offsets(), [0x40, 0x1000, 0x2000, 0x3000]);
        assert_eq!(header.bounds_min, vec3(-1.0, -2.0, -3.0));
        assert_eq!(header.bounds_max, vec3(1.0, 2.0, 3.0));
        assert_eq!(header.world_offset, vec3(0.5, 0.0, 0.0));
        assert!(cursor.is_empty());
    }

    #[test]
    fn wrong_version_stops_after_four_bytes() {
        let data = header_bytes(126);
        let mut cursor = ByteCursor::new(&data);
        let err = WorldHeader::read(&mut cursor).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Structural);
        assert_eq!(err.offset(), Some(0));
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn version_gate_needs_only_four_bytes() {
        // a lone bad tag fails as structural, not as truncated
        let data = 0u32.to_le_bytes();
        let err = WorldHeader::read(&mut ByteCursor::new(&data)).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn truncated_header() {
        let data = header_bytes(WORLD_VERSION);
        let err = WorldHeader::read(&mut ByteCursor::new(&data[..20])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Truncated);
    }
}
