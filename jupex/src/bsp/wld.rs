use glam::Vec3;

use super::{
    consts::WLD_MAGIC,
    section::{flag_bytes, read_models},
    WorldModel, WorldVersion,
};
use crate::{
    binaries::{BinaryData, ByteCursor},
    error::{JupexError, Result},
    world::StringTableEntry,
};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WldHeader {
    pub version: WorldVersion,
    /// Meaning unknown, kept as stored.
    pub vectors: [Vec3; 5],
}

impl BinaryData for WldHeader {
    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let offset = cursor.absolute_position();
        let found = cursor.read_magic()?;
        if found != WLD_MAGIC {
            return Err(JupexError::InvalidMagic {
                offset,
                expected: WLD_MAGIC,
                found,
            });
        }

        let version = WorldVersion::read(cursor)?;
        let vectors = cursor.read_array::<Vec3, 5>()?;

        Ok(Self { version, vectors })
    }
}

/// Table of contents for the models of a `.wld` file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WldModelsSection {
    pub node_count: u32,
    pub subdivision_flags: Vec<u8>,
    /// Only stored by the 113 layout.
    pub reserved: Option<u32>,
    pub string_count: u32,
    pub string_length: u32,
    pub model_count: u32,
    pub reserved_counts: [u32; 4],
    /// Only stored by the 126 layout.
    pub floats: Vec<f32>,
    /// Names per model, by model index.
    pub names: Vec<Vec<String>>,
    /// Stored axis order.
    pub normals: Vec<Vec3>,
}

impl WldModelsSection {
    /// Decode the section header, then `model_count` models straight after it.
    pub fn read(
        cursor: &mut ByteCursor<'_>,
        version: WorldVersion,
    ) -> Result<(Self, Vec<WorldModel>)> {
        let node_count = cursor.read_u32()?;
        let subdivision_flags = cursor.read_bytes(flag_bytes(node_count))?.to_vec();

        let reserved = match version {
            WorldVersion::V113 => Some(cursor.read_u32()?),
            WorldVersion::V126 => None,
        };

        let [string_count, string_length, normal_count, model_count] =
            cursor.read_array::<u32, 4>()?;
        let reserved_counts = cursor.read_array::<u32, 4>()?;

        let floats = match version {
            WorldVersion::V113 => Vec::new(),
            WorldVersion::V126 => {
                let count = cursor.read_u32()?;
                let count = cursor.ensure_count("float", count as u64, 4)?;
                (0..count)
                    .map(|_| cursor.read_f32())
                    .collect::<Result<Vec<_>>>()?
            }
        };

        let string_length = cursor.ensure_count("string byte", string_length as u64, 1)?;
        let strings = cursor.read_bytes(string_length)?;
        let entries = StringTableEntry::read_all(cursor, string_count)?;

        let normal_count = cursor.ensure_count("normal", normal_count as u64, 12)?;
        let normals = (0..normal_count)
            .map(|_| cursor.read_vec3())
            .collect::<Result<Vec<_>>>()?;

        let models = read_models(cursor, strings, &entries, model_count, version)?;
        let names = models.iter().map(|m| m.names.clone()).collect();

        let section = Self {
            node_count,
            subdivision_flags,
            reserved,
            string_count,
            string_length: string_length as u32,
            model_count,
            reserved_counts,
            floats,
            names,
            normals,
        };

        Ok((section, models))
    }
}

/// A decoded standalone `.wld` file.
#[derive(Clone, Debug, PartialEq)]
pub struct WldFile {
    pub header: WldHeader,
    pub section: WldModelsSection,
    pub models: Vec<WorldModel>,
}

impl BinaryData for WldFile {
    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let header = WldHeader::read(cursor)?;
        log::debug!("WLDP version {:?}", header.version);

        let (section, models) = WldModelsSection::read(cursor, header.version)?;
        log::info!("Read {} world models", models.len());

        Ok(Self {
            header,
            section,
            models,
        })
    }
}

/// Decode a whole `.wld` file.
pub fn decode_wld(data: &[u8]) -> Result<WldFile> {
    WldFile::read(&mut ByteCursor::new(data))
}

#[cfg(test)]
mod wld_tests {
    use glam::vec3;

    use super::*;
    use crate::{binaries::Writer, bsp::model::model_tests::write_model};

    fn wld_bytes(version: u32) -> Vec<u8> {
        let names = b"WorldModel0\0PhysicsBox\0";
        let wld_version = WorldVersion::from_u32(version).unwrap_or(WorldVersion::V113);

        let mut w = Writer::new();
        w.write_bytes(&WLD_MAGIC).write_u32(version);
        for i in 0..5 {
            w.write_vec3(vec3(i as f32, 0.0, 0.0));
        }

        w.write_u32(3).write_u8(0b101);
        if wld_version == WorldVersion::V113 {
            w.write_u32(77);
        }
        w.write_u32(2).write_u32(names.len() as u32);
        w.write_u32(1).write_u32(2);
        w.write_bytes(&[0; 16]);
        if wld_version == WorldVersion::V126 {
            w.write_u32(2).write_f32(0.5).write_f32(1.5);
        }

        w.write_bytes(names);
        w.write_u32(0).write_u32(0);
        w.write_u32(12).write_u32(1);
        w.write_vec3(vec3(0.0, 0.0, 1.0));

        write_model(&mut w, wld_version);
        write_model(&mut w, wld_version);
        w.into_bytes()
    }

    #[test]
    fn reads_version_113() {
        let data = wld_bytes(113);
        let wld = decode_wld(&data).unwrap();

        assert_eq!(wld.header.version, WorldVersion::V113);
        assert_eq!(wld.header.vectors[4], vec3(4.0, 0.0, 0.0));
        assert_eq!(wld.section.reserved, Some(77));
        assert!(wld.section.floats.is_empty());
        assert_eq!(wld.section.subdivision_flags, [0b101]);
        assert_eq!(wld.section.normals, [vec3(0.0, 0.0, 1.0)]);
        assert_eq!(wld.models.len(), 2);
        assert_eq!(wld.models[0].name(), Some("WorldModel0"));
        assert_eq!(wld.models[1].name(), Some("PhysicsBox"));
        assert_eq!(wld.models[0].trailing, Some(0x55));
    }

    #[test]
    fn reads_version_126() {
        let data = wld_bytes(126);
        let wld = decode_wld(&data).unwrap();

        assert_eq!(wld.header.version, WorldVersion::V126);
        assert_eq!(wld.section.reserved, None);
        assert_eq!(wld.section.floats, [0.5, 1.5]);
        assert_eq!(wld.section.names, [vec!["WorldModel0"], vec!["PhysicsBox"]]);
        assert_eq!(wld.models[1].trailing, None);
        assert_eq!(wld.models[1].nodes.len(), 1);
    }

    #[test]
    fn rejects_other_versions() {
        let data = wld_bytes(120);
        assert!(matches!(
            decode_wld(&data),
            Err(JupexError::UnsupportedVersion { offset: 4, found: 120 })
        ));
    }

    #[test]
    fn rejects_other_magic() {
        let mut data = wld_bytes(113);
        data[3] = b'X';
        let err = decode_wld(&data).unwrap_err();
        assert!(err.is_structural());
        assert_eq!(err.offset(), Some(0));
    }
}
