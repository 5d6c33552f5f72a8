//! `LTMI` material files: an ordered list of shader effects, each with a bag of
//! typed parameters.

use ahash::AHashMap;
use glam::{Vec3, Vec4};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::{
    binaries::ByteCursor,
    error::{JupexError, Result},
};

pub const MATERIAL_MAGIC: [u8; 4] = *b"LTMI";

pub const DIFFUSE_MAP: &str = "tDiffuseMap";
pub const MAX_SPECULAR_POWER: &str = "fMaxSpecularPower";

#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum FxDefType {
    String = 1,
    Vector3f = 2,
    Vector4f = 3,
    Int = 4,
    Float = 5,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FxValue {
    String(String),
    /// Stored order, these are shader constants rather than positions.
    Vector3f(Vec3),
    Vector4f(Vec4),
    Int(i32),
    Float(f32),
}

impl FxValue {
    pub fn def_type(&self) -> FxDefType {
        match self {
            FxValue::String(_) => FxDefType::String,
            FxValue::Vector3f(_) => FxDefType::Vector3f,
            FxValue::Vector4f(_) => FxDefType::Vector4f,
            FxValue::Int(_) => FxDefType::Int,
            FxValue::Float(_) => FxDefType::Float,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FxValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Ints are accepted too, some files store whole numbers that way.
    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            FxValue::Float(f) => Some(f),
            FxValue::Int(i) => Some(i as f32),
            _ => None,
        }
    }

    fn read(cursor: &mut ByteCursor<'_>, def_type: FxDefType) -> Result<Self> {
        Ok(match def_type {
            FxDefType::String => FxValue::String(cursor.read_lt_string()?),
            FxDefType::Vector3f => FxValue::Vector3f(cursor.read_vec3()?),
            FxDefType::Vector4f => FxValue::Vector4f(cursor.read_vec4()?),
            FxDefType::Int => FxValue::Int(cursor.read_i32()?),
            FxDefType::Float => FxValue::Float(cursor.read_f32()?),
        })
    }
}

/// One shader effect and its parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialFx {
    /// Effect file the parameters feed, as stored.
    pub file_name: String,
    /// Later definitions of the same name replace earlier ones.
    pub definitions: AHashMap<String, FxValue>,
}

impl MaterialFx {
    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let file_name = cursor.read_lt_string()?;
        let count = cursor.read_u32()?;
        // type tag and an empty name at the very least
        let count = cursor.ensure_count("material definition", count as u64, 6)?;

        let mut definitions = AHashMap::with_capacity(count);
        for _ in 0..count {
            let offset = cursor.absolute_position();
            let tag = cursor.read_u32()?;
            let def_type =
                FxDefType::from_u32(tag).ok_or(JupexError::UnknownDefType { value: tag, offset })?;
            let name = cursor.read_lt_string()?;
            let value = FxValue::read(cursor, def_type)?;
            definitions.insert(name, value);
        }

        Ok(Self {
            file_name,
            definitions,
        })
    }

    pub fn get(&self, name: &str) -> Option<&FxValue> {
        self.definitions.get(name)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    /// File stem of the path the material was loaded from.
    pub name: String,
    pub fx: Vec<MaterialFx>,
}

impl Material {
    /// Decode a whole material file.
    ///
    /// Any failure rejects the material: a definition that is not understood
    /// leaves no way to find where the next one starts.
    pub fn decode(name: impl Into<String>, data: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(data);

        let found = cursor.read_magic()?;
        if found != MATERIAL_MAGIC {
            return Err(JupexError::InvalidMagic {
                offset: 0,
                expected: MATERIAL_MAGIC,
                found,
            });
        }

        let offset = cursor.absolute_position();
        let count = cursor.read_u32()?;
        if count == 0 {
            return Err(JupexError::EmptyMaterial { offset });
        }
        let count = cursor.ensure_count("material effect", count as u64, 6)?;

        let fx = (0..count)
            .map(|_| MaterialFx::read(&mut cursor))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: name.into(),
            fx,
        })
    }

    /// Decode with the name taken from a stored path, `Materials\Floor.Mat00` gives `Floor`.
    pub fn from_path(path: &str, data: &[u8]) -> Result<Self> {
        Self::decode(name_from_path(path), data)
    }

    /// First definition called `name`, searching effects in order.
    pub fn definition(&self, name: &str) -> Option<&FxValue> {
        self.fx.iter().find_map(|fx| fx.get(name))
    }

    pub fn diffuse_map(&self) -> Option<&str> {
        self.definition(DIFFUSE_MAP).and_then(FxValue::as_str)
    }

    /// Specular power scaled to `0.0..=1.0`.
    pub fn specular(&self) -> Option<f32> {
        self.definition(MAX_SPECULAR_POWER)
            .and_then(FxValue::as_f32)
            .map(|p| p / 255.0)
    }
}

/// File name without directories or extension. Both separators are accepted.
pub fn name_from_path(path: &str) -> &str {
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file,
    }
}

#[cfg(test)]
mod material_tests {
    use glam::vec3;

    use super::*;
    use crate::{binaries::Writer, error::ErrorKind};

    fn material_bytes() -> Vec<u8> {
        let mut w = Writer::new();
        w.write_bytes(&MATERIAL_MAGIC).write_u32(2);

        w.write_lt_string("FX\\World.fx").write_u32(3);
        w.write_u32(FxDefType::String as u32)
            .write_lt_string(DIFFUSE_MAP)
            .write_lt_string("Tex\\Floor.dds");
        w.write_u32(FxDefType::Float as u32)
            .write_lt_string(MAX_SPECULAR_POWER)
            .write_f32(51.0);
        w.write_u32(FxDefType::Vector3f as u32)
            .write_lt_string("vBaseColor")
            .write_vec3(vec3(1.0, 0.5, 0.25));

        w.write_lt_string("FX\\Detail.fx").write_u32(2);
        w.write_u32(FxDefType::Int as u32).write_lt_string("iLayers").write_i32(-3);
        w.write_u32(FxDefType::String as u32)
            .write_lt_string(DIFFUSE_MAP)
            .write_lt_string("Tex\\Detail.dds");
        w.into_bytes()
    }

    #[test]
    fn decodes_effects() {
        let data = material_bytes();
        let material = Material::from_path("Materials\\World\\Floor.Mat00", &data).unwrap();

        assert_eq!(material.name, "Floor");
        assert_eq!(material.fx.len(), 2);
        assert_eq!(material.fx[0].file_name, "FX\\World.fx");
        assert_eq!(
            material.fx[0].get("vBaseColor"),
            Some(&FxValue::Vector3f(vec3(1.0, 0.5, 0.25)))
        );
        assert_eq!(material.fx[1].get("iLayers"), Some(&FxValue::Int(-3)));
        assert_eq!(
            material.definition("iLayers").map(FxValue::def_type),
            Some(FxDefType::Int)
        );

        // first effect wins
        assert_eq!(material.diffuse_map(), Some("Tex\\Floor.dds"));
        assert_eq!(material.specular(), Some(0.2));
        assert_eq!(material.definition("missing"), None);
    }

    #[test]
    fn empty_material() {
        let mut w = Writer::new();
        w.write_bytes(&MATERIAL_MAGIC).write_u32(0);
        let data = w.into_bytes();

        assert!(matches!(
            Material::decode("Empty", &data),
            Err(JupexError::EmptyMaterial { offset: 4 })
        ));
    }

    #[test]
    fn wrong_magic() {
        let mut data = material_bytes();
        data[..4].copy_from_slice(b"LTMO");

        let err = Material::decode("x", &data).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn unknown_definition_type_rejects_material() {
        let mut w = Writer::new();
        w.write_bytes(&MATERIAL_MAGIC).write_u32(1);
        w.write_lt_string("FX\\World.fx").write_u32(2);
        w.write_u32(FxDefType::Int as u32).write_lt_string("iOk").write_i32(1);
        let tag_offset = w.position();
        w.write_u32(9).write_lt_string("bad").write_u32(0);
        let data = w.into_bytes();

        match Material::decode("x", &data) {
            Err(JupexError::UnknownDefType { value, offset }) => {
                assert_eq!((value, offset), (9, tag_offset));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn truncated_material() {
        let data = material_bytes();
        let err = Material::decode("x", &data[..data.len() - 3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Truncated);
    }

    #[test]
    fn names_from_paths() {
        assert_eq!(name_from_path("Materials\\Floor.Mat00"), "Floor");
        assert_eq!(name_from_path("materials/walls/brick.mat00"), "brick");
        assert_eq!(name_from_path("NoExtension"), "NoExtension");
        assert_eq!(name_from_path("dir/.hidden"), ".hidden");
        assert_eq!(name_from_path("a.b.Mat00"), "a.b");
    }
}
