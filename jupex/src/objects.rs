use ahash::AHashMap;
use glam::{Quat, Vec3, Vec4};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::{
    binaries::{cstring_at, BinaryData, ByteCursor},
    coords::{swap_quat, swap_yz},
    diagnostics::{DiagnosticKind, Diagnostics, Entity},
    error::{JupexError, Result},
    world::consts::OBJECT_PROPERTY_RECORD_SIZE,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum ObjectPropertyType {
    String = 0,
    Vector = 1,
    Colour = 2,
    Float = 3,
    Int = 4,
    Flags = 5,
    Quaternion = 6,
    CommandString = 7,
    Text = 8,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    String(String),
    /// Axis swapped like every other position.
    Vector(Vec3),
    /// Swapped the same way as vectors.
    Colour(Vec3),
    Float(f32),
    Int(i32),
    Flags(i32),
    Quaternion(Quat),
    CommandString(String),
    Text(String),
}

impl PropertyValue {
    pub fn property_type(&self) -> ObjectPropertyType {
        match self {
            PropertyValue::String(_) => ObjectPropertyType::String,
            PropertyValue::Vector(_) => ObjectPropertyType::Vector,
            PropertyValue::Colour(_) => ObjectPropertyType::Colour,
            PropertyValue::Float(_) => ObjectPropertyType::Float,
            PropertyValue::Int(_) => ObjectPropertyType::Int,
            PropertyValue::Flags(_) => ObjectPropertyType::Flags,
            PropertyValue::Quaternion(_) => ObjectPropertyType::Quaternion,
            PropertyValue::CommandString(_) => ObjectPropertyType::CommandString,
            PropertyValue::Text(_) => ObjectPropertyType::Text,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) | PropertyValue::CommandString(s) | PropertyValue::Text(s) => {
                Some(s)
            }
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match *self {
            PropertyValue::Vector(v) | PropertyValue::Colour(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            PropertyValue::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            PropertyValue::Int(i) | PropertyValue::Flags(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_quat(&self) -> Option<Quat> {
        match *self {
            PropertyValue::Quaternion(q) => Some(q),
            _ => None,
        }
    }
}

/// Name offset, type tag and a four byte slot holding either the value or a
/// blob offset to it.
#[repr(C, packed)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct PropertyRecord {
    name_offset: u32,
    kind: u32,
    slot: [u8; 4],
}

/// A placed object: its class and its named properties.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldObject {
    pub type_name: String,
    pub properties: AHashMap<String, PropertyValue>,
}

impl WorldObject {
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("Name").and_then(PropertyValue::as_str)
    }

    pub fn position(&self) -> Option<Vec3> {
        self.get("Pos").and_then(PropertyValue::as_vec3)
    }

    pub fn rotation(&self) -> Option<Quat> {
        self.get("Rotation").and_then(PropertyValue::as_quat)
    }
}

/// The bytes of one object, split out before any property is interpreted.
struct ObjectFrame<'a> {
    type_name: String,
    blob: &'a [u8],
    records: ByteCursor<'a>,
}

impl<'a> ObjectFrame<'a> {
    /// Only fails when the section itself is cut short.
    fn read(cursor: &mut ByteCursor<'a>) -> Result<Self> {
        let type_name = cursor.read_lt_string()?;
        let [property_count, blob_size] = cursor.read_array::<u32, 2>()?;
        let blob = cursor.read_bytes(blob_size as usize)?;

        let property_count = cursor.ensure_count(
            "object property",
            property_count as u64,
            OBJECT_PROPERTY_RECORD_SIZE as u64,
        )?;
        let records = cursor.sub_cursor(property_count * OBJECT_PROPERTY_RECORD_SIZE)?;

        Ok(Self {
            type_name,
            blob,
            records,
        })
    }

    fn decode(mut self) -> Result<WorldObject> {
        let mut properties = AHashMap::new();

        while !self.records.is_empty() {
            let offset = self.records.absolute_position();
            let record = self.records.read::<PropertyRecord>()?;
            let (name_offset, kind) = (record.name_offset, record.kind);

            let name = cstring_at(self.blob, name_offset as usize, "object property name")?;
            let kind = ObjectPropertyType::from_u32(kind)
                .ok_or(JupexError::UnknownPropertyType { value: kind, offset: offset + 4 })?;
            let value = self.value(kind, record.slot)?;

            properties.insert(name, value);
        }

        Ok(WorldObject {
            type_name: self.type_name,
            properties,
        })
    }

    fn value(&self, kind: ObjectPropertyType, slot: [u8; 4]) -> Result<PropertyValue> {
        let blob_offset = u32::from_le_bytes(slot) as usize;

        Ok(match kind {
            ObjectPropertyType::String => PropertyValue::String(self.string(blob_offset)?),
            ObjectPropertyType::CommandString => {
                PropertyValue::CommandString(self.string(blob_offset)?)
            }
            ObjectPropertyType::Text => PropertyValue::Text(self.string(blob_offset)?),
            ObjectPropertyType::Vector => {
                PropertyValue::Vector(swap_yz(self.floats(blob_offset)?.read_vec3()?))
            }
            ObjectPropertyType::Colour => {
                PropertyValue::Colour(swap_yz(self.floats(blob_offset)?.read_vec3()?))
            }
            ObjectPropertyType::Quaternion => {
                let raw: Vec4 = self.floats(blob_offset)?.read_vec4()?;
                PropertyValue::Quaternion(swap_quat(raw))
            }
            ObjectPropertyType::Float => PropertyValue::Float(f32::from_le_bytes(slot)),
            ObjectPropertyType::Int => PropertyValue::Int(i32::from_le_bytes(slot)),
            ObjectPropertyType::Flags => PropertyValue::Flags(i32::from_le_bytes(slot)),
        })
    }

    fn string(&self, offset: usize) -> Result<String> {
        cstring_at(self.blob, offset, "object property string")
    }

    /// Cursor over the blob from `offset`, reads past the end fail as usual.
    fn floats(&self, offset: usize) -> Result<ByteCursor<'a>> {
        let blob = ByteCursor::new(self.blob);
        let len = self.blob.len().checked_sub(offset).ok_or(JupexError::OffsetOutOfBounds {
            context: "object property value",
            offset,
            len: 12,
            available: self.blob.len(),
        })?;
        blob.view(offset, len)
    }
}

impl BinaryData for WorldObject {
    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        ObjectFrame::read(cursor)?.decode()
    }
}

/// Decode the object section at the cursor position.
///
/// An object whose properties do not decode is skipped on its own. Running out
/// of data fails the section.
pub fn read_objects(
    cursor: &mut ByteCursor<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<WorldObject>> {
    let count = cursor.read_u32()?;
    // type name length and both counts
    let count = cursor.ensure_count("object", count as u64, 10)?;

    let mut objects = Vec::with_capacity(count);
    for index in 0..count {
        let frame = ObjectFrame::read(cursor)?;
        let type_name = frame.type_name.clone();

        match frame.decode() {
            Ok(object) => objects.push(object),
            Err(e) => {
                log::debug!("Skipping {type_name} object");
                diagnostics.push(Entity::Object(index), DiagnosticKind::SkippedObject(e));
            }
        }
    }

    log::info!("Read {} of {} objects", objects.len(), count);

    Ok(objects)
}
