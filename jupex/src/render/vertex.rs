use glam::{Vec2, Vec3, Vec4};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::{
    binaries::{BinaryData, ByteCursor},
    coords::{flip_v, normalise_colour, swap_yz},
    diagnostics::{DiagnosticKind, Diagnostics, Entity},
    error::{JupexError, Result},
    world::consts::{VERTEX_DEFINITION_END, VERTEX_PROPERTY_RECORD_SIZE},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum VertexPropertyFormat {
    Float2 = 1,
    Float3 = 2,
    Float4 = 3,
    Byte4 = 4,
    /// Four signed bytes.
    SkeletalIndex = 5,
    /// Terminates a declaration. Never valid inside one.
    Exit = 17,
}

impl VertexPropertyFormat {
    /// Bytes the property occupies in a vertex record.
    pub fn size(self) -> usize {
        match self {
            VertexPropertyFormat::Float2 => 8,
            VertexPropertyFormat::Float3 => 12,
            VertexPropertyFormat::Float4 => 16,
            VertexPropertyFormat::Byte4 | VertexPropertyFormat::SkeletalIndex => 4,
            VertexPropertyFormat::Exit => 0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum VertexPropertyLocation {
    Position = 0,
    BlendWeight = 1,
    BlendIndices = 2,
    Normal = 3,
    TexCoords = 5,
    Tangent = 6,
    Binormal = 7,
    Colour = 10,
}

/// One stored declaration element, laid out like a Direct3D 9 vertex element.
#[repr(C, packed)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct VertexPropertyRecord {
    stream: u16,
    offset: u16,
    format: u8,
    method: u8,
    location: u8,
    sub_id: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VertexProperty {
    pub format: VertexPropertyFormat,
    pub location: VertexPropertyLocation,
    /// Non-zero for secondary channels (second UV set and so on).
    pub sub_id: u8,
    /// Stored byte offset inside the vertex. Decoding walks properties in order instead.
    pub offset: u16,
}

impl VertexProperty {
    fn from_record(record: VertexPropertyRecord, offset: usize) -> Result<Self> {
        let format = VertexPropertyFormat::from_u8(record.format).ok_or(
            JupexError::UnknownEnumValue {
                kind: "vertex property format",
                value: record.format as i64,
                offset: offset + 4,
            },
        )?;
        if format == VertexPropertyFormat::Exit {
            return Err(JupexError::UnexpectedSentinel { offset: offset + 4 });
        }
        let location = VertexPropertyLocation::from_u8(record.location).ok_or(
            JupexError::UnknownEnumValue {
                kind: "vertex property location",
                value: record.location as i64,
                offset: offset + 6,
            },
        )?;

        Ok(Self {
            format,
            location,
            sub_id: record.sub_id,
            offset: record.offset,
        })
    }

    /// Whether the value is read only to keep the stride and then dropped.
    pub fn is_unhandled(&self) -> bool {
        self.sub_id != 0
            || matches!(
                self.location,
                VertexPropertyLocation::BlendWeight | VertexPropertyLocation::BlendIndices
            )
    }
}

/// Decoded vertex, already converted to the consumer's axes.
///
/// Attributes the declaration does not mention keep their defaults.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coords: Vec2,
    pub tangent: Vec3,
    pub binormal: Vec3,
    pub colour: Vec4,
}

/// Ordered list of properties making up one vertex layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VertexDefinition {
    pub properties: Vec<VertexProperty>,
}

impl VertexDefinition {
    /// Decode the records of one declaration block, stopping at the end marker.
    fn parse(mut block: ByteCursor<'_>, offset: usize) -> Result<Self> {
        let size = block.len();
        let mut properties = Vec::new();

        for _ in 0..size / VERTEX_PROPERTY_RECORD_SIZE {
            let record_offset = block.absolute_position();
            let record = block.read::<VertexPropertyRecord>()?;
            let stream = record.stream;

            if stream == VERTEX_DEFINITION_END {
                return Ok(Self { properties });
            }

            properties.push(VertexProperty::from_record(record, record_offset)?);
        }

        Err(JupexError::UnterminatedVertexDefinition { offset, size })
    }

    /// Bytes consumed by one vertex following this layout.
    pub fn stride(&self) -> usize {
        self.properties.iter().map(|p| p.format.size()).sum()
    }

    pub fn unhandled(&self) -> impl Iterator<Item = &VertexProperty> {
        self.properties.iter().filter(|p| p.is_unhandled())
    }

    /// Decode a single vertex record.
    pub fn read_vertex(&self, cursor: &mut ByteCursor<'_>) -> Result<Vertex> {
        let mut vertex = Vertex::default();

        for property in &self.properties {
            let offset = cursor.absolute_position();
            let value = match property.format {
                VertexPropertyFormat::Float2 => cursor.read_vec2()?.extend(0.0).extend(0.0),
                VertexPropertyFormat::Float3 => cursor.read_vec3()?.extend(0.0),
                VertexPropertyFormat::Float4 => cursor.read_vec4()?,
                VertexPropertyFormat::Byte4 => {
                    Vec4::from_array(cursor.read_array::<u8, 4>()?.map(|b| b as f32))
                }
                VertexPropertyFormat::SkeletalIndex => {
                    Vec4::from_array(cursor.read_array::<i8, 4>()?.map(|b| b as f32))
                }
                VertexPropertyFormat::Exit => {
                    return Err(JupexError::UnexpectedSentinel { offset })
                }
            };

            if property.is_unhandled() {
                continue;
            }

            match property.location {
                VertexPropertyLocation::Position => vertex.position = swap_yz(value.truncate()),
                VertexPropertyLocation::Normal => vertex.normal = swap_yz(value.truncate()),
                VertexPropertyLocation::TexCoords => {
                    vertex.tex_coords = flip_v(value.truncate().truncate())
                }
                VertexPropertyLocation::Tangent => vertex.tangent = swap_yz(value.truncate()),
                VertexPropertyLocation::Binormal => vertex.binormal = swap_yz(value.truncate()),
                VertexPropertyLocation::Colour => vertex.colour = normalise_colour(value),
                VertexPropertyLocation::BlendWeight | VertexPropertyLocation::BlendIndices => {}
            }
        }

        Ok(vertex)
    }
}

impl BinaryData for VertexDefinition {
    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let offset = cursor.absolute_position();
        let size = cursor.read_u32()? as usize;
        let block = cursor.sub_cursor(size)?;
        Self::parse(block, offset)
    }
}

/// Every vertex declaration of the render section, by index.
///
/// A declaration that failed to decode leaves a gap, so later indices keep
/// pointing at the right declaration.
#[derive(Clone, Debug, Default)]
pub struct VertexFormatTable {
    definitions: Vec<Option<VertexDefinition>>,
}

impl VertexFormatTable {
    pub fn read(cursor: &mut ByteCursor<'_>, diagnostics: &mut Diagnostics) -> Result<Self> {
        let count = cursor.read_u32()?;
        let count = cursor.ensure_count("vertex definition", count as u64, 4)?;
        let mut definitions = Vec::with_capacity(count);

        for i in 0..count {
            let offset = cursor.absolute_position();
            let size = cursor.read_u32()? as usize;
            // the outer cursor moves past the block whatever it contains
            let block = cursor.sub_cursor(size)?;

            match VertexDefinition::parse(block, offset) {
                Ok(definition) => definitions.push(Some(definition)),
                Err(e) => {
                    diagnostics.push(
                        Entity::VertexDefinition(i),
                        DiagnosticKind::InvalidVertexDefinition(e),
                    );
                    definitions.push(None);
                }
            }
        }

        log::debug!("Read {} vertex definitions", definitions.len());

        Ok(Self { definitions })
    }

    pub fn get(&self, index: u32) -> Result<&VertexDefinition> {
        self.definitions
            .get(index as usize)
            .and_then(Option::as_ref)
            .ok_or(JupexError::MissingVertexDefinition {
                index,
                available: self.definitions.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&VertexDefinition>> {
        self.definitions.iter().map(Option::as_ref)
    }
}

impl From<Vec<VertexDefinition>> for VertexFormatTable {
    fn from(definitions: Vec<VertexDefinition>) -> Self {
        Self {
            definitions: definitions.into_iter().map(Some).collect(),
        }
    }
}

#[cfg(test)]
pub(crate) mod vertex_tests {
    use glam::vec3;

    use super::*;
    use crate::{binaries::Writer, error::ErrorKind};

    /// Append one declaration block: size prefix, records and the end marker.
    pub(crate) fn write_definition(w: &mut Writer, properties: &[(u8, u8, u8)]) {
        w.write_u32(((properties.len() + 1) * VERTEX_PROPERTY_RECORD_SIZE) as u32);
        let mut offset = 0u16;
        for &(format, location, sub_id) in properties {
            w.write_u16(0).write_u16(offset);
            w.write_u8(format).write_u8(0).write_u8(location).write_u8(sub_id);
            offset += 4;
        }
        w.write_u16(VERTEX_DEFINITION_END).write_u16(0);
        w.write_u8(VertexPropertyFormat::Exit as u8).write_bytes(&[0, 0, 0]);
    }

    fn definition(properties: &[(u8, u8, u8)]) -> VertexDefinition {
        let mut w = Writer::new();
        write_definition(&mut w, properties);
        let data = w.into_bytes();
        VertexDefinition::read(&mut ByteCursor::new(&data)).unwrap()
    }

    #[test]
    fn reads_declaration() {
        let def = definition(&[(2, 0, 0), (2, 3, 0), (1, 5, 0), (4, 10, 0)]);

        let formats: Vec<_> = def.properties.iter().map(|p| p.format).collect();
        assert_eq!(
            formats,
            [
                VertexPropertyFormat::Float3,
                VertexPropertyFormat::Float3,
                VertexPropertyFormat::Float2,
                VertexPropertyFormat::Byte4
            ]
        );
        assert_eq!(def.properties[3].location, VertexPropertyLocation::Colour);
        assert_eq!(def.stride(), 12 + 12 + 8 + 4);
        assert_eq!(def.unhandled().count(), 0);
    }

    #[test]
    fn declaration_without_terminator() {
        let mut w = Writer::new();
        w.write_u32(8);
        w.write_u16(0).write_u16(0).write_bytes(&[2, 0, 0, 0]);
        let data = w.into_bytes();

        let mut cursor = ByteCursor::new(&data);
        assert!(matches!(
            VertexDefinition::read(&mut cursor),
            Err(JupexError::UnterminatedVertexDefinition { offset: 0, size: 8 })
        ));
        assert!(cursor.is_empty());
    }

    #[test]
    fn cursor_skips_padding_after_marker() {
        let mut w = Writer::new();
        w.write_u32(24);
        w.write_u16(VERTEX_DEFINITION_END).write_u16(0).write_bytes(&[17, 0, 0, 0]);
        w.write_bytes(&[0xaa; 16]);
        w.write_u8(42);
        let data = w.into_bytes();

        let mut cursor = ByteCursor::new(&data);
        let def = VertexDefinition::read(&mut cursor).unwrap();
        assert!(def.properties.is_empty());
        assert_eq!(cursor.read_u8().unwrap(), 42);
    }

    #[test]
    fn unknown_format_only_loses_its_definition() {
        let mut w = Writer::new();
        w.write_u32(3);
        write_definition(&mut w, &[(2, 0, 0)]);
        write_definition(&mut w, &[(2, 0, 0), (99, 3, 0)]);
        write_definition(&mut w, &[(1, 5, 0)]);
        let data = w.into_bytes();

        let mut diagnostics = Diagnostics::new();
        let table = VertexFormatTable::read(&mut ByteCursor::new(&data), &mut diagnostics).unwrap();

        assert_eq!(table.len(), 3);
        assert!(table.get(0).is_ok());
        assert!(matches!(
            table.get(1),
            Err(JupexError::MissingVertexDefinition { index: 1, available: 3 })
        ));
        assert_eq!(table.get(2).unwrap().properties.len(), 1);

        assert_eq!(diagnostics.len(), 1);
        let diagnostic = diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.entity, Entity::VertexDefinition(1));
        match &diagnostic.kind {
            DiagnosticKind::InvalidVertexDefinition(e) => {
                assert_eq!(e.kind(), ErrorKind::UnknownEnum);
                assert!(matches!(
                    e,
                    JupexError::UnknownEnumValue { value: 99, .. }
                ));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn end_format_inside_declaration_loses_definition() {
        let mut w = Writer::new();
        w.write_u32(2);
        write_definition(&mut w, &[(2, 0, 0), (17, 3, 0)]);
        write_definition(&mut w, &[(2, 0, 0)]);
        let data = w.into_bytes();

        let mut diagnostics = Diagnostics::new();
        let table = VertexFormatTable::read(&mut ByteCursor::new(&data), &mut diagnostics).unwrap();

        assert!(table.get(0).is_err());
        assert!(table.get(1).is_ok());
        assert!(matches!(
            diagnostics.iter().next().map(|d| &d.kind),
            // second record of the block starts at 16, its format byte 4 after that
            Some(DiagnosticKind::InvalidVertexDefinition(JupexError::UnexpectedSentinel {
                offset: 20
            }))
        ));
    }

    #[test]
    fn converts_attributes() {
        let def = definition(&[(2, 0, 0), (2, 3, 0), (1, 5, 0), (4, 10, 0)]);

        let mut w = Writer::new();
        w.write_vec3(vec3(1.0, 2.0, 3.0));
        w.write_vec3(vec3(0.0, 1.0, 0.0));
        w.write_f32(0.25).write_f32(0.75);
        w.write_bytes(&[255, 0, 51, 255]);
        let data = w.into_bytes();

        let vertex = def.read_vertex(&mut ByteCursor::new(&data)).unwrap();
        assert_eq!(vertex.position, vec3(1.0, 3.0, 2.0));
        assert_eq!(vertex.normal, vec3(0.0, 0.0, 1.0));
        assert_eq!(vertex.tex_coords, Vec2::new(0.25, 0.25));
        assert!((vertex.colour - Vec4::new(1.0, 0.0, 0.2, 1.0)).abs().max_element() < 1e-6);
        assert_eq!(vertex.tangent, Vec3::ZERO);
    }

    #[test]
    fn secondary_channels_keep_stride() {
        // second UV set and blend weights are read past, not stored
        let def = definition(&[(2, 0, 0), (1, 5, 1), (3, 1, 0), (1, 5, 0)]);
        assert_eq!(def.unhandled().count(), 2);

        let mut w = Writer::new();
        w.write_vec3(vec3(1.0, 2.0, 3.0));
        w.write_f32(9.0).write_f32(9.0);
        w.write_f32(0.5).write_f32(0.5).write_f32(0.0).write_f32(0.0);
        w.write_f32(0.0).write_f32(1.0);
        let data = w.into_bytes();

        let mut cursor = ByteCursor::new(&data);
        let vertex = def.read_vertex(&mut cursor).unwrap();
        assert_eq!(vertex.tex_coords, Vec2::new(0.0, 0.0));
        assert!(cursor.is_empty());
    }

    #[test]
    fn sentinel_inside_declaration() {
        let def = VertexDefinition {
            properties: vec![VertexProperty {
                format: VertexPropertyFormat::Exit,
                location: VertexPropertyLocation::Position,
                sub_id: 0,
                offset: 0,
            }],
        };

        let data = [0u8; 12];
        assert!(matches!(
            def.read_vertex(&mut ByteCursor::new(&data)),
            Err(JupexError::UnexpectedSentinel { offset: 0 })
        ));
    }
}
