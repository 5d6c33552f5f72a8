/// The only `.world00p` container version understood.
pub const WORLD_VERSION: u32 = 113;

/// Section counts stored at the start of the render section.
pub const RENDER_SECTION_COUNTS: usize = 10;

/// Marks the end of a vertex definition in the first u16 of a property record.
pub const VERTEX_DEFINITION_END: u16 = 255;

pub const VERTEX_PROPERTY_RECORD_SIZE: usize = 8;

/// Size of one render surface record (9 x u32).
pub const RENDER_SURFACE_RECORD_SIZE: usize = 36;

/// Size of one object property record: name offset, type tag and value slot.
pub const OBJECT_PROPERTY_RECORD_SIZE: usize = 12;
