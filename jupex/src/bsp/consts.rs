/// Identifier at the start of a standalone `.wld` file.
pub const WLD_MAGIC: [u8; 4] = *b"WLDP";

pub const VERSION_113: u32 = 113;
pub const VERSION_126: u32 = 126;

/// Reserved bytes, flags, plane id, distance. Vertex ids follow.
pub const POLYGON_HEADER_SIZE: usize = 12;

/// World model header: five counts, two vectors. The 113 layout adds one more u32.
pub const WORLD_MODEL_HEADER_SIZE: usize = 5 * 4 + 2 * 12;

/// Number of obfuscated counts in a container's world model section.
pub const OBFUSCATED_COUNTS: usize = 8;
