//! BSP world models, either inside a `.world00p` container or in a standalone
//! `.wld` file.

pub mod consts;
pub mod model;
pub mod polygon;
pub mod section;
pub mod wld;

pub use model::{NodeEntry, WorldModel};
pub use polygon::BspPolygon;
pub use section::{deobfuscate, obfuscate, ModelCounts, WorldModelSection};
pub use wld::{decode_wld, WldFile, WldHeader, WldModelsSection};

use crate::{
    binaries::{BinaryData, ByteCursor},
    error::{JupexError, Result},
};

use consts::{VERSION_113, VERSION_126};

/// Layout revision of world model data. Containers are always 113.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WorldVersion {
    /// Extra u32 after the model header, 32-bit node entries.
    V113,
    /// Float block in the section header, 16-bit node entries.
    V126,
}

impl WorldVersion {
    pub fn from_u32(version: u32) -> Option<Self> {
        match version {
            VERSION_113 => Some(Self::V113),
            VERSION_126 => Some(Self::V126),
            _ => None,
        }
    }

    pub fn as_u32(self) -> u32 {
        match self {
            Self::V113 => VERSION_113,
            Self::V126 => VERSION_126,
        }
    }
}

impl BinaryData for WorldVersion {
    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let offset = cursor.absolute_position();
        let found = cursor.read_u32()?;
        Self::from_u32(found).ok_or(JupexError::UnsupportedVersion { offset, found })
    }
}
