use glam::Vec3;

use super::{consts::OBFUSCATED_COUNTS, WorldModel, WorldVersion};
use crate::{
    binaries::ByteCursor,
    diagnostics::{DiagnosticKind, Diagnostics, Entity, Section},
    error::Result,
    world::{StringTable, StringTableEntry},
};

/// XOR every count with the per-game magic. Applying it twice gives back the input.
pub fn obfuscate(counts: [u32; OBFUSCATED_COUNTS], magic: u32) -> [u32; OBFUSCATED_COUNTS] {
    counts.map(|c| c ^ magic)
}

pub fn deobfuscate(stored: [u32; OBFUSCATED_COUNTS], magic: u32) -> [u32; OBFUSCATED_COUNTS] {
    obfuscate(stored, magic)
}

/// The eight counts heading a container's world model section, in stored order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelCounts {
    pub name_entries: u32,
    pub names_length: u32,
    pub planes: u32,
    pub models: u32,
    pub nodes: u32,
    pub polygons: u32,
    pub vertex_refs: u32,
    pub vertices: u32,
}

impl From<[u32; OBFUSCATED_COUNTS]> for ModelCounts {
    fn from(c: [u32; OBFUSCATED_COUNTS]) -> Self {
        Self {
            name_entries: c[0],
            names_length: c[1],
            planes: c[2],
            models: c[3],
            nodes: c[4],
            polygons: c[5],
            vertex_refs: c[6],
            vertices: c[7],
        }
    }
}

/// World models stored inside a `.world00p` container.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldModelSection {
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
    pub node_count: u32,
    pub reserved: u32,
    /// One bit per node.
    pub subdivision_flags: Vec<u8>,
    pub counts: ModelCounts,
    /// Plane normals, stored axis order.
    pub planes: Vec<Vec3>,
    pub models: Vec<WorldModel>,
}

impl WorldModelSection {
    /// Decode the section at the cursor position.
    ///
    /// A wrong `magic` shows up as absurd counts, which fail as
    /// [`JupexError::ImplausibleCount`](crate::error::JupexError::ImplausibleCount)
    /// before anything is allocated. Totals that disagree with the decoded
    /// models are reported to `diagnostics`.
    pub fn read(
        cursor: &mut ByteCursor<'_>,
        magic: u32,
        version: WorldVersion,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let bounds_min = cursor.read_vec3()?;
        let bounds_max = cursor.read_vec3()?;
        let [node_count, reserved] = cursor.read_array::<u32, 2>()?;
        let subdivision_flags = cursor.read_bytes(flag_bytes(node_count))?.to_vec();

        let counts = ModelCounts::from(deobfuscate(cursor.read_array()?, magic));
        log::debug!("World model counts: {counts:?}");

        let names_length = cursor.ensure_count("model name byte", counts.names_length as u64, 1)?;
        let names = cursor.read_bytes(names_length)?;
        let entries = StringTableEntry::read_all(cursor, counts.name_entries)?;

        let planes = cursor.ensure_count("plane", counts.planes as u64, 12)?;
        let planes = (0..planes)
            .map(|_| cursor.read_vec3())
            .collect::<Result<Vec<_>>>()?;

        let models = read_models(cursor, names, &entries, counts.models, version)?;

        log::info!("Read {} world models", models.len());
        check_totals(&counts, &models, diagnostics);

        Ok(Self {
            bounds_min,
            bounds_max,
            node_count,
            reserved,
            subdivision_flags,
            counts,
            planes,
            models,
        })
    }
}

/// `count` models, named from the string table built over `names`.
pub(crate) fn read_models(
    cursor: &mut ByteCursor<'_>,
    names: &[u8],
    entries: &[StringTableEntry],
    count: u32,
    version: WorldVersion,
) -> Result<Vec<WorldModel>> {
    let count = cursor.ensure_count(
        "world model",
        count as u64,
        WorldModel::min_size(version) as u64,
    )?;
    let table = StringTable::decode(names, entries, count)?;

    (0..count)
        .map(|i| {
            let mut model = WorldModel::read(cursor, version)?;
            model.names = table.names(i).to_vec();
            Ok(model)
        })
        .collect()
}

fn check_totals(counts: &ModelCounts, models: &[WorldModel], diagnostics: &mut Diagnostics) {
    let total = |f: fn(&WorldModel) -> usize| models.iter().map(|m| f(m) as u64).sum::<u64>();

    let totals = [
        ("node", counts.nodes, total(|m| m.nodes.len())),
        ("polygon", counts.polygons, total(|m| m.polygons.len())),
        (
            "vertex reference",
            counts.vertex_refs,
            total(|m| m.polygons.iter().map(|p| p.vertex_ids.len()).sum()),
        ),
        ("vertex", counts.vertices, total(|m| m.vertices.len())),
    ];

    for (name, declared, found) in totals {
        if declared as u64 != found {
            diagnostics.push(
                Entity::Section(Section::WorldModels),
                DiagnosticKind::CountMismatch {
                    name,
                    declared,
                    found,
                },
            );
        }
    }
}

/// Bytes needed for one flag bit per node.
pub(crate) fn flag_bytes(node_count: u32) -> usize {
    (node_count as usize).div_ceil(8)
}
