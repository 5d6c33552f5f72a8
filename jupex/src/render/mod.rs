//! Render section: shared vertex and index buffers, their declarations, the
//! surfaces cut out of them, and the names of the materials they use.

pub mod surface;
pub mod tree;
pub mod vertex;

pub use surface::{RenderSurface, RenderSurfaceRecord};
pub use tree::{RenderBranch, RenderNode, RenderTree};
pub use vertex::{
    Vertex, VertexDefinition, VertexFormatTable, VertexProperty, VertexPropertyFormat,
    VertexPropertyLocation,
};

use crate::{
    binaries::{BinaryData, ByteCursor},
    diagnostics::{DiagnosticKind, Diagnostics, Entity, Section},
    error::{ErrorKind, Result},
    world::consts::{RENDER_SECTION_COUNTS, RENDER_SURFACE_RECORD_SIZE},
};

#[derive(Clone, Debug, Default)]
pub struct RenderSection {
    /// The first one is the number of render trees after the material names.
    pub section_counts: [u32; RENDER_SECTION_COUNTS],
    pub reserved: u32,
    /// Surface count stored ahead of the buffers. The surface table carries its own.
    pub declared_surface_count: u32,
    pub vertex_definitions: VertexFormatTable,
    /// Surfaces that decoded, in stored order. Skipped ones are in the diagnostics.
    pub surfaces: Vec<RenderSurface>,
    /// Material file paths as stored, indexed by [`RenderSurface::material_id`].
    /// A name that could not be read is left empty.
    pub material_names: Vec<String>,
    /// Only present when asked for.
    pub render_trees: Option<Vec<RenderTree>>,
}

impl RenderSection {
    /// Decode the section at the cursor position.
    ///
    /// Errors returned here mean the whole section is unusable, everything
    /// smaller is reported to `diagnostics`.
    pub fn read(
        cursor: &mut ByteCursor<'_>,
        read_render_trees: bool,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let section_counts = cursor.read_array::<u32, RENDER_SECTION_COUNTS>()?;
        let [reserved, declared_surface_count, material_count] = cursor.read_array::<u32, 3>()?;
        let [vertex_bytes, triangle_bytes] = cursor.read_array::<u32, 2>()?;

        let vertex_data = cursor.sub_cursor(vertex_bytes as usize)?;
        let triangle_data = cursor.sub_cursor(triangle_bytes as usize)?;

        log::debug!(
            "Render buffers: {} vertex bytes, {} triangle bytes",
            vertex_bytes,
            triangle_bytes
        );

        let vertex_definitions = VertexFormatTable::read(cursor, diagnostics)?;

        let surface_count = cursor.read_u32()?;
        let surface_count = cursor.ensure_count(
            "render surface",
            surface_count as u64,
            RENDER_SURFACE_RECORD_SIZE as u64,
        )?;

        let mut surfaces = Vec::with_capacity(surface_count);
        for index in 0..surface_count {
            let record = RenderSurfaceRecord::read(cursor)?;

            match RenderSurface::decode(
                index,
                &record,
                &vertex_definitions,
                &vertex_data,
                &triangle_data,
                diagnostics,
            ) {
                Ok(surface) => {
                    report_unhandled(&surface, &vertex_definitions, diagnostics);
                    surfaces.push(surface);
                }
                Err(e) => {
                    diagnostics.push(Entity::Surface(index), DiagnosticKind::SkippedSurface(e))
                }
            }
        }

        let material_count = cursor.ensure_count("material name", material_count as u64, 2)?;
        let mut material_names = Vec::with_capacity(material_count);
        for slot in 0..material_count {
            match cursor.read_lt_string() {
                Ok(name) => material_names.push(name),
                Err(e) if e.kind() == ErrorKind::Truncated => return Err(e),
                Err(e) => {
                    diagnostics.push(
                        Entity::Material(slot, String::new()),
                        DiagnosticKind::InvalidMaterialName(e),
                    );
                    material_names.push(String::new());
                }
            }
        }

        let render_trees = if read_render_trees {
            match read_trees(cursor, section_counts[0]) {
                Ok(trees) => Some(trees),
                Err(e) => {
                    diagnostics.push(
                        Entity::Section(Section::RenderTree),
                        DiagnosticKind::SectionFailed(e),
                    );
                    None
                }
            }
        } else {
            None
        };

        log::info!(
            "Render section: {} of {} surfaces, {} materials",
            surfaces.len(),
            surface_count,
            material_names.len()
        );

        Ok(Self {
            section_counts,
            reserved,
            declared_surface_count,
            vertex_definitions,
            surfaces,
            material_names,
            render_trees,
        })
    }

    pub fn material_name(&self, surface: &RenderSurface) -> Option<&str> {
        self.material_names
            .get(surface.material_id as usize)
            .map(String::as_str)
            .filter(|n| !n.is_empty())
    }
}

fn read_trees(cursor: &mut ByteCursor<'_>, count: u32) -> Result<Vec<RenderTree>> {
    let count = cursor.ensure_count("render tree", count as u64, 4)?;
    (0..count).map(|_| RenderTree::read(cursor)).collect()
}

/// One diagnostic per dropped property kind per surface.
fn report_unhandled(
    surface: &RenderSurface,
    definitions: &VertexFormatTable,
    diagnostics: &mut Diagnostics,
) {
    let Ok(definition) = definitions.get(surface.vertex_definition) else {
        return;
    };

    for property in definition.unhandled() {
        diagnostics.push(
            Entity::Surface(surface.index),
            DiagnosticKind::UnhandledVertexProperty {
                location: property.location,
                sub_id: property.sub_id,
            },
        );
    }
}
