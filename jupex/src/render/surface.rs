use crate::{
    binaries::ByteCursor,
    diagnostics::{DiagnosticKind, Diagnostics, Entity},
    error::{JupexError, Result},
};

use super::vertex::{Vertex, VertexDefinition, VertexFormatTable};

/// Stored surface header. Starts are in elements, not bytes.
#[repr(C, packed)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RenderSurfaceRecord {
    pub vertices_start: u32,
    pub vertices_count: u32,
    pub vertex_size: u32,
    /// In 16-bit units.
    pub indices_start: u32,
    /// First index value used by this surface in the shared buffer.
    pub index_base: u32,
    /// In triangles.
    pub indices_count: u32,
    pub material_id: u32,
    pub reserved: u32,
    pub vertex_definition: u32,
}

/// One drawable chunk with a single vertex layout and material.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSurface {
    /// Position of the record in the render section.
    pub index: usize,
    pub vertices_start: u32,
    pub vertices_count: u32,
    pub vertex_size: u32,
    pub indices_start: u32,
    pub indices_count: u32,
    /// Subtracted from every stored index to make it local to [`RenderSurface::vertices`].
    pub indices_offset: i64,
    /// Index into the render section's material names.
    pub material_id: u32,
    /// Purpose unknown, kept as stored.
    pub reserved: u32,
    pub vertex_definition: u32,
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<[u32; 3]>,
}

impl RenderSurface {
    /// Rebuild a surface from its header and the section's shared buffers.
    ///
    /// Fails only when the surface as a whole is unusable. Bad vertices and bad
    /// triangles are reported to `diagnostics` and decoding carries on.
    pub fn decode(
        index: usize,
        record: &RenderSurfaceRecord,
        definitions: &VertexFormatTable,
        vertex_data: &ByteCursor<'_>,
        triangle_data: &ByteCursor<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let record = *record;
        let definition = definitions.get(record.vertex_definition)?;

        let vertex_size = record.vertex_size as usize;
        if definition.stride() > vertex_size {
            return Err(JupexError::TruncatedInput {
                offset: vertex_data.absolute_position(),
                need: definition.stride(),
                have: vertex_size,
            });
        }

        let vertices = vertex_data.view(
            byte_range(record.vertices_start, record.vertex_size, "vertex buffer")?,
            byte_range(record.vertices_count, record.vertex_size, "vertex buffer")?,
        )?;
        let triangles = triangle_data.view(
            byte_range(record.indices_start, 2, "triangle buffer")?,
            byte_range(record.indices_count, 6, "triangle buffer")?,
        )?;

        let mut surface = Self {
            index,
            vertices_start: record.vertices_start,
            vertices_count: record.vertices_count,
            vertex_size: record.vertex_size,
            indices_start: record.indices_start,
            indices_count: record.indices_count,
            indices_offset: record.vertices_start as i64 - record.index_base as i64,
            material_id: record.material_id,
            reserved: record.reserved,
            vertex_definition: record.vertex_definition,
            vertices: Vec::new(),
            triangles: Vec::new(),
        };

        let placeholders = surface.read_vertices(definition, vertices, diagnostics)?;
        surface.read_triangles(triangles, &placeholders, diagnostics)?;

        Ok(surface)
    }

    /// Returns which vertices are placeholders for records that failed to decode.
    fn read_vertices(
        &mut self,
        definition: &VertexDefinition,
        mut data: ByteCursor<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<bool>> {
        self.vertices.reserve(self.vertices_count as usize);
        let mut placeholders = vec![false; self.vertices_count as usize];

        for vertex in 0..self.vertices_count as usize {
            let mut record = data.sub_cursor(self.vertex_size as usize)?;

            match definition.read_vertex(&mut record) {
                Ok(v) => self.vertices.push(v),
                Err(error) => {
                    // placeholder keeps later ids lined up with their vertices
                    diagnostics.push(
                        Entity::Surface(self.index),
                        DiagnosticKind::SkippedVertex { vertex, error },
                    );
                    self.vertices.push(Vertex::default());
                    placeholders[vertex] = true;
                }
            }
        }

        Ok(placeholders)
    }

    fn read_triangles(
        &mut self,
        mut data: ByteCursor<'_>,
        placeholders: &[bool],
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        for triangle in 0..self.indices_count as usize {
            let raw = data.read_array::<u16, 3>()?;
            let indices = raw.map(|i| i as i64 - self.indices_offset);

            // faces over placeholder vertices would draw at the origin
            let local = self
                .local_triangle(indices)
                .filter(|t| t.iter().all(|&i| !placeholders[i as usize]));

            match local {
                Some(t) => self.triangles.push(t),
                None => diagnostics.push(
                    Entity::Surface(self.index),
                    DiagnosticKind::SkippedFace { triangle, indices },
                ),
            }
        }

        Ok(())
    }

    /// In range of this surface's vertices and not degenerate.
    fn local_triangle(&self, [a, b, c]: [i64; 3]) -> Option<[u32; 3]> {
        let count = self.vertices_count as i64;
        let in_range = |i: i64| (0..count).contains(&i);

        if !(in_range(a) && in_range(b) && in_range(c)) || a == b || b == c || a == c {
            return None;
        }
        Some([a as u32, b as u32, c as u32])
    }
}

/// `count * size` in bytes, refusing anything that does not fit in memory.
fn byte_range(count: u32, size: u32, context: &'static str) -> Result<usize> {
    (count as u64)
        .checked_mul(size as u64)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or(JupexError::OffsetOutOfBounds {
            context,
            offset: usize::MAX,
            len: size as usize,
            available: 0,
        })
}
