use std::fmt;

use crate::{error::JupexError, render::VertexPropertyLocation};

/// The decoded entity a diagnostic is about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entity {
    Section(Section),
    VertexDefinition(usize),
    Surface(usize),
    /// Slot in the render section's material list, with the stored path.
    Material(usize, String),
    Object(usize),
    WorldModel(usize),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Section {
    Render,
    RenderTree,
    Objects,
    WorldModels,
}

#[derive(Debug)]
pub enum DiagnosticKind {
    /// A whole section failed to decode. Other sections are unaffected.
    SectionFailed(JupexError),
    /// The descriptor could not be decoded, surfaces using it are skipped.
    InvalidVertexDefinition(JupexError),
    SkippedSurface(JupexError),
    /// Vertex data could not be decoded, a default vertex holds its place.
    SkippedVertex { vertex: usize, error: JupexError },
    /// Triangle with out of range or repeated vertex ids.
    SkippedFace { triangle: usize, indices: [i64; 3] },
    /// Property decoded to keep the stride, but its value was dropped.
    UnhandledVertexProperty {
        location: VertexPropertyLocation,
        sub_id: u8,
    },
    /// Material name stored in the world could not be read.
    InvalidMaterialName(JupexError),
    UnresolvedMaterial(JupexError),
    SkippedObject(JupexError),
    /// A stored total disagrees with what the decoded entries add up to.
    CountMismatch {
        name: &'static str,
        declared: u32,
        found: u64,
    },
}

#[derive(Debug)]
pub struct Diagnostic {
    pub entity: Entity,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: ", self.entity)?;
        match &self.kind {
            DiagnosticKind::SectionFailed(e) => write!(f, "section failed: {e}"),
            DiagnosticKind::InvalidVertexDefinition(e) => {
                write!(f, "invalid vertex definition: {e}")
            }
            DiagnosticKind::SkippedSurface(e) => write!(f, "surface skipped: {e}"),
            DiagnosticKind::SkippedVertex { vertex, error } => {
                write!(f, "vertex {vertex} skipped: {error}")
            }
            DiagnosticKind::SkippedFace { triangle, indices } => {
                write!(f, "face {triangle} skipped, indices {indices:?}")
            }
            DiagnosticKind::UnhandledVertexProperty { location, sub_id } => {
                write!(f, "unhandled vertex property {location:?} (sub id {sub_id})")
            }
            DiagnosticKind::InvalidMaterialName(e) => write!(f, "invalid material name: {e}"),
            DiagnosticKind::UnresolvedMaterial(e) => write!(f, "material unresolved: {e}"),
            DiagnosticKind::SkippedObject(e) => write!(f, "object skipped: {e}"),
            DiagnosticKind::CountMismatch {
                name,
                declared,
                found,
            } => write!(f, "{name} count is {declared} but {found} were read"),
        }
    }
}

/// Recoverable problems met while decoding, in the order they were found.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entity: Entity, kind: DiagnosticKind) {
        let diagnostic = Diagnostic { entity, kind };
        log::warn!("{diagnostic}");
        self.entries.push(diagnostic);
    }

    pub fn append(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    /// Diagnostics about one entity.
    pub fn for_entity<'a>(&'a self, entity: &'a Entity) -> impl Iterator<Item = &'a Diagnostic> {
        self.entries.iter().filter(move |d| &d.entity == entity)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
