//! Whole-container decoding: the header, then every section it points at.

use ahash::AHashMap;
use common::{normalise_path, VFileSystem};

use crate::{
    binaries::{BinaryData, ByteCursor},
    bsp::{WorldModel, WorldModelSection, WorldVersion},
    diagnostics::{DiagnosticKind, Diagnostics, Entity, Section},
    error::{JupexError, Result},
    material::Material,
    objects::{read_objects, WorldObject},
    render::{RenderSection, RenderSurface},
    world::WorldHeader,
};

/// What to decode beyond the sections every container has.
#[derive(Clone, Copy, Default)]
pub struct DecodeOptions<'a> {
    /// Where material paths are looked up. Materials are left alone without one.
    pub materials: Option<&'a VFileSystem>,
    /// Per-game XOR constant for the world model counts. World models are
    /// skipped without one.
    pub world_model_magic: Option<u32>,
    pub render_tree: bool,
}

/// Everything decoded from one `.world00p` container.
#[derive(Debug)]
pub struct WorldScene {
    pub header: WorldHeader,
    /// `None` when the section failed, see the diagnostics.
    pub render: Option<RenderSection>,
    /// One slot per material name when materials were requested. A slot is
    /// `None` when its material could not be loaded.
    pub materials: Option<Vec<Option<Material>>>,
    pub objects: Vec<WorldObject>,
    pub world_models: Option<WorldModelSection>,
    pub diagnostics: Diagnostics,
}

impl WorldScene {
    pub fn surfaces(&self) -> &[RenderSurface] {
        self.render.as_ref().map_or(&[], |r| &r.surfaces[..])
    }

    pub fn material_names(&self) -> &[String] {
        self.render.as_ref().map_or(&[], |r| &r.material_names[..])
    }

    pub fn world_models(&self) -> &[WorldModel] {
        self.world_models.as_ref().map_or(&[], |s| &s.models[..])
    }

    /// The resolved material a surface is drawn with.
    pub fn surface_material(&self, surface: &RenderSurface) -> Option<&Material> {
        self.materials
            .as_ref()?
            .get(surface.material_id as usize)?
            .as_ref()
    }
}

/// Decode a `.world00p` container.
///
/// Only a bad header is an error. Sections that fail are left out of the scene
/// and recorded in [`WorldScene::diagnostics`], as is every smaller problem.
pub fn decode_world(data: &[u8], options: &DecodeOptions<'_>) -> Result<WorldScene> {
    let header = WorldHeader::read(&mut ByteCursor::new(data))?;
    log::info!("{header}");

    let mut diagnostics = Diagnostics::new();

    let render = decode_section(
        data,
        header.render_section,
        Section::Render,
        &mut diagnostics,
        |cursor, diagnostics| RenderSection::read(cursor, options.render_tree, diagnostics),
    );

    let materials = options.materials.map(|files| {
        let names = render.as_ref().map_or(&[][..], |r| &r.material_names[..]);
        resolve_materials(files, names, &mut diagnostics)
    });

    let objects = decode_section(
        data,
        header.object_section,
        Section::Objects,
        &mut diagnostics,
        read_objects,
    )
    .unwrap_or_default();

    let world_models = match options.world_model_magic {
        Some(magic) => decode_section(
            data,
            header.sector_section,
            Section::WorldModels,
            &mut diagnostics,
            |cursor, diagnostics| {
                WorldModelSection::read(cursor, magic, WorldVersion::V113, diagnostics)
            },
        ),
        None => {
            log::debug!("No world model magic configured, skipping world models");
            None
        }
    };

    Ok(WorldScene {
        header,
        render,
        materials,
        objects,
        world_models,
        diagnostics,
    })
}

/// Run `read` at `offset`, turning a failure into a diagnostic.
///
/// An offset of zero means the container has no such section.
fn decode_section<T>(
    data: &[u8],
    offset: u32,
    section: Section,
    diagnostics: &mut Diagnostics,
    read: impl FnOnce(&mut ByteCursor<'_>, &mut Diagnostics) -> Result<T>,
) -> Option<T> {
    if offset == 0 {
        log::debug!("{section:?} section not present");
        return None;
    }

    let mut cursor = ByteCursor::new(data);
    let result = cursor
        .seek(offset as usize)
        .and_then(|_| read(&mut cursor, diagnostics));

    match result {
        Ok(value) => Some(value),
        Err(e) => {
            diagnostics.push(Entity::Section(section), DiagnosticKind::SectionFailed(e));
            None
        }
    }
}

/// Load every named material, decoding each distinct path once.
fn resolve_materials(
    files: &VFileSystem,
    names: &[String],
    diagnostics: &mut Diagnostics,
) -> Vec<Option<Material>> {
    let mut cache: AHashMap<String, Material> = AHashMap::new();

    names
        .iter()
        .enumerate()
        .map(|(slot, name)| {
            let key = normalise_path(name);
            if let Some(material) = cache.get(&key) {
                return Some(material.clone());
            }

            match load_material(files, name) {
                Ok(material) => {
                    cache.insert(key, material.clone());
                    Some(material)
                }
                Err(e) => {
                    diagnostics.push(
                        Entity::Material(slot, name.clone()),
                        DiagnosticKind::UnresolvedMaterial(e),
                    );
                    None
                }
            }
        })
        .collect()
}

fn load_material(files: &VFileSystem, name: &str) -> Result<Material> {
    if name.is_empty() {
        return Err(JupexError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "material has no name",
        )));
    }
    let data = files.read(name)?;
    Material::from_path(name, &data)
}
