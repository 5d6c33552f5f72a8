use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use jupex::prelude::*;

const DEFAULT_CONF: &str = "conf.ini";

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    let (conf, world) = match &args[..] {
        [world] => (None, world),
        [conf, world] => (Some(conf.as_path()), world),
        _ => {
            eprintln!("usage: world-readout [conf.ini] <world file>");
            return ExitCode::from(2);
        }
    };

    match run(conf, world) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}: {e}", world.display());
            ExitCode::FAILURE
        }
    }
}

fn run(conf: Option<&Path>, world: &Path) -> jupex::Result<()> {
    let game = load_game(conf)?;
    let data = std::fs::read(world)?;

    let is_wld = world
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("wld"));

    if is_wld {
        report_wld(&decode_wld(&data)?);
        return Ok(());
    }

    let options = game
        .as_ref()
        .map(GameData::decode_options)
        .unwrap_or_default();
    report_world(&decode_world(&data, &options)?);
    Ok(())
}

/// Game settings from an explicit path, or `conf.ini` when one is lying around.
fn load_game(conf: Option<&Path>) -> jupex::Result<Option<GameData>> {
    match conf {
        Some(path) => GameData::load(path).map(Some),
        None if Path::new(DEFAULT_CONF).exists() => GameData::load(DEFAULT_CONF).map(Some),
        None => {
            log::info!("No {DEFAULT_CONF}, materials and world models are skipped");
            Ok(None)
        }
    }
}

fn report_world(scene: &WorldScene) {
    log::info!("{}", scene.header);

    if let Some(render) = &scene.render {
        log::info!("Section counts: {:?}", render.section_counts);
        log::info!(
            "{} vertex definitions, {} of {} surfaces, {} materials",
            render.vertex_definitions.len(),
            render.surfaces.len(),
            render.declared_surface_count,
            render.material_names.len(),
        );

        let (vertices, triangles) = render.surfaces.iter().fold((0, 0), |(v, t), s| {
            (v + s.vertices.len(), t + s.triangles.len())
        });
        log::info!("{vertices} vertices, {triangles} triangles");

        if let Some(trees) = &render.render_trees {
            log::info!("{} render trees", trees.len());
        }
    }

    if let Some(materials) = &scene.materials {
        let resolved = materials.iter().flatten().count();
        log::info!("Resolved {resolved} of {} materials", materials.len());
    }

    log::info!("{} objects", scene.objects.len());
    for object in &scene.objects {
        log::debug!(
            "{} {:?} at {:?}",
            object.type_name,
            object.name().unwrap_or_default(),
            object.position()
        );
    }

    if let Some(section) = &scene.world_models {
        log::info!(
            "{} world models over {} planes",
            section.models.len(),
            section.planes.len()
        );
    }

    report_diagnostics(&scene.diagnostics);
}

fn report_wld(wld: &WldFile) {
    log::info!("WLDP version {}", wld.header.version.as_u32());
    log::info!(
        "{} world models, {} normals",
        wld.models.len(),
        wld.section.normals.len()
    );

    for model in &wld.models {
        log::debug!(
            "{}: {} polygons ({} valid), {} vertices",
            model.name().unwrap_or("<unnamed>"),
            model.polygons.len(),
            model.valid_polygons().count(),
            model.vertices.len()
        );
    }
}

fn report_diagnostics(diagnostics: &Diagnostics) {
    if diagnostics.is_empty() {
        log::info!("No diagnostics");
        return;
    }

    log::info!("{} diagnostics:", diagnostics.len());
    for diagnostic in diagnostics {
        log::info!("  {diagnostic}");
    }
}
