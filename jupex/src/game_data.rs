use std::path::{Path, PathBuf};

use common::VFileSystem;
use ini::{Ini, Properties};

use crate::{
    error::{JupexError, Result},
    scene::DecodeOptions,
};

/// Settings for one game, read from `conf.ini`.
///
/// ```ini
/// [launch]
/// game = fear2
///
/// [fear2]
/// name = F.E.A.R. 2
/// data = C:/Games/FEAR2/Data
/// magic = 0x12345678
/// materials = true
/// render_tree = false
/// ```
pub struct GameData {
    name: String,
    data: PathBuf,
    magic: Option<u32>,
    import_materials: bool,
    render_tree: bool,
    files: VFileSystem,
}

impl GameData {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ini = Ini::load_from_file(path)
            .map_err(|e| JupexError::Config(format!("{}: {e}", path.display())))?;
        Self::from_ini(&ini)
    }

    pub fn from_ini(ini: &Ini) -> Result<Self> {
        let launch = section(ini, "launch")?;
        let game_key = value(launch, "launch", "game")?;
        let game = section(ini, game_key)?;

        let name = value(game, game_key, "name")?.to_owned();
        let data = PathBuf::from(value(game, game_key, "data")?);

        let magic = game.get("magic").map(parse_magic).transpose()?;
        let import_materials = flag(game, game_key, "materials")?;
        let render_tree = flag(game, game_key, "render_tree")?;

        log::info!("Loaded game data for {name} from {}", data.display());

        Ok(Self {
            files: VFileSystem::directory(&data),
            name,
            data,
            magic,
            import_materials,
            render_tree,
        })
    }

    pub fn decode_options(&self) -> DecodeOptions<'_> {
        DecodeOptions {
            materials: self.import_materials.then_some(&self.files),
            world_model_magic: self.magic,
            render_tree: self.render_tree,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &Path {
        &self.data
    }

    pub fn magic(&self) -> Option<u32> {
        self.magic
    }

    pub fn files(&self) -> &VFileSystem {
        &self.files
    }
}

/// Decimal, or hexadecimal with a `0x` prefix.
pub fn parse_magic(value: &str) -> Result<u32> {
    let value = value.trim();
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| JupexError::Config(format!("magic {value:?}: {e}")))
}

fn section<'a>(ini: &'a Ini, name: &str) -> Result<&'a Properties> {
    ini.section(Some(name))
        .ok_or_else(|| JupexError::Config(format!("missing section [{name}]")))
}

fn value<'a>(properties: &'a Properties, section: &str, key: &str) -> Result<&'a str> {
    properties
        .get(key)
        .ok_or_else(|| JupexError::Config(format!("missing key {key} in [{section}]")))
}

/// Optional boolean, off when absent.
fn flag(properties: &Properties, section: &str, key: &str) -> Result<bool> {
    match properties.get(key).map(str::trim) {
        None => Ok(false),
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => Err(JupexError::Config(format!(
            "{key} in [{section}] is not a boolean: {other:?}"
        ))),
    }
}

#[cfg(test)]
mod game_data_tests {
    use super::*;
    use crate::error::ErrorKind;

    const CONF: &str = "
[launch]
game = fear2

[fear2]
name = F.E.A.R. 2
data = /games/fear2/data
magic = 0x12345678
materials = true
";

    #[test]
    fn reads_active_game() {
        let ini = Ini::load_from_str(CONF).unwrap();
        let game = GameData::from_ini(&ini).unwrap();

        assert_eq!(game.name(), "F.E.A.R. 2");
        assert_eq!(game.data(), Path::new("/games/fear2/data"));
        assert_eq!(game.magic(), Some(0x1234_5678));

        let options = game.decode_options();
        assert!(options.materials.is_some());
        assert_eq!(options.world_model_magic, Some(0x1234_5678));
        assert!(!options.render_tree);
    }

    #[test]
    fn missing_game_section() {
        let ini = Ini::load_from_str("[launch]\ngame = fear3\n").unwrap();
        let err = GameData::from_ini(&ini).err().unwrap();

        assert_eq!(err.kind(), ErrorKind::Resource);
        assert!(err.to_string().contains("[fear3]"));
    }

    #[test]
    fn missing_data_folder() {
        let ini = Ini::load_from_str("[launch]\ngame = g\n[g]\nname = G\n").unwrap();
        assert!(matches!(GameData::from_ini(&ini), Err(JupexError::Config(_))));
    }

    #[test]
    fn magic_formats() {
        assert_eq!(parse_magic("305419896").unwrap(), 0x1234_5678);
        assert_eq!(parse_magic(" 0xDEADBEEF ").unwrap(), 0xdead_beef);
        assert!(parse_magic("0xZZ").is_err());
        assert!(parse_magic("-1").is_err());
    }

    #[test]
    fn options_without_materials() {
        let ini =
            Ini::load_from_str("[launch]\ngame = g\n[g]\nname = G\ndata = d\nrender_tree = yes\n")
                .unwrap();
        let game = GameData::from_ini(&ini).unwrap();
        let options = game.decode_options();

        assert!(options.materials.is_none());
        assert!(options.world_model_magic.is_none());
        assert!(options.render_tree);
    }
}
