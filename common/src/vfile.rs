use std::{
    borrow::Cow,
    collections::HashMap,
    fs,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

#[derive(Default)]
pub struct VFile {
    pub data: Vec<u8>,
}

/// Where companion files (materials, textures) referenced by a world are looked up.
///
/// Stored paths use Windows separators and arbitrary case, e.g. `Materials\Walls\Brick.Mat00`.
/// Both backings normalise them before looking anything up.
#[derive(Clone)]
pub enum VFileSystem {
    /// Game data folder on disk.
    Directory(PathBuf),
    /// Files held in memory, keyed by normalised path.
    Memory(Arc<HashMap<String, VFile>>),
}

impl VFileSystem {
    pub fn directory(root: impl Into<PathBuf>) -> Self {
        Self::Directory(root.into())
    }

    pub fn memory<K: AsRef<str>>(files: impl IntoIterator<Item = (K, Vec<u8>)>) -> Self {
        let files = files
            .into_iter()
            .map(|(path, data)| (normalise_path(path.as_ref()), VFile { data }))
            .collect();
        Self::Memory(Arc::new(files))
    }

    pub fn read(&self, path: &str) -> io::Result<Cow<'_, [u8]>> {
        let normalised = normalise_path(path);
        match self {
            VFileSystem::Directory(root) => {
                let full = root.join(Path::new(&normalised));
                match fs::read(&full) {
                    Ok(data) => Ok(Cow::Owned(data)),
                    // fall back to the path as stored, data folders are usually shipped lower case
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        log::debug!("{} not found, trying the stored path", full.display());
                        let stored = root.join(path.replace('\\', "/"));
                        fs::read(stored).map(Cow::Owned)
                    }
                    Err(e) => Err(e),
                }
            }
            VFileSystem::Memory(files) => match files.get(&normalised) {
                Some(file) => Ok(Cow::Borrowed(&file.data[..])),
                None => Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{normalised} not present"),
                )),
            },
        }
    }
}

/// Forward slashes, lower case, no leading separator.
pub fn normalise_path(path: &str) -> String {
    let mut path = path.replace('\\', "/");
    path.make_ascii_lowercase();
    path.trim_start_matches('/').to_owned()
}
