pub mod vfile;

pub use vfile::{normalise_path, VFile, VFileSystem};
