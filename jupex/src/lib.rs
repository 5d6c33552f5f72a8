//! Decoder for Jupiter EX world data: `.world00p` containers, their `LTMI`
//! materials and standalone `.wld` BSP files.
//!
//! [`decode_world`] is the entry point for containers and [`decode_wld`] for
//! BSP files. Recoverable problems are collected as [`Diagnostics`] next to the
//! decoded data instead of aborting the decode.

pub mod binaries;
pub mod bsp;
pub mod coords;
pub mod diagnostics;
pub mod error;
pub mod game_data;
pub mod material;
pub mod objects;
pub mod prelude;
pub mod render;
pub mod scene;
pub mod world;

pub use bsp::decode_wld;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Entity, Section};
pub use error::{ErrorKind, JupexError, Result};
pub use scene::{decode_world, DecodeOptions, WorldScene};
