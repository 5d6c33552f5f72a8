pub use crate::bsp::{
    decode_wld, BspPolygon, NodeEntry, WldFile, WorldModel, WorldModelSection, WorldVersion,
};
pub use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Entity};
pub use crate::error::{ErrorKind, JupexError};
pub use crate::game_data::GameData;
pub use crate::material::{FxValue, Material, MaterialFx};
pub use crate::objects::{PropertyValue, WorldObject};
pub use crate::render::{RenderSection, RenderSurface, Vertex, VertexDefinition};
pub use crate::scene::{decode_world, DecodeOptions, WorldScene};
pub use crate::world::WorldHeader;
