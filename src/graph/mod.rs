/// Core traits shared by everything a voice can play.
pub mod node;
/// Catalog-described instrument voices.
pub mod patch;

pub use node::{GraphNode, RenderCtx};
pub use patch::InstrumentPatch;
