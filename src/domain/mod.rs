//! Domain layer: the document tree consumed by the engine and the chunks it emits.

pub mod entity;
pub mod node;

pub use entity::{Annotation, Chunk, EntityKind};
pub use node::{Environment, Node, NodeKind};
