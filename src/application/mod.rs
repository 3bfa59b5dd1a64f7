//! Application services layer.

pub mod error;
pub mod output;
pub mod render;
