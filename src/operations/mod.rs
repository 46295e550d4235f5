//! Operations module
//!
//! Coordinates the resolution pipeline and its output modes

pub mod render;
pub mod resolve;
pub mod to_context_args;

pub use render::*;
pub use resolve::*;
pub use to_context_args::*;
