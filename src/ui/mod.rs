//! Terminal-facing output.
//!
//! Orchestration code talks to [`RenderSink`]; [`Renderer`] is the default
//! crossterm-backed implementation.

pub mod render;

pub use render::{RenderSink, Renderer};
