//! Renderers for finished body expressions.

pub mod scad;

pub use scad::{ScadOptions, ScadRenderer};
