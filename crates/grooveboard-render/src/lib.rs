//! GrooveBoard Render Library
//!
//! Renderer abstraction and implementations for GrooveBoard.
//! Painting only reads the board; it never mutates it.

mod color;
mod display_list;
mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use color::{parse_color, try_parse_color};
pub use display_list::{DisplayListRenderer, DrawCommand};
pub use renderer::{
    ERASER_IDLE_DASHES, RenderContext, RenderResult, Renderer, RendererError, eraser_outline_color,
};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloRenderer;
