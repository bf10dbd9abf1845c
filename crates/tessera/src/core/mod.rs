//! Core abstractions for diagram processing
//!
//! Shared by every diagram type: source splitting, the line grammar and command
//! tables, deferred coordinates and tiles, skin lookups, and drawing surfaces.
//! Each plugin implements the traits defined here for its own model.

mod box_drawing;
mod canvas;
mod color;
pub mod command;
mod database;
mod detector;
mod error;
pub mod grammar;
mod layout;
pub mod logging;
mod parser;
mod real;
mod renderer;
mod skin;
mod source;
mod surface;
mod text;
mod tile;
mod types;

pub use box_drawing::*;
pub use canvas::*;
pub use color::*;
pub use command::{
    register_common_commands, Command, CommandError, CommandRegistry, Handler, TitledDiagram,
};
pub use database::*;
pub use detector::*;
pub use error::*;
pub use grammar::{Captures, CharClass, Fragment, LineMatcher, Pattern};
pub use layout::*;
pub use logging::*;
pub use parser::*;
pub use real::*;
pub use renderer::*;
pub use skin::*;
pub use source::*;
pub use surface::*;
pub use text::*;
pub use tile::*;
pub use types::*;
