#![warn(missing_docs)]

//! STEP (ISO 10303-21) import for partquote.
//!
//! Reads AP203/AP214/AP242 boundary representations into a
//! [`partquote_brep::BRepModel`]: planar and analytic faces, circle and
//! B-spline edges, solids with voids and plain shell models. Lengths are
//! converted to millimetres using the file's unit context.
//!
//! # Example
//!
//! ```no_run
//! use partquote_step::read_step;
//!
//! let model = read_step("bracket.step").unwrap();
//! println!("{} faces, volume {:?} mm³", model.num_faces(), model.volume());
//! ```

mod entities;
mod error;
mod lexer;
mod parser;
mod reader;

pub use entities::Units;
pub use error::StepError;
pub use reader::{read_step, read_step_from_buffer};
