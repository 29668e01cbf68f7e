#![warn(missing_docs)]

//! IGES 5.x import for partquote.
//!
//! Reads the fixed 80-column ASCII form: the global section for delimiters
//! and model units, the directory for entity types, and parameter data for
//! the wireframe entities that carry manufacturing information:
//!
//! - 100 circular arc (kept as a circle edge, so fillets can be measured)
//! - 110 line
//! - 116 point
//! - 126 rational B-spline curve (control polygon)
//!
//! Surfaces and trimmed faces are not read, so the resulting
//! [`BRepModel`](partquote_brep::BRepModel) has edges but no faces.
//! Transformation matrices (entity 124) are not applied.
//!
//! # Example
//!
//! ```no_run
//! use partquote_iges::read_iges;
//!
//! let model = read_iges("bracket.igs").unwrap();
//! println!("{} edges", model.num_edges());
//! ```

mod directory;
mod error;
mod params;
mod reader;
mod record;

pub use error::IgesError;
pub use reader::{read_iges, read_iges_from_buffer};
