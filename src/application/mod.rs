//! Application layer: the builder service and its helpers
//!
//! This layer wires domain pieces into one editor instance and adds parsing.

pub mod builder;
pub mod display;
pub mod error;
pub mod error_ext;
pub mod field_form;
pub mod script;

pub use builder::NavBuilder;
pub use display::TreeDisplay;
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use field_form::FieldForm;
pub use script::{parse_path, parse_script, ScriptLine, ScriptStep};
