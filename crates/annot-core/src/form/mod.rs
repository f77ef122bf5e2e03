//! Coding form built from the codebook
//!
//! One control per code, grouped by section in codebook order. The control
//! kind follows the codebook row: multi-select for "checkall" fields,
//! single choice when values are listed, a text area for the configured
//! long-text codes, and a single-line input otherwise.

mod control;
mod model;

pub use control::{Control, FormControl};
pub use model::{EntryMode, FormModel, FormSection, FormSettings};
