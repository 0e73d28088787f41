pub mod commands;
pub mod input;
pub mod ui;

pub use input::{InputFormat, read_document, read_structured, write_document};
pub use ui::Output;
