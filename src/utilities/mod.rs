//! Small helpers shared by the library and the CLI.

pub mod file_handler;
pub mod printer;
pub mod text;
