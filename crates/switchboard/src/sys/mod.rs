pub mod reader;
pub mod runtime;
