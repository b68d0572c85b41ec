pub mod datetime;
pub mod format;
pub mod loader;
pub mod parser;
pub mod source;
