pub mod file;
pub mod project;
