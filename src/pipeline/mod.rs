pub mod processing;
pub mod tables;
