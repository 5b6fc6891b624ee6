pub mod fs;
pub mod in_memory;
