pub mod aggregate;
pub mod behavior;
pub mod coerce;
pub mod project;
