pub mod aggregate_use_case;
pub mod normalize_use_case;
pub mod ports;
