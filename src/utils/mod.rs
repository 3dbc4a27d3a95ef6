//! Naming helpers shared by the view resolver

pub mod string;

pub use string::{to_snake_case, to_snake_case_last_segment};
