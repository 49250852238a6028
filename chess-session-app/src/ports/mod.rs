pub mod color;
pub mod persistence;
pub mod rules;
