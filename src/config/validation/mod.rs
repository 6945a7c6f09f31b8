//! Configuration validation
//!
//! - `trait_def`: the `Validate` trait
//! - `validators`: implementations for each configuration section

mod trait_def;
mod validators;

pub use trait_def::Validate;
