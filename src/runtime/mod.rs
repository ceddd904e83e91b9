//! Runtime system
//!
//! Dynamically-typed values and their evaluation rules.

pub mod value;
