//! Frontend boundary
//!
//! Tokenizing and parsing happen outside this crate; the frontend here is
//! only the tree they produce.

pub mod ast;

pub use ast::Node;
