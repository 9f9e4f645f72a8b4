//! Parser module for extracting type information from the Rust AST.
//!
//! This module contains parsers for:
//! - Container and field attributes
//! - Struct definitions

pub mod attributes;
pub mod struct_parser;

pub use struct_parser::{CapabilityFlags, FieldIR, Shape, StructIR, StructParser};
