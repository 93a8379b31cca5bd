//! Core data types: script trees and structured payloads.

pub mod fields;
pub mod script;
