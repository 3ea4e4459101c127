//! Sluice Core - Core types for the Sluice incremental dataflow engine.
//!
//! This crate provides the foundational types shared by every pipeline node:
//!
//! - `Value`: Scalar attribute values (Null, Boolean, Int64, Float64, String)
//! - `Record`: An open attribute map flowing through pipelines
//! - `KeySpec`: The ordered attribute list identifying a record
//! - `Error`: Error types for protocol and topology violations
//!
//! # Example
//!
//! ```rust
//! use sluice_core::{KeySpec, Record, Value};
//!
//! let a = Record::from([("id", Value::from(1)), ("name", Value::from("Jane"))]);
//! let b = Record::new().with("id", 1).with("name", "Janet");
//!
//! let key = KeySpec::default();
//! assert!(key.matches(&a, &b));
//! assert_eq!(key.extract(&a), vec![Value::Int64(1)]);
//! ```

#![no_std]

extern crate alloc;

mod error;
mod key;
mod record;
mod value;

pub use error::{Error, Result};
pub use key::KeySpec;
pub use record::Record;
pub use value::Value;
