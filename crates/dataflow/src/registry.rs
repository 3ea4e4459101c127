//! Operator registry.
//!
//! Maps operator names to builders so pipelines can be assembled from names
//! and option records. New operators are registered on the registry instead
//! of being attached to a shared base type.

use crate::dataflow::Operator;
use crate::operators::{PassThrough, Set, SetOptions};
use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;
use sluice_core::{Error, Record, Result};
use tracing::debug;

/// Builds an operator from its option record.
pub type Builder = Box<dyn Fn(&Record) -> Result<Box<dyn Operator>>>;

/// Name-to-builder mapping consulted by `Pipeline::build`.
pub struct OperatorRegistry {
    builders: HashMap<String, Builder>,
}

impl Default for OperatorRegistry {
    /// Registry with `pass_through` and `set`.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.builders.insert(
            "pass_through".into(),
            Box::new(|_: &Record| -> Result<Box<dyn Operator>> {
                Ok(Box::new(PassThrough::new()))
            }),
        );
        registry.builders.insert(
            "set".into(),
            Box::new(|options: &Record| -> Result<Box<dyn Operator>> {
                let options = SetOptions::from_record(options)?;
                Ok(Box::new(Set::with_options(options)))
            }),
        );
        registry
    }
}

impl OperatorRegistry {
    /// Creates a registry with no operators.
    pub fn empty() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Registers a builder under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, builder: F) -> Result<()>
    where
        F: Fn(&Record) -> Result<Box<dyn Operator>> + 'static,
    {
        let name = name.into();
        if self.builders.contains_key(&name) {
            return Err(Error::topology(format!(
                "operator {} is already registered",
                name
            )));
        }
        debug!(operator = %name, "operator registered");
        self.builders.insert(name, Box::new(builder));
        Ok(())
    }

    /// Returns true if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Builds the operator registered under `name`.
    pub fn build(&self, name: &str, options: &Record) -> Result<Box<dyn Operator>> {
        let builder = self
            .builders
            .get(name)
            .ok_or_else(|| Error::unknown_operator(name))?;
        let operator = builder(options)?;
        debug!(operator = name, "operator built");
        Ok(operator)
    }
}
