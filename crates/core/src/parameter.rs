//! Named bind parameters
//!
//! A [`ParameterSet`] is the ordered list of values bound to a command.
//! Order is insertion order and is significant: it is the order in which
//! parameters are handed to the store's query spec.
//!
//! Names may be bound with or without the leading `@`. [`Parameter::field`]
//! yields the bare name used as a document field, [`Parameter::bind_name`]
//! the `@`-prefixed form used in query text.

use serde::{Deserialize, Serialize};

use crate::value::ParamValue;

/// A single named bind value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    name: String,
    value: ParamValue,
}

impl Parameter {
    /// Create a new parameter.
    pub fn new(name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The name exactly as bound.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name without a leading `@`.
    pub fn field(&self) -> &str {
        self.name.strip_prefix('@').unwrap_or(&self.name)
    }

    /// The name with a leading `@`.
    pub fn bind_name(&self) -> String {
        bind_name(&self.name)
    }

    /// The bound value.
    pub fn value(&self) -> &ParamValue {
        &self.value
    }
}

/// Normalize a parameter name to its `@`-prefixed form.
pub fn bind_name(name: &str) -> String {
    if name.starts_with('@') {
        name.to_string()
    } else {
        format!("@{}", name)
    }
}

/// Ordered, name-unique collection of parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    items: Vec<Parameter>,
}

impl ParameterSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value. Rebinding an existing name replaces its value in place,
    /// keeping the original position.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        let parameter = Parameter::new(name, value);
        match self.position(parameter.field()) {
            Some(index) => self.items[index] = parameter,
            None => self.items.push(parameter),
        }
        self
    }

    /// Builder-style variant of [`ParameterSet::add`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.add(name, value);
        self
    }

    /// Look up a parameter by name, with or without `@`.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        let field = name.strip_prefix('@').unwrap_or(name);
        self.items.iter().find(|p| p.field() == field)
    }

    /// Whether a parameter with this name is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove a parameter by name, returning it if it was bound.
    pub fn remove(&mut self, name: &str) -> Option<Parameter> {
        let field = name.strip_prefix('@').unwrap_or(name);
        self.position(field).map(|index| self.items.remove(index))
    }

    /// Remove all parameters.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no parameters are bound.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate in binding order.
    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.items.iter()
    }

    fn position(&self, field: &str) -> Option<usize> {
        self.items.iter().position(|p| p.field() == field)
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<N: Into<String>, V: Into<ParamValue>> FromIterator<(N, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut set = ParameterSet::new();
        for (name, value) in iter {
            set.add(name, value);
        }
        set
    }
}
