use std::collections::BTreeMap;

use serde::Serialize;

use super::Value;
use crate::error::RuntimeError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredVariable {
    pub var_type: String,
    pub value: Value,
    pub is_loop_variable: bool,
}

/// Runtime bindings of one interpreter run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VariableStore {
    variables: BTreeMap<String, StoredVariable>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing any earlier binding.
    pub fn declare(&mut self, name: impl Into<String>, var_type: impl Into<String>, value: Value) {
        self.insert(name.into(), var_type.into(), value, false);
    }

    /// Bind a `for` induction variable; it is dropped by
    /// [`purge_loop_variables`](Self::purge_loop_variables).
    pub fn declare_loop_variable(
        &mut self,
        name: impl Into<String>,
        var_type: impl Into<String>,
        value: Value,
    ) {
        self.insert(name.into(), var_type.into(), value, true);
    }

    fn insert(&mut self, name: String, var_type: String, value: Value, is_loop_variable: bool) {
        let span = tracing::debug_span!("declare_variable", name = %name, var_type = %var_type);
        let _enter = span.enter();
        tracing::trace!(value = %value, loop_var = is_loop_variable, "Binding variable");

        self.variables.insert(
            name,
            StoredVariable {
                var_type,
                value,
                is_loop_variable,
            },
        );
    }

    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let span = tracing::debug_span!("assign_variable", name = %name);
        let _enter = span.enter();

        match self.variables.get_mut(name) {
            Some(variable) => {
                tracing::trace!(value = %value, "Updating variable");
                variable.value = value;
                Ok(())
            }
            None => Err(RuntimeError::UnknownVariable {
                name: name.to_string(),
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name).map(|v| &v.value)
    }

    pub fn lookup(&self, name: &str) -> Option<&StoredVariable> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Remove every loop-flagged binding, returning the removed names.
    pub fn purge_loop_variables(&mut self) -> Vec<String> {
        let purged: Vec<String> = self
            .variables
            .iter()
            .filter(|(_, v)| v.is_loop_variable)
            .map(|(name, _)| name.clone())
            .collect();

        for name in &purged {
            self.variables.remove(name);
        }
        if !purged.is_empty() {
            tracing::debug!(purged = ?purged, "Purged loop variables");
        }

        purged
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StoredVariable)> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn clear(&mut self) {
        self.variables.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_assign() {
        let mut store = VariableStore::new();
        store.declare("x", "int", Value::Int(1));
        store.assign("x", Value::Int(2)).unwrap();

        assert_eq!(store.get("x"), Some(&Value::Int(2)));
        assert_eq!(store.lookup("x").unwrap().var_type, "int");
    }

    #[test]
    fn test_assign_to_unknown_fails() {
        let mut store = VariableStore::new();

        assert_eq!(
            store.assign("y", Value::Int(2)),
            Err(RuntimeError::UnknownVariable {
                name: "y".to_string()
            })
        );
    }

    #[test]
    fn test_purge_removes_only_loop_variables() {
        let mut store = VariableStore::new();
        store.declare("total", "int", Value::Int(0));
        store.declare_loop_variable("i", "int", Value::Int(3));

        assert_eq!(store.purge_loop_variables(), vec!["i".to_string()]);
        assert!(!store.contains("i"));
        assert!(store.contains("total"));
    }
}
