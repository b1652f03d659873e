use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Serialize;

use crate::ast::Parameter;

/// Which class a scope belongs to. Declarations seen before any class
/// header land in the `Unscoped` scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ScopeName {
    Unscoped,
    Class(String),
}

impl Display for ScopeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopeName::Unscoped => write!(f, "(sin clase)"),
            ScopeName::Class(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableSymbol {
    pub var_type: String,
    pub initial_value: Option<String>,
    pub line: usize,
    pub is_loop_variable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSymbol {
    pub modifier: String,
    pub return_type: String,
    pub parameters: Vec<Parameter>,
    pub is_static: bool,
    pub line: usize,
}

impl MethodSymbol {
    /// Parameter list rendered as `type name, type name`.
    pub fn signature(&self) -> String {
        self.parameters
            .iter()
            .map(|p| format!("{} {}", p.param_type, p.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scope {
    pub class: ScopeName,
    pub variables: BTreeMap<String, VariableSymbol>,
    pub methods: BTreeMap<String, MethodSymbol>,
}

impl Scope {
    pub fn new(class: ScopeName) -> Self {
        Self {
            class,
            variables: BTreeMap::new(),
            methods: BTreeMap::new(),
        }
    }
}

/// Scopes in the order their classes were first seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    #[serde(skip)]
    current: Option<usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `name` the current scope. Reopening a known class starts it
    /// over empty.
    pub fn open_class(&mut self, name: &str) {
        let class = ScopeName::Class(name.to_string());
        let index = match self.scopes.iter().position(|s| s.class == class) {
            Some(index) => {
                tracing::debug!(class = %name, "Resetting class scope");
                self.scopes[index] = Scope::new(class);
                index
            }
            None => {
                self.scopes.push(Scope::new(class));
                self.scopes.len() - 1
            }
        };
        self.current = Some(index);
    }

    pub fn current_scope(&self) -> Option<&Scope> {
        self.current.and_then(|index| self.scopes.get(index))
    }

    fn current_scope_mut(&mut self) -> &mut Scope {
        let index = match self.current {
            Some(index) => index,
            None => {
                let index = match self
                    .scopes
                    .iter()
                    .position(|s| s.class == ScopeName::Unscoped)
                {
                    Some(index) => index,
                    None => {
                        self.scopes.push(Scope::new(ScopeName::Unscoped));
                        self.scopes.len() - 1
                    }
                };
                self.current = Some(index);
                index
            }
        };
        &mut self.scopes[index]
    }

    pub fn lookup_variable(&self, name: &str) -> Option<&VariableSymbol> {
        self.current_scope()?.variables.get(name)
    }

    pub fn insert_variable(&mut self, name: impl Into<String>, symbol: VariableSymbol) {
        let name = name.into();
        tracing::debug!(
            name = %name,
            var_type = %symbol.var_type,
            loop_var = symbol.is_loop_variable,
            "Registering variable"
        );
        self.current_scope_mut().variables.insert(name, symbol);
    }

    pub fn insert_method(&mut self, name: impl Into<String>, symbol: MethodSymbol) {
        let name = name.into();
        tracing::debug!(name = %name, "Registering method");
        self.current_scope_mut().methods.insert(name, symbol);
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn scope(&self, class: &str) -> Option<&Scope> {
        self.scopes
            .iter()
            .find(|s| matches!(&s.class, ScopeName::Class(name) if name == class))
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_var(line: usize) -> VariableSymbol {
        VariableSymbol {
            var_type: "int".to_string(),
            initial_value: Some("1".to_string()),
            line,
            is_loop_variable: false,
        }
    }

    #[test]
    fn test_declarations_before_any_class_are_unscoped() {
        let mut table = SymbolTable::new();
        table.insert_variable("x", int_var(1));

        assert_eq!(table.scopes().len(), 1);
        assert_eq!(table.scopes()[0].class, ScopeName::Unscoped);
        assert!(table.lookup_variable("x").is_some());
    }

    #[test]
    fn test_reopening_class_resets_scope() {
        let mut table = SymbolTable::new();
        table.open_class("Main");
        table.insert_variable("x", int_var(2));
        table.open_class("Other");
        table.open_class("Main");

        assert_eq!(table.scopes().len(), 2);
        assert!(table.lookup_variable("x").is_none());
        assert!(table.scope("Other").is_some());
    }
}
