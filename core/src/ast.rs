use std::fmt::Display;

use serde::Serialize;

use crate::lexer::Token;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Integer(i64),
    Decimal(f64),
    String(String),
    Char(char),
    Boolean(bool),
    Null,
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::Decimal(n) => write!(f, "{}", n),
            Literal::String(s) => write!(f, "\"{}\"", s),
            Literal::Char(c) => write!(f, "'{}'", c),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Null => write!(f, "null"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    EqualEqual,
    NotEqual,
}

impl BinaryOperator {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Less
                | BinaryOperator::LessEq
                | BinaryOperator::Greater
                | BinaryOperator::GreaterEq
                | BinaryOperator::EqualEqual
                | BinaryOperator::NotEqual
        )
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Subtract,
            "*" => BinaryOperator::Multiply,
            "/" => BinaryOperator::Divide,
            "%" => BinaryOperator::Modulo,
            "<" => BinaryOperator::Less,
            "<=" => BinaryOperator::LessEq,
            ">" => BinaryOperator::Greater,
            ">=" => BinaryOperator::GreaterEq,
            "==" => BinaryOperator::EqualEqual,
            "!=" => BinaryOperator::NotEqual,
            _ => return None,
        };
        Some(op)
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEq => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEq => ">=",
            BinaryOperator::EqualEqual => "==",
            BinaryOperator::NotEqual => "!=",
        };
        write!(f, "{}", op)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOperator {
    Negate,
    Not,
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOperator::Negate => write!(f, "-"),
            UnaryOperator::Not => write!(f, "!"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    Literal {
        value: Literal,
    },
    Identifier {
        name: String,
    },
    Grouping {
        inner: Box<Expr>,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<Expr>,
    },
    BinaryOp {
        left: Box<Expr>,
        operator: BinaryOperator,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn identifier(name: impl Into<String>) -> Self {
        Expr::Identifier { name: name.into() }
    }

    pub fn literal(value: Literal) -> Self {
        Expr::Literal { value }
    }

    pub fn binary(left: Expr, operator: BinaryOperator, right: Expr) -> Self {
        Expr::BinaryOp {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn ungrouped(&self) -> &Expr {
        match self {
            Expr::Grouping { inner } => inner.ungrouped(),
            other => other,
        }
    }

    /// True when the expression only combines numbers and names with
    /// `+ - * / %`, unary minus and parentheses.
    pub fn is_arithmetic(&self) -> bool {
        match self {
            Expr::Literal {
                value: Literal::Integer(_) | Literal::Decimal(_),
            } => true,
            Expr::Literal { .. } => false,
            Expr::Identifier { .. } => true,
            Expr::Grouping { inner } => inner.is_arithmetic(),
            Expr::Unary {
                operator: UnaryOperator::Negate,
                operand,
            } => operand.is_arithmetic(),
            Expr::Unary { .. } => false,
            Expr::BinaryOp {
                left,
                operator,
                right,
            } => !operator.is_comparison() && left.is_arithmetic() && right.is_arithmetic(),
        }
    }

    /// Flatten a top-level left-leaning chain of `+` into its operands.
    pub fn concatenation_parts(&self) -> Vec<&Expr> {
        match self {
            Expr::BinaryOp {
                left,
                operator: BinaryOperator::Add,
                right,
            } => {
                let mut parts = left.concatenation_parts();
                parts.push(right);
                parts
            }
            other => vec![other],
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Literal { value } => write!(f, "{}", value),
            Expr::Identifier { name } => write!(f, "{}", name),
            Expr::Grouping { inner } => write!(f, "({})", inner),
            Expr::Unary { operator, operand } => write!(f, "{}{}", operator, operand),
            Expr::BinaryOp {
                left,
                operator,
                right,
            } => write!(f, "{} {} {}", left, operator, right),
        }
    }
}

/// A run of raw tokens kept next to its parsed form, used for
/// control-structure headers whose shape is validated textually.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Segment {
    #[serde(skip)]
    pub tokens: Vec<Token>,
    /// Token text concatenated without whitespace.
    pub text: String,
}

impl Segment {
    pub fn new(tokens: Vec<Token>) -> Self {
        let text = tokens.iter().map(|t| t.text.as_str()).collect();
        Self { tokens, text }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token text joined with single spaces.
    pub fn spaced(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Condition {
    #[serde(flatten)]
    pub segment: Segment,
    /// Parsed form, absent when the tokens do not form an expression.
    pub expr: Option<Expr>,
}

impl Condition {
    pub fn text(&self) -> &str {
        &self.segment.text
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForHeader {
    pub init: Segment,
    pub condition: Condition,
    pub increment: Segment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub param_type: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Statement {
    ClassDeclaration {
        name: Option<String>,
        line: usize,
    },
    MethodDeclaration {
        modifier: String,
        is_static: bool,
        return_type: Option<String>,
        name: Option<String>,
        parameters: Vec<Parameter>,
        line: usize,
    },
    VariableDeclaration {
        declared_type: String,
        name: Option<String>,
        /// Text of the single value token following `=`.
        initial_value: Option<String>,
        initializer: Option<Expr>,
        line: usize,
    },
    Assignment {
        name: String,
        value: Expr,
        line: usize,
    },
    Print {
        argument: Option<Expr>,
        newline: bool,
        line: usize,
    },
    If {
        condition: Condition,
        then_branch: Vec<Statement>,
        else_branch: Vec<Statement>,
        has_else: bool,
        line: usize,
    },
    For {
        header: ForHeader,
        body: Vec<Statement>,
        line: usize,
    },
    While {
        condition: Condition,
        body: Vec<Statement>,
        line: usize,
    },
}

impl Statement {
    pub fn line(&self) -> usize {
        match self {
            Statement::ClassDeclaration { line, .. }
            | Statement::MethodDeclaration { line, .. }
            | Statement::VariableDeclaration { line, .. }
            | Statement::Assignment { line, .. }
            | Statement::Print { line, .. }
            | Statement::If { line, .. }
            | Statement::For { line, .. }
            | Statement::While { line, .. } => *line,
        }
    }

    /// Short node label used by tree listings.
    pub fn label(&self) -> String {
        match self {
            Statement::ClassDeclaration { name, .. } => {
                format!("clase: {}", name.as_deref().unwrap_or("?"))
            }
            Statement::MethodDeclaration { name, .. } => {
                format!("metodo: {}", name.as_deref().unwrap_or("?"))
            }
            Statement::VariableDeclaration { name, .. } => {
                format!("variable: {}", name.as_deref().unwrap_or("?"))
            }
            Statement::Assignment { name, .. } => format!("asignacion: {}", name),
            Statement::Print { .. } => "print".to_string(),
            Statement::If { condition, .. } => format!("if: {}", condition.text()),
            Statement::For { header, .. } => format!(
                "for: {}; {}; {}",
                header.init.text,
                header.condition.text(),
                header.increment.text
            ),
            Statement::While { condition, .. } => format!("while: {}", condition.text()),
        }
    }

    /// Nested statement lists owned by this node, in source order.
    pub fn children(&self) -> Vec<&Statement> {
        match self {
            Statement::If {
                then_branch,
                else_branch,
                ..
            } => then_branch.iter().chain(else_branch.iter()).collect(),
            Statement::For { body, .. } | Statement::While { body, .. } => body.iter().collect(),
            _ => Vec::new(),
        }
    }
}
