use crate::ast::{
    BinaryOperator, Condition, Expr, ForHeader, Literal, Parameter, Segment, Statement,
    UnaryOperator,
};
use crate::error::SyntaxError;
use crate::lexer::{Token, TokenKind};

pub type ParseResult<T> = std::result::Result<T, SyntaxError>;

const MODIFIERS: &[&str] = &["public", "private", "protected", "static", "final", "abstract"];
const ACCESS_MODIFIERS: &[&str] = &["public", "private", "protected"];
/// Shared by nested blocks, control statements and expressions.
const MAX_NESTING_DEPTH: usize = 64;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    recursive_depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            recursive_depth: 0,
        }
    }

    /// Build the flat statement list. Class and method braces only delimit;
    /// `if`/`for`/`while` own their bodies.
    pub fn parse(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            tracing::trace!(token = ?self.tokens.get(self.current), "Parser: dispatching");
            if let Some(stmt) = self.declaration()? {
                tracing::debug!(node = %stmt.label(), line = stmt.line(), "Parser: parsed node");
                statements.push(stmt);
            }
        }

        tracing::debug!(nodes = statements.len(), "Parser: completed");
        Ok(statements)
    }

    fn declaration(&mut self) -> ParseResult<Option<Statement>> {
        if self.match_symbol("{") || self.match_symbol("}") || self.match_symbol(";") {
            return Ok(None);
        }

        if self.check_modifier() {
            let line = self.peek_line();
            let mut modifiers = Vec::new();
            while self.check_modifier() {
                modifiers.push(self.advance().text);
            }

            if self.check_keyword("class") {
                return self.class_declaration().map(Some);
            }
            return self.member_declaration(modifiers, line).map(Some);
        }

        if self.check_keyword("class") {
            return self.class_declaration().map(Some);
        }

        self.statement()
    }

    fn class_declaration(&mut self) -> ParseResult<Statement> {
        let line = self.advance().line;

        let name = if self.check_identifier() {
            Some(self.advance().text)
        } else {
            None
        };

        // extends / implements clauses are not modelled
        while !self.is_at_end() && !self.check_symbol("{") && !self.check_symbol(";") {
            self.advance();
        }
        self.match_symbol("{");

        Ok(Statement::ClassDeclaration { name, line })
    }

    fn member_declaration(
        &mut self,
        modifiers: Vec<String>,
        line: usize,
    ) -> ParseResult<Statement> {
        let modifier = modifiers
            .iter()
            .find(|m| ACCESS_MODIFIERS.contains(&m.as_str()))
            .or_else(|| modifiers.first())
            .cloned()
            .unwrap_or_default();
        let is_static = modifiers.iter().any(|m| m == "static");

        let mut return_type = if self.check_type_start() {
            Some(self.type_name())
        } else {
            None
        };

        let name = if self.check_identifier() {
            Some(self.advance().text)
        } else if self.check_symbol("(") {
            // Constructor: the "type" was the name
            return_type.take()
        } else {
            None
        };

        if !self.match_symbol("(") {
            return self.finish_variable(return_type.unwrap_or_default(), name, line);
        }

        let parameters = self.parameters();

        // throws clauses are not modelled
        while !self.is_at_end() && !self.check_symbol("{") && !self.check_symbol(";") {
            self.advance();
        }
        self.match_symbol("{");

        Ok(Statement::MethodDeclaration {
            modifier,
            is_static,
            return_type,
            name,
            parameters,
            line,
        })
    }

    fn parameters(&mut self) -> Vec<Parameter> {
        let mut parameters = Vec::new();

        while !self.is_at_end() && !self.check_symbol(")") {
            if self.check_type_start() {
                let param_type = self.type_name();
                if self.check_identifier() {
                    let name = self.advance().text;
                    parameters.push(Parameter { param_type, name });
                }
            } else {
                self.advance();
            }
        }
        self.match_symbol(")");

        parameters
    }

    fn statement(&mut self) -> ParseResult<Option<Statement>> {
        if self.is_at_end() || self.check_symbol("}") {
            return Ok(None);
        }

        let token = self.peek().clone();
        match token.kind {
            TokenKind::Keyword => match token.text.as_str() {
                "if" => self.nested(Self::if_statement).map(Some),
                "for" => self.nested(Self::for_statement).map(Some),
                "while" => self.nested(Self::while_statement).map(Some),
                "else" => {
                    // A dangling else has no if to attach to
                    self.advance();
                    Ok(None)
                }
                "final" => {
                    self.advance();
                    self.nested(Self::statement)
                }
                _ => self.variable_declaration().map(Some),
            },
            TokenKind::Identifier => {
                if self.check_print_call() {
                    return Ok(self.print_statement());
                }
                if self.check_assignment() {
                    return Ok(self.assignment_statement());
                }
                if self.check_declaration_with_named_type() {
                    return self.variable_declaration().map(Some);
                }
                self.skip_statement();
                Ok(None)
            }
            TokenKind::Symbol if token.text == ";" => {
                self.advance();
                Ok(None)
            }
            _ => {
                self.skip_statement();
                Ok(None)
            }
        }
    }

    /// A braced block, or a single statement.
    fn body(&mut self) -> ParseResult<Vec<Statement>> {
        if !self.match_symbol("{") {
            return Ok(self.statement()?.into_iter().collect());
        }

        let mut statements = Vec::new();
        while !self.is_at_end() && !self.check_symbol("}") {
            if self.check_symbol("{") {
                statements.extend(self.nested(Self::body)?);
                continue;
            }
            if let Some(stmt) = self.statement()? {
                statements.push(stmt);
            }
        }
        self.match_symbol("}");

        Ok(statements)
    }

    fn if_statement(&mut self) -> ParseResult<Statement> {
        let line = self.advance().line;

        if !self.match_symbol("(") {
            return Err(SyntaxError::new("Se esperaba '(' después de 'if'", line));
        }
        let condition = self.condition("if", line)?;

        let then_branch = self.body()?;

        let has_else = self.match_keyword("else");
        let else_branch = if has_else { self.body()? } else { Vec::new() };

        Ok(Statement::If {
            condition,
            then_branch,
            else_branch,
            has_else,
            line,
        })
    }

    fn while_statement(&mut self) -> ParseResult<Statement> {
        let line = self.advance().line;

        if !self.match_symbol("(") {
            return Err(SyntaxError::new("Se esperaba '(' después de 'while'", line));
        }
        let condition = self.condition("while", line)?;
        let body = self.body()?;

        Ok(Statement::While {
            condition,
            body,
            line,
        })
    }

    fn for_statement(&mut self) -> ParseResult<Statement> {
        let line = self.advance().line;

        if !self.match_symbol("(") {
            return Err(SyntaxError::new("Se esperaba '(' después de 'for'", line));
        }

        let init = Segment::new(self.header_segment(";", line)?);
        let condition_tokens = self.header_segment(";", line)?;
        let increment = Segment::new(self.header_segment(")", line)?);

        let header = ForHeader {
            init,
            condition: Self::build_condition(condition_tokens),
            increment,
        };
        let body = self.body()?;

        Ok(Statement::For { header, body, line })
    }

    /// Collect one `for` header segment and consume its terminator.
    fn header_segment(&mut self, terminator: &str, line: usize) -> ParseResult<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;

        loop {
            if self.is_at_end() {
                return Err(SyntaxError::new(
                    format!("Se esperaba '{}' en la cabecera del for", terminator),
                    line,
                ));
            }
            if depth == 0 && self.check_symbol(terminator) {
                self.advance();
                return Ok(tokens);
            }
            if depth == 0 && (self.check_symbol(")") || self.check_symbol("{")) {
                return Err(SyntaxError::new(
                    format!("Se esperaba '{}' en la cabecera del for", terminator),
                    self.peek_line(),
                ));
            }
            if self.check_symbol("(") {
                depth += 1;
            } else if self.check_symbol(")") {
                depth -= 1;
            }
            tokens.push(self.advance());
        }
    }

    /// Collect a parenthesised condition; the opening `(` is already consumed.
    fn condition(&mut self, construct: &str, line: usize) -> ParseResult<Condition> {
        let tokens = self.paren_group().ok_or_else(|| {
            SyntaxError::new(format!("Falta ')' en la condición del {}", construct), line)
        })?;
        Ok(Self::build_condition(tokens))
    }

    fn build_condition(tokens: Vec<Token>) -> Condition {
        let expr = parse_expression_tokens(&tokens);
        Condition {
            segment: Segment::new(tokens),
            expr,
        }
    }

    /// Tokens up to the `)` matching an already consumed `(`.
    fn paren_group(&mut self) -> Option<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;

        while !self.is_at_end() {
            if self.check_symbol(")") {
                if depth == 0 {
                    self.advance();
                    return Some(tokens);
                }
                depth -= 1;
            } else if self.check_symbol("(") {
                depth += 1;
            }
            tokens.push(self.advance());
        }

        None
    }

    fn variable_declaration(&mut self) -> ParseResult<Statement> {
        let line = self.peek_line();
        let declared_type = self.type_name();

        let name = if self.check_identifier() {
            Some(self.advance().text)
        } else {
            None
        };

        self.finish_variable(declared_type, name, line)
    }

    /// Parse the optional `= value` part of a declaration whose type and name
    /// are already consumed.
    fn finish_variable(
        &mut self,
        declared_type: String,
        name: Option<String>,
        line: usize,
    ) -> ParseResult<Statement> {
        let mut initial_value = None;
        let mut initializer = None;

        if self.match_operator("=") {
            initial_value = self.single_value_text();

            let start = self.current;
            match self.expression() {
                Ok(expr) => initializer = Some(expr),
                Err(e) => {
                    tracing::debug!(error = %e, "Unsupported initializer, keeping raw value only");
                    self.current = start;
                }
            }
        }

        self.finish_statement(line);

        Ok(Statement::VariableDeclaration {
            declared_type,
            name,
            initial_value,
            initializer,
            line,
        })
    }

    /// The text of the token right after `=`, folding a sign into a
    /// following numeric literal.
    fn single_value_text(&self) -> Option<String> {
        let token = self.tokens.get(self.current)?;
        if token.is_operator("-") {
            if let Some(next) = self.tokens.get(self.current + 1) {
                if matches!(
                    next.kind,
                    TokenKind::IntegerLiteral | TokenKind::DecimalLiteral
                ) {
                    return Some(format!("-{}", next.text));
                }
            }
        }
        if token.is_symbol(";") {
            return None;
        }
        Some(token.text.clone())
    }

    fn assignment_statement(&mut self) -> Option<Statement> {
        let target = self.advance();
        let name = target.text.clone();
        let line = target.line;
        let op = self.advance().text;

        let value = match op.as_str() {
            "++" | "--" => {
                let operator = if op == "++" {
                    BinaryOperator::Add
                } else {
                    BinaryOperator::Subtract
                };
                Some(Expr::binary(
                    Expr::identifier(&name),
                    operator,
                    Expr::literal(Literal::Integer(1)),
                ))
            }
            _ => {
                let start = self.current;
                match self.expression() {
                    Ok(expr) => match op.strip_suffix('=').and_then(BinaryOperator::from_symbol) {
                        Some(operator) => Some(Expr::binary(
                            Expr::identifier(&name),
                            operator,
                            Expr::Grouping {
                                inner: Box::new(expr),
                            },
                        )),
                        None => Some(expr),
                    },
                    Err(e) => {
                        tracing::debug!(error = %e, line, "Skipping unsupported assignment");
                        self.current = start;
                        None
                    }
                }
            }
        };

        match value {
            Some(value) => {
                self.finish_statement(line);
                Some(Statement::Assignment { name, value, line })
            }
            None => {
                self.skip_statement();
                None
            }
        }
    }

    fn print_statement(&mut self) -> Option<Statement> {
        let line = self.peek_line();

        let mut newline = true;
        if self.peek().text == "System" {
            // System . out . println
            self.current += 4;
            newline = self.previous().text == "println";
        } else {
            self.advance();
        }
        self.advance(); // (

        let Some(tokens) = self.paren_group() else {
            return None;
        };

        let argument = if tokens.is_empty() {
            None
        } else {
            match parse_expression_tokens(&tokens) {
                Some(expr) => Some(expr),
                None => {
                    tracing::debug!(line, "Skipping print with unsupported argument");
                    self.skip_statement();
                    return None;
                }
            }
        };
        self.finish_statement(line);

        Some(Statement::Print {
            argument,
            newline,
            line,
        })
    }

    /// Consume the terminating `;`, discarding anything left on the
    /// statement's line before it.
    fn finish_statement(&mut self, line: usize) {
        if self.match_symbol(";") {
            return;
        }
        if !self.is_at_end() && self.peek_line() == line && !self.check_symbol("}") {
            self.skip_statement();
        }
    }

    /// Skip an unsupported statement up to and including its `;`.
    fn skip_statement(&mut self) {
        let mut skipped = Vec::new();
        while !self.is_at_end() && !self.check_symbol("}") && !self.check_symbol("{") {
            let token = self.advance();
            let done = token.is_symbol(";");
            skipped.push(token.text);
            if done {
                break;
            }
        }
        if !skipped.is_empty() {
            tracing::debug!(tokens = %skipped.join(" "), "Skipped unsupported statement");
        }
    }

    // Expressions

    pub fn expression(&mut self) -> ParseResult<Expr> {
        self.nested(Self::comparison)
    }

    /// Run `rule` one nesting level deeper, failing once the limit is hit.
    fn nested<T>(&mut self, rule: fn(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        self.recursive_depth += 1;
        if self.recursive_depth > MAX_NESTING_DEPTH {
            self.recursive_depth -= 1;
            return Err(SyntaxError::new(
                "Límite de anidamiento excedido",
                self.peek_line(),
            ));
        }

        let result = rule(self);
        self.recursive_depth -= 1;
        result
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;

        while let Some(operator) = self.match_binary(&["<", "<=", ">", ">=", "==", "!="]) {
            let right = self.term()?;
            expr = Expr::binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;

        while let Some(operator) = self.match_binary(&["+", "-"]) {
            let right = self.factor()?;
            expr = Expr::binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;

        while let Some(operator) = self.match_binary(&["*", "/", "%"]) {
            let right = self.unary()?;
            expr = Expr::binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        let operator = if self.match_operator("-") {
            UnaryOperator::Negate
        } else if self.match_operator("!") {
            UnaryOperator::Not
        } else {
            return self.primary();
        };

        let operand = self.nested(Self::unary)?;
        Ok(Expr::Unary {
            operator,
            operand: Box::new(operand),
        })
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if self.is_at_end() {
            return Err(SyntaxError::new(
                "Se esperaba una expresión",
                self.tokens.last().map(|t| t.line).unwrap_or(0),
            ));
        }

        let token = self.advance();
        let line = token.line;
        match token.kind {
            TokenKind::IntegerLiteral => token
                .text
                .parse::<i64>()
                .map(|n| Expr::literal(Literal::Integer(n)))
                .map_err(|_| {
                    SyntaxError::new(format!("Entero fuera de rango: {}", token.text), line)
                }),
            TokenKind::DecimalLiteral => token
                .text
                .parse::<f64>()
                .map(|n| Expr::literal(Literal::Decimal(n)))
                .map_err(|_| SyntaxError::new(format!("Decimal no válido: {}", token.text), line)),
            TokenKind::StringLiteral => {
                let content = token.text[1..token.text.len() - 1].to_string();
                Ok(Expr::literal(Literal::String(content)))
            }
            TokenKind::CharacterLiteral => match token.text.chars().nth(1) {
                Some(c) => Ok(Expr::literal(Literal::Char(c))),
                None => Err(SyntaxError::new("Carácter no válido", line)),
            },
            TokenKind::Keyword => match token.text.as_str() {
                "true" => Ok(Expr::literal(Literal::Boolean(true))),
                "false" => Ok(Expr::literal(Literal::Boolean(false))),
                "null" => Ok(Expr::literal(Literal::Null)),
                other => Err(SyntaxError::new(
                    format!("Palabra reservada inesperada en expresión: {}", other),
                    line,
                )),
            },
            TokenKind::Identifier => {
                if self.check_symbol(".") || self.check_symbol("(") || self.check_symbol("[") {
                    return Err(SyntaxError::new(
                        format!("Expresión no soportada después de '{}'", token.text),
                        line,
                    ));
                }
                Ok(Expr::identifier(token.text))
            }
            TokenKind::Symbol if token.text == "(" => {
                let inner = self.expression()?;
                if !self.match_symbol(")") {
                    return Err(SyntaxError::new("Se esperaba ')' después de la expresión", line));
                }
                Ok(Expr::Grouping {
                    inner: Box::new(inner),
                })
            }
            _ => Err(SyntaxError::new(
                format!("Token inesperado en expresión: {}", token.text),
                line,
            )),
        }
    }

    // Helper methods

    fn type_name(&mut self) -> String {
        let mut name = self.advance().text;
        while self.check_symbol("[") && self.peek_next_is_symbol("]") {
            self.current += 2;
            name.push_str("[]");
        }
        name
    }

    fn check_modifier(&self) -> bool {
        !self.is_at_end()
            && self.peek().kind == TokenKind::Keyword
            && MODIFIERS.contains(&self.peek().text.as_str())
    }

    fn check_type_start(&self) -> bool {
        !self.is_at_end()
            && matches!(self.peek().kind, TokenKind::Keyword | TokenKind::Identifier)
    }

    fn check_print_call(&self) -> bool {
        let text = |offset: usize| self.tokens.get(self.current + offset).map(|t| t.text.as_str());

        match text(0) {
            Some("print") | Some("println") => text(1) == Some("("),
            Some("System") => {
                text(1) == Some(".")
                    && text(2) == Some("out")
                    && text(3) == Some(".")
                    && matches!(text(4), Some("println") | Some("print"))
                    && text(5) == Some("(")
            }
            _ => false,
        }
    }

    fn check_assignment(&self) -> bool {
        match self.tokens.get(self.current + 1) {
            Some(next) => {
                next.kind == TokenKind::Operator
                    && matches!(
                        next.text.as_str(),
                        "=" | "+=" | "-=" | "*=" | "/=" | "%=" | "++" | "--"
                    )
            }
            None => false,
        }
    }

    fn check_declaration_with_named_type(&self) -> bool {
        let mut offset = 1;
        while self.tokens.get(self.current + offset).is_some_and(|t| t.is_symbol("["))
            && self
                .tokens
                .get(self.current + offset + 1)
                .is_some_and(|t| t.is_symbol("]"))
        {
            offset += 2;
        }
        self.tokens
            .get(self.current + offset)
            .is_some_and(|t| t.is_identifier())
    }

    fn match_binary(&mut self, ops: &[&str]) -> Option<BinaryOperator> {
        if self.is_at_end() || self.peek().kind != TokenKind::Operator {
            return None;
        }
        if !ops.contains(&self.peek().text.as_str()) {
            return None;
        }
        let op = BinaryOperator::from_symbol(&self.peek().text)?;
        self.advance();
        Some(op)
    }

    fn match_symbol(&mut self, symbol: &str) -> bool {
        if self.check_symbol(symbol) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_keyword(&mut self, word: &str) -> bool {
        if self.check_keyword(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_operator(&mut self, op: &str) -> bool {
        if !self.is_at_end() && self.peek().is_operator(op) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check_symbol(&self, symbol: &str) -> bool {
        !self.is_at_end() && self.peek().is_symbol(symbol)
    }

    fn check_keyword(&self, word: &str) -> bool {
        !self.is_at_end() && self.peek().is_keyword(word)
    }

    fn check_identifier(&self) -> bool {
        !self.is_at_end() && self.peek().is_identifier()
    }

    fn peek_next_is_symbol(&self, symbol: &str) -> bool {
        self.tokens
            .get(self.current + 1)
            .is_some_and(|t| t.is_symbol(symbol))
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek_line(&self) -> usize {
        self.tokens
            .get(self.current)
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(0)
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    fn previous(&self) -> Token {
        self.tokens[self.current.saturating_sub(1).min(self.tokens.len() - 1)].clone()
    }
}

/// Parse a complete token run as one expression. `None` when the run is
/// empty, malformed, or has trailing tokens.
pub fn parse_expression_tokens(tokens: &[Token]) -> Option<Expr> {
    if tokens.is_empty() {
        return None;
    }

    let mut parser = Parser::new(tokens.to_vec());
    match parser.expression() {
        Ok(expr) if parser.is_at_end() => Some(expr),
        _ => None,
    }
}

/// Convenience wrapper for `Parser::new(tokens).parse()`.
pub fn parse(tokens: Vec<Token>) -> ParseResult<Vec<Statement>> {
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_source(source: &str) -> Vec<Statement> {
        parse(tokenize(source)).expect("source should parse")
    }

    #[test]
    fn test_class_and_main() {
        let statements = parse_source(
            "public class Main {\n    public static void main(String[] args) {\n    }\n}",
        );

        assert_eq!(
            statements,
            vec![
                Statement::ClassDeclaration {
                    name: Some("Main".to_string()),
                    line: 1,
                },
                Statement::MethodDeclaration {
                    modifier: "public".to_string(),
                    is_static: true,
                    return_type: Some("void".to_string()),
                    name: Some("main".to_string()),
                    parameters: vec![Parameter {
                        param_type: "String[]".to_string(),
                        name: "args".to_string(),
                    }],
                    line: 2,
                },
            ]
        );
    }

    #[test]
    fn test_variable_declaration_keeps_single_value_token() {
        let statements = parse_source("int y = x + 3;\nint z = -4;\nint w;");

        match &statements[0] {
            Statement::VariableDeclaration {
                declared_type,
                name,
                initial_value,
                initializer,
                line,
            } => {
                assert_eq!(declared_type, "int");
                assert_eq!(name.as_deref(), Some("y"));
                assert_eq!(initial_value.as_deref(), Some("x"));
                assert_eq!(initializer.as_ref().map(|e| e.to_string()).as_deref(), Some("x + 3"));
                assert_eq!(*line, 1);
            }
            other => panic!("Expected variable declaration, got {:?}", other),
        }

        match &statements[1] {
            Statement::VariableDeclaration { initial_value, .. } => {
                assert_eq!(initial_value.as_deref(), Some("-4"))
            }
            other => panic!("Expected variable declaration, got {:?}", other),
        }

        match &statements[2] {
            Statement::VariableDeclaration {
                initial_value,
                initializer,
                ..
            } => {
                assert!(initial_value.is_none());
                assert!(initializer.is_none());
            }
            other => panic!("Expected variable declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_if_else_owns_bodies() {
        let statements = parse_source(
            "if (x > 5) {\n print(\"big\");\n} else {\n print(\"small\");\n}\nprint(x);",
        );

        assert_eq!(statements.len(), 2);
        match &statements[0] {
            Statement::If {
                condition,
                then_branch,
                else_branch,
                has_else,
                ..
            } => {
                assert_eq!(condition.text(), "x>5");
                assert!(condition.expr.is_some());
                assert_eq!(then_branch.len(), 1);
                assert_eq!(else_branch.len(), 1);
                assert!(*has_else);
            }
            other => panic!("Expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_if_without_else_does_not_see_later_else() {
        let statements = parse_source(
            "if (a == 1) {\n print(a);\n}\nif (b == 2) {\n print(b);\n} else {\n print(c);\n}",
        );

        match (&statements[0], &statements[1]) {
            (Statement::If { has_else: first, .. }, Statement::If { has_else: second, .. }) => {
                assert!(!first);
                assert!(second);
            }
            other => panic!("Expected two if statements, got {:?}", other),
        }
    }

    #[test]
    fn test_for_header_segments() {
        let statements = parse_source("for (int i = 0; i < 3; i++) {\n print(i);\n}");

        match &statements[0] {
            Statement::For { header, body, line } => {
                assert_eq!(header.init.text, "inti=0");
                assert_eq!(header.init.spaced(), "int i = 0");
                assert_eq!(header.condition.text(), "i<3");
                assert_eq!(header.increment.text, "i++");
                assert_eq!(body.len(), 1);
                assert_eq!(*line, 1);
            }
            other => panic!("Expected for statement, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_paren_after_if_is_syntax_error() {
        let err = parse(tokenize("if x > 5 {\n}")).unwrap_err();

        assert_eq!(err.line, 1);
        assert!(err.message.contains("'('"));
    }

    #[test]
    fn test_missing_semicolon_in_for_header() {
        let err = parse(tokenize("for (int i = 0) {\n}")).unwrap_err();

        assert!(err.message.contains("';'"));
    }

    #[test]
    fn test_print_forms_and_assignments() {
        let statements = parse_source(
            "System.out.println(\"a\" + x);\nSystem.out.print(x);\nx = x * 2;\nx += 1;\nx++;",
        );

        assert!(matches!(
            statements[0],
            Statement::Print { newline: true, .. }
        ));
        assert!(matches!(
            statements[1],
            Statement::Print { newline: false, .. }
        ));
        match &statements[3] {
            Statement::Assignment { name, value, .. } => {
                assert_eq!(name, "x");
                assert_eq!(value.to_string(), "x + (1)");
            }
            other => panic!("Expected assignment, got {:?}", other),
        }
        match &statements[4] {
            Statement::Assignment { value, .. } => assert_eq!(value.to_string(), "x + 1"),
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_statements_are_skipped() {
        let statements = parse_source("Scanner sc = new Scanner(System.in);\nfoo.bar();\nprint(1);");

        assert_eq!(statements.len(), 2);
        assert!(matches!(
            &statements[0],
            Statement::VariableDeclaration { declared_type, initializer: None, .. } if declared_type == "Scanner"
        ));
        assert!(matches!(statements[1], Statement::Print { .. }));
    }

    #[test]
    fn test_expression_precedence() {
        let tokens = tokenize("1 + 2 * (3 - 4)");
        let expr = parse_expression_tokens(&tokens).unwrap();

        assert_eq!(expr.to_string(), "1 + 2 * (3 - 4)");
        match expr {
            Expr::BinaryOp { operator, .. } => assert_eq!(operator, BinaryOperator::Add),
            other => panic!("Expected binary op, got {:?}", other),
        }
    }

    #[test]
    fn test_unary_chain_hits_nesting_limit() {
        let source = format!("{}1", "- ".repeat(5_000));

        assert!(parse_expression_tokens(&tokenize(&source)).is_none());
        assert!(parse_expression_tokens(&tokenize("- - -1")).is_some());
    }

    #[test]
    fn test_nested_control_statements_hit_nesting_limit() {
        let ifs = format!("{}print(1);", "if (x > 0) ".repeat(3_000));
        let err = parse(tokenize(&ifs)).unwrap_err();
        assert!(err.message.contains("anidamiento"));

        let blocks = format!("while (x > 0) {}{}", "{".repeat(3_000), "}".repeat(3_000));
        assert!(parse(tokenize(&blocks)).is_err());

        let shallow = format!("{}print(1);", "if (x > 0) ".repeat(20));
        assert_eq!(parse_source(&shallow).len(), 1);
    }
}
