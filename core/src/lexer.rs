use std::fmt::Display;

use logos::Logos;
use serde::Serialize;

/// Reserved words of the supported Java subset.
pub const KEYWORDS: &[&str] = &[
    // Access and other modifiers
    "public",
    "private",
    "protected",
    "static",
    "final",
    "abstract",
    // Data types
    "void",
    "int",
    "double",
    "float",
    "String",
    "boolean",
    "char",
    "long",
    "byte",
    "short",
    // Control flow
    "if",
    "else",
    "while",
    "for",
    "do",
    "switch",
    "case",
    "break",
    "continue",
    "return",
    // Others
    "class",
    "new",
    "try",
    "catch",
    "finally",
    "throw",
    "throws",
    "null",
    "true",
    "false",
    "extends",
    "implements",
    "interface",
    "package",
    "import",
];

/// Operators recognised by the classifier.
pub const OPERATORS: &[&str] = &[
    // Arithmetic
    "+", "-", "*", "/", "%", "++", "--", // Relational
    "==", "!=", ">", "<", ">=", "<=", // Logical
    "&&", "||", "!", // Assignment
    "=", "+=", "-=", "*=", "/=", "%=", // Bitwise
    "&", "|", "^", "~", "<<", ">>", ">>>",
];

/// Punctuation that is not an operator.
pub const SYMBOLS: &[&str] = &[";", "{", "}", "(", ")", "[", "]", ",", "."];

/// Raw lexeme classes matched by logos on a single physical line.
///
/// Operators use longest match, so `<=`, `++` and `+=` come out as one
/// token each. Listings therefore differ from a lexer that tries
/// single-character operators first, which splits `<=` into `<` `=`.
#[derive(Debug, Logos, PartialEq, Clone, Copy)]
#[logos(skip r"[ \t\r\f]+")] // Skip whitespace
#[logos(skip r"//[^\n]*")] // Skip line comments
enum Lexeme {
    #[regex("[a-zA-Z_][a-zA-Z0-9_]*")]
    Word,

    #[regex(r#""[^"]*""#)]
    Str,

    #[regex(r"[0-9]+\.[0-9]+")]
    Decimal,

    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r"'[^']'")]
    Char,

    #[token(">>>")]
    #[token("==")]
    #[token("!=")]
    #[token(">=")]
    #[token("<=")]
    #[token("++")]
    #[token("--")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("&&")]
    #[token("||")]
    #[token("<<")]
    #[token(">>")]
    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("%")]
    #[token("=")]
    #[token("!")]
    #[token("<")]
    #[token(">")]
    #[token("&")]
    #[token("|")]
    #[token("^")]
    #[token("~")]
    Operator,

    #[token(";")]
    #[token("{")]
    #[token("}")]
    #[token("(")]
    #[token(")")]
    #[token("[")]
    #[token("]")]
    #[token(",")]
    #[token(".")]
    Symbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Keyword,
    Identifier,
    StringLiteral,
    IntegerLiteral,
    DecimalLiteral,
    CharacterLiteral,
    Operator,
    Symbol,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::Keyword => "palabra_reservada",
            TokenKind::Identifier => "identificador",
            TokenKind::StringLiteral => "cadena",
            TokenKind::IntegerLiteral => "entero",
            TokenKind::DecimalLiteral => "decimal",
            TokenKind::CharacterLiteral => "caracter",
            TokenKind::Operator => "operador",
            TokenKind::Symbol => "simbolo",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
        }
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == word
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text == symbol
    }

    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }

    pub fn is_comparison(&self) -> bool {
        self.kind == TokenKind::Operator
            && matches!(self.text.as_str(), "==" | "!=" | "<" | "<=" | ">" | ">=")
    }

    /// Human readable description shown next to the token in listings.
    pub fn description(&self) -> String {
        match self.kind {
            TokenKind::Keyword => "Palabra clave del lenguaje Java".to_string(),
            TokenKind::Operator => format!("Operador {}", operator_description(&self.text)),
            TokenKind::Identifier => "Nombre de variable, método o clase".to_string(),
            TokenKind::StringLiteral => "Cadena de texto".to_string(),
            TokenKind::DecimalLiteral => "Número decimal".to_string(),
            TokenKind::IntegerLiteral => "Número entero".to_string(),
            TokenKind::Symbol => symbol_description(&self.text).to_string(),
            TokenKind::CharacterLiteral => "Carácter único".to_string(),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

fn operator_description(op: &str) -> &'static str {
    match op {
        "+" => "de suma",
        "-" => "de resta",
        "*" => "de multiplicación",
        "/" => "de división",
        "%" => "módulo",
        "=" => "de asignación",
        "==" => "de igualdad",
        "!=" => "de desigualdad",
        ">" => "mayor que",
        "<" => "menor que",
        ">=" => "mayor o igual que",
        "<=" => "menor o igual que",
        "&&" => "AND lógico",
        "||" => "OR lógico",
        "!" => "NOT lógico",
        "++" => "de incremento",
        "--" => "de decremento",
        _ => "no especificado",
    }
}

fn symbol_description(symbol: &str) -> &'static str {
    match symbol {
        ";" => "Fin de sentencia",
        "{" => "Inicio de bloque",
        "}" => "Fin de bloque",
        "(" => "Inicio de paréntesis",
        ")" => "Fin de paréntesis",
        "[" => "Inicio de arreglo",
        "]" => "Fin de arreglo",
        "," => "Separador",
        "." => "Operador de acceso",
        _ => "Símbolo no especificado",
    }
}

/// A run of input that matched no lexical class and was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedLexeme {
    pub text: String,
    pub line: usize,
}

/// Output of a full tokenization: the tokens plus everything that was dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
    pub rejected: Vec<RejectedLexeme>,
}

pub struct Lexer<'a> {
    source: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Tokenize the source, silently dropping unrecognised input.
    pub fn tokenize(&self) -> Vec<Token> {
        self.tokenize_with_rejects().tokens
    }

    /// Tokenize the source and report every dropped run alongside the tokens.
    pub fn tokenize_with_rejects(&self) -> TokenStream {
        let mut stream = TokenStream::default();

        for (index, line) in self.source.split('\n').enumerate() {
            Self::tokenize_line(line, index + 1, &mut stream);
        }

        tracing::debug!(
            tokens = stream.tokens.len(),
            rejected = stream.rejected.len(),
            "Tokenized source"
        );
        stream
    }

    fn tokenize_line(line: &str, line_number: usize, stream: &mut TokenStream) {
        let mut lex = Lexeme::lexer(line);
        // Byte range of the run of rejected input currently being collected
        let mut pending: Option<(usize, usize)> = None;

        while let Some(result) = lex.next() {
            let span = lex.span();
            let kind = result
                .ok()
                .and_then(|lexeme| line.get(span.clone()).and_then(|text| classify(lexeme, text)));

            match kind {
                Some(kind) => {
                    if let Some(range) = pending.take() {
                        stream.rejected.push(Self::rejected(line, range, line_number));
                    }
                    stream
                        .tokens
                        .push(Token::new(kind, &line[span.start..span.end], line_number));
                }
                None => {
                    pending = match pending {
                        Some((start, end)) if end == span.start => Some((start, span.end)),
                        Some(range) => {
                            stream.rejected.push(Self::rejected(line, range, line_number));
                            Some((span.start, span.end))
                        }
                        None => Some((span.start, span.end)),
                    };
                }
            }
        }

        if let Some(range) = pending {
            stream.rejected.push(Self::rejected(line, range, line_number));
        }
    }

    fn rejected(line: &str, (start, end): (usize, usize), line_number: usize) -> RejectedLexeme {
        let text = match line.get(start..end) {
            Some(text) => text.to_string(),
            None => String::from_utf8_lossy(&line.as_bytes()[start..end]).into_owned(),
        };
        tracing::trace!(line = line_number, text = %text, "Dropping unrecognised input");
        RejectedLexeme {
            text,
            line: line_number,
        }
    }
}

/// Classify a matched lexeme in the documented precedence order.
fn classify(lexeme: Lexeme, text: &str) -> Option<TokenKind> {
    if KEYWORDS.contains(&text) {
        return Some(TokenKind::Keyword);
    }
    if OPERATORS.contains(&text) {
        return Some(TokenKind::Operator);
    }

    match lexeme {
        Lexeme::Word => Some(TokenKind::Identifier),
        Lexeme::Str => Some(TokenKind::StringLiteral),
        Lexeme::Decimal => Some(TokenKind::DecimalLiteral),
        Lexeme::Integer => Some(TokenKind::IntegerLiteral),
        Lexeme::Symbol if SYMBOLS.contains(&text) => Some(TokenKind::Symbol),
        Lexeme::Char => Some(TokenKind::CharacterLiteral),
        Lexeme::Operator | Lexeme::Symbol => None,
    }
}

/// Convenience wrapper for `Lexer::new(source).tokenize()`.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}
