//! SQL Tokens - the atomic units of SQL output.
//!
//! Statements are assembled as token streams and serialized in one pass.
//! Identifiers are always double-quoted and values only ever appear as `?`
//! placeholders, so nothing user-supplied is spliced into the text.

/// Quote an identifier with double quotes, doubling embedded quotes.
pub fn quote_identifier(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// SQL Token - every element a generated statement can contain.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Keywords ===
    Select,
    From,
    Where,
    And,
    As,
    Cast,
    Like,
    Limit,

    // === Punctuation ===
    Dot,
    Star,
    LParen,
    RParen,

    // === Operators ===
    Eq,
    Lt,
    Gt,

    // === Whitespace ===
    Space,

    // === Dynamic Content ===
    /// Quoted identifier (catalog, schema, table, column)
    Ident(String),
    /// Dotted path of quoted identifiers: `"hive"."sales"."orders"`
    QualifiedIdent(Vec<String>),
    /// Unquoted alias such as `t1`
    Alias(String),
    /// Type name in a cast target
    TypeName(&'static str),
    /// Integer literal
    LitInt(i64),
    /// Positional bind placeholder
    Param,
}

impl Token {
    /// Serialize this token to a string.
    pub fn serialize(&self) -> String {
        match self {
            Token::Select => "SELECT".into(),
            Token::From => "FROM".into(),
            Token::Where => "WHERE".into(),
            Token::And => "AND".into(),
            Token::As => "AS".into(),
            Token::Cast => "CAST".into(),
            Token::Like => "LIKE".into(),
            Token::Limit => "LIMIT".into(),

            Token::Dot => ".".into(),
            Token::Star => "*".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),

            Token::Eq => "=".into(),
            Token::Lt => "<".into(),
            Token::Gt => ">".into(),

            Token::Space => " ".into(),

            Token::Ident(name) => quote_identifier(name),
            Token::QualifiedIdent(parts) => parts
                .iter()
                .map(|p| quote_identifier(p))
                .collect::<Vec<_>>()
                .join("."),
            Token::Alias(name) => name.clone(),
            Token::TypeName(name) => (*name).into(),
            Token::LitInt(n) => n.to_string(),
            Token::Param => "?".into(),
        }
    }
}

/// A stream of tokens that can be serialized to SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Number of `?` placeholders in the stream.
    pub fn param_count(&self) -> usize {
        self.tokens.iter().filter(|t| matches!(t, Token::Param)).count()
    }

    /// Serialize all tokens to a SQL string.
    pub fn serialize(&self) -> String {
        self.tokens.iter().map(Token::serialize).collect()
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
    pub fn param(&mut self) -> &mut Self {
        self.push(Token::Param)
    }
}
