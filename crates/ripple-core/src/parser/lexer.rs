// Lexer for the Ripple language
// Line-oriented: newlines are significant statement separators, runs of
// blank lines collapse into one Newline token. Comments run from `#` to
// end of line.

use crate::ast::Span;

use super::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),

    // Keywords
    Fn,
    EndFn,
    If,
    Else,
    EndIf,
    While,
    EndWhile,
    Return,
    True,
    False,
    Null,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    Assign,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Bang,
    At,
    Dot,
    Comma,

    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,

    Newline,
    Eof,
}

impl TokenKind {
    fn keyword(ident: &str) -> Option<TokenKind> {
        Some(match ident {
            "fn" => TokenKind::Fn,
            "endfn" => TokenKind::EndFn,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "endif" => TokenKind::EndIf,
            "while" => TokenKind::While,
            "endwhile" => TokenKind::EndWhile,
            "return" => TokenKind::Return,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    col: u32,
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer {
        chars: source.chars().collect(),
        pos: 0,
        line: 1,
        col: 1,
    };
    lexer.run()
}

impl Lexer {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn span(&self) -> Span {
        Span::new(self.line, self.col)
    }

    fn run(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek() {
            let span = self.span();
            match c {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '#' => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                '\n' => {
                    self.bump();
                    if !matches!(
                        tokens.last(),
                        None | Some(Token {
                            kind: TokenKind::Newline,
                            ..
                        })
                    ) {
                        tokens.push(Token {
                            kind: TokenKind::Newline,
                            span,
                        });
                    }
                }
                '"' => {
                    let text = self.string(span)?;
                    tokens.push(Token {
                        kind: TokenKind::Str(text),
                        span,
                    });
                }
                c if c.is_ascii_digit() => {
                    let kind = self.number(span)?;
                    tokens.push(Token { kind, span });
                }
                c if c.is_alphabetic() || c == '_' => {
                    let mut ident = String::new();
                    while let Some(c) = self.peek() {
                        if c.is_alphanumeric() || c == '_' {
                            ident.push(c);
                            self.bump();
                        } else {
                            break;
                        }
                    }
                    let kind =
                        TokenKind::keyword(&ident).unwrap_or(TokenKind::Ident(ident));
                    tokens.push(Token { kind, span });
                }
                _ => {
                    let kind = self.operator(span)?;
                    tokens.push(Token { kind, span });
                }
            }
        }
        tokens.push(Token {
            kind: TokenKind::Eof,
            span: self.span(),
        });
        Ok(tokens)
    }

    fn string(&mut self, span: Span) -> Result<String, ParseError> {
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(text),
                Some('\\') => match self.bump() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('r') => text.push('\r'),
                    Some('\\') => text.push('\\'),
                    Some('"') => text.push('"'),
                    Some(c) => text.push(c),
                    None => {
                        return Err(ParseError::at(span, "unterminated string literal"))
                    }
                },
                Some('\n') | None => {
                    return Err(ParseError::at(span, "unterminated string literal"))
                }
                Some(c) => text.push(c),
            }
        }
    }

    fn number(&mut self, span: Span) -> Result<TokenKind, ParseError> {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        let is_float = self.peek() == Some('.')
            && self.peek_next().is_some_and(|c| c.is_ascii_digit());
        if is_float {
            text.push('.');
            self.bump();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.bump();
                } else {
                    break;
                }
            }
            let value: f64 = text
                .parse()
                .map_err(|_| ParseError::at(span, format!("invalid number `{text}`")))?;
            Ok(TokenKind::Float(value))
        } else {
            let value: i64 = text
                .parse()
                .map_err(|_| ParseError::at(span, format!("invalid number `{text}`")))?;
            Ok(TokenKind::Int(value))
        }
    }

    fn operator(&mut self, span: Span) -> Result<TokenKind, ParseError> {
        let c = self.bump().unwrap_or_default();
        let followed_by_eq = self.peek() == Some('=');
        let kind = match c {
            '+' if followed_by_eq => {
                self.bump();
                TokenKind::PlusEq
            }
            '+' => TokenKind::Plus,
            '-' if followed_by_eq => {
                self.bump();
                TokenKind::MinusEq
            }
            '-' => TokenKind::Minus,
            '*' if followed_by_eq => {
                self.bump();
                TokenKind::StarEq
            }
            '*' => TokenKind::Star,
            '/' if followed_by_eq => {
                self.bump();
                TokenKind::SlashEq
            }
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' if followed_by_eq => {
                self.bump();
                TokenKind::EqEq
            }
            '=' => TokenKind::Assign,
            '!' if followed_by_eq => {
                self.bump();
                TokenKind::NotEq
            }
            '!' => TokenKind::Bang,
            '<' if followed_by_eq => {
                self.bump();
                TokenKind::Le
            }
            '<' => TokenKind::Lt,
            '>' if followed_by_eq => {
                self.bump();
                TokenKind::Ge
            }
            '>' => TokenKind::Gt,
            '@' => TokenKind::At,
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            other => {
                return Err(ParseError::at(
                    span,
                    format!("unexpected character `{other}`"),
                ))
            }
        };
        Ok(kind)
    }
}
