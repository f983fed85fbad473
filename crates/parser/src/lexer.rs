//! Tokenizer for IR1 text.

use std::fmt;

use crate::error::ParseError;

/// A single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// Identifier or keyword (`call`, `if`, `goto`, `return`, `true`, `false`).
    Ident(String),
    /// Integer literal, sign included.
    Int(i32),
    /// String literal with escapes resolved.
    Str(String),
    /// Operator symbol: `+ - * / && || ! < <= > >= == !=`.
    Op(&'static str),
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Assign,
    /// End of a non-empty line.
    Newline,
}

impl Token {
    /// True for tokens after which a `-` is a binary minus rather than the
    /// sign of a literal.
    fn ends_operand(&self) -> bool {
        match self {
            Token::Ident(s) => !matches!(s.as_str(), "if" | "return"),
            Token::Int(_) | Token::Str(_) | Token::RParen | Token::RBracket => true,
            _ => false,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) => f.write_str(s),
            Token::Int(i) => write!(f, "{i}"),
            Token::Str(s) => write!(f, "{s:?}"),
            Token::Op(op) => f.write_str(op),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::LBrace => f.write_str("{"),
            Token::RBrace => f.write_str("}"),
            Token::LBracket => f.write_str("["),
            Token::RBracket => f.write_str("]"),
            Token::Comma => f.write_str(","),
            Token::Colon => f.write_str(":"),
            Token::Assign => f.write_str("="),
            Token::Newline => f.write_str("newline"),
        }
    }
}

/// A token and the line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Spanned {
    pub(crate) token: Token,
    pub(crate) line: usize,
}

/// Tokenize a whole program. Every non-empty line ends with a
/// [`Token::Newline`].
pub(crate) fn tokenize(text: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let tokens = tokenize_line(line, line_num)?;
        if tokens.is_empty() {
            continue;
        }
        out.extend(tokens.into_iter().map(|token| Spanned {
            token,
            line: line_num,
        }));
        out.push(Spanned {
            token: Token::Newline,
            line: line_num,
        });
    }
    Ok(out)
}

/// Tokenize a single line.
///
/// Returns an empty Vec for blank lines and comment-only lines.
/// Comments start with `#` and extend to end of line.
pub(crate) fn tokenize_line(line: &str, line_num: usize) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens: Vec<Token> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '#' {
            break;
        }

        let signed_literal = c == '-'
            && next.is_some_and(|n| n.is_ascii_digit())
            && !tokens.last().is_some_and(Token::ends_operand);

        if c.is_ascii_digit() || signed_literal {
            let start = i;
            i += 1;
            while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let value = text.parse::<i32>().map_err(|_| ParseError::InvalidNumber {
                line: line_num,
                token: text.clone(),
            })?;
            tokens.push(Token::Int(value));
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
            continue;
        }

        if c == '"' {
            let (s, end) = lex_string(&chars, i + 1, line_num)?;
            tokens.push(Token::Str(s));
            i = end;
            continue;
        }

        let (token, width) = match (c, next) {
            ('&', Some('&')) => (Token::Op("&&"), 2),
            ('|', Some('|')) => (Token::Op("||"), 2),
            ('<', Some('=')) => (Token::Op("<="), 2),
            ('>', Some('=')) => (Token::Op(">="), 2),
            ('=', Some('=')) => (Token::Op("=="), 2),
            ('!', Some('=')) => (Token::Op("!="), 2),
            ('+', _) => (Token::Op("+"), 1),
            ('-', _) => (Token::Op("-"), 1),
            ('*', _) => (Token::Op("*"), 1),
            ('/', _) => (Token::Op("/"), 1),
            ('!', _) => (Token::Op("!"), 1),
            ('<', _) => (Token::Op("<"), 1),
            ('>', _) => (Token::Op(">"), 1),
            ('=', _) => (Token::Assign, 1),
            ('(', _) => (Token::LParen, 1),
            (')', _) => (Token::RParen, 1),
            ('{', _) => (Token::LBrace, 1),
            ('}', _) => (Token::RBrace, 1),
            ('[', _) => (Token::LBracket, 1),
            (']', _) => (Token::RBracket, 1),
            (',', _) => (Token::Comma, 1),
            (':', _) => (Token::Colon, 1),
            _ => {
                return Err(ParseError::UnexpectedChar {
                    line: line_num,
                    ch: c,
                })
            }
        };
        tokens.push(token);
        i += width;
    }

    Ok(tokens)
}

/// Lex a string body starting just after the opening quote. Returns the
/// content and the index just past the closing quote.
fn lex_string(chars: &[char], mut i: usize, line: usize) -> Result<(String, usize), ParseError> {
    let mut s = String::new();
    while let Some(&c) = chars.get(i) {
        match c {
            '"' => return Ok((s, i + 1)),
            '\\' => {
                let escaped = chars
                    .get(i + 1)
                    .copied()
                    .ok_or(ParseError::UnterminatedString { line })?;
                s.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    '"' => '"',
                    '\\' => '\\',
                    other => return Err(ParseError::InvalidEscape { line, ch: other }),
                });
                i += 2;
            }
            _ => {
                s.push(c);
                i += 1;
            }
        }
    }
    Err(ParseError::UnterminatedString { line })
}
