//! Recursive-descent parser: tokens -> program.

use ir1_common::{Addr, BinOp, Func, Inst, Operand, Program, RelOp, UnOp};

use crate::error::ParseError;
use crate::lexer::{Spanned, Token};

pub(crate) struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Spanned>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse every function until the end of input.
    pub(crate) fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut funcs = Vec::new();
        loop {
            self.skip_newlines();
            if self.peek().is_none() {
                break;
            }
            funcs.push(self.parse_func()?);
        }
        Ok(Program::new(funcs))
    }

    // ---- Functions ----

    fn parse_func(&mut self) -> Result<Func, ParseError> {
        let name = self.expect_ident("function name")?;
        let params = self.parse_name_list()?;
        self.skip_newlines();

        let locals = if self.peek() == Some(&Token::LParen) {
            let locals = self.parse_name_list()?;
            self.skip_newlines();
            locals
        } else {
            Vec::new()
        };

        self.expect(&Token::LBrace, "'{'")?;
        let mut code = Vec::new();
        loop {
            self.skip_newlines();
            match self.peek() {
                Some(Token::RBrace) => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    code.push(self.parse_inst()?);
                    self.expect_line_end()?;
                }
                None => return Err(self.unexpected("'}'")),
            }
        }
        self.expect_line_end()?;

        Ok(Func::new(name, params, code).with_locals(locals))
    }

    /// `( name, name, ... )`
    fn parse_name_list(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect(&Token::LParen, "'('")?;
        let mut names = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(names);
        }
        loop {
            names.push(self.expect_ident("name")?);
            if self.eat(&Token::RParen) {
                return Ok(names);
            }
            self.expect(&Token::Comma, "',' or ')'")?;
        }
    }

    // ---- Instructions ----

    fn parse_inst(&mut self) -> Result<Inst, ParseError> {
        match self.peek() {
            Some(Token::Ident(word)) => match word.as_str() {
                "goto" => {
                    self.bump();
                    let label = self.expect_ident("label")?;
                    Ok(Inst::Jump { label })
                }
                "if" => {
                    self.bump();
                    self.parse_cjump()
                }
                "return" => {
                    self.bump();
                    let val = if self.at_line_end() {
                        None
                    } else {
                        Some(self.parse_operand()?)
                    };
                    Ok(Inst::Return { val })
                }
                "call" => self.parse_call(None),
                _ if self.peek_nth(1) == Some(&Token::Colon) => {
                    let name = self.expect_ident("label")?;
                    self.bump();
                    Ok(Inst::Label { name })
                }
                _ => {
                    let dst = self.expect_ident("destination")?;
                    self.expect(&Token::Assign, "'='")?;
                    self.parse_assignment(dst)
                }
            },
            Some(Token::Int(_) | Token::LBracket) => {
                let addr = self.parse_addr()?;
                self.expect(&Token::Assign, "'='")?;
                let src = self.parse_operand()?;
                Ok(Inst::Store { addr, src })
            }
            _ => Err(self.unexpected("instruction")),
        }
    }

    /// Everything right of `dst =`.
    fn parse_assignment(&mut self, dst: String) -> Result<Inst, ParseError> {
        match self.peek() {
            Some(Token::Ident(word)) if word == "call" => self.parse_call(Some(dst)),
            Some(Token::LBracket) => {
                let addr = self.parse_addr()?;
                Ok(Inst::Load { dst, addr })
            }
            Some(Token::Int(_)) if self.peek_nth(1) == Some(&Token::LBracket) => {
                let addr = self.parse_addr()?;
                Ok(Inst::Load { dst, addr })
            }
            Some(Token::Op(sym @ ("-" | "!"))) => {
                let op = sym
                    .parse::<UnOp>()
                    .map_err(|_| self.unexpected("unary operator"))?;
                self.bump();
                let src = self.parse_operand()?;
                Ok(Inst::Unop { op, dst, src })
            }
            _ => {
                let lhs = self.parse_operand()?;
                let Some(Token::Op(sym)) = self.peek() else {
                    return Ok(Inst::Move { dst, src: lhs });
                };
                let op = sym
                    .parse::<BinOp>()
                    .map_err(|_| self.unexpected("binary operator"))?;
                self.bump();
                let rhs = self.parse_operand()?;
                Ok(Inst::Binop { op, dst, lhs, rhs })
            }
        }
    }

    /// `if` already consumed: `lhs ROP rhs goto label`.
    fn parse_cjump(&mut self) -> Result<Inst, ParseError> {
        let lhs = self.parse_operand()?;
        let op = match self.peek() {
            Some(Token::Op(sym)) => sym
                .parse::<RelOp>()
                .map_err(|_| self.unexpected("relational operator"))?,
            _ => return Err(self.unexpected("relational operator")),
        };
        self.bump();
        let rhs = self.parse_operand()?;
        self.expect_keyword("goto")?;
        let label = self.expect_ident("label")?;
        Ok(Inst::CJump {
            op,
            lhs,
            rhs,
            label,
        })
    }

    /// `call name(args)`
    fn parse_call(&mut self, dst: Option<String>) -> Result<Inst, ParseError> {
        self.expect_keyword("call")?;
        let callee = self.expect_ident("function name")?;
        self.expect(&Token::LParen, "'('")?;
        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.parse_operand()?);
                if self.eat(&Token::RParen) {
                    break;
                }
                self.expect(&Token::Comma, "',' or ')'")?;
            }
        }
        Ok(Inst::Call { callee, args, dst })
    }

    /// `[offset][base]`
    fn parse_addr(&mut self) -> Result<Addr, ParseError> {
        let offset = match self.peek() {
            Some(Token::Int(i)) => {
                let i = *i;
                self.bump();
                i
            }
            _ => 0,
        };
        self.expect(&Token::LBracket, "'['")?;
        let base = self.parse_operand()?;
        self.expect(&Token::RBracket, "']'")?;
        Ok(Addr::new(base, offset))
    }

    fn parse_operand(&mut self) -> Result<Operand, ParseError> {
        let operand = match self.peek() {
            Some(Token::Ident(word)) => match word.as_str() {
                "true" => Operand::Bool(true),
                "false" => Operand::Bool(false),
                "call" | "if" | "goto" | "return" => return Err(self.unexpected("operand")),
                name => Operand::Name(name.to_string()),
            },
            Some(Token::Int(i)) => Operand::Int(*i),
            Some(Token::Str(s)) => Operand::Str(s.clone()),
            _ => return Err(self.unexpected("operand")),
        };
        self.bump();
        Ok(operand)
    }

    // ---- Token helpers ----

    fn peek(&self) -> Option<&Token> {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|s| &s.token)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    /// Line of the current token, or of the last token at end of input.
    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or(self.tokens.last())
            .map_or(1, |s| s.line)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, expected: &'static str) -> Result<(), ParseError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_ident(&mut self, expected: &'static str) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Ident(s)) => {
                let s = s.clone();
                self.bump();
                Ok(s)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn expect_keyword(&mut self, keyword: &'static str) -> Result<(), ParseError> {
        match self.peek() {
            Some(Token::Ident(s)) if s == keyword => {
                self.bump();
                Ok(())
            }
            _ => Err(self.unexpected(keyword)),
        }
    }

    fn at_line_end(&self) -> bool {
        matches!(self.peek(), None | Some(Token::Newline | Token::RBrace))
    }

    /// An instruction or closing brace must be the last thing on its line.
    fn expect_line_end(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            None | Some(Token::RBrace) => Ok(()),
            Some(Token::Newline) => {
                self.bump();
                Ok(())
            }
            Some(_) => Err(self.unexpected("end of line")),
        }
    }

    fn skip_newlines(&mut self) {
        while self.eat(&Token::Newline) {}
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::UnexpectedToken {
                line: self.line(),
                expected,
                token: token.to_string(),
            },
            None => ParseError::UnexpectedEnd {
                line: self.line(),
                expected,
            },
        }
    }
}
