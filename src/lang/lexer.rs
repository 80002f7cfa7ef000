// SPDX-License-Identifier: AGPL-3.0-or-later
// BurrowGen - Query Codegen for the Burrow Document Database
// Copyright (C) 2026 Burrow Labs (https://github.com/burrowdb)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Tokenizer for the Burrow predicate language

use std::iter::Peekable;
use std::str::Chars;

use super::parser::ParseError;

/// Token kinds. Keywords are split out so the parser can match on them
/// without string comparisons.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    /// Backtick-quoted serialization tag.
    Tag(String),

    KwFn,
    KwType,
    KwConst,
    KwUse,
    KwReturn,
    KwIf,
    KwElse,
    KwTrue,
    KwFalse,

    OrOr,
    AndAnd,
    EqEq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
    Plus,
    Minus,
    Star,
    Slash,
    Not,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PlusPlus,
    MinusMinus,

    Dot,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    Eof,
}

/// Hand-written tokenizer with line/column tracking. Whitespace (including
/// newlines) separates tokens and carries no structure; `//` comments run to
/// end of line.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next();
        match c {
            Some('\n') => {
                self.line += 1;
                self.column = 1;
            }
            Some(_) => self.column += 1,
            None => {}
        }
        c
    }

    fn err(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            line: self.line,
            column: self.column,
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.chars.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some(';') => {
                    self.bump();
                }
                Some('/') => {
                    // Only a comment if followed by another slash.
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    if ahead.peek() == Some(&'/') {
                        while let Some(&c) = self.chars.peek() {
                            if c == '\n' {
                                break;
                            }
                            self.bump();
                        }
                    } else {
                        return;
                    }
                }
                _ => return,
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_trivia();

        let c = match self.chars.peek() {
            None => return Ok(Token::Eof),
            Some(&c) => c,
        };

        if c.is_ascii_digit() {
            return self.number();
        }
        if c == '"' {
            return self.string();
        }
        if c == '`' {
            return self.tag();
        }
        if c.is_alphabetic() || c == '_' {
            return Ok(self.ident());
        }

        self.bump();
        let tok = match c {
            '.' => Token::Dot,
            ',' => Token::Comma,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '|' => match self.chars.peek() {
                Some('|') => {
                    self.bump();
                    Token::OrOr
                }
                _ => return Err(self.err("expected '||'")),
            },
            '&' => match self.chars.peek() {
                Some('&') => {
                    self.bump();
                    Token::AndAnd
                }
                _ => return Err(self.err("expected '&&'")),
            },
            '=' => match self.chars.peek() {
                Some('=') => {
                    self.bump();
                    Token::EqEq
                }
                _ => Token::Assign,
            },
            '!' => match self.chars.peek() {
                Some('=') => {
                    self.bump();
                    Token::NotEq
                }
                _ => Token::Not,
            },
            '<' => match self.chars.peek() {
                Some('=') => {
                    self.bump();
                    Token::Lte
                }
                _ => Token::Lt,
            },
            '>' => match self.chars.peek() {
                Some('=') => {
                    self.bump();
                    Token::Gte
                }
                _ => Token::Gt,
            },
            '+' => match self.chars.peek() {
                Some('=') => {
                    self.bump();
                    Token::PlusAssign
                }
                Some('+') => {
                    self.bump();
                    Token::PlusPlus
                }
                _ => Token::Plus,
            },
            '-' => match self.chars.peek() {
                Some('=') => {
                    self.bump();
                    Token::MinusAssign
                }
                Some('-') => {
                    self.bump();
                    Token::MinusMinus
                }
                _ => Token::Minus,
            },
            '*' => match self.chars.peek() {
                Some('=') => {
                    self.bump();
                    Token::StarAssign
                }
                _ => Token::Star,
            },
            '/' => match self.chars.peek() {
                Some('=') => {
                    self.bump();
                    Token::SlashAssign
                }
                _ => Token::Slash,
            },
            other => return Err(self.err(format!("unexpected character '{other}'"))),
        };

        Ok(tok)
    }

    fn number(&mut self) -> Result<Token, ParseError> {
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }

        // A fractional part only when a digit follows the dot, so selector
        // chains on integer map keys keep lexing as Dot.
        let mut is_float = false;
        if self.chars.peek() == Some(&'.') {
            let mut ahead = self.chars.clone();
            ahead.next();
            if ahead.peek().is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                text.push('.');
                self.bump();
                while let Some(&c) = self.chars.peek() {
                    if c.is_ascii_digit() {
                        text.push(c);
                        self.bump();
                    } else {
                        break;
                    }
                }
            }
        }

        if is_float {
            text.parse::<f64>()
                .map(Token::Float)
                .map_err(|_| self.err(format!("invalid float literal: {text}")))
        } else {
            text.parse::<i64>()
                .map(Token::Int)
                .map_err(|_| self.err(format!("integer literal out of range: {text}")))
        }
    }

    fn string(&mut self) -> Result<Token, ParseError> {
        self.bump(); // opening quote
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.err("unterminated string literal")),
                Some('"') => return Ok(Token::Str(out)),
                Some('\\') => match self.bump() {
                    Some('"') => out.push('"'),
                    Some('\\') => out.push('\\'),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(other) => {
                        return Err(self.err(format!("unknown escape '\\{other}'")))
                    }
                    None => return Err(self.err("unterminated string literal")),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn tag(&mut self) -> Result<Token, ParseError> {
        self.bump(); // opening backtick
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.err("unterminated tag literal")),
                Some('`') => return Ok(Token::Tag(out)),
                Some(c) => out.push(c),
            }
        }
    }

    fn ident(&mut self) -> Token {
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }

        match name.as_str() {
            "fn" => Token::KwFn,
            "type" => Token::KwType,
            "const" => Token::KwConst,
            "use" => Token::KwUse,
            "return" => Token::KwReturn,
            "if" => Token::KwIf,
            "else" => Token::KwElse,
            "true" => Token::KwTrue,
            "false" => Token::KwFalse,
            _ => Token::Ident(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all(input: &str) -> Vec<Token> {
        let mut lx = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let t = lx.next_token().unwrap();
            if t == Token::Eof {
                return out;
            }
            out.push(t);
        }
    }

    #[test]
    fn lexes_selectors_and_operators() {
        assert_eq!(
            all("d.FieldInt >= args.ArgInt && !d.FieldBool"),
            vec![
                Token::Ident("d".into()),
                Token::Dot,
                Token::Ident("FieldInt".into()),
                Token::Gte,
                Token::Ident("args".into()),
                Token::Dot,
                Token::Ident("ArgInt".into()),
                Token::AndAnd,
                Token::Not,
                Token::Ident("d".into()),
                Token::Dot,
                Token::Ident("FieldBool".into()),
            ]
        );
    }

    #[test]
    fn lexes_numbers() {
        assert_eq!(
            all("10 10.5 0"),
            vec![Token::Int(10), Token::Float(10.5), Token::Int(0)]
        );
        // An integer index followed by a selector stays an integer.
        assert_eq!(
            all("m[25].x"),
            vec![
                Token::Ident("m".into()),
                Token::LBracket,
                Token::Int(25),
                Token::RBracket,
                Token::Dot,
                Token::Ident("x".into()),
            ]
        );
    }

    #[test]
    fn lexes_strings_and_tags() {
        assert_eq!(
            all(r#""a\"b" `field_int`"#),
            vec![Token::Str("a\"b".into()), Token::Tag("field_int".into())]
        );
    }

    #[test]
    fn lexes_assign_forms() {
        assert_eq!(
            all("= += -= *= /= ++ --"),
            vec![
                Token::Assign,
                Token::PlusAssign,
                Token::MinusAssign,
                Token::StarAssign,
                Token::SlashAssign,
                Token::PlusPlus,
                Token::MinusMinus,
            ]
        );
    }

    #[test]
    fn skips_comments_and_semicolons() {
        assert_eq!(
            all("a // trailing\nb; c"),
            vec![
                Token::Ident("a".into()),
                Token::Ident("b".into()),
                Token::Ident("c".into()),
            ]
        );
    }

    #[test]
    fn rejects_oversized_integer() {
        let mut lx = Lexer::new("99999999999999999999");
        assert!(lx.next_token().is_err());
    }
}
