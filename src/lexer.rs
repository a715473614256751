use crate::token::{lookup_identifier, Token, TokenKind};

#[derive(Debug)]
pub struct Lexer {
    input: String,
    position: usize,
    read_position: usize,
    ch: u8,
}

trait IsLetter {
    fn is_letter(&self) -> bool;
}

impl IsLetter for u8 {
    fn is_letter(&self) -> bool {
        self.is_ascii_alphabetic() || *self == b'_'
    }
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let mut lexer = Self {
            input: input.into(),
            position: 0,
            read_position: 0,
            ch: 0,
        };
        lexer.read_char();
        lexer
    }

    fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn read_char(&mut self) {
        self.ch = self.peek_char();
        self.position = self.read_position;
        self.read_position += 1;
    }

    fn peek_char(&self) -> u8 {
        self.input
            .as_bytes()
            .get(self.read_position)
            .copied()
            .unwrap_or(0)
    }

    fn read_identifier(&mut self) -> String {
        let start = self.position;
        while !self.at_end() && self.ch.is_letter() {
            self.read_char();
        }

        self.input[start..self.position].to_string()
    }

    fn read_number(&mut self) -> String {
        let start = self.position;
        while !self.at_end() && self.ch.is_ascii_digit() {
            self.read_char();
        }

        self.input[start..self.position].to_string()
    }

    // Leaves `position` on the closing quote, or at end of input when the
    // literal is unterminated.
    fn read_string(&mut self) -> String {
        let start = self.position + 1;
        loop {
            self.read_char();
            if self.at_end() || self.ch == b'"' {
                break;
            }
        }

        self.input[start..self.position].into()
    }

    fn read_illegal(&mut self) -> String {
        let c = self.input[self.position..].chars().next().unwrap_or('\0');
        // Step over the remaining bytes of a multi-byte character so the
        // next read starts on a char boundary.
        for _ in 1..c.len_utf8() {
            self.read_char();
        }
        c.to_string()
    }

    fn skip_whitespace(&mut self) {
        while !self.at_end() && matches!(self.ch, b' ' | b'\t' | b'\n' | b'\r') {
            self.read_char();
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        if self.at_end() {
            return Token::eof();
        }

        let token = match self.ch {
            b'=' => {
                if self.peek_char() == b'=' {
                    self.read_char();
                    Token::new(TokenKind::Eq, "==")
                } else {
                    Token::new(TokenKind::Assign, "=")
                }
            }
            b'!' => {
                if self.peek_char() == b'=' {
                    self.read_char();
                    Token::new(TokenKind::NotEq, "!=")
                } else {
                    Token::new(TokenKind::Bang, "!")
                }
            }
            b'+' => Token::new(TokenKind::Plus, "+"),
            b'-' => Token::new(TokenKind::Minus, "-"),
            b'*' => Token::new(TokenKind::Asterisk, "*"),
            b'/' => Token::new(TokenKind::Slash, "/"),
            b'<' => Token::new(TokenKind::Lt, "<"),
            b'>' => Token::new(TokenKind::Gt, ">"),
            b'(' => Token::new(TokenKind::LParen, "("),
            b')' => Token::new(TokenKind::RParen, ")"),
            b'{' => Token::new(TokenKind::LBrace, "{"),
            b'}' => Token::new(TokenKind::RBrace, "}"),
            b'[' => Token::new(TokenKind::LBracket, "["),
            b']' => Token::new(TokenKind::RBracket, "]"),
            b',' => Token::new(TokenKind::Comma, ","),
            b';' => Token::new(TokenKind::Semicolon, ";"),
            b'"' => Token::new(TokenKind::String, self.read_string()),
            c if c.is_letter() => {
                let literal = self.read_identifier();
                return Token::new(lookup_identifier(&literal), literal);
            }
            c if c.is_ascii_digit() => {
                return Token::new(TokenKind::Int, self.read_number());
            }
            _ => Token::new(TokenKind::Illegal, self.read_illegal()),
        };

        self.read_char();

        token
    }
}

/// Yields every token up to, but not including, the first `EOF`.
impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        if token.is(TokenKind::Eof) {
            None
        } else {
            Some(token)
        }
    }
}
