/// Tokens of a `-EVAL` expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    True,
    False,
    And,
    Or,
    Not,
    LParen,
    RParen,
    Plus,
    Minus,
    Star,
    Slash,
    SlashSlash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eof,
}

impl Token {
    pub fn description(&self) -> String {
        match self {
            Token::Int(n) => format!("integer {}", n),
            Token::Float(f) => format!("float {}", f),
            Token::Str(s) => format!("string {:?}", s),
            Token::Eof => "end of expression".to_string(),
            other => format!("'{}'", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Token::True => "True",
            Token::False => "False",
            Token::And => "and",
            Token::Or => "or",
            Token::Not => "not",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::SlashSlash => "//",
            Token::Percent => "%",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::Lt => "<",
            Token::LtEq => "<=",
            Token::Gt => ">",
            Token::GtEq => ">=",
            Token::Int(_) | Token::Float(_) | Token::Str(_) | Token::Eof => "",
        }
    }
}

pub struct Lexer<'src> {
    source: &'src [u8],
    text: &'src str,
    pos: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(text: &'src str) -> Self {
        Self {
            source: text.as_bytes(),
            text,
            pos: 0,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, String> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let is_eof = tok == Token::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn next_token(&mut self) -> Result<Token, String> {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }

        let Some(ch) = self.peek() else {
            return Ok(Token::Eof);
        };

        if ch.is_ascii_alphabetic() || ch == b'_' {
            return self.scan_word();
        }
        if ch.is_ascii_digit() || (ch == b'.' && self.source.get(self.pos + 1).is_some_and(u8::is_ascii_digit)) {
            return self.scan_number();
        }
        if ch == b'"' || ch == b'\'' {
            return self.scan_string(ch);
        }
        self.scan_symbol()
    }

    fn scan_word(&mut self) -> Result<Token, String> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_') {
            self.pos += 1;
        }
        match &self.text[start..self.pos] {
            "True" => Ok(Token::True),
            "False" => Ok(Token::False),
            "and" => Ok(Token::And),
            "or" => Ok(Token::Or),
            "not" => Ok(Token::Not),
            word => Err(format!("unknown name '{}'", word)),
        }
    }

    fn scan_number(&mut self) -> Result<Token, String> {
        let start = self.pos;
        if self.text[start..].starts_with("0x") || self.text[start..].starts_with("0X") {
            self.pos += 2;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.pos += 1;
            }
            let digits = &self.text[start + 2..self.pos];
            return i64::from_str_radix(digits, 16)
                .map(Token::Int)
                .map_err(|_| format!("invalid hex literal '{}'", &self.text[start..self.pos]));
        }

        let mut is_float = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.pos += 1;
            } else if c == b'.' && !is_float {
                is_float = true;
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.peek().is_some_and(|c| c == b'e' || c == b'E') {
            let save = self.pos;
            self.pos += 1;
            if self.peek().is_some_and(|c| c == b'+' || c == b'-') {
                self.pos += 1;
            }
            if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
            } else {
                self.pos = save;
            }
        }

        let text = &self.text[start..self.pos];
        if is_float {
            text.parse::<f64>()
                .map(Token::Float)
                .map_err(|_| format!("invalid float literal '{}'", text))
        } else {
            text.parse::<i64>()
                .map(Token::Int)
                .map_err(|_| format!("integer literal '{}' is too large", text))
        }
    }

    fn scan_string(&mut self, quote: u8) -> Result<Token, String> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(format!("unterminated string starting at offset {}", start)),
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(Token::Str(value));
                }
                Some(b'\\') => {
                    let escaped = self.source.get(self.pos + 1).copied();
                    match escaped {
                        Some(b'n') => value.push('\n'),
                        Some(b't') => value.push('\t'),
                        Some(b'\\') => value.push('\\'),
                        Some(b'\'') => value.push('\''),
                        Some(b'"') => value.push('"'),
                        _ => return Err("invalid escape sequence in string".to_string()),
                    }
                    self.pos += 2;
                }
                Some(_) => {
                    // Copy one whole UTF-8 character.
                    let rest = &self.text[self.pos..];
                    let ch = rest.chars().next().unwrap_or_default();
                    value.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }
    }

    fn scan_symbol(&mut self) -> Result<Token, String> {
        let ch = self.source[self.pos];
        let next = self.source.get(self.pos + 1).copied();
        let (token, len) = match (ch, next) {
            (b'(', _) => (Token::LParen, 1),
            (b')', _) => (Token::RParen, 1),
            (b'+', _) => (Token::Plus, 1),
            (b'-', _) => (Token::Minus, 1),
            (b'*', _) => (Token::Star, 1),
            (b'/', Some(b'/')) => (Token::SlashSlash, 2),
            (b'/', _) => (Token::Slash, 1),
            (b'%', _) => (Token::Percent, 1),
            (b'=', Some(b'=')) => (Token::EqEq, 2),
            (b'!', Some(b'=')) => (Token::NotEq, 2),
            (b'!', _) => (Token::Not, 1),
            (b'<', Some(b'=')) => (Token::LtEq, 2),
            (b'<', _) => (Token::Lt, 1),
            (b'>', Some(b'=')) => (Token::GtEq, 2),
            (b'>', _) => (Token::Gt, 1),
            (b'&', Some(b'&')) => (Token::And, 2),
            (b'|', Some(b'|')) => (Token::Or, 2),
            _ => {
                let rest = &self.text[self.pos..];
                let shown = rest.chars().next().unwrap_or_default();
                return Err(format!("unexpected character '{}'", shown));
            }
        };
        self.pos += len;
        Ok(token)
    }
}
