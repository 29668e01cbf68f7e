//! Tokenizer for the ISO 10303-21 exchange structure.
//!
//! The lexer walks raw bytes and yields [`Lexeme`]s. Comments (`/* .. */`)
//! and whitespace are dropped; everything else maps onto one [`Token`].
//! Reals written the Part 21 way (`10.`, `1.E-3`) are accepted even though
//! Rust's float parser would reject them.

use crate::error::StepError;

/// One token of a Part 21 file.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Type name or section keyword, upper-cased (`CARTESIAN_POINT`, `ENDSEC`).
    Name(String),
    /// Instance reference, `#42`.
    Ref(u64),
    /// Quoted string with `''` escapes resolved.
    Str(String),
    /// Number with a decimal point or exponent.
    Real(f64),
    /// Number without one.
    Int(i64),
    /// Enumeration literal without the dots, `.T.` gives `T`.
    Enumeration(String),
    /// `(`
    Open,
    /// `)`
    Close,
    /// `,`
    Comma,
    /// `;`
    Semi,
    /// `=`
    Eq,
    /// `*`, a value derived by the schema.
    Star,
    /// `$`, an unset optional value.
    Dollar,
}

/// A token and the line it started on.
#[derive(Debug, Clone)]
pub struct Lexeme {
    /// The token.
    pub token: Token,
    /// 1-based line.
    pub line: usize,
}

/// Byte-level scanner producing [`Lexeme`]s.
pub struct Lexer<'a> {
    src: &'a [u8],
    at: usize,
    line: usize,
    line_start: usize,
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'!')
}

impl<'a> Lexer<'a> {
    /// Scanner positioned at the first byte of `src`.
    pub fn new(src: &'a [u8]) -> Self {
        Self {
            src,
            at: 0,
            line: 1,
            line_start: 0,
        }
    }

    /// Every remaining token, stopping at the first error.
    pub fn tokenize(&mut self) -> Result<Vec<Lexeme>, StepError> {
        self.collect()
    }

    fn col(&self) -> usize {
        self.at - self.line_start + 1
    }

    fn current(&self) -> Option<u8> {
        self.src.get(self.at).copied()
    }

    fn lookahead(&self, n: usize) -> Option<u8> {
        self.src.get(self.at + n).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.current()?;
        self.at += 1;
        if b == b'\n' {
            self.line += 1;
            self.line_start = self.at;
        }
        Some(b)
    }

    fn eat_while(&mut self, keep: impl Fn(u8) -> bool) -> &'a [u8] {
        let src = self.src;
        let from = self.at;
        while self.current().is_some_and(&keep) {
            self.bump();
        }
        &src[from..self.at]
    }

    /// Drop whitespace and comments. An unterminated comment runs to the end.
    fn skip_trivia(&mut self) {
        loop {
            self.eat_while(|b| b.is_ascii_whitespace());
            if !self.src[self.at..].starts_with(b"/*") {
                return;
            }
            self.at += 2;
            match self.src[self.at..].windows(2).position(|w| w == b"*/") {
                Some(len) => {
                    for _ in 0..len + 2 {
                        self.bump();
                    }
                }
                None => {
                    while self.bump().is_some() {}
                }
            }
        }
    }

    fn scan(&mut self) -> Result<Option<Lexeme>, StepError> {
        self.skip_trivia();
        let Some(b) = self.current() else {
            return Ok(None);
        };
        let (line, col) = (self.line, self.col());
        let fail = |message: String| StepError::syntax(line, col, message);

        let punct = match b {
            b'(' => Some(Token::Open),
            b')' => Some(Token::Close),
            b',' => Some(Token::Comma),
            b';' => Some(Token::Semi),
            b'=' => Some(Token::Eq),
            b'*' => Some(Token::Star),
            b'$' => Some(Token::Dollar),
            _ => None,
        };
        let token = if let Some(token) = punct {
            self.bump();
            token
        } else {
            match b {
                b'#' => {
                    self.bump();
                    let digits = self.eat_while(|b| b.is_ascii_digit());
                    let text = std::str::from_utf8(digits).unwrap_or_default();
                    if text.is_empty() {
                        return Err(fail("expected digits after '#'".into()));
                    }
                    Token::Ref(text.parse().map_err(|_| fail(format!("invalid entity ID: {text}")))?)
                }
                b'\'' => Token::Str(self.string_body().ok_or_else(|| fail("unterminated string".into()))?),
                b'.' => {
                    self.bump();
                    let name = self.eat_while(|b| b.is_ascii_alphanumeric() || b == b'_');
                    if name.is_empty() {
                        return Err(fail("empty enumeration".into()));
                    }
                    let name = String::from_utf8_lossy(name).into_owned();
                    match self.bump() {
                        Some(b'.') => Token::Enumeration(name),
                        Some(other) => {
                            return Err(fail(format!("invalid character in enumeration: '{}'", other as char)))
                        }
                        None => return Err(fail("unterminated enumeration".into())),
                    }
                }
                b'0'..=b'9' => self.number().map_err(fail)?,
                b'-' | b'+' if self.lookahead(1).is_some_and(|d| d.is_ascii_digit()) => {
                    self.number().map_err(fail)?
                }
                b'A'..=b'Z' | b'a'..=b'z' | b'_' | b'!' => {
                    let name = self.eat_while(is_name_byte);
                    Token::Name(String::from_utf8_lossy(name).to_ascii_uppercase())
                }
                other => return Err(fail(format!("unexpected character: '{}'", other as char))),
            }
        };
        Ok(Some(Lexeme { token, line }))
    }

    /// Contents of a quoted string, or `None` if it never closes.
    fn string_body(&mut self) -> Option<String> {
        self.bump();
        let mut out = Vec::new();
        loop {
            match self.bump()? {
                b'\'' if self.current() == Some(b'\'') => {
                    self.bump();
                    out.push(b'\'');
                }
                b'\'' => return Some(String::from_utf8_lossy(&out).into_owned()),
                b => out.push(b),
            }
        }
    }

    /// Integer or real. A bare trailing `.` is completed with `0` so `10.`
    /// and `1.E3` parse.
    fn number(&mut self) -> Result<Token, String> {
        let mut text = String::new();
        if let Some(sign @ (b'-' | b'+')) = self.current() {
            self.bump();
            text.push(sign as char);
        }
        text.push_str(&String::from_utf8_lossy(self.eat_while(|b| b.is_ascii_digit())));

        let mut real = false;
        if self.current() == Some(b'.') {
            self.bump();
            real = true;
            text.push('.');
            let fraction = self.eat_while(|b| b.is_ascii_digit());
            if fraction.is_empty() {
                text.push('0');
            } else {
                text.push_str(&String::from_utf8_lossy(fraction));
            }
        }
        if let Some(e @ (b'E' | b'e')) = self.current() {
            self.bump();
            real = true;
            text.push(e as char);
            if let Some(sign @ (b'-' | b'+')) = self.current() {
                self.bump();
                text.push(sign as char);
            }
            text.push_str(&String::from_utf8_lossy(self.eat_while(|b| b.is_ascii_digit())));
        }

        if real {
            text.parse()
                .map(Token::Real)
                .map_err(|_| format!("invalid real number: {text}"))
        } else {
            text.parse()
                .map(Token::Int)
                .map_err(|_| format!("invalid integer: {text}"))
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Lexeme, StepError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.scan().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Lexer::new(input.as_bytes())
            .map(|lexeme| lexeme.unwrap().token)
            .collect()
    }

    #[test]
    fn test_refs_and_strings() {
        assert_eq!(tokens("#123 #1"), vec![Token::Ref(123), Token::Ref(1)]);
        assert_eq!(tokens("'hello'"), vec![Token::Str("hello".into())]);
        assert_eq!(tokens("'it''s'"), vec![Token::Str("it's".into())]);
        assert_eq!(tokens("''"), vec![Token::Str(String::new())]);
    }

    #[test]
    fn test_enumerations() {
        assert_eq!(tokens(".T."), vec![Token::Enumeration("T".into())]);
        assert_eq!(
            tokens(".UNSPECIFIED."),
            vec![Token::Enumeration("UNSPECIFIED".into())]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(tokens("42"), vec![Token::Int(42)]);
        assert_eq!(tokens("-7"), vec![Token::Int(-7)]);
        assert_eq!(tokens("3.25"), vec![Token::Real(3.25)]);
        assert_eq!(tokens("-1.5E-10"), vec![Token::Real(-1.5e-10)]);
        assert_eq!(tokens("2.0E3"), vec![Token::Real(2000.0)]);
    }

    #[test]
    fn test_part21_reals() {
        assert_eq!(tokens("10."), vec![Token::Real(10.0)]);
        assert_eq!(tokens("-0."), vec![Token::Real(-0.0)]);
        assert_eq!(tokens("1.E-3"), vec![Token::Real(0.001)]);
        assert_eq!(
            tokens("(1.,0.,.F.)"),
            vec![
                Token::Open,
                Token::Real(1.0),
                Token::Comma,
                Token::Real(0.0),
                Token::Comma,
                Token::Enumeration("F".into()),
                Token::Close,
            ]
        );
    }

    #[test]
    fn test_names_are_upper_cased() {
        assert_eq!(
            tokens("CARTESIAN_POINT data"),
            vec![
                Token::Name("CARTESIAN_POINT".into()),
                Token::Name("DATA".into())
            ]
        );
        assert_eq!(
            tokens("END-ISO-10303-21"),
            vec![Token::Name("END-ISO-10303-21".into())]
        );
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            tokens("()=,;*$"),
            vec![
                Token::Open,
                Token::Close,
                Token::Eq,
                Token::Comma,
                Token::Semi,
                Token::Star,
                Token::Dollar,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(tokens("/* comment */ #1"), vec![Token::Ref(1)]);
        assert_eq!(tokens("#1 /* a */ /* b */ #2"), vec![Token::Ref(1), Token::Ref(2)]);
        assert!(tokens("/* unterminated").is_empty());
    }

    #[test]
    fn test_lines_counted_through_comments() {
        let lexemes = Lexer::new(b"#1\n/* two\nlines */\n#2").tokenize().unwrap();
        assert_eq!(lexemes[0].line, 1);
        assert_eq!(lexemes[1].line, 4);
    }

    #[test]
    fn test_errors_carry_position() {
        assert!(Lexer::new(b"'open").tokenize().is_err());
        assert!(Lexer::new(b".T").tokenize().is_err());
        let err = Lexer::new(b"#1\n  #x").tokenize().unwrap_err();
        assert!(matches!(err, StepError::Syntax { line: 2, col: 3, .. }), "{err}");
        let err = Lexer::new(b"@").tokenize().unwrap_err();
        assert!(err.to_string().contains("'@'"));
    }
}
