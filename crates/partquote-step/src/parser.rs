//! Exchange-structure parser.
//!
//! Produces an untyped instance graph: every `#id = ...;` line becomes a
//! [`StepEntity`] holding its raw parameters. Nothing here knows what a
//! CARTESIAN_POINT is; the `entities` module interprets the graph.
//!
//! Complex instances, e.g.
//! `#7 = ( LENGTH_UNIT() NAMED_UNIT(*) SI_UNIT(.MILLI.,.METRE.) );`,
//! keep one parameter list per partial type.

use std::collections::HashMap;

use crate::error::StepError;
use crate::lexer::{Lexeme, Lexer, Token};

/// One instance parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum StepValue {
    /// `#123`
    Ref(u64),
    /// Quoted string.
    Str(String),
    /// Real literal.
    Real(f64),
    /// Integer literal.
    Int(i64),
    /// `.NAME.`
    Enumeration(String),
    /// Parenthesised aggregate.
    List(Vec<StepValue>),
    /// `*`
    Derived,
    /// `$`
    Unset,
    /// Select value wrapped in its type, `LENGTH_MEASURE(25.4)`.
    Typed {
        /// Wrapping type.
        type_name: String,
        /// Wrapped parameters.
        args: Vec<StepValue>,
    },
}

impl StepValue {
    /// The referenced instance id.
    pub fn as_entity_ref(&self) -> Option<u64> {
        match *self {
            StepValue::Ref(id) => Some(id),
            _ => None,
        }
    }

    /// Numeric value; integers widen and single-valued typed measures unwrap.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            StepValue::Real(v) => Some(*v),
            StepValue::Int(v) => Some(*v as f64),
            StepValue::Typed { args, .. } => match args.as_slice() {
                [inner] => inner.as_real(),
                _ => None,
            },
            _ => None,
        }
    }

    /// String contents.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            StepValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Enumeration name without dots.
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            StepValue::Enumeration(s) => Some(s),
            _ => None,
        }
    }

    /// Aggregate members.
    pub fn as_list(&self) -> Option<&[StepValue]> {
        match self {
            StepValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// True for `$`.
    pub fn is_null(&self) -> bool {
        matches!(self, StepValue::Unset)
    }
}

/// An instance from the data section, or an entry of the header.
#[derive(Debug, Clone)]
pub struct StepEntity {
    /// Instance id; 0 for header entries.
    pub id: u64,
    /// Type name. Complex instances report their first partial type.
    pub type_name: String,
    /// Parameters of a simple instance. Empty for complex ones.
    pub args: Vec<StepValue>,
    /// `(type, parameters)` per partial type of a complex instance.
    pub parts: Vec<(String, Vec<StepValue>)>,
}

impl StepEntity {
    fn simple(id: u64, type_name: String, args: Vec<StepValue>) -> Self {
        Self {
            id,
            type_name,
            args,
            parts: Vec::new(),
        }
    }

    /// True for `( A(..) B(..) )` instances.
    pub fn is_complex(&self) -> bool {
        !self.parts.is_empty()
    }

    /// Parameters of `name`, for a simple instance of that type or a
    /// complex one that includes it.
    pub fn part(&self, name: &str) -> Option<&[StepValue]> {
        if !self.is_complex() {
            return (self.type_name == name).then_some(self.args.as_slice());
        }
        self.parts
            .iter()
            .find_map(|(part, args)| (part == name).then_some(args.as_slice()))
    }

    /// Whether [`part`](Self::part) would find `name`.
    pub fn has_part(&self, name: &str) -> bool {
        self.part(name).is_some()
    }
}

/// A parsed exchange structure.
#[derive(Debug, Clone)]
pub struct StepFile {
    /// FILE_DESCRIPTION, FILE_NAME, FILE_SCHEMA and friends.
    pub header: Vec<StepEntity>,
    /// Data section instances by id.
    pub entities: HashMap<u64, StepEntity>,
}

impl StepFile {
    /// Instance `#id`, if present.
    pub fn get(&self, id: u64) -> Option<&StepEntity> {
        self.entities.get(&id)
    }

    /// Instance `#id`, or [`StepError::DanglingReference`].
    pub fn require(&self, id: u64) -> Result<&StepEntity, StepError> {
        self.get(id).ok_or(StepError::DanglingReference(id))
    }

    /// Simple instances of one type in id order. Complex instances are
    /// never returned.
    pub fn entities_of_type(&self, type_name: &str) -> Vec<&StepEntity> {
        let mut found: Vec<&StepEntity> = self
            .entities
            .values()
            .filter(|e| !e.is_complex() && e.type_name == type_name)
            .collect();
        found.sort_unstable_by_key(|e| e.id);
        found
    }

    /// Application protocol names listed in FILE_SCHEMA.
    pub fn schema(&self) -> Vec<&str> {
        self.header
            .iter()
            .filter(|e| e.type_name == "FILE_SCHEMA")
            .filter_map(|e| e.args.first().and_then(StepValue::as_list))
            .flat_map(|names| names.iter().filter_map(StepValue::as_string))
            .collect()
    }
}

/// Recursive-descent parser over the lexer output.
pub struct Parser {
    lexemes: Vec<Lexeme>,
    next: usize,
}

impl Parser {
    /// Parse a whole Part 21 file.
    pub fn parse(input: &[u8]) -> Result<StepFile, StepError> {
        let lexemes = Lexer::new(input).tokenize()?;
        Parser { lexemes, next: 0 }.file()
    }

    fn file(&mut self) -> Result<StepFile, StepError> {
        let mut file = StepFile {
            header: Vec::new(),
            entities: HashMap::new(),
        };
        self.expect_name("ISO-10303-21")?;
        self.expect(&Token::Semi)?;

        while self.peek().is_some() {
            if self.eat_name("HEADER") {
                self.expect(&Token::Semi)?;
                file.header = self.header_entries()?;
            } else if self.eat_name("DATA") {
                // Edition 3 allows `DATA('name', ('schema'));`.
                if self.peek() == Some(&Token::Open) {
                    self.parameters()?;
                }
                self.expect(&Token::Semi)?;
                while let Some(&Token::Ref(id)) = self.peek() {
                    self.next += 1;
                    let entity = self.instance(id)?;
                    file.entities.insert(id, entity);
                }
            } else if self.eat_name("END-ISO-10303-21") {
                self.expect(&Token::Semi)?;
                return Ok(file);
            } else {
                return Err(self.error(None, "unexpected token"));
            }
            self.expect_name("ENDSEC")?;
            self.expect(&Token::Semi)?;
        }
        Ok(file)
    }

    fn header_entries(&mut self) -> Result<Vec<StepEntity>, StepError> {
        let mut entries = Vec::new();
        loop {
            match self.peek() {
                Some(Token::Name(name)) if name != "ENDSEC" => {
                    let name = name.clone();
                    self.next += 1;
                    let args = self.parameters()?;
                    self.expect(&Token::Semi)?;
                    entries.push(StepEntity::simple(0, name, args));
                }
                _ => return Ok(entries),
            }
        }
    }

    /// Everything after `#id`, up to and including the semicolon.
    fn instance(&mut self, id: u64) -> Result<StepEntity, StepError> {
        self.expect(&Token::Eq)?;
        let entity = match self.peek() {
            Some(Token::Name(name)) => {
                let name = name.clone();
                self.next += 1;
                StepEntity::simple(id, name, self.parameters()?)
            }
            Some(Token::Open) => {
                self.next += 1;
                let mut parts = Vec::new();
                while let Some(Token::Name(name)) = self.peek() {
                    let name = name.clone();
                    self.next += 1;
                    parts.push((name, self.parameters()?));
                }
                self.expect(&Token::Close)?;
                let Some((first, _)) = parts.first() else {
                    return Err(self.error(Some(id), "empty complex entity"));
                };
                StepEntity {
                    id,
                    type_name: first.clone(),
                    args: Vec::new(),
                    parts,
                }
            }
            _ => return Err(self.error(Some(id), "expected type name")),
        };
        self.expect(&Token::Semi)?;
        Ok(entity)
    }

    /// `( value, value, ... )`
    fn parameters(&mut self) -> Result<Vec<StepValue>, StepError> {
        self.expect(&Token::Open)?;
        self.aggregate()
    }

    /// Values after an already consumed `(`, through the matching `)`.
    fn aggregate(&mut self) -> Result<Vec<StepValue>, StepError> {
        let mut values = Vec::new();
        if self.eat(&Token::Close) {
            return Ok(values);
        }
        loop {
            values.push(self.value()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::Close)?;
        Ok(values)
    }

    fn value(&mut self) -> Result<StepValue, StepError> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.error(None, "unexpected end of input"));
        };
        let value = match token {
            Token::Ref(id) => StepValue::Ref(id),
            Token::Str(s) => StepValue::Str(s),
            Token::Real(v) => StepValue::Real(v),
            Token::Int(v) => StepValue::Int(v),
            Token::Enumeration(s) => StepValue::Enumeration(s),
            Token::Star => StepValue::Derived,
            Token::Dollar => StepValue::Unset,
            Token::Open => {
                self.next += 1;
                return self.aggregate().map(StepValue::List);
            }
            Token::Name(type_name) => {
                self.next += 1;
                let args = self.parameters()?;
                return Ok(StepValue::Typed { type_name, args });
            }
            other => return Err(self.error(None, format!("unexpected value: {other:?}"))),
        };
        self.next += 1;
        Ok(value)
    }

    fn peek(&self) -> Option<&Token> {
        self.lexemes.get(self.next).map(|l| &l.token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        let hit = self.peek() == Some(token);
        if hit {
            self.next += 1;
        }
        hit
    }

    fn eat_name(&mut self, name: &str) -> bool {
        let hit = matches!(self.peek(), Some(Token::Name(n)) if n == name);
        if hit {
            self.next += 1;
        }
        hit
    }

    fn expect(&mut self, token: &Token) -> Result<(), StepError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(None, format!("expected {token:?}")))
        }
    }

    fn expect_name(&mut self, name: &str) -> Result<(), StepError> {
        if self.eat_name(name) {
            Ok(())
        } else {
            Err(self.error(None, format!("expected keyword '{name}'")))
        }
    }

    /// Malformed-input error naming the offending token and its line.
    fn error(&self, entity_id: Option<u64>, message: impl Into<String>) -> StepError {
        let found = match self.lexemes.get(self.next) {
            Some(l) => format!("{:?} on line {}", l.token, l.line),
            None => "end of input".to_string(),
        };
        StepError::malformed(entity_id, format!("{}, got {found}", message.into()))
    }
}
