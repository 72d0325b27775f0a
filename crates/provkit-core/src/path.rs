//! # Structural Paths
//!
//! A [`Path`] is a pure address into nested data: an ordered sequence of
//! [`Step`]s selecting attributes by name or collection elements by string
//! key, integer index, or value identity. Paths never reference the data
//! they address and carry no validation of their own. Validity is decided
//! only when a stepping protocol consumes a path against a concrete tree
//! (see [`crate::step`]).
//!
//! ## Invariant
//!
//! Paths are immutable. Every derivation builds a fresh step vector, so a
//! child path never shares storage with its parent or siblings. The parent
//! of the empty path is the empty path.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::PathParseError;
use crate::wire::WireValue;

/// One atomic unit of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Select a named attribute of an object or schema.
    AttributeName(String),
    /// Select a map element by key.
    ElementKeyString(String),
    /// Select a list or tuple element by zero-based index.
    ElementKeyInt(i64),
    /// Select a set element by its value.
    ElementKeyValue(WireValue),
}

impl Step {
    /// The kind of this step, without its payload.
    pub fn kind(&self) -> StepKind {
        match self {
            Self::AttributeName(_) => StepKind::AttributeName,
            Self::ElementKeyString(_) => StepKind::ElementKeyString,
            Self::ElementKeyInt(_) => StepKind::ElementKeyInt,
            Self::ElementKeyValue(_) => StepKind::ElementKeyValue,
        }
    }
}

/// Payload-free discriminant of a [`Step`], used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// [`Step::AttributeName`].
    AttributeName,
    /// [`Step::ElementKeyString`].
    ElementKeyString,
    /// [`Step::ElementKeyInt`].
    ElementKeyInt,
    /// [`Step::ElementKeyValue`].
    ElementKeyValue,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AttributeName => "AttributeName",
            Self::ElementKeyString => "ElementKeyString",
            Self::ElementKeyInt => "ElementKeyInt",
            Self::ElementKeyValue => "ElementKeyValue",
        })
    }
}

/// Immutable structural address into nested data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    /// The root path, with no steps.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a path from an explicit step sequence.
    pub fn from_steps(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    fn with_step(&self, step: Step) -> Self {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend_from_slice(&self.steps);
        steps.push(step);
        Self { steps }
    }

    /// A new path selecting the named attribute below this one.
    pub fn attribute(&self, name: impl Into<String>) -> Self {
        self.with_step(Step::AttributeName(name.into()))
    }

    /// A new path selecting the map element with key `key`.
    pub fn at_map_key(&self, key: impl Into<String>) -> Self {
        self.with_step(Step::ElementKeyString(key.into()))
    }

    /// A new path selecting the list element at `index`.
    pub fn at_list_index(&self, index: i64) -> Self {
        self.with_step(Step::ElementKeyInt(index))
    }

    /// A new path selecting the set element equal to `value`.
    pub fn at_set_value(&self, value: WireValue) -> Self {
        self.with_step(Step::ElementKeyValue(value))
    }

    /// A new path without the last step. The empty path is its own parent.
    pub fn parent(&self) -> Self {
        match self.steps.split_last() {
            Some((_, rest)) => Self {
                steps: rest.to_vec(),
            },
            None => Self::empty(),
        }
    }

    /// Read-only view of the steps.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The final step, if any.
    pub fn last_step(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// The first step and a new path holding the rest.
    pub fn split_first(&self) -> Option<(&Step, Path)> {
        self.steps.split_first().map(|(first, rest)| {
            (
                first,
                Self {
                    steps: rest.to_vec(),
                },
            )
        })
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True for the root path.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Parse the textual form `a.b[0]["key"]`.
    ///
    /// Set-value steps have no textual form and cannot be parsed.
    pub fn parse(input: &str) -> Result<Self, PathParseError> {
        Parser::new(input).parse()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                Step::AttributeName(name) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                Step::ElementKeyString(key) => write!(f, "[{key:?}]")?,
                Step::ElementKeyInt(index) => write!(f, "[{index}]")?,
                Step::ElementKeyValue(value) => write!(f, "[Value({value})]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for Path {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

struct Parser<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    steps: Vec<Step>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            steps: Vec::new(),
        }
    }

    fn error(&self, offset: usize, reason: &str) -> PathParseError {
        PathParseError {
            input: self.input.to_string(),
            offset,
            reason: reason.to_string(),
        }
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.input.len(), |(i, _)| *i)
    }

    fn parse(mut self) -> Result<Path, PathParseError> {
        let mut expect_name = true;
        while let Some(&(offset, c)) = self.chars.peek() {
            match c {
                '[' => {
                    self.chars.next();
                    self.parse_element(offset)?;
                    expect_name = false;
                }
                '.' if !self.steps.is_empty() && !expect_name => {
                    self.chars.next();
                    expect_name = true;
                }
                _ if expect_name => {
                    self.parse_name()?;
                    expect_name = false;
                }
                _ => return Err(self.error(offset, "expected '.' or '['")),
            }
        }
        if expect_name && !self.steps.is_empty() {
            return Err(self.error(self.input.len(), "expected attribute name"));
        }
        Ok(Path { steps: self.steps })
    }

    fn parse_name(&mut self) -> Result<(), PathParseError> {
        let start = self.offset();
        let mut name = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c == '.' || c == '[' {
                break;
            }
            name.push(c);
            self.chars.next();
        }
        if name.is_empty() {
            return Err(self.error(start, "expected attribute name"));
        }
        self.steps.push(Step::AttributeName(name));
        Ok(())
    }

    fn parse_element(&mut self, open: usize) -> Result<(), PathParseError> {
        match self.chars.peek().copied() {
            Some((_, '"')) => {
                self.chars.next();
                let key = self.parse_quoted(open)?;
                self.steps.push(Step::ElementKeyString(key));
            }
            Some((start, c)) if c == '-' || c.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(&(_, c)) = self.chars.peek() {
                    if c != '-' && !c.is_ascii_digit() {
                        break;
                    }
                    digits.push(c);
                    self.chars.next();
                }
                let index = digits
                    .parse::<i64>()
                    .map_err(|_| self.error(start, "invalid element index"))?;
                self.steps.push(Step::ElementKeyInt(index));
            }
            _ => return Err(self.error(open, "expected element index or quoted key")),
        }
        match self.chars.next() {
            Some((_, ']')) => Ok(()),
            Some((offset, _)) => Err(self.error(offset, "expected ']'")),
            None => Err(self.error(self.input.len(), "unterminated element step")),
        }
    }

    fn parse_quoted(&mut self, open: usize) -> Result<String, PathParseError> {
        let mut key = String::new();
        loop {
            match self.chars.next() {
                Some((_, '"')) => return Ok(key),
                Some((_, '\\')) => match self.chars.next() {
                    Some((_, escaped)) => key.push(escaped),
                    None => return Err(self.error(self.input.len(), "unterminated escape")),
                },
                Some((_, c)) => key.push(c),
                None => return Err(self.error(open, "unterminated quoted key")),
            }
        }
    }
}
