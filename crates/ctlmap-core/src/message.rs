//! Typed messages addressed to parameter paths.
//!
//! A [`Message`] borrows its path and string arguments and keeps up to four
//! arguments inline, so building one on the audio thread never touches the heap.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Inline argument capacity of a [`Message`].
pub const INLINE_ARGS: usize = 4;

/// A single typed message argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arg<'a> {
    Float(f32),
    Int(i32),
    Bool(bool),
    Char(char),
    Str(&'a str),
}

impl<'a> Arg<'a> {
    /// Type tag of this argument (`T`/`F` for booleans).
    pub fn type_tag(&self) -> char {
        match self {
            Self::Float(_) => 'f',
            Self::Int(_) => 'i',
            Self::Bool(true) => 'T',
            Self::Bool(false) => 'F',
            Self::Char(_) => 'c',
            Self::Str(_) => 's',
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f32),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) => Some(*f as i32),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Char(v) => write!(f, "{:?}", v),
            Self::Str(v) => write!(f, "{:?}", v),
        }
    }
}

/// Native value type of a bindable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Float,
    Int,
    Bool,
    Char,
}

impl ValueType {
    /// Derive the value type from a port's argument signature.
    ///
    /// Checked in priority order: float, integer, boolean (`T`), char.
    /// Returns `None` when none of those tags appear.
    pub fn from_signature(signature: &str) -> Option<Self> {
        if signature.contains('f') {
            Some(Self::Float)
        } else if signature.contains('i') {
            Some(Self::Int)
        } else if signature.contains('T') {
            Some(Self::Bool)
        } else if signature.contains('c') {
            Some(Self::Char)
        } else {
            None
        }
    }

    pub fn tag(&self) -> char {
        match self {
            Self::Float => 'f',
            Self::Int => 'i',
            Self::Bool => 'T',
            Self::Char => 'c',
        }
    }
}

/// A path plus typed arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Message<'a> {
    path: &'a str,
    args: SmallVec<[Arg<'a>; INLINE_ARGS]>,
}

impl<'a> Message<'a> {
    /// Single-argument message.
    pub fn new(path: &'a str, arg: Arg<'a>) -> Self {
        let mut args = SmallVec::new();
        args.push(arg);
        Self { path, args }
    }

    /// Message without arguments.
    pub fn empty(path: &'a str) -> Self {
        Self {
            path,
            args: SmallVec::new(),
        }
    }

    pub fn with_args(path: &'a str, args: impl IntoIterator<Item = Arg<'a>>) -> Self {
        Self {
            path,
            args: args.into_iter().collect(),
        }
    }

    #[inline]
    pub fn path(&self) -> &'a str {
        self.path
    }

    #[inline]
    pub fn args(&self) -> &[Arg<'a>] {
        &self.args
    }

    #[inline]
    pub fn arg(&self, index: usize) -> Option<&Arg<'a>> {
        self.args.get(index)
    }

    pub fn type_tags(&self) -> impl Iterator<Item = char> + '_ {
        self.args.iter().map(Arg::type_tag)
    }
}

impl fmt::Display for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ,", self.path)?;
        for tag in self.type_tags() {
            write!(f, "{tag}")?;
        }
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_priority() {
        assert_eq!(ValueType::from_signature(":f"), Some(ValueType::Float));
        assert_eq!(ValueType::from_signature(":i:f"), Some(ValueType::Float));
        assert_eq!(ValueType::from_signature(":c:i"), Some(ValueType::Int));
        assert_eq!(ValueType::from_signature(":T:F"), Some(ValueType::Bool));
        assert_eq!(ValueType::from_signature(":c"), Some(ValueType::Char));
        assert_eq!(ValueType::from_signature(":s"), None);
        assert_eq!(ValueType::from_signature(""), None);
    }

    #[test]
    fn test_bool_type_tags() {
        assert_eq!(Arg::Bool(true).type_tag(), 'T');
        assert_eq!(Arg::Bool(false).type_tag(), 'F');
    }

    #[test]
    fn test_message_args_inline() {
        let msg = Message::with_args("/register", [Arg::Int(0), Arg::Int(7), Arg::Str("/vol")]);
        assert_eq!(msg.path(), "/register");
        assert_eq!(msg.type_tags().collect::<String>(), "iis");
        assert_eq!(msg.arg(2).and_then(Arg::as_str), Some("/vol"));
        assert!(msg.arg(3).is_none());
    }

    #[test]
    fn test_message_display() {
        let msg = Message::new("/synth/volume", Arg::Float(0.5));
        assert_eq!(msg.to_string(), "/synth/volume ,f 0.5");

        let msg = Message::new("/synth/bypass", Arg::Bool(false));
        assert_eq!(msg.to_string(), "/synth/bypass ,F false");
    }

    #[test]
    fn test_arg_conversion() {
        assert_eq!(Arg::Int(3).as_f32(), Some(3.0));
        assert_eq!(Arg::Float(2.7).as_i32(), Some(2));
        assert_eq!(Arg::Char('x').as_bool(), None);
        assert_eq!(Arg::Char('x').as_char(), Some('x'));
    }
}
