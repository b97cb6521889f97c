use std::error;
use std::fmt;

use crate::cfg::production::Production;
use crate::cfg::variable::Variable;

/// Ways in which a grammar handed to the normalizer can be malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidGrammar {
    /// The start symbol is not one of the declared non-terminals.
    UndeclaredStart(Variable),
    /// A name is declared both as a terminal and as a non-terminal.
    OverlappingSymbol(String),
    /// A production body references a symbol that was never declared.
    UndeclaredSymbol { head: Variable, symbol: String },
    /// A production is attached to an undeclared non-terminal.
    UndeclaredHead(Variable),
    /// A line of textual grammar could not be read.
    MalformedRule(String),
    /// The indexed representation is internally inconsistent.
    Inconsistent(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidGrammar(InvalidGrammar),
    NotInNormalForm(Production),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for InvalidGrammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InvalidGrammar::UndeclaredStart(v) => {
                write!(f, "start symbol '{}' is not a declared non-terminal", v)
            }
            InvalidGrammar::OverlappingSymbol(name) => {
                write!(f, "'{}' is declared both as terminal and non-terminal", name)
            }
            InvalidGrammar::UndeclaredSymbol { head, symbol } => {
                write!(f, "production of '{}' uses undeclared symbol '{}'", head, symbol)
            }
            InvalidGrammar::UndeclaredHead(v) => {
                write!(f, "production head '{}' is not a declared non-terminal", v)
            }
            InvalidGrammar::MalformedRule(line) => write!(f, "malformed grammar rule: {}", line),
            InvalidGrammar::Inconsistent(what) => write!(f, "inconsistent grammar: {}", what),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidGrammar(ref e) => write!(f, "Invalid grammar: {}", e),
            Error::NotInNormalForm(ref p) => write!(f, "Grammar is not in CNF: {}", p),
        }
    }
}

impl error::Error for Error {}

impl From<InvalidGrammar> for Error {
    fn from(e: InvalidGrammar) -> Error {
        Error::InvalidGrammar(e)
    }
}
