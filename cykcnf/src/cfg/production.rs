use std::fmt;

use crate::cfg::terminal::Terminal;
use crate::cfg::variable::Variable;
use crate::input_symbol::EPSILON_SYMBOLS;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Symbol {
    T(Terminal),
    V(Variable),
}

impl Symbol {
    pub fn get_name(&self) -> &str {
        match self {
            Symbol::T(t) => t.get_name(),
            Symbol::V(v) => v.get_name(),
        }
    }

    /// A terminal spelled like epsilon stands for the empty word
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Symbol::T(t) if t.is_epsilon())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get_name())
    }
}

/// A single rule `head -> body`. An empty body is an epsilon production.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Production {
    pub head: Variable,    // The head of the production (e.g., "S", "VP")
    pub body: Vec<Symbol>, // The body of the production (e.g., "NP VP", "cooks")
}

impl Production {
    /// Create a new Production
    pub fn new(head: Variable, body: Vec<Symbol>) -> Self {
        Production { head, body }
    }

    pub fn is_epsilon(&self) -> bool {
        self.body.iter().all(Symbol::is_epsilon)
    }

    /// `A -> B` for a single non-terminal `B`
    pub fn is_unit(&self) -> bool {
        matches!(self.body.as_slice(), [Symbol::V(_)])
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.head)?;
        if self.is_epsilon() {
            return write!(f, " {}", EPSILON_SYMBOLS[1]);
        }
        for symbol in self.body.iter().filter(|s| !s.is_epsilon()) {
            write!(f, " {}", symbol)?;
        }
        Ok(())
    }
}
