use std::fmt;

use hashbrown::HashSet;

#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct InputSymbol {
    pub name: String, // Textual representation of the symbol (e.g., "he", "cooks")
}
pub const EPSILON_SYMBOLS: [&str; 5] = ["epsilon", "ε", "ϵ", "Є", "$"];

lazy_static! {
    static ref EPSILON_SET: HashSet<&'static str> = EPSILON_SYMBOLS.iter().copied().collect();
}

impl InputSymbol {
    /// Create a new InputSymbol
    pub fn new(name: &str) -> Self {
        InputSymbol {
            name: name.to_string(),
        }
    }

    /// Create a new InputSymbol from a String
    pub fn from_string(name: String) -> Self {
        InputSymbol { name }
    }

    /// Get the name of the symbol
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Whether this symbol is one of the accepted spellings of the empty word
    pub fn is_epsilon(&self) -> bool {
        is_epsilon_name(&self.name)
    }
}

impl fmt::Display for InputSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

pub fn is_epsilon_name(name: &str) -> bool {
    EPSILON_SET.contains(name)
}

/// Splits a sentence on whitespace into input symbols.
pub fn tokenize(sentence: &str) -> Vec<InputSymbol> {
    sentence.split_whitespace().map(InputSymbol::new).collect()
}
