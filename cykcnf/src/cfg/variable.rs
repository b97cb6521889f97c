use std::fmt;

#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Variable {
    pub name: String, // The name of the non-terminal (e.g., "S", "NP", "X_he")
}

impl Variable {
    /// Create a new Variable
    pub fn new(name: &str) -> Self {
        Variable {
            name: name.to_string(),
        }
    }

    /// Create a new Variable from a String
    pub fn from_string(name: String) -> Self {
        Variable { name }
    }

    /// Get the name of the variable
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
