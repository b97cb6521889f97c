use crate::input_symbol::{tokenize, InputSymbol};

pub trait Language {
    fn accepts(&self, input: &[InputSymbol]) -> bool;

    /// Splits `input` on whitespace into symbols and checks if the language contains them.
    fn accepts_string(&self, input: &str) -> bool {
        self.accepts(&tokenize(input))
    }
}
