/// Base names used when the normalizer has to invent non-terminals.
///
/// Every base is only a starting point: the fresh-name allocator appends a
/// suffix whenever the base collides with a symbol already in the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalFormConfig {
    /// Name of the new start symbol introduced by the START pass.
    pub start_symbol: String,
    /// Prefix of the `X_t -> t` non-terminals introduced by the TERM pass.
    pub terminal_prefix: String,
    /// Prefix of the numbered non-terminals introduced by the BIN pass.
    pub binary_prefix: String,
}

impl Default for NormalFormConfig {
    fn default() -> Self {
        NormalFormConfig {
            start_symbol: "S0".to_string(),
            terminal_prefix: "X_".to_string(),
            binary_prefix: "B".to_string(),
        }
    }
}
