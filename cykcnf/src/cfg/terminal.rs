use crate::input_symbol::InputSymbol;

// Terminals are the input symbols of a CFG
// NOTE: epsilon is not a terminal; bodies spelled with one of its symbols become empty bodies
pub type Terminal = InputSymbol;
