#[macro_use]
extern crate lazy_static;

pub mod cfg;
pub mod config;
pub mod cyk;
pub mod error;
pub mod input_symbol;
pub mod language;

pub use cfg::normal_form::normalize;
pub use cyk::{parse, recognize};
