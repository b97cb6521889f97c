pub mod cfg;
pub mod fresh;
pub mod normal_form;
pub mod production;
pub mod terminal;
pub mod variable;
