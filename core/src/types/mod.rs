mod checker;
mod symbol_table;

pub use checker::*;
pub use symbol_table::*;
