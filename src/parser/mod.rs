// SQL select-list parser used for axis detection

pub mod lexer;
pub mod select;

// Public API re-exports
pub use select::{parse_select_list, select_items};
