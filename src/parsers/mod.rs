//! Spreadsheet input and column mapping

pub mod rules;
pub mod sheet;

pub use rules::{ColumnRule, RuleSet};
pub use sheet::{CellValue, Sheet, SheetRow};
