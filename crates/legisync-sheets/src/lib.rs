//! Spreadsheet gateway: reads the source column and batch-writes the
//! target columns of one Google Sheets tab.

mod column;
mod gateway;

pub use column::column_letter;
pub use gateway::{SheetError, SheetGateway, SheetsSession};
