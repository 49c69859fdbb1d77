pub mod csv_export;
pub mod csv_import;

pub use csv_export::export_csv;
pub use csv_import::{import_csv, CsvImport};
