//! Output generation for a finished run.
//!
//! # Submodules
//!
//! - [`markdown`]: browsable listing, printed or written to a file
//! - [`csv`]: spreadsheet export with the raw time text
//! - [`json`]: full export with normalized timestamps
//!
//! # Output Structure
//!
//! ```text
//! csv_output_dir/
//! └── tin-chung-khoan-2024-03-05.csv
//!
//! json_output_dir/
//! └── 2024-03-05.json
//!
//! markdown_output_dir/
//! └── 2024-03-05.md
//! ```

pub mod csv;
pub mod json;
pub mod markdown;
