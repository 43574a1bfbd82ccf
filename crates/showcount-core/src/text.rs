//! Decoding uploaded files into plain text for extraction.

use std::io::Cursor;

use calamine::{Reader, Xlsx};
use thiserror::Error;

/// Extensions decoded as UTF-8 text.
pub const TEXT_EXTENSIONS: [&str; 3] = ["txt", "md", "csv"];

pub const SPREADSHEET_EXTENSION: &str = "xlsx";

/// Separator placed between spreadsheet cells on one line.
const CELL_SEPARATOR: &str = " | ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnsupportedFormat {
    #[error("Unsupported file type: {0}")]
    Extension(String),

    #[error("file is not valid UTF-8 text")]
    InvalidEncoding,

    #[error("could not read spreadsheet: {0}")]
    Spreadsheet(String),
}

/// Decode `bytes` according to the file `extension` (with or without the
/// leading dot, any case).
///
/// Text files are read as UTF-8. An `.xlsx` workbook becomes one line per
/// row across every sheet, cells joined by `" | "`, empty cells as `""`.
///
/// # Errors
///
/// - [`UnsupportedFormat::Extension`] for anything other than `.txt`,
///   `.md`, `.csv` or `.xlsx`.
/// - [`UnsupportedFormat::InvalidEncoding`] when text bytes are not UTF-8.
/// - [`UnsupportedFormat::Spreadsheet`] when the workbook cannot be opened.
pub fn extract_text(bytes: &[u8], extension: &str) -> Result<String, UnsupportedFormat> {
    let ext = extension.trim().trim_start_matches('.').to_ascii_lowercase();
    if ext == SPREADSHEET_EXTENSION {
        return spreadsheet_text(bytes);
    }
    if !TEXT_EXTENSIONS.contains(&ext.as_str()) {
        return Err(UnsupportedFormat::Extension(format!(".{ext}")));
    }

    let text = std::str::from_utf8(bytes).map_err(|_| UnsupportedFormat::InvalidEncoding)?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
}

fn spreadsheet_text(bytes: &[u8]) -> Result<String, UnsupportedFormat> {
    let unreadable = |err: calamine::XlsxError| UnsupportedFormat::Spreadsheet(err.to_string());
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).map_err(unreadable)?;

    let mut lines = Vec::new();
    for sheet in workbook.sheet_names() {
        let range = workbook.worksheet_range(&sheet).map_err(unreadable)?;
        for row in range.rows() {
            let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
            lines.push(cells.join(CELL_SEPARATOR));
        }
    }
    Ok(lines.join("\n"))
}
