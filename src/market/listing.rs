//! Symbol directory parsing.
//!
//! Directories are pipe-delimited with a header row. The symbol column is
//! `Symbol` in the Nasdaq file and `ACT Symbol` in the other-listed file, and
//! both end with a `File Creation Time:` footer line.

use csv::ReaderBuilder;

use crate::error::MarketError;

/// Header names recognised as the symbol column, in priority order.
const SYMBOL_COLUMNS: [&str; 2] = ["Symbol", "ACT Symbol"];

/// Footer line prefix.
const FOOTER_PREFIX: &str = "File Creation Time";

/// Extract the symbol column from a pipe-delimited directory.
///
/// Empty symbols and the footer row are dropped. A file with no recognised
/// symbol column yields no symbols.
pub fn parse_symbols(text: &str) -> Result<Vec<String>, MarketError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let column = SYMBOL_COLUMNS
        .iter()
        .find_map(|name| headers.iter().position(|h| h.trim() == *name));

    let Some(column) = column else {
        return Ok(Vec::new());
    };

    let mut symbols = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(symbol) = record.get(column).map(str::trim) else {
            continue;
        };
        if symbol.is_empty() || symbol.starts_with(FOOTER_PREFIX) {
            continue;
        }
        symbols.push(symbol.to_string());
    }

    Ok(symbols)
}
