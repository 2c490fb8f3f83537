//! Delimited table reader.
//!
//! Reads a header row and data records with the `csv` crate and pulls the
//! three required columns out of each record. The reader is
//! lenient about record length: a short record yields missing cells, not
//! an error. Only the header must be valid UTF-8; data cells are read as
//! bytes and decoded per cell.

use crate::config::{ColumnsConfig, Config};
use crate::error::SummaryError;
use crate::models::{RawCell, Row};
use csv::{ByteRecord, ReaderBuilder, StringRecord, Trim};
use std::borrow::Cow;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where the table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `-` selects standard input, anything else is a path.
    pub fn from_arg(arg: &Path) -> Self {
        if arg.as_os_str() == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(arg.to_path_buf())
        }
    }

    fn display_path(&self) -> PathBuf {
        match self {
            InputSource::Stdin => PathBuf::from("<stdin>"),
            InputSource::File(path) => path.clone(),
        }
    }
}

/// Settings for reading one table.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    pub delimiter: u8,
    pub trim_fields: bool,
    pub columns: ColumnsConfig,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            trim_fields: false,
            columns: ColumnsConfig::default(),
        }
    }
}

impl TryFrom<&Config> for ReadOptions {
    type Error = SummaryError;

    fn try_from(config: &Config) -> Result<Self, Self::Error> {
        Ok(Self {
            delimiter: parse_delimiter(&config.input.delimiter)?,
            trim_fields: config.input.trim_fields,
            columns: config.columns.clone(),
        })
    }
}

/// Turn a configured delimiter into the byte the reader expects.
pub fn parse_delimiter(raw: &str) -> Result<u8, SummaryError> {
    match raw {
        "\\t" | "tab" | "\t" => Ok(b'\t'),
        s if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        s => Err(SummaryError::InvalidDelimiter(s.to_string())),
    }
}

/// Column positions of the required fields within a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    product: usize,
    quantity: usize,
    unit_price: usize,
}

impl ColumnMap {
    /// Resolve required columns against the header. The first matching
    /// header wins; every absent column is reported at once.
    fn resolve(headers: &StringRecord, columns: &ColumnsConfig) -> Result<Self, SummaryError> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let product = find(columns.product.as_str());
        let quantity = find(columns.quantity.as_str());
        let unit_price = find(columns.unit_price.as_str());

        match (product, quantity, unit_price) {
            (Some(product), Some(quantity), Some(unit_price)) => Ok(Self {
                product,
                quantity,
                unit_price,
            }),
            _ => {
                let missing = [
                    (product, &columns.product),
                    (quantity, &columns.quantity),
                    (unit_price, &columns.unit_price),
                ]
                .into_iter()
                .filter(|(position, _)| position.is_none())
                .map(|(_, name)| name.clone())
                .collect();

                Err(SummaryError::MissingColumns(missing))
            }
        }
    }

    /// Pull the required cells out of a record. A product name that is not
    /// UTF-8 is decoded lossily and still forms its own bucket.
    fn extract(&self, line: u64, record: &ByteRecord) -> Row {
        let product = String::from_utf8_lossy(record.get(self.product).unwrap_or_default());
        if let Cow::Owned(_) = product {
            debug!("Line {}: product name is not valid UTF-8, decoded lossily", line);
        }

        Row {
            line,
            product: product.into_owned(),
            quantity: RawCell::from_bytes(record.get(self.quantity)),
            unit_price: RawCell::from_bytes(record.get(self.unit_price)),
        }
    }
}

/// Read every row of a table from any reader.
pub fn read_rows<R: Read>(input: R, options: &ReadOptions) -> Result<Vec<Row>, SummaryError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(if options.trim_fields {
            Trim::All
        } else {
            Trim::Headers
        })
        .flexible(true)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|source| SummaryError::Malformed { record: 1, source })?
        .clone();
    debug!("Headers: {:?}", headers.iter().collect::<Vec<_>>());

    let columns = ColumnMap::resolve(&headers, &options.columns)?;

    let mut rows = Vec::new();
    let mut record = ByteRecord::new();
    loop {
        let fallback_line = rows.len() as u64 + 2;
        match reader.read_byte_record(&mut record) {
            Ok(true) => {
                let line = record
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(fallback_line);
                rows.push(columns.extract(line, &record));
            }
            Ok(false) => break,
            Err(source) => {
                let record = source
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(fallback_line);
                return Err(SummaryError::Malformed { record, source });
            }
        }
    }

    Ok(rows)
}

/// Load the whole table from a file or standard input.
pub fn load_rows(input: &InputSource, options: &ReadOptions) -> Result<Vec<Row>, SummaryError> {
    let rows = match input {
        InputSource::Stdin => read_rows(std::io::stdin().lock(), options)?,
        InputSource::File(path) => {
            let file = std::fs::File::open(path).map_err(|e| SummaryError::Io {
                path: path.clone(),
                source: e,
            })?;
            read_rows(std::io::BufReader::new(file), options)?
        }
    };

    info!(
        "Loaded {} row(s) from {}",
        rows.len(),
        input.display_path().display()
    );

    Ok(rows)
}
