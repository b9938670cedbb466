//! CSV codec backed by the `csv` crate
//!
//! Tables are arrays of rows: objects keyed by the header in header mode,
//! plain arrays of fields otherwise.

use ::csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};
use tracing::debug;

use crate::error::{Error, ErrorKind, Pos, Result};
use crate::node::{Array, Node, Object};

/// Configuration for the CSV codec
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CsvConfig {
    /// Field delimiter
    pub delimiter: u8,
    /// Quote character used for fields that need quoting
    pub quote: u8,
    /// Whether the first non-blank record holds the column names
    pub has_header: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            has_header: true,
        }
    }
}

impl CsvConfig {
    pub const fn new(delimiter: u8, has_header: bool) -> Self {
        Self {
            delimiter,
            quote: b'"',
            has_header,
        }
    }

    pub const fn with_quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }
}

/// Decode CSV text into an array of rows.
///
/// Blank lines are skipped, while a quoted empty field is kept as a value.
/// In header mode every record must have exactly as many fields as the
/// header; a mismatch fails with [`ErrorKind::Shape`] rather than truncating
/// or padding the row.
pub fn decode(input: &str, config: &CsvConfig) -> Result<Node> {
    let mut reader = ReaderBuilder::new()
        .delimiter(config.delimiter)
        .quote(config.quote)
        .has_headers(false)
        .flexible(true)
        .from_reader(input.as_bytes());

    let mut header: Option<Vec<String>> = None;
    let mut rows = Array::new();

    for record in reader.records() {
        let record = record.map_err(|err| Error::shape(err.to_string()))?;
        if is_blank_line(&record, input, config.quote) {
            continue;
        }

        if !config.has_header {
            rows.push(record.iter().collect::<Array>());
            continue;
        }

        match &header {
            None => header = Some(record.iter().map(str::to_string).collect()),
            Some(keys) if keys.len() != record.len() => {
                let line = record
                    .position()
                    .map_or(0, |pos| u32::try_from(pos.line()).unwrap_or(u32::MAX));
                return Err(Error::at(
                    ErrorKind::Shape,
                    format!(
                        "record on line {line} has {} fields, header has {}",
                        record.len(),
                        keys.len()
                    ),
                    Pos::new(0, line, 1),
                ));
            }
            Some(keys) => {
                let row: Object = keys.iter().cloned().zip(record.iter()).collect();
                rows.push(row);
            }
        }
    }

    debug!(rows = rows.len(), "decoded csv table");
    Ok(Node::Array(rows))
}

/// Encode an array of rows as CSV text.
///
/// For object rows the header is taken from the keys of the first row only;
/// later rows are written against that header, with missing keys left empty
/// and extra keys ignored. Array rows are written as-is without a header.
pub fn encode(node: &Node, config: &CsvConfig) -> Result<String> {
    let Node::Array(rows) = node else {
        return Err(Error::shape("csv input must be an array of rows"));
    };
    let Some(first) = rows.first() else {
        return Err(Error::shape("cannot derive a header from an empty row list"));
    };

    let mut out = Vec::new();

    match first {
        Node::Object(first) => {
            let header: Vec<&str> = first.keys().map(String::as_str).collect();
            if header.is_empty() {
                return Err(Error::shape("first row has no columns"));
            }
            write_record(&mut out, &header, config)?;

            for (index, row) in rows.iter().enumerate() {
                let Node::Object(row) = row else {
                    return Err(Error::shape(format!("row {index} is not an object")));
                };
                let fields = header
                    .iter()
                    .map(|key| match row.get(key) {
                        None => Ok(""),
                        Some(value) => scalar_field(value, index),
                    })
                    .collect::<Result<Vec<_>>>()?;
                write_record(&mut out, &fields, config)?;
            }
        }
        Node::Array(_) => {
            for (index, row) in rows.iter().enumerate() {
                let Node::Array(row) = row else {
                    return Err(Error::shape(format!("row {index} is not an array")));
                };
                let fields = row
                    .iter()
                    .map(|value| scalar_field(value, index))
                    .collect::<Result<Vec<_>>>()?;
                write_record(&mut out, &fields, config)?;
            }
        }
        Node::Scalar(_) => return Err(Error::shape("rows must be objects or arrays")),
    }

    String::from_utf8(out).map_err(|err| Error::shape(err.to_string()))
}

fn scalar_field(value: &Node, row: usize) -> Result<&str> {
    value
        .as_scalar()
        .ok_or_else(|| Error::shape(format!("row {row} holds a nested value")))
}

/// Write one record. A lone blank field is always quoted so it does not read
/// back as a blank line.
fn write_record(out: &mut Vec<u8>, fields: &[&str], config: &CsvConfig) -> Result<()> {
    let style = match fields {
        [only] if only.trim().is_empty() => QuoteStyle::Always,
        _ => QuoteStyle::Necessary,
    };
    let mut writer = WriterBuilder::new()
        .delimiter(config.delimiter)
        .quote(config.quote)
        .quote_style(style)
        .from_writer(out);
    writer
        .write_record(fields)
        .map_err(|err| Error::shape(err.to_string()))?;
    writer.flush().map_err(|err| Error::shape(err.to_string()))
}

/// True for records read from an empty or whitespace-only source line.
///
/// The reader yields the same single blank field for `   ` and `" "`, so the
/// raw line is checked for a quote.
fn is_blank_line(record: &StringRecord, input: &str, quote: u8) -> bool {
    if record.len() == 0 {
        return true;
    }
    if record.len() != 1 || !record.iter().all(|f| f.trim().is_empty()) {
        return false;
    }
    let start = record
        .position()
        .and_then(|pos| usize::try_from(pos.byte()).ok())
        .unwrap_or(0);
    let line = input
        .as_bytes()
        .get(start..)
        .unwrap_or_default()
        .split(|b| *b == b'\n')
        .next()
        .unwrap_or_default();
    !line.contains(&quote)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Node {
        Node::Object(pairs.iter().copied().collect())
    }

    #[test]
    fn test_decode_with_header() -> Result<()> {
        let node = decode("name,age\nann,31\n\nbob,42\n", &CsvConfig::default())?;
        let expected = Node::from(vec![
            row(&[("name", "ann"), ("age", "31")]),
            row(&[("name", "bob"), ("age", "42")]),
        ]);
        assert_eq!(node, expected);
        Ok(())
    }

    #[test]
    fn test_decode_skips_leading_blank_lines() -> Result<()> {
        let node = decode("\n   \na;b\n1;2\n", &CsvConfig::new(b';', true))?;
        assert_eq!(node, Node::from(vec![row(&[("a", "1"), ("b", "2")])]));
        Ok(())
    }

    #[test]
    fn test_decode_without_header() -> Result<()> {
        let node = decode("1,2\n3\n", &CsvConfig::new(b',', false))?;
        let expected = Node::from(vec![
            Node::Array(["1", "2"].into_iter().collect()),
            Node::Array(["3"].into_iter().collect()),
        ]);
        assert_eq!(node, expected);
        Ok(())
    }

    #[test]
    fn test_short_row_is_shape_error() {
        let err = decode("a,b,c\n1,2\n", &CsvConfig::default()).err();
        assert_eq!(err.as_ref().map(|e| e.kind().clone()), Some(ErrorKind::Shape));
        assert_eq!(err.map(|e| e.span().start.line), Some(2));
    }

    #[test]
    fn test_long_row_is_shape_error() {
        let err = decode("a\n1,2\n", &CsvConfig::default()).err();
        assert_eq!(err.map(|e| e.kind().clone()), Some(ErrorKind::Shape));
    }

    #[test]
    fn test_single_column_blank_values_survive() -> Result<()> {
        let config = CsvConfig::default();
        let rows = Node::from(vec![row(&[("a", "1")]), row(&[("a", "")]), row(&[("a", " ")])]);
        let text = encode(&rows, &config)?;
        assert_eq!(text, "a\n1\n\"\"\n\" \"\n");
        assert_eq!(decode(&text, &config)?, rows);
        Ok(())
    }

    #[test]
    fn test_unquoted_blank_lines_are_skipped() -> Result<()> {
        let node = decode("a\n  \n1\n\t\n", &CsvConfig::default())?;
        assert_eq!(node, Node::from(vec![row(&[("a", "1")])]));
        Ok(())
    }

    #[test]
    fn test_encode_quotes_when_needed() -> Result<()> {
        let rows = Node::from(vec![row(&[("a", "x;y"), ("b", "say \"hi\""), ("c", "l1\nl2")])]);
        let text = encode(&rows, &CsvConfig::new(b';', true))?;
        assert_eq!(text, "a;b;c\n\"x;y\";\"say \"\"hi\"\"\";\"l1\nl2\"\n");
        Ok(())
    }

    #[test]
    fn test_encode_uses_first_row_header() -> Result<()> {
        let rows = Node::from(vec![
            row(&[("a", "1"), ("b", "2")]),
            row(&[("b", "4"), ("z", "ignored")]),
        ]);
        assert_eq!(encode(&rows, &CsvConfig::default())?, "a,b\n1,2\n,4\n");
        Ok(())
    }

    #[test]
    fn test_encode_array_rows() -> Result<()> {
        let rows = Node::from(vec![Node::Array(["1", "2"].into_iter().collect())]);
        assert_eq!(encode(&rows, &CsvConfig::default())?, "1,2\n");
        Ok(())
    }

    #[test]
    fn test_encode_rejects_bad_shapes() {
        let empty = Node::Array(Array::new());
        let nested = Node::from(vec![Node::Object(
            [("a", Node::from(vec![Node::from("x")]))].into_iter().collect(),
        )]);
        for node in [empty, nested, Node::from("flat")] {
            let kind = encode(&node, &CsvConfig::default()).err().map(|e| e.kind().clone());
            assert_eq!(kind, Some(ErrorKind::Shape));
        }
    }

    #[test]
    fn test_round_trip_semicolon() -> Result<()> {
        let config = CsvConfig::new(b';', true);
        let rows = Node::from(vec![row(&[("a", "1"), ("b", "2")])]);
        assert_eq!(decode(&encode(&rows, &config)?, &config)?, rows);
        Ok(())
    }
}
