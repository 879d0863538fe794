//! Tabular Record Converter
//!
//! Converts comma-delimited text into an ordered sequence of
//! field/value records and back. The first input line is the header;
//! every record shares the header's field set in header order.
//! Values stay text, no type inference. Plain split only -- quoting
//! and embedded delimiters are out of scope.

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors the converter itself can produce. Everything else
/// (network, auth, deployment) belongs to the platform collaborators.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("malformed input: {0}")]
    MalformedInput(&'static str),

    /// A data row whose field count disagrees with the header is
    /// rejected outright rather than silently truncated or padded.
    #[error("malformed row at line {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// An ordered sequence of records sharing one header.
///
/// Constructed fresh from one input document per conversion call and
/// immutable once produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// A borrowed view of one row, paired positionally with the header.
#[derive(Clone, Copy, Debug)]
pub struct Record<'a> {
    header: &'a [String],
    values: &'a [String],
}

impl<'a> Record<'a> {
    /// Iterate the record's fields in header order.
    pub fn fields(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.header
            .iter()
            .zip(self.values.iter())
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Look up a field value by name.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.header
            .iter()
            .position(|h| h == name)
            .map(|i| self.values[i].as_str())
    }
}

impl Table {
    /// The header field names, in input order.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Number of records (non-header rows).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate records in input row order.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(|values| Record {
            header: &self.header,
            values,
        })
    }

    /// Serialize to a JSON array of objects, one per record, keys in
    /// header order, all values as JSON strings.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.to_json_value()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Pretty-printed variant of [`Table::to_json`]; this is the form
    /// the deployed agent replies with.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.to_json_value()).unwrap_or_else(|_| "[]".to_string())
    }

    fn to_json_value(&self) -> Value {
        let records: Vec<Value> = self
            .rows
            .iter()
            .map(|values| {
                let mut object = Map::with_capacity(self.header.len());
                for (name, value) in self.header.iter().zip(values.iter()) {
                    object.insert(name.clone(), Value::String(value.clone()));
                }
                Value::Object(object)
            })
            .collect();
        Value::Array(records)
    }

    /// Emit the table back as comma-delimited text: header line plus
    /// one line per record. Inverse of [`parse`].
    pub fn to_csv(&self) -> String {
        let mut out = self.header.join(",");
        for row in &self.rows {
            out.push('\n');
            out.push_str(&row.join(","));
        }
        out
    }
}

/// Parse comma-delimited text into a [`Table`].
///
/// The first line is the header. Each subsequent non-empty line is
/// split on the delimiter and paired positionally with the header.
/// Blank lines are skipped. Field values are taken verbatim between
/// delimiters, no trimming.
///
/// Fails with [`ConvertError::MalformedInput`] when there is no
/// header line, and with [`ConvertError::MalformedRow`] when a data
/// row's field count disagrees with the header. A header-only
/// document parses to an empty table.
pub fn parse(text: &str) -> Result<Table, ConvertError> {
    let mut lines = text.lines();

    let header_line = lines
        .next()
        .ok_or(ConvertError::MalformedInput("no header line"))?;
    if header_line.is_empty() {
        return Err(ConvertError::MalformedInput("empty header line"));
    }

    let header: Vec<String> = header_line.split(',').map(|s| s.to_string()).collect();

    let mut rows = Vec::new();
    for (i, line) in lines.enumerate() {
        if line.is_empty() {
            continue;
        }

        let values: Vec<String> = line.split(',').map(|s| s.to_string()).collect();
        if values.len() != header.len() {
            return Err(ConvertError::MalformedRow {
                // Header is line 1, so the first data line is line 2.
                line: i + 2,
                expected: header.len(),
                found: values.len(),
            });
        }
        rows.push(values);
    }

    Ok(Table { header, rows })
}

/// A structural summary of parsed input, used by the agent's
/// analysis step before conversion.
#[derive(Clone, Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub total_rows: usize,
    pub total_columns: usize,
    pub columns: Vec<String>,
    pub first_record: Option<Value>,
}

/// Analyze comma-delimited text: row/column counts, column names,
/// and a preview of the first record. Same failure taxonomy as
/// [`parse`].
pub fn analyze(text: &str) -> Result<TableSummary, ConvertError> {
    let table = parse(text)?;

    let first_record = table.records().next().map(|record| {
        let mut object = Map::with_capacity(table.header().len());
        for (name, value) in record.fields() {
            object.insert(name.to_string(), Value::String(value.to_string()));
        }
        Value::Object(object)
    });

    Ok(TableSummary {
        total_rows: table.len(),
        total_columns: table.header().len(),
        columns: table.header().to_vec(),
        first_record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "name,age,city\nJohn,25,NYC\nJane,30,LA";

    #[test]
    fn test_parse_sample() {
        let table = parse(SAMPLE).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.header(), &["name", "age", "city"]);

        let first = table.records().next().unwrap();
        assert_eq!(first.get("name"), Some("John"));
        assert_eq!(first.get("age"), Some("25"));
        assert_eq!(first.get("city"), Some("NYC"));
    }

    #[test]
    fn test_sample_json_output_exact() {
        let table = parse(SAMPLE).unwrap();
        assert_eq!(
            table.to_json(),
            r#"[{"name":"John","age":"25","city":"NYC"},{"name":"Jane","age":"30","city":"LA"}]"#
        );
    }

    #[test]
    fn test_values_stay_text() {
        let table = parse("id,active\n7,true").unwrap();
        let record = table.records().next().unwrap();
        // No type inference: "7" and "true" remain text.
        assert_eq!(record.get("id"), Some("7"));
        assert_eq!(record.get("active"), Some("true"));
        assert!(table.to_json().contains(r#""id":"7""#));
    }

    #[test]
    fn test_record_count_matches_data_lines() {
        let table = parse("a,b\n1,2\n\n3,4\n").unwrap();
        // Blank lines and the trailing newline are not records.
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_header_order_preserved() {
        let table = parse("zeta,alpha,mid\n1,2,3").unwrap();
        let record = table.records().next().unwrap();
        let names: Vec<&str> = record.fields().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        // JSON keys keep header order too.
        let json = table.to_json();
        let zeta = json.find("zeta").unwrap();
        let alpha = json.find("alpha").unwrap();
        let mid = json.find("mid").unwrap();
        assert!(zeta < alpha && alpha < mid);
    }

    #[test]
    fn test_header_only_is_empty_table() {
        let table = parse("name,age,city").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.to_json(), "[]");
    }

    #[test]
    fn test_empty_input_is_malformed() {
        assert_eq!(parse(""), Err(ConvertError::MalformedInput("no header line")));
    }

    #[test]
    fn test_blank_header_line_is_malformed() {
        assert_eq!(
            parse("\na,b"),
            Err(ConvertError::MalformedInput("empty header line"))
        );
    }

    #[test]
    fn test_short_row_is_rejected() {
        let err = parse("a,b,c\n1,2").unwrap_err();
        assert_eq!(
            err,
            ConvertError::MalformedRow {
                line: 2,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_long_row_is_rejected() {
        let err = parse("a,b\n1,2\n1,2,3").unwrap_err();
        assert_eq!(
            err,
            ConvertError::MalformedRow {
                line: 3,
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn test_round_trip() {
        let table = parse(SAMPLE).unwrap();
        let rebuilt = parse(&table.to_csv()).unwrap();
        assert_eq!(table, rebuilt);
    }

    #[test]
    fn test_analyze_sample() {
        let summary = analyze(SAMPLE).unwrap();
        assert_eq!(summary.total_rows, 2);
        assert_eq!(summary.total_columns, 3);
        assert_eq!(summary.columns, vec!["name", "age", "city"]);
        let first = summary.first_record.unwrap();
        assert_eq!(first["name"], "John");
    }

    #[test]
    fn test_analyze_header_only() {
        let summary = analyze("name,age").unwrap();
        assert_eq!(summary.total_rows, 0);
        assert!(summary.first_record.is_none());
    }
}
