//! Spreadsheet rows as uploaded for a template
//!
//! Sheets arrive either as CSV exports or as the JSON row array a
//! spreadsheet library produces (one object per row, keyed by header).
//! Column order is preserved in both cases.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::services::format::parse_amount;
use crate::types::{PosterError, Result};

/// A single cell value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Trimmed display text. Whole numbers print without a fraction.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.trim().to_string(),
        }
    }

    /// Numeric value; text may carry separators and a 万/亿 unit
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => parse_amount(s),
            CellValue::Empty | CellValue::Bool(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// One row: `(header, value)` pairs in column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRow {
    cells: Vec<(String, CellValue)>,
}

impl SheetRow {
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, CellValue)>,
        K: Into<String>,
    {
        Self {
            cells: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Value of the column whose header is exactly `header`
    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| k == header).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<'de> Deserialize<'de> for SheetRow {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = SheetRow;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of header -> cell value")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<SheetRow, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut cells = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, CellValue>()? {
                    cells.push((key, value));
                }
                Ok(SheetRow { cells })
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

/// All rows of the first worksheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub rows: Vec<SheetRow>,
}

impl Sheet {
    /// Load a sheet, picking the format from the file extension
    pub fn load(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("csv") => Self::from_csv_path(path),
            Some("json") => Self::from_json_path(path),
            _ => Err(PosterError::Sheet(format!(
                "unsupported sheet format: {} (expected .csv or .json)",
                path.display()
            ))),
        }
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        Self::from_csv_reader(File::open(path)?)
    }

    /// Read CSV with a header row. Cells are kept as text so codes such as
    /// `000001` keep their leading zeros; empty cells become [`CellValue::Empty`].
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let row = SheetRow::from_pairs(headers.iter().zip(record.iter()).map(|(h, v)| {
                let cell = if v.trim().is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(v.to_string())
                };
                (h, cell)
            }));
            if row.iter().all(|(_, v)| v.is_empty()) {
                continue;
            }
            rows.push(row);
        }

        Ok(Self { rows })
    }

    pub fn from_json_path(path: &Path) -> Result<Self> {
        let mut content = std::fs::read(path)?;
        Self::from_json_slice(&mut content)
    }

    /// Parse a JSON array of row objects (SIMD accelerated, parses in place)
    pub fn from_json_slice(content: &mut [u8]) -> Result<Self> {
        let rows: Vec<SheetRow> = simd_json::from_slice(content)
            .map_err(|e| PosterError::Sheet(format!("invalid sheet json: {}", e)))?;
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }

    // ========== CellValue ==========

    #[test]
    fn test_cell_as_text() {
        assert_eq!(CellValue::Number(3.0).as_text(), "3");
        assert_eq!(CellValue::Number(1.25).as_text(), "1.25");
        assert_eq!(CellValue::Text("  铜 ".into()).as_text(), "铜");
        assert_eq!(CellValue::Empty.as_text(), "");
    }

    #[test]
    fn test_cell_as_number() {
        assert_eq!(CellValue::Number(3.5).as_number(), Some(3.5));
        assert_eq!(CellValue::Text("1.2亿".into()).as_number(), Some(1.2e8));
        assert_eq!(CellValue::Text("abc".into()).as_number(), None);
        assert_eq!(CellValue::Empty.as_number(), None);
    }

    // ========== JSON ==========

    #[test]
    fn test_json_rows_keep_column_order() {
        let mut json = br#"[{"b":1,"a":"x","c":null,"d":true}]"#.to_vec();
        let sheet = Sheet::from_json_slice(&mut json).unwrap();

        let headers: Vec<&str> = sheet.rows[0].iter().map(|(h, _)| h).collect();
        assert_eq!(headers, vec!["b", "a", "c", "d"]);
        assert_eq!(sheet.rows[0].get("b"), Some(&CellValue::Number(1.0)));
        assert_eq!(sheet.rows[0].get("a"), Some(&CellValue::Text("x".into())));
        assert_eq!(sheet.rows[0].get("c"), Some(&CellValue::Empty));
        assert_eq!(sheet.rows[0].get("d"), Some(&CellValue::Bool(true)));
    }

    #[test]
    fn test_json_invalid_is_sheet_error() {
        let mut json = b"{not json".to_vec();
        let err = Sheet::from_json_slice(&mut json).unwrap_err();
        assert!(matches!(err, PosterError::Sheet(_)));
    }

    #[test]
    fn test_load_json_fixture() {
        let sheet = Sheet::load(&fixture_path("performance_forecast.json")).unwrap();
        assert_eq!(sheet.len(), 3);
    }

    // ========== CSV ==========

    #[test]
    fn test_csv_keeps_text_and_skips_blank_rows() {
        let csv = "股票代码,股票简称,涨停原因\n000001,平安银行,金融\n,,\n600000, 浦发银行 ,\n";
        let sheet = Sheet::from_csv_reader(csv.as_bytes()).unwrap();

        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.rows[0].get("股票代码").unwrap().as_text(), "000001");
        assert_eq!(sheet.rows[1].get("股票简称").unwrap().as_text(), "浦发银行");
        assert_eq!(sheet.rows[1].get("涨停原因"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_load_csv_fixture() {
        let sheet = Sheet::load(&fixture_path("limit_review.csv")).unwrap();
        assert_eq!(sheet.len(), 6);
    }

    #[test]
    fn test_load_unsupported_extension() {
        let err = Sheet::load(Path::new("data.xlsx")).unwrap_err();
        assert!(matches!(err, PosterError::Sheet(_)));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(Sheet::load(Path::new("/nonexistent/sheet.csv")).is_err());
    }
}
