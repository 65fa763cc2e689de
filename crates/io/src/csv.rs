// CSV reading and writing for header-keyed tables

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use log::warn;

use crate::error::BankError;

/// A parsed CSV file: header names in file order and one map per data row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<HashMap<String, String>>,
}

pub fn read(path: &Path) -> Result<CsvTable, BankError> {
    let content = read_file_as_utf8(path)?;
    parse(&content)
}

/// Parse CSV text. Blank and whitespace-only lines are skipped, every field is trimmed, and rows
/// shorter than the header get empty strings for the missing columns.
pub fn parse(content: &str) -> Result<CsvTable, BankError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut seen = std::collections::HashSet::new();
    for h in &headers {
        if !seen.insert(h) {
            warn!("duplicate column {:?}: the rightmost value wins", h);
        }
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        // A whitespace-only line trims down to a single empty field
        if headers.len() > 1 && record.len() == 1 && record[0].is_empty() {
            continue;
        }
        let mut row = HashMap::with_capacity(headers.len());
        for (i, name) in headers.iter().enumerate() {
            row.insert(name.clone(), record.get(i).unwrap_or("").to_string());
        }
        if record.len() > headers.len() {
            let (row_no, fields) = (rows.len() + 1, record.len());
            warn!("row {} has {} fields, header has {}", row_no, fields, headers.len());
        }
        rows.push(row);
    }

    Ok(CsvTable { headers, rows })
}

/// Serialize a table. Fields containing a comma, quote, or newline are quoted
/// with embedded quotes doubled; records end with `\n`.
pub fn to_string(headers: &[String], rows: &[Vec<String>]) -> Result<String, BankError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| BankError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| BankError::Csv(e.to_string()))
}

pub fn write(path: &Path, headers: &[String], rows: &[Vec<String>]) -> Result<(), BankError> {
    let content = to_string(headers, rows)?;
    std::fs::write(path, content).map_err(|e| BankError::io(path, e))
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, BankError> {
    let mut file = std::fs::File::open(path).map_err(|e| BankError::io(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| BankError::io(path, e))?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            warn!("{}: not valid UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_quoted_fields() {
        let content = "id,text\n1,\"a, b\"\n2,\"say \"\"hi\"\"\"\n3,\"two\nlines\"\n";
        let table = parse(content).unwrap();
        assert_eq!(table.headers, strings(&["id", "text"]));
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0]["text"], "a, b");
        assert_eq!(table.rows[1]["text"], "say \"hi\"");
        assert_eq!(table.rows[2]["text"], "two\nlines");
    }

    #[test]
    fn test_parse_skips_blank_lines_and_pads_short_rows() {
        let content = "a,b,c\n\n1,2\n\n  4 , 5 ,6  \n";
        let table = parse(content).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["c"], "");
        assert_eq!(table.rows[1]["a"], "4");
        assert_eq!(table.rows[1]["b"], "5");
        assert_eq!(table.rows[1]["c"], "6");
    }

    #[test]
    fn test_parse_skips_whitespace_only_lines() {
        let table = parse("a,b\n1,2\n   \n3,4\n\t\n").unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1]["a"], "3");
    }

    #[test]
    fn test_parse_keeps_all_empty_records() {
        let table = parse("a,b\n,\n1,2\n").unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["a"], "");
        assert_eq!(table.rows[0]["b"], "");
    }

    #[test]
    fn test_parse_strips_bom() {
        let table = parse("\u{feff}cluster,topic\nx,y\n").unwrap();
        assert_eq!(table.headers[0], "cluster");
    }

    #[test]
    fn test_to_string_quotes_only_when_needed() {
        let out = to_string(
            &strings(&["a", "b"]),
            &[strings(&["plain", "has,comma"]), strings(&["has \"quote\"", "line\nbreak"])],
        )
        .unwrap();
        assert_eq!(out, "a,b\nplain,\"has,comma\"\n\"has \"\"quote\"\"\",\"line\nbreak\"\n");
    }

    #[test]
    fn test_empty_file_has_no_headers() {
        let table = parse("").unwrap();
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // "café" with 0xE9 for é
        fs::write(&path, b"name\ncaf\xe9\n").unwrap();
        let table = read(&path).unwrap();
        assert_eq!(table.rows[0]["name"], "café");
    }

    #[test]
    fn test_read_missing_file() {
        let err = read(Path::new("/nonexistent/bank.csv")).unwrap_err();
        assert!(matches!(err, BankError::Io { .. }));
    }
}
