use std::io::ErrorKind;
use std::path::Path;

use csv::StringRecord;

use crate::errors::AppError;

/// A CSV file split into its header row and data rows.
#[derive(Debug, Clone, Default)]
pub struct RawCsv {
    pub header: Vec<String>,
    pub rows: Vec<StringRecord>,
}

/// Read a whole CSV file into memory. The first row is always the header.
///
/// Every row must have the same number of fields as the header; a ragged
/// row or a quote left open is reported as `CsvFormat`.
pub fn read_csv(path: &Path) -> Result<RawCsv, AppError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AppError::FileNotFound(path.display().to_string()),
        _ => AppError::FileRead(format!("{}: {}", path.display(), e)),
    })?;

    // Escaped quotes come in pairs, so an odd count means one never closed.
    if bytes.iter().filter(|&&b| b == b'"').count() % 2 != 0 {
        return Err(AppError::CsvFormat(format!(
            "{}: unterminated quoted field",
            path.display()
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(bytes.as_slice());

    let mut records = reader.records();
    let header = match records.next() {
        Some(first) => first
            .map_err(|e| locate(path, e))?
            .iter()
            .map(|s| s.to_string())
            .collect(),
        None => return Ok(RawCsv::default()),
    };

    let rows = records
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| locate(path, e))?;

    Ok(RawCsv { header, rows })
}

/// Prefix a csv error with the file it came from.
fn locate(path: &Path, err: csv::Error) -> AppError {
    match AppError::from(err) {
        AppError::FileRead(msg) => AppError::FileRead(format!("{}: {}", path.display(), msg)),
        AppError::CsvFormat(msg) => AppError::CsvFormat(format!("{}: {}", path.display(), msg)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_read_strips_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "AAPL.csv",
            "Date,Open,High\n2023-01-03,1,2\n2023-01-04,3,4\n",
        );
        let csv = read_csv(&path).unwrap();
        assert_eq!(csv.header, vec!["Date", "Open", "High"]);
        assert_eq!(csv.rows.len(), 2);
        assert_eq!(&csv.rows[0][0], "2023-01-03");
        assert_eq!(&csv.rows[1][2], "4");
    }

    #[test]
    fn test_read_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "MSFT.csv", "Date,Open\n");
        let csv = read_csv(&path).unwrap();
        assert_eq!(csv.header.len(), 2);
        assert!(csv.rows.is_empty());
    }

    #[test]
    fn test_read_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "EMPTY.csv", "");
        let csv = read_csv(&path).unwrap();
        assert!(csv.header.is_empty());
        assert!(csv.rows.is_empty());
    }

    #[test]
    fn test_read_quoted_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "Q.csv",
            "Date,Close\n\"01/03/2023\",\"$1,250.00\"\n",
        );
        let csv = read_csv(&path).unwrap();
        assert_eq!(&csv.rows[0][1], "$1,250.00");
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_csv(&dir.path().join("NOPE.csv")).unwrap_err();
        assert!(matches!(err, AppError::FileNotFound(_)));
    }

    #[test]
    fn test_read_ragged_rows_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "BAD.csv", "a,b,c\n1,2,3\n4,5\n");
        let err = read_csv(&path).unwrap_err();
        assert!(matches!(err, AppError::CsvFormat(_)), "got {:?}", err);
    }

    #[test]
    fn test_read_unterminated_quote_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "OPEN.csv", "a,b\n1,\"2\n");
        let err = read_csv(&path).unwrap_err();
        assert!(matches!(err, AppError::CsvFormat(_)), "got {:?}", err);
    }

    #[test]
    fn test_read_escaped_quotes_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "ESC.csv", "a,b\n1,\"say \"\"hi\"\"\"\n");
        let csv = read_csv(&path).unwrap();
        assert_eq!(&csv.rows[0][1], "say \"hi\"");
    }
}
