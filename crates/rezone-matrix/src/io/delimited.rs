//! Minimal comma/tab separated reader shared by the matrix and lookup loaders.
//!
//! Fields are split on the delimiter, trimmed, and stripped of one pair of
//! surrounding double quotes. Quoted fields containing the delimiter are not
//! supported; zone files never need them.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use rezone_core::errors::LoadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    /// Comma if the line contains one, tab otherwise.
    pub(crate) fn detect(line: &str) -> Self {
        if line.contains(',') {
            Self::Comma
        } else {
            Self::Tab
        }
    }

    fn as_char(self) -> char {
        match self {
            Self::Comma => ',',
            Self::Tab => '\t',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderMode {
    /// The first line is always a header.
    Present,
    /// The first line is a header only when `numeric_column` does not parse as
    /// a number and the line either names a known column or has text zone
    /// cells where the next line has numbers. Anything else is data.
    Detect {
        numeric_column: usize,
        names: &'static [&'static str],
    },
}

/// One data line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Row {
    /// 1-based line number in the file.
    pub line: usize,
    pub fields: Vec<String>,
}

impl Row {
    pub(crate) fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Delimited {
    pub path: PathBuf,
    pub delimiter: Delimiter,
    pub header: Option<Vec<String>>,
    pub rows: Vec<Row>,
}

impl Delimited {
    /// Index of a header column, matched case-insensitively.
    pub(crate) fn column_index(&self, name: &str) -> Option<usize> {
        self.header
            .as_ref()?
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name.trim()))
    }

    pub(crate) fn parse_error(&self, line: usize, reason: impl Into<String>) -> LoadError {
        LoadError::Parse {
            path: self.path.clone(),
            line,
            reason: reason.into(),
        }
    }
}

pub(crate) fn read_delimited(path: &Path, header: HeaderMode) -> Result<Delimited, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
    parse_lines(path, BufReader::new(file), header)
}

pub(crate) fn parse_lines<R: BufRead>(
    path: &Path,
    reader: R,
    header: HeaderMode,
) -> Result<Delimited, LoadError> {
    let mut delimiter = None;
    let mut rows = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| LoadError::io(path, e))?;
        let text = line.trim_start_matches('\u{feff}');
        if text.trim().is_empty() {
            continue;
        }
        let delim = *delimiter.get_or_insert_with(|| Delimiter::detect(text));
        rows.push(Row {
            line: i + 1,
            fields: split_fields(text, delim),
        });
    }

    let Some(delimiter) = delimiter else {
        return Err(LoadError::EmptyFile {
            path: path.to_path_buf(),
        });
    };

    let header_fields = if is_header(&rows[0].fields, rows.get(1), header) {
        Some(rows.remove(0).fields)
    } else {
        None
    };

    Ok(Delimited {
        path: path.to_path_buf(),
        delimiter,
        header: header_fields,
        rows,
    })
}

fn is_number(field: &str) -> bool {
    field.parse::<f64>().is_ok()
}

fn is_header(first: &[String], next: Option<&Row>, mode: HeaderMode) -> bool {
    let HeaderMode::Detect {
        numeric_column,
        names,
    } = mode
    else {
        return true;
    };
    match first.get(numeric_column) {
        Some(value) if !is_number(value) => {}
        _ => return false,
    }

    let names_column = first
        .iter()
        .any(|f| names.iter().any(|n| f.eq_ignore_ascii_case(n)));
    let text_over_numbers = next.is_some_and(|next| {
        (0..numeric_column).any(|i| match (first.get(i), next.field(i)) {
            (Some(a), Some(b)) => !is_number(a) && is_number(b),
            _ => false,
        })
    });
    names_column || text_over_numbers
}

fn split_fields(line: &str, delimiter: Delimiter) -> Vec<String> {
    line.split(delimiter.as_char())
        .map(|f| {
            let f = f.trim();
            f.strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .unwrap_or(f)
                .to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn parse(text: &str, header: HeaderMode) -> Delimited {
        parse_lines(Path::new("test.csv"), Cursor::new(text), header).unwrap()
    }

    const DETECT: HeaderMode = HeaderMode::Detect {
        numeric_column: 2,
        names: &["origin", "destination", "trips"],
    };

    #[test]
    fn test_comma_with_detected_header() {
        let d = parse("origin,destination,trips\n1,2,3.5\n\n2,1,4\n", DETECT);
        assert_eq!(d.delimiter, Delimiter::Comma);
        assert_eq!(d.column_index("TRIPS"), Some(2));
        assert_eq!(d.rows.len(), 2);
        assert_eq!(d.rows[1].line, 4);
        assert_eq!(d.rows[1].field(2), Some("4"));
    }

    #[test]
    fn test_tab_without_header() {
        let d = parse("1\t2\t3.5\n2\t1\t4\n", DETECT);
        assert_eq!(d.delimiter, Delimiter::Tab);
        assert!(d.header.is_none());
        assert_eq!(d.rows.len(), 2);
        assert_eq!(d.rows[0].fields, vec!["1", "2", "3.5"]);
    }

    #[test]
    fn test_quoted_fields_and_bom() {
        let d = parse(
            "\u{feff}\"old\",\"new\",\"factor\"\n\"E01\", \"N1\" ,0.5\n",
            HeaderMode::Present,
        );
        assert_eq!(d.header.as_deref(), Some(&["old".to_string(), "new".to_string(), "factor".to_string()][..]));
        assert_eq!(d.rows[0].fields, vec!["E01", "N1", "0.5"]);
    }

    #[test]
    fn test_empty_input() {
        let err = parse_lines(Path::new("empty.csv"), Cursor::new("\n  \n"), HeaderMode::Present).unwrap_err();
        assert!(matches!(err, LoadError::EmptyFile { .. }));
    }

    #[test]
    fn test_unnamed_header_over_numeric_zones() {
        let d = parse("from,to,volume\n1,2,3.5\n", DETECT);
        assert_eq!(d.column_index("volume"), Some(2));
        assert_eq!(d.rows.len(), 1);
    }

    #[test]
    fn test_bad_first_row_is_kept_as_data() {
        let d = parse("A,X,half\nB,Y,1\n", DETECT);
        assert!(d.header.is_none());
        assert_eq!(d.rows.len(), 2);
        assert_eq!(d.rows[0].field(2), Some("half"));

        let short = parse("A,X\nB,Y,1\n", DETECT);
        assert!(short.header.is_none());
    }
}
