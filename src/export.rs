use std::io::Write;
use std::path::Path;

use crate::error::SearchError;
use crate::results::Match;

/// Column names of the CSV export, in order.
pub const CSV_HEADER: [&str; 4] = ["file", "page", "used_ocr", "snippet"];

/// Write `matches` as UTF-8 CSV with a header row.
///
/// `used_ocr` is written as `True` or `False`, the spelling existing
/// consumers of these exports already parse.
pub fn write_csv<W: Write>(writer: W, matches: &[Match]) -> Result<(), SearchError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(CSV_HEADER).map_err(csv_error)?;

    for m in matches {
        let page = m.page.to_string();
        let file = m.path.to_string_lossy();
        out.write_record([
            &*file,
            page.as_str(),
            if m.used_ocr { "True" } else { "False" },
            m.snippet.as_str(),
        ])
        .map_err(csv_error)?;
    }

    out.flush().map_err(|source| SearchError::Io {
        path: Default::default(),
        source,
    })
}

/// Write `matches` to a CSV file at `path`, replacing it if present.
pub fn export_csv(path: &Path, matches: &[Match]) -> Result<(), SearchError> {
    let file = std::fs::File::create(path).map_err(|source| SearchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(std::io::BufWriter::new(file), matches)
}

fn csv_error(e: csv::Error) -> SearchError {
    SearchError::Io {
        path: Default::default(),
        source: e.into(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn header_and_quoting() {
        let matches = vec![
            Match {
                path:     PathBuf::from("/docs/report.pdf"),
                page:     2,
                snippet:  "revenue, \"adjusted\" figures".into(),
                used_ocr: false,
            },
            Match {
                path:     PathBuf::from("/docs/scan.pdf"),
                page:     1,
                snippet:  "Revenue growth".into(),
                used_ocr: true,
            },
        ];

        let mut buf = Vec::new();
        write_csv(&mut buf, &matches).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "file,page,used_ocr,snippet");
        assert_eq!(lines[1], r#"/docs/report.pdf,2,False,"revenue, ""adjusted"" figures""#);
        assert_eq!(lines[2], "/docs/scan.pdf,1,True,Revenue growth");
    }

    #[test]
    fn empty_export_still_has_header() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "file,page,used_ocr,snippet\n");
    }
}
