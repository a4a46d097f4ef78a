use super::models::{FileRecord, Fingerprint};
use super::{path_from_bytes, HEADER, LEGACY_FINGERPRINT_COLUMN};
use crate::error::Error;
use ahash::AHashSet;
use csv::ByteRecord;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Read every record of the manifest at `path`, in file order.
pub fn read_manifest(path: &Path) -> Result<Vec<FileRecord>, Error> {
    let file = File::open(path).map_err(|e| Error::Manifest {
        path: path.to_path_buf(),
        line: 0,
        reason: e.to_string(),
    })?;
    read_manifest_from(BufReader::new(file), path)
}

/// Parse a manifest from any reader. `source` names it in errors.
///
/// Any malformed row fails the whole read.
pub fn read_manifest_from<R: Read>(reader: R, source: &Path) -> Result<Vec<FileRecord>, Error> {
    let malformed = |line: u64, reason: String| Error::Manifest {
        path: source.to_path_buf(),
        line,
        reason,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr
        .byte_headers()
        .map_err(|e| malformed(error_line(&e), e.to_string()))?
        .clone();
    check_header(&headers).map_err(|reason| malformed(1, reason))?;

    let mut records = Vec::new();
    let mut seen: AHashSet<PathBuf> = AHashSet::new();
    let mut row = ByteRecord::new();

    loop {
        let more = rdr
            .read_byte_record(&mut row)
            .map_err(|e| malformed(error_line(&e), e.to_string()))?;
        if !more {
            break;
        }
        // Line the row starts on; quoted fields may span several.
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let record = parse_row(&row).map_err(|reason| malformed(line, reason))?;

        if !seen.insert(record.path.clone()) {
            return Err(malformed(
                line,
                format!("duplicate path '{}'", record.path.display()),
            ));
        }
        records.push(record);
    }

    Ok(records)
}

fn parse_row(row: &ByteRecord) -> Result<FileRecord, String> {
    let field = |i: usize| row.get(i).ok_or_else(|| format!("missing column {}", HEADER[i]));
    let text = |i: usize| {
        field(i).and_then(|bytes| {
            std::str::from_utf8(bytes).map_err(|_| format!("{} is not valid UTF-8", HEADER[i]))
        })
    };

    let raw_path = field(0)?;
    if raw_path.is_empty() {
        return Err("empty full_path".to_string());
    }
    let path = path_from_bytes(raw_path)
        .ok_or_else(|| "full_path cannot be represented on this platform".to_string())?;

    let size_text = text(1)?;
    let size = size_text
        .parse::<u64>()
        .map_err(|_| format!("invalid size '{}'", size_text))?;
    let fingerprint = text(4)?
        .parse::<Fingerprint>()
        .map_err(|e| e.to_string())?;

    Ok(FileRecord {
        path,
        size,
        created: text(2)?.to_string(),
        modified: text(3)?.to_string(),
        fingerprint,
    })
}

fn check_header(headers: &ByteRecord) -> Result<(), String> {
    let matches = headers.len() == HEADER.len()
        && headers.iter().zip(HEADER).all(|(found, expected)| {
            found == expected.as_bytes()
                || (expected == "fingerprint" && found == LEGACY_FINGERPRINT_COLUMN.as_bytes())
        });
    if matches {
        Ok(())
    } else {
        let found: Vec<String> = headers
            .iter()
            .map(|h| String::from_utf8_lossy(h).into_owned())
            .collect();
        Err(format!(
            "expected header '{}', found '{}'",
            HEADER.join(","),
            found.join(",")
        ))
    }
}

fn error_line(err: &csv::Error) -> u64 {
    err.position().map(|p| p.line()).unwrap_or(0)
}
