//! Fixed-column record splitting and section assembly.

use crate::error::IgesError;

/// Columns 1-72 carry section data.
const DATA_COLUMNS: usize = 72;
/// Parameter lines keep columns 65-72 for the directory back-pointer.
const PARAMETER_COLUMNS: usize = 64;

/// Section letter in column 73.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Human-readable prologue.
    Start,
    /// Global parameters: delimiters, units, precision.
    Global,
    /// Two lines per entity.
    Directory,
    /// Entity parameter data.
    Parameter,
    /// Line counts per section.
    Terminate,
}

impl Section {
    fn from_letter(c: u8) -> Option<Self> {
        match c {
            b'S' => Some(Section::Start),
            b'G' => Some(Section::Global),
            b'D' => Some(Section::Directory),
            b'P' => Some(Section::Parameter),
            b'T' => Some(Section::Terminate),
            _ => None,
        }
    }
}

/// The sections of an IGES file, with the fixed columns stripped.
#[derive(Debug, Default)]
pub struct Sections {
    /// Columns 1-72 of the global lines, concatenated.
    pub global: String,
    /// Columns 1-72 of each directory line, in order.
    pub directory: Vec<String>,
    /// Columns 1-64 of each parameter line, in order.
    pub parameter: Vec<String>,
}

impl Sections {
    /// Split raw file contents into sections.
    ///
    /// Blank lines are ignored. Compressed-format files (section letter
    /// `C`) are rejected like any other unknown letter.
    pub fn split(data: &[u8]) -> Result<Self, IgesError> {
        let text = String::from_utf8_lossy(data);
        let mut sections = Sections::default();
        let mut seen_global = false;
        let mut seen_directory = false;

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let bytes = line.as_bytes();
            if bytes.len() <= DATA_COLUMNS {
                return Err(IgesError::record(
                    index + 1,
                    format!("expected 80 columns, found {}", bytes.len()),
                ));
            }
            let section = Section::from_letter(bytes[DATA_COLUMNS]).ok_or_else(|| {
                IgesError::record(
                    index + 1,
                    format!("unknown section letter '{}'", bytes[DATA_COLUMNS] as char),
                )
            })?;
            let data = columns(line, DATA_COLUMNS);
            match section {
                Section::Start | Section::Terminate => {}
                Section::Global => {
                    seen_global = true;
                    sections.global.push_str(data);
                }
                Section::Directory => {
                    seen_directory = true;
                    sections.directory.push(data.to_string());
                }
                Section::Parameter => sections
                    .parameter
                    .push(columns(line, PARAMETER_COLUMNS).to_string()),
            }
        }

        if !seen_global {
            return Err(IgesError::MissingSection("global"));
        }
        if !seen_directory {
            return Err(IgesError::MissingSection("directory"));
        }
        Ok(sections)
    }
}

/// The first `n` columns of a line, tolerating non-ASCII bytes.
fn columns(line: &str, n: usize) -> &str {
    let mut end = n.min(line.len());
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(data: &str, letter: char, seq: usize) -> String {
        format!("{data:<72}{letter}{seq:>7}\n")
    }

    fn fields(values: &[&str]) -> String {
        values.iter().map(|v| format!("{v:>8}")).collect()
    }

    #[test]
    fn test_split_sections() {
        let text = [
            line("demo part", 'S', 1),
            line("1H,,1H;,", 'G', 1),
            line("4Hpart;", 'G', 2),
            line(&fields(&["110", "1", "0", "0", "0", "0", "0", "0", "00000000"]), 'D', 1),
            line(&fields(&["110", "0", "0", "1", "0"]), 'D', 2),
            line(&format!("{:<64}{:>8}", "110,0.,0.,0.,1.,0.,0.;", 1), 'P', 1),
            line("S      1G      2D      2P      1", 'T', 1),
        ]
        .concat();
        let sections = Sections::split(text.as_bytes()).unwrap();
        assert!(sections.global.starts_with("1H,,1H;,"));
        assert_eq!(sections.global.len(), 144);
        assert_eq!(sections.directory.len(), 2);
        assert_eq!(sections.parameter.len(), 1);
        assert_eq!(sections.parameter[0].trim_end(), "110,0.,0.,0.,1.,0.,0.;");
    }

    #[test]
    fn test_short_record() {
        let err = Sections::split(b"too short\n").unwrap_err();
        assert!(matches!(err, IgesError::InvalidRecord { line: 1, .. }));
    }

    #[test]
    fn test_missing_sections() {
        let text = line("start only", 'S', 1);
        assert!(matches!(
            Sections::split(text.as_bytes()),
            Err(IgesError::MissingSection("global"))
        ));
        let text = [line("start", 'S', 1), line("1H,,1H;;", 'G', 1)].concat();
        assert!(matches!(
            Sections::split(text.as_bytes()),
            Err(IgesError::MissingSection("directory"))
        ));
    }

    #[test]
    fn test_unknown_section_letter() {
        let text = line("compressed", 'C', 1);
        assert!(matches!(
            Sections::split(text.as_bytes()),
            Err(IgesError::InvalidRecord { line: 1, .. })
        ));
    }
}
