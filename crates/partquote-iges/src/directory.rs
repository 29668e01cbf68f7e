//! Directory entries: two 72-column lines of 8-column fields per entity.

use crate::error::IgesError;

const FIELD_WIDTH: usize = 8;

/// Entity type numbers the reader understands.
pub mod entity_type {
    /// Circular arc.
    pub const CIRCULAR_ARC: i64 = 100;
    /// Line segment.
    pub const LINE: i64 = 110;
    /// Point.
    pub const POINT: i64 = 116;
    /// Rational B-spline curve.
    pub const RATIONAL_BSPLINE_CURVE: i64 = 126;
}

/// One directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Sequence number of the entry's first line (odd, 1-based).
    pub sequence: usize,
    /// Entity type number.
    pub entity_type: i64,
    /// First parameter line (1-based).
    pub parameter_pointer: usize,
    /// Number of parameter lines.
    pub parameter_lines: usize,
    /// Pointer to a transformation matrix entity, 0 for none.
    pub transform: i64,
    /// Form number.
    pub form: i64,
}

/// Parse the directory section into entries.
pub fn parse_directory(lines: &[String]) -> Result<Vec<DirectoryEntry>, IgesError> {
    if lines.len() % 2 != 0 {
        return Err(IgesError::parameter(
            lines.len(),
            "directory entry is missing its second line",
        ));
    }
    lines
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| {
            let sequence = 2 * i + 1;
            let int = |line: &str, field: usize| field_int(line, field, sequence);
            let pointer = int(&pair[0], 2)?;
            let count = int(&pair[1], 4)?;
            Ok(DirectoryEntry {
                sequence,
                entity_type: int(&pair[0], 1)?,
                parameter_pointer: usize::try_from(pointer)
                    .map_err(|_| IgesError::parameter(sequence, "negative parameter pointer"))?,
                parameter_lines: usize::try_from(count)
                    .map_err(|_| IgesError::parameter(sequence, "negative parameter line count"))?,
                transform: int(&pair[0], 7)?,
                form: int(&pair[1], 5)?,
            })
        })
        .collect()
}

/// Integer in 1-based 8-column field `field`; blank reads as 0.
fn field_int(line: &str, field: usize, sequence: usize) -> Result<i64, IgesError> {
    let start = (field - 1) * FIELD_WIDTH;
    let text = line.get(start..start + FIELD_WIDTH).unwrap_or("").trim();
    if text.is_empty() {
        return Ok(0);
    }
    text.parse()
        .map_err(|_| IgesError::parameter(sequence, format!("field {field} is not an integer: '{text}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(values: &[&str]) -> String {
        format!("{:<72}", values.iter().map(|v| format!("{v:>8}")).collect::<String>())
    }

    #[test]
    fn test_parse_entries() {
        let lines = vec![
            fields(&["110", "1", "0", "0", "0", "0", "0", "0", "00000000"]),
            fields(&["110", "0", "0", "1", "0", "", "", "LINE", "0"]),
            fields(&["100", "2", "0", "0", "0", "0", "3", "0", "00000000"]),
            fields(&["100", "0", "0", "2", "1"]),
        ];
        let entries = parse_directory(&lines).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].entity_type, entity_type::LINE);
        assert_eq!(entries[0].parameter_pointer, 1);
        assert_eq!(entries[1].sequence, 3);
        assert_eq!(entries[1].transform, 3);
        assert_eq!(entries[1].parameter_lines, 2);
        assert_eq!(entries[1].form, 1);
    }

    #[test]
    fn test_odd_line_count() {
        let lines = vec![fields(&["110", "1"])];
        assert!(parse_directory(&lines).is_err());
    }

    #[test]
    fn test_non_numeric_field() {
        let lines = vec![fields(&["LINE", "1"]), fields(&["110"])];
        assert!(matches!(
            parse_directory(&lines),
            Err(IgesError::InvalidParameter { directory_line: 1, .. })
        ));
    }
}
