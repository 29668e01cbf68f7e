//! Free-format parameter tokenizer and global section.

/// One delimited parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Empty field; the entity's default applies.
    Default,
    /// Hollerith string (`nH...`).
    Text(String),
    /// Any other field: integer, real, or pointer.
    Value(String),
}

impl Param {
    /// Real value; `D` exponents are accepted.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Param::Value(s) => s.replace(['D', 'd'], "E").parse().ok(),
            _ => None,
        }
    }

    /// Integer value, also accepting integral reals (`2.`).
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Param::Value(s) => s.parse().ok().or_else(|| {
                let r = self.as_real()?;
                (r.fract() == 0.0 && r.abs() < i64::MAX as f64).then_some(r as i64)
            }),
            _ => None,
        }
    }

    /// Hollerith text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Param::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Split free-format data into parameters.
///
/// Stops at the record delimiter; anything after it (comments) is ignored.
pub fn split_params(text: &str, delimiter: char, record: char) -> Result<Vec<Param>, String> {
    let chars: Vec<char> = text.chars().collect();
    let mut params = Vec::new();
    let mut i = 0;

    loop {
        while i < chars.len() && chars[i] == ' ' {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }

        let digits_end = chars[i..]
            .iter()
            .position(|c| !c.is_ascii_digit())
            .map_or(chars.len(), |n| i + n);
        if digits_end > i && matches!(chars.get(digits_end), Some('H' | 'h')) {
            let count: String = chars[i..digits_end].iter().collect();
            let count: usize = count
                .parse()
                .map_err(|_| format!("bad Hollerith length '{count}'"))?;
            let start = digits_end + 1;
            let end = start + count;
            if end > chars.len() {
                return Err(format!("Hollerith string of {count} runs past the data"));
            }
            params.push(Param::Text(chars[start..end].iter().collect()));
            i = end;
            while i < chars.len() && chars[i] == ' ' {
                i += 1;
            }
        } else {
            let end = chars[i..]
                .iter()
                .position(|&c| c == delimiter || c == record)
                .map_or(chars.len(), |n| i + n);
            let token: String = chars[i..end].iter().collect();
            let token = token.trim();
            params.push(if token.is_empty() {
                Param::Default
            } else {
                Param::Value(token.to_string())
            });
            i = end;
        }

        match chars.get(i) {
            None => break,
            Some(&c) if c == record => break,
            Some(&c) if c == delimiter => {
                i += 1;
                // A delimiter right before the record end leaves a default.
                if matches!(chars.get(i), Some(&c) if c == record) {
                    params.push(Param::Default);
                    break;
                }
            }
            Some(c) => return Err(format!("unexpected '{c}' after parameter {}", params.len())),
        }
    }
    Ok(params)
}

/// Millimetres per model unit for a units flag.
pub fn units_flag_to_mm(flag: i64) -> Option<f64> {
    let mm = match flag {
        1 => 25.4,
        2 => 1.0,
        4 => 304.8,
        5 => 1_609_344.0,
        6 => 1000.0,
        7 => 1_000_000.0,
        8 => 0.0254,
        9 => 0.001,
        10 => 10.0,
        11 => 0.000_025_4,
        _ => return None,
    };
    Some(mm)
}

/// Millimetres per model unit for a units name.
pub fn units_name_to_mm(name: &str) -> Option<f64> {
    let mm = match name.trim().to_ascii_uppercase().as_str() {
        "IN" | "INCH" => 25.4,
        "MM" => 1.0,
        "FT" => 304.8,
        "MI" => 1_609_344.0,
        "M" => 1000.0,
        "KM" => 1_000_000.0,
        "MIL" => 0.0254,
        "UM" | "MICRON" => 0.001,
        "CM" => 10.0,
        "UIN" => 0.000_025_4,
        _ => return None,
    };
    Some(mm)
}

/// The parts of the global section the reader uses.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalParams {
    /// Parameter delimiter, `,` unless redefined.
    pub delimiter: char,
    /// Record delimiter, `;` unless redefined.
    pub record: char,
    /// Sending system's product identifier.
    pub product_id: Option<String>,
    /// Millimetres per model unit.
    pub mm_per_unit: f64,
}

impl GlobalParams {
    /// Parse the concatenated global section.
    ///
    /// The first two fields may redefine the delimiters, written as
    /// one-character Hollerith strings. The units flag (field 14) wins over
    /// the units name (field 15) unless it is 3 ("see name"). Files that give
    /// neither are in inches, the format's default.
    pub fn parse(global: &str) -> Result<Self, String> {
        let delimiter = hollerith_char(global).unwrap_or(',');
        // Skip the defining character itself before looking for the separator.
        let first = if global.trim_start().starts_with("1H") {
            global.trim_start().get(3..).unwrap_or("")
        } else {
            global
        };
        let rest = first
            .find(delimiter)
            .map_or("", |n| &first[n + delimiter.len_utf8()..]);
        let record = hollerith_char(rest).unwrap_or(';');

        let params = split_params(global, delimiter, record)?;
        let flag = params.get(13).and_then(Param::as_int);
        let name = params.get(14).and_then(Param::as_text);
        let mm_per_unit = match flag {
            Some(3) | None => name.and_then(units_name_to_mm),
            Some(f) => units_flag_to_mm(f).or_else(|| name.and_then(units_name_to_mm)),
        }
        .unwrap_or(25.4);

        Ok(Self {
            delimiter,
            record,
            product_id: params.get(2).and_then(Param::as_text).map(str::to_string),
            mm_per_unit,
        })
    }
}

/// The character of a leading `1Hx` field.
fn hollerith_char(text: &str) -> Option<char> {
    text.trim_start().strip_prefix("1H")?.chars().next()
}
