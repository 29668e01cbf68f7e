//! STEP entity interpretation.
//!
//! Turns the raw entity graph into partquote B-rep pieces: points and
//! placements, edge curves, face surfaces, topology records and units.

pub mod curves;
pub mod geometry;
pub mod surfaces;
pub mod topology;
pub mod units;

pub use curves::parse_curve;
pub use geometry::*;
pub use surfaces::parse_surface;
pub use topology::*;
pub use units::{detect_units, Units};

use crate::error::StepError;
use crate::parser::{StepEntity, StepValue};

/// Typed access to instance parameters by position.
///
/// Implemented for whole instances and for single partial types of a
/// complex instance; failures become [`StepError::Malformed`] naming the
/// instance and the position.
pub trait EntityArgs {
    fn id(&self) -> u64;

    fn type_name(&self) -> &str;

    fn args(&self) -> &[StepValue];

    /// Parameter `idx` converted by `read`, or an error saying `what` was
    /// expected there.
    fn arg<'s, T>(&'s self, idx: usize, what: &str, read: impl FnOnce(&'s StepValue) -> Option<T>) -> Result<T, StepError> {
        self.args().get(idx).and_then(read).ok_or_else(|| {
            StepError::malformed(
                Some(self.id()),
                format!("expected {what} at arg {idx} in {}", self.type_name()),
            )
        })
    }

    fn real(&self, idx: usize) -> Result<f64, StepError> {
        self.arg(idx, "real", StepValue::as_real)
    }

    fn string(&self, idx: usize) -> Result<&str, StepError> {
        self.arg(idx, "string", StepValue::as_string)
    }

    /// `.T.`/`.F.`, also spelled out as `.TRUE.`/`.FALSE.`.
    fn boolean(&self, idx: usize) -> Result<bool, StepError> {
        self.arg(idx, "boolean", |v| match v.as_enum()? {
            "T" | "TRUE" => Some(true),
            "F" | "FALSE" => Some(false),
            _ => None,
        })
    }

    fn entity_ref(&self, idx: usize) -> Result<u64, StepError> {
        self.arg(idx, "entity ref", StepValue::as_entity_ref)
    }

    /// Like [`entity_ref`](Self::entity_ref), but `$` or a missing
    /// trailing parameter is `None`.
    fn optional_ref(&self, idx: usize) -> Result<Option<u64>, StepError> {
        match self.args().get(idx) {
            None | Some(StepValue::Unset) => Ok(None),
            Some(_) => self.entity_ref(idx).map(Some),
        }
    }

    fn real_list(&self, idx: usize) -> Result<Vec<f64>, StepError> {
        self.arg(idx, "real list", |v| v.as_list()?.iter().map(StepValue::as_real).collect())
    }

    fn entity_ref_list(&self, idx: usize) -> Result<Vec<u64>, StepError> {
        self.arg(idx, "entity ref list", |v| {
            v.as_list()?.iter().map(StepValue::as_entity_ref).collect()
        })
    }
}

impl EntityArgs for StepEntity {
    fn id(&self) -> u64 {
        self.id
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn args(&self) -> &[StepValue] {
        &self.args
    }
}

/// One partial type of an instance, read through [`EntityArgs`].
#[derive(Debug, Clone, Copy)]
pub struct PartView<'a> {
    id: u64,
    name: &'a str,
    args: &'a [StepValue],
}

impl EntityArgs for PartView<'_> {
    fn id(&self) -> u64 {
        self.id
    }

    fn type_name(&self) -> &str {
        self.name
    }

    fn args(&self) -> &[StepValue] {
        self.args
    }
}

/// The `name` part of `entity`, simple or complex.
pub fn part_view<'a>(entity: &'a StepEntity, name: &'a str) -> Option<PartView<'a>> {
    let args = entity.part(name)?;
    Some(PartView {
        id: entity.id,
        name,
        args,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Parser, StepFile};

    fn instances(lines: &str) -> StepFile {
        let input = format!("ISO-10303-21;\nHEADER;\nENDSEC;\nDATA;\n{lines}\nENDSEC;\nEND-ISO-10303-21;\n");
        Parser::parse(input.as_bytes()).unwrap()
    }

    #[test]
    fn test_accessors() {
        let file = instances("#1 = THING('name', 2, .TRUE., #4, $, (1., 2), (#5, #6));");
        let e = file.get(1).unwrap();
        assert_eq!(e.string(0).unwrap(), "name");
        assert_eq!(e.real(1).unwrap(), 2.0);
        assert!(e.boolean(2).unwrap());
        assert_eq!(e.entity_ref(3).unwrap(), 4);
        assert_eq!(e.optional_ref(4).unwrap(), None);
        assert_eq!(e.optional_ref(9).unwrap(), None);
        assert_eq!(e.real_list(5).unwrap(), vec![1.0, 2.0]);
        assert_eq!(e.entity_ref_list(6).unwrap(), vec![5, 6]);
    }

    #[test]
    fn test_accessor_errors_name_position() {
        let file = instances("#1 = THING('name', .MAYBE., ('a'), 3.);");
        let e = file.get(1).unwrap();
        let message = e.boolean(1).unwrap_err().to_string();
        assert!(message.contains("#1"), "{message}");
        assert!(message.contains("arg 1 in THING"), "{message}");
        assert!(e.real_list(2).is_err());
        assert!(e.optional_ref(3).is_err());
        assert!(e.entity_ref(7).is_err());
    }

    #[test]
    fn test_part_view_of_complex_instance() {
        let file = instances("#1 = ( NAMED_UNIT(*) SI_UNIT(.MILLI.,.METRE.) LENGTH_UNIT() );");
        let e = file.get(1).unwrap();
        let si = part_view(e, "SI_UNIT").unwrap();
        assert_eq!(si.type_name(), "SI_UNIT");
        assert_eq!(si.args().len(), 2);
        assert!(si.entity_ref(0).is_err());
        assert!(part_view(e, "CONVERSION_BASED_UNIT").is_none());
    }
}
