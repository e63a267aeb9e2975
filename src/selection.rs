//! Land unit filter expressions.
//!
//! A filter is a single id (`7`), an inclusive range (`3:5`) or a union of
//! either joined by `+` or `,` (`101:119+221:239`). Every id must lie in
//! 1..=999.

use crate::constants::{MAX_UNIT_ID, MIN_UNIT_ID};
use crate::error::{HspfError, Result};
use std::collections::HashSet;

/// Expand a filter expression into unit ids, in expression order without
/// duplicates.
pub fn parse_unit_filter(expression: &str) -> Result<Vec<u32>> {
    let invalid = |reason: &str| HspfError::InvalidUnitFilter {
        expression: expression.to_string(),
        reason: reason.to_string(),
    };

    let mut units = Vec::new();
    let mut seen = HashSet::new();

    for part in expression.split(['+', ',']).map(str::trim) {
        if part.is_empty() {
            return Err(invalid("empty element"));
        }

        let (start, end) = match part.split_once(':') {
            Some((start, end)) => (parse_id(start, &invalid)?, parse_id(end, &invalid)?),
            None => {
                let id = parse_id(part, &invalid)?;
                (id, id)
            }
        };

        for id in [start, end] {
            if !(MIN_UNIT_ID..=MAX_UNIT_ID).contains(&id) {
                return Err(HspfError::InvalidUnitId { value: id });
            }
        }
        if start > end {
            return Err(invalid("range start is greater than range end"));
        }

        for id in start..=end {
            let id = id as u32;
            if seen.insert(id) {
                units.push(id);
            }
        }
    }

    Ok(units)
}

fn parse_id(text: &str, invalid: &impl Fn(&str) -> HspfError) -> Result<i64> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| invalid(&format!("'{}' is not an integer", text.trim())))
}
