//! Package table parsing.

use crate::models::{parse_clock, PackageRecord};

use super::records::split_records;
use super::LoadError;

const MIN_FIELDS: usize = 7;

/// Parses the package table.
///
/// Columns are `id, address, city, state, postal, deadline, mass, notes`;
/// the notes column may be missing. A first record whose ID column is not
/// a number is treated as a header and skipped.
///
/// # Examples
///
/// ```
/// use u_dispatch::loader::parse_packages;
///
/// let text = "\
/// 1,195 W Oakland Ave,Salt Lake City,UT,84115,10:30 AM,21,
/// 2,2530 S 500 E,Salt Lake City,UT,84106,EOD,44,\"Can only be on truck 2\"
/// ";
/// let records = parse_packages(text).unwrap();
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0].deadline, 630.0);
/// assert_eq!(records[1].notes, "Can only be on truck 2");
/// ```
pub fn parse_packages(text: &str) -> Result<Vec<PackageRecord>, LoadError> {
    let mut records = Vec::new();
    for (index, (line, fields)) in split_records(text).into_iter().enumerate() {
        let id_field = fields.first().map(|f| f.trim()).unwrap_or_default();
        if index == 0 && id_field.parse::<u32>().is_err() {
            continue;
        }
        records.push(parse_record(line, &fields)?);
    }
    Ok(records)
}

fn parse_record(line: usize, fields: &[String]) -> Result<PackageRecord, LoadError> {
    if fields.len() < MIN_FIELDS {
        return Err(LoadError::MalformedRow {
            line,
            reason: format!("expected at least {MIN_FIELDS} fields, found {}", fields.len()),
        });
    }
    let field = |i: usize| fields.get(i).map(|f| f.trim()).unwrap_or_default();

    let id = field(0).parse().map_err(|_| LoadError::InvalidNumber {
        line,
        value: field(0).to_owned(),
    })?;
    let deadline = parse_clock(field(5)).ok_or_else(|| LoadError::InvalidTime {
        line,
        value: field(5).to_owned(),
    })?;
    let mass = field(6).parse().map_err(|_| LoadError::InvalidNumber {
        line,
        value: field(6).to_owned(),
    })?;

    Ok(PackageRecord::new(id, field(1), field(4))
        .with_city(field(2), field(3))
        .with_deadline(deadline)
        .with_mass(mass)
        .with_notes(field(7)))
}
