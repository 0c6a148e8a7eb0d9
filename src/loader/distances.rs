//! Distance table parsing.

use tracing::debug;

use crate::distance::DistanceGraph;
use crate::models::Location;

use super::records::split_records;
use super::LoadError;

/// Parses the lower-triangular distance table into a graph.
///
/// Each record is `name, address, d0, d1, ..., di` where `dj` is the
/// distance to the location of record `j` and `di` is the diagonal. Empty
/// cells are ignored. The first record is the depot and is registered
/// under the [`HUB`](crate::models::HUB) key whatever its address column
/// says; later addresses are normalized into [`Location`] keys.
///
/// # Examples
///
/// ```
/// use u_dispatch::loader::parse_distances;
/// use u_dispatch::models::Location;
///
/// let text = "\
/// \"Western Governors University\",\" HUB\",0.0
/// \"International Peace Gardens\",\" 1060 Dalton Ave S\n(84104)\",7.2,0.0
/// ";
/// let graph = parse_distances(text).unwrap();
/// let dalton = Location::new("1060 Dalton Ave South (84104)");
/// assert_eq!(graph.distance(&Location::hub(), &dalton).unwrap(), 7.2);
/// assert_eq!(graph.name(&dalton), Some("International Peace Gardens"));
/// ```
pub fn parse_distances(text: &str) -> Result<DistanceGraph, LoadError> {
    let mut graph = DistanceGraph::new();
    let mut rows: Vec<Location> = Vec::new();

    for (line, fields) in split_records(text) {
        let [name, address, distances @ ..] = fields.as_slice() else {
            return Err(LoadError::MalformedRow {
                line,
                reason: "expected a name and an address column".to_owned(),
            });
        };
        let location = if rows.is_empty() {
            Location::hub()
        } else {
            Location::new(address)
        };
        graph.add_named_vertex(location.clone(), name.trim().to_owned());
        rows.push(location.clone());

        for (j, cell) in distances.iter().enumerate() {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            let Some(other) = rows.get(j) else {
                return Err(LoadError::MalformedRow {
                    line,
                    reason: format!("distance column {} has no matching row", j + 1),
                });
            };
            let weight: f64 = cell.parse().map_err(|_| LoadError::InvalidNumber {
                line,
                value: cell.to_owned(),
            })?;
            if !weight.is_finite() || weight < 0.0 {
                return Err(LoadError::InvalidNumber {
                    line,
                    value: cell.to_owned(),
                });
            }
            graph.add_edge(&location, other, weight)?;
        }
    }

    debug!(
        locations = graph.len(),
        complete = graph.is_complete(),
        "distance table loaded"
    );
    Ok(graph)
}
