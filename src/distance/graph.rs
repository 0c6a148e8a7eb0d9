//! Distance graph keyed by [`Location`].

use std::collections::HashMap;

use crate::error::{DispatchError, Result};
use crate::models::Location;

use super::DistanceMatrix;

/// Undirected weighted graph over delivery locations.
///
/// Each location gets a stable index when added; distances live in a
/// [`DistanceMatrix`]. Only direct edges are answered: the source data is a
/// complete pairwise table, so no shortest-path search is performed.
///
/// # Examples
///
/// ```
/// use u_dispatch::distance::DistanceGraph;
/// use u_dispatch::models::Location;
///
/// let hub = Location::hub();
/// let a = Location::new("A");
/// let mut graph = DistanceGraph::new();
/// graph.add_vertex(hub.clone());
/// graph.add_vertex(a.clone());
/// graph.add_edge(&hub, &a, 3.0).unwrap();
/// assert_eq!(graph.distance(&a, &hub).unwrap(), 3.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DistanceGraph {
    index: HashMap<Location, usize>,
    locations: Vec<Location>,
    names: Vec<String>,
    matrix: DistanceMatrix,
}

impl DistanceGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex, returning its index. Adding an existing location
    /// returns the index it already has.
    pub fn add_vertex(&mut self, location: Location) -> usize {
        let name = location.to_string();
        self.add_named_vertex(location, name)
    }

    /// Adds a vertex with a display name (e.g. the business name from the
    /// distance table).
    pub fn add_named_vertex(&mut self, location: Location, name: String) -> usize {
        if let Some(&i) = self.index.get(&location) {
            return i;
        }
        let i = self.matrix.push_location();
        self.index.insert(location.clone(), i);
        self.locations.push(location);
        self.names.push(name);
        i
    }

    /// Records the same weight for `(a, b)` and `(b, a)`.
    pub fn add_edge(&mut self, a: &Location, b: &Location, weight: f64) -> Result<()> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        self.matrix.set(i, j, weight);
        Ok(())
    }

    /// Distance between two locations.
    ///
    /// Fails with [`DispatchError::UnknownLocation`] if either endpoint is
    /// not a vertex and [`DispatchError::MissingEdge`] if no weight was
    /// recorded for the pair.
    pub fn distance(&self, a: &Location, b: &Location) -> Result<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        self.matrix.get(i, j).ok_or_else(|| DispatchError::MissingEdge {
            from: a.clone(),
            to: b.clone(),
        })
    }

    /// Returns the candidate whose location is nearest to `from`.
    ///
    /// Ties go to the earliest candidate. Returns `Ok(None)` when there are
    /// no candidates.
    pub fn nearest<'a, T, I>(&self, from: &Location, candidates: I) -> Result<Option<T>>
    where
        I: IntoIterator<Item = (T, &'a Location)>,
    {
        let mut best: Option<(T, f64)> = None;
        for (item, location) in candidates {
            let d = self.distance(from, location)?;
            if best.as_ref().map_or(true, |&(_, shortest)| d < shortest) {
                best = Some((item, d));
            }
        }
        Ok(best.map(|(item, _)| item))
    }

    /// Returns `true` if the location is a vertex.
    pub fn contains(&self, location: &Location) -> bool {
        self.index.contains_key(location)
    }

    /// Vertices in insertion order.
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Display name recorded for a vertex.
    pub fn name(&self, location: &Location) -> Option<&str> {
        self.index.get(location).map(|&i| self.names[i].as_str())
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Returns `true` if the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Returns `true` if every pair of vertices has a distance.
    pub fn is_complete(&self) -> bool {
        self.matrix.is_complete()
    }

    fn index_of(&self, location: &Location) -> Result<usize> {
        self.index
            .get(location)
            .copied()
            .ok_or_else(|| DispatchError::UnknownLocation(location.clone()))
    }
}
