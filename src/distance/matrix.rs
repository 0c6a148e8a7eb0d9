//! Packed symmetric distance matrix.

/// A symmetric distance matrix stored as a packed lower triangle.
///
/// Row `i` holds the distances from location `i` to locations `0..=i`, so
/// `get(a, b)` and `get(b, a)` read the same cell and symmetry cannot be
/// broken. Appending a location appends one row without moving the
/// existing data. Cells never set read as `None`; the diagonal is `0.0`.
///
/// # Examples
///
/// ```
/// use u_dispatch::distance::DistanceMatrix;
///
/// let mut dm = DistanceMatrix::new();
/// let hub = dm.push_location();
/// let a = dm.push_location();
/// dm.set(a, hub, 3.0);
/// assert_eq!(dm.get(hub, a), Some(3.0));
/// assert_eq!(dm.get(a, a), Some(0.0));
/// assert_eq!(dm.size(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DistanceMatrix {
    data: Vec<Option<f64>>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates an empty matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a matrix with `size` locations and only the diagonal set.
    pub fn with_size(size: usize) -> Self {
        let mut dm = Self::new();
        for _ in 0..size {
            dm.push_location();
        }
        dm
    }

    /// Adds a location and returns its index.
    pub fn push_location(&mut self) -> usize {
        let index = self.size;
        self.data.extend(std::iter::repeat(None).take(index));
        self.data.push(Some(0.0));
        self.size += 1;
        index
    }

    fn cell(&self, a: usize, b: usize) -> Option<usize> {
        let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
        (hi < self.size).then(|| hi * (hi + 1) / 2 + lo)
    }

    /// Returns the distance between locations `a` and `b`, if recorded.
    pub fn get(&self, a: usize, b: usize) -> Option<f64> {
        self.cell(a, b).and_then(|i| self.data[i])
    }

    /// Records the distance between `a` and `b` (both directions).
    ///
    /// Returns `false` if either index is out of bounds.
    pub fn set(&mut self, a: usize, b: usize, distance: f64) -> bool {
        match self.cell(a, b) {
            Some(i) => {
                self.data[i] = Some(distance);
                true
            }
            None => false,
        }
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if every pair of locations has a distance.
    pub fn is_complete(&self) -> bool {
        self.data.iter().all(Option::is_some)
    }
}
