//! Column count resolution and column width derivation.

/// How many columns the layout uses.
///
/// Fixed and breakpoint-driven column counts are one parametrized design,
/// not separate algorithms: both resolve to a plain `usize` for the packer.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnCount {
    /// Always the same number of columns.
    Fixed(usize),
    /// Breakpoint table: the entry with the largest minimum width that still
    /// fits the container wins; below every breakpoint the base count
    /// applies.
    Responsive {
        base: usize,
        /// `(min_container_width, columns)`, sorted descending by width.
        break_points: Vec<(f32, usize)>,
    },
}

impl ColumnCount {
    /// Builds a responsive column count from an unsorted breakpoint table.
    pub fn responsive<I>(base: usize, break_points: I) -> Self
    where
        I: IntoIterator<Item = (f32, usize)>,
    {
        let mut break_points: Vec<(f32, usize)> = break_points.into_iter().collect();
        break_points.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Self::Responsive { base, break_points }
    }

    /// Effective column count for the given container width.
    pub fn resolve(&self, container_width: f32) -> usize {
        match self {
            Self::Fixed(columns) => *columns,
            Self::Responsive { base, break_points } => break_points
                .iter()
                .find(|(min_width, _)| *min_width <= container_width)
                .map(|(_, columns)| *columns)
                .unwrap_or(*base),
        }
    }
}

impl Default for ColumnCount {
    fn default() -> Self {
        Self::Fixed(2)
    }
}

/// Width of a single column: the container width minus inter-column gutters
/// and horizontal padding, divided evenly.
///
/// Returns 0.0 for a zero column count; a non-positive result means the
/// container is not ready to lay out.
pub fn column_width(
    container_width: f32,
    columns: usize,
    gutter: f32,
    horizontal_padding: f32,
) -> f32 {
    if columns == 0 {
        return 0.0;
    }
    (container_width - (columns - 1) as f32 * gutter - horizontal_padding) / columns as f32
}
