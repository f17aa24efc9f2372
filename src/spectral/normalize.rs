use crate::core::NumericSeries;

/// Flatten an engine array into a plain sequence.
///
/// Column vectors arrive as single-element rows (`[[1], [2], [3]]`); each row
/// is replaced by its first entry. An empty row becomes `NaN` so parallel
/// arrays keep their alignment. Flat input is returned unchanged.
pub fn flatten(data: &NumericSeries) -> Vec<f64> {
    match data {
        NumericSeries::Flat(values) => values.clone(),
        NumericSeries::Nested(rows) => rows
            .iter()
            .map(|row| row.first().copied().unwrap_or(f64::NAN))
            .collect(),
    }
}

/// Flatten an optional array, treating a missing one as empty.
pub fn flatten_opt(data: Option<&NumericSeries>) -> Vec<f64> {
    data.map(flatten).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_row_keeps_alignment() {
        let nested = NumericSeries::Nested(vec![vec![1.0], vec![], vec![3.0, 9.0]]);
        let flat = flatten(&nested);
        assert_eq!(flat.len(), 3);
        assert_eq!(flat[0], 1.0);
        assert!(flat[1].is_nan());
        assert_eq!(flat[2], 3.0);
    }

    #[test]
    fn test_flatten_opt_missing_is_empty() {
        assert!(flatten_opt(None).is_empty());
    }
}
