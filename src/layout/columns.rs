//! # Column Widths
//!
//! Turns measured head labels into final column widths. Each column gets
//! its measured label width plus one shared margin, so the spare page width
//! is spread evenly instead of proportionally.

/// Margin that makes `measured` columns exactly fill `available` width.
pub fn uniform_margin(measured: &[f64], available: f64) -> f64 {
    if measured.is_empty() {
        return 0.0;
    }
    let sum: f64 = measured.iter().sum();
    (available - sum) / measured.len() as f64
}

/// Final widths: every measured width plus `margin`.
pub fn resolve_head_widths(measured: &[f64], available: f64, margin: Option<f64>) -> Vec<f64> {
    let margin = margin.unwrap_or_else(|| uniform_margin(measured, available));
    measured.iter().map(|w| w + margin).collect()
}

/// Total width of a run of columns.
pub fn span_width(widths: &[f64]) -> f64 {
    widths.iter().sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_margin_fills_available_width() {
        let widths = resolve_head_widths(&[20.0, 30.0, 50.0], 400.0, None);
        assert!((span_width(&widths) - 400.0).abs() < 1e-9);
        // Same extra margin for every column
        assert!((widths[0] - 120.0).abs() < 1e-9);
        assert!((widths[1] - 130.0).abs() < 1e-9);
        assert!((widths[2] - 150.0).abs() < 1e-9);
    }

    #[test]
    fn explicit_margin_wins() {
        let widths = resolve_head_widths(&[20.0, 30.0], 400.0, Some(5.0));
        assert_eq!(widths, vec![25.0, 35.0]);
    }

    #[test]
    fn empty_head_has_no_margin() {
        assert_eq!(uniform_margin(&[], 100.0), 0.0);
        assert!(resolve_head_widths(&[], 100.0, None).is_empty());
    }
}
