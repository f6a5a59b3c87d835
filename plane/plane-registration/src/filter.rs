//! Surface-based plane selection.

/// Picks the planes worth aligning from their surfaces.
///
/// Planes below `min_surface` are dropped; of the rest, at most
/// `max_planes` with the largest surfaces are kept (ties keep the earlier
/// plane). Returns the kept positions in their original order.
///
/// # Example
///
/// ```
/// use plane_registration::select_planes;
///
/// let surfaces = [40.0, 5.0, 90.0, 31.0, 60.0];
/// assert_eq!(select_planes(&surfaces, Some(30.0), None), vec![0, 2, 3, 4]);
/// assert_eq!(select_planes(&surfaces, Some(30.0), Some(2)), vec![2, 4]);
/// assert_eq!(select_planes(&surfaces, None, None).len(), 5);
/// ```
#[must_use]
pub fn select_planes(
    surfaces: &[f64],
    min_surface: Option<f64>,
    max_planes: Option<usize>,
) -> Vec<usize> {
    let mut kept: Vec<usize> = (0..surfaces.len())
        .filter(|&i| min_surface.map_or(true, |min| surfaces[i] >= min))
        .collect();

    if let Some(max) = max_planes {
        if kept.len() > max {
            kept.sort_by(|&a, &b| surfaces[b].total_cmp(&surfaces[a]).then(a.cmp(&b)));
            kept.truncate(max);
            kept.sort_unstable();
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_inclusive() {
        assert_eq!(select_planes(&[30.0, 29.9], Some(30.0), None), vec![0]);
    }

    #[test]
    fn test_everything_filtered() {
        assert!(select_planes(&[1.0, 2.0], Some(30.0), None).is_empty());
        assert!(select_planes(&[], None, Some(3)).is_empty());
    }

    #[test]
    fn test_cap_ties_keep_earlier() {
        assert_eq!(select_planes(&[5.0, 5.0, 5.0], None, Some(2)), vec![0, 1]);
    }
}
