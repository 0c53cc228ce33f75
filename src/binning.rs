/// Binning factors considered when matching a target pixel size.
pub const BINNING_FACTORS: [u32; 7] = [1, 2, 4, 8, 16, 32, 64];

/// Picks the binning factor whose binned pixel size lands closest to `target_pixel_size`.
///
/// Ties resolve to the smaller factor.
pub fn find_binning_factor(pixel_size: f64, target_pixel_size: f64) -> u32 {
    let mut best = BINNING_FACTORS[0];
    let mut best_delta = f64::INFINITY;
    for factor in BINNING_FACTORS {
        let delta = (f64::from(factor) * pixel_size - target_pixel_size).abs();
        if delta < best_delta {
            best = factor;
            best_delta = delta;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_is_selected() {
        assert_eq!(find_binning_factor(1.0, 4.0), 4);
        assert_eq!(find_binning_factor(1.0, 1.0), 1);
        assert_eq!(find_binning_factor(1.35, 10.8), 8);
    }

    #[test]
    fn nearest_factor_wins() {
        assert_eq!(find_binning_factor(1.0, 5.9), 4);
        assert_eq!(find_binning_factor(1.0, 6.1), 8);
        assert_eq!(find_binning_factor(2.0, 0.1), 1);
        assert_eq!(find_binning_factor(1.0, 1000.0), 64);
    }

    #[test]
    fn tie_prefers_smaller_factor() {
        assert_eq!(find_binning_factor(1.0, 3.0), 2);
        assert_eq!(find_binning_factor(1.0, 1.5), 1);
    }
}
