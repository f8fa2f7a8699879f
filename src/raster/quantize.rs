//! Level quantization: reduce an intensity grid to a small set of levels.
//!
//! Uses median cut over the 256-bin intensity histogram. The result is fully
//! deterministic for a given input, which keeps rendered output reproducible.

use serde::Serialize;
use std::cmp::Reverse;

use super::grid::{Color, Grid, IntensityGrid};

/// Smallest number of levels a quantization may use.
pub const MIN_COLOR_COUNT: u16 = 2;
/// Largest number of levels a quantization may use.
pub const MAX_COLOR_COUNT: u16 = 256;
pub const DEFAULT_COLOR_COUNT: u16 = 16;

/// Clamp a requested level count into `[MIN_COLOR_COUNT, MAX_COLOR_COUNT]`.
pub fn clamp_color_count(requested: i64) -> u16 {
    requested.clamp(MIN_COLOR_COUNT as i64, MAX_COLOR_COUNT as i64) as u16
}

/// How a representative intensity is turned into a display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMapping {
    /// `(v, v, v)`
    #[default]
    Grayscale,
    /// The tint color scaled by `v / 255`.
    Tint(Color),
}

impl ColorMapping {
    pub fn color_for(&self, level: u8) -> Color {
        match self {
            ColorMapping::Grayscale => Color::gray(level),
            ColorMapping::Tint(tint) => tint.scaled(level as f32 / 255.0),
        }
    }
}

/// One quantized cell: the representative intensity and its display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct QuantizedCell {
    pub level: u8,
    pub color: Color,
}

/// Output of [`quantize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizedGrid {
    grid: Grid<QuantizedCell>,
    palette: Vec<QuantizedCell>,
    color_count: u16,
}

impl QuantizedGrid {
    pub fn grid(&self) -> &Grid<QuantizedCell> {
        &self.grid
    }

    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    /// Distinct representatives in ascending level order.
    pub fn palette(&self) -> &[QuantizedCell] {
        &self.palette
    }

    /// Distinct levels in ascending order.
    pub fn levels(&self) -> Vec<u8> {
        self.palette.iter().map(|c| c.level).collect()
    }

    /// The clamped level count that was requested.
    pub fn color_count(&self) -> u16 {
        self.color_count
    }
}

/// A contiguous range of intensities `[lo, hi]`, tightened so that both ends
/// occur in the histogram.
#[derive(Debug, Clone, Copy)]
struct Bucket {
    lo: usize,
    hi: usize,
    count: u64,
}

impl Bucket {
    fn span(hist: &[u64; 256], lo: usize, hi: usize) -> Option<Bucket> {
        let lo = (lo..=hi).find(|&v| hist[v] > 0)?;
        let hi = (lo..=hi).rev().find(|&v| hist[v] > 0)?;
        let count = hist[lo..=hi].iter().sum();
        Some(Bucket { lo, hi, count })
    }

    fn can_split(&self) -> bool {
        self.lo < self.hi
    }

    /// Weighted median: the first observed value at which half the population
    /// has been seen.
    fn median(&self, hist: &[u64; 256]) -> usize {
        let mut acc = 0u64;
        for v in self.lo..=self.hi {
            acc += hist[v];
            if acc * 2 >= self.count {
                return v;
            }
        }
        self.hi
    }

    /// Split at the median, keeping the upper end in the right half.
    fn split(&self, hist: &[u64; 256]) -> (Bucket, Bucket) {
        let mut acc = 0u64;
        let mut cut = self.lo;
        for v in self.lo..self.hi {
            acc += hist[v];
            if hist[v] > 0 {
                cut = v;
            }
            if acc * 2 >= self.count {
                break;
            }
        }
        // Both halves contain an observed endpoint, so neither is empty.
        let left = Bucket::span(hist, self.lo, cut).unwrap_or(*self);
        let right = Bucket::span(hist, cut + 1, self.hi).unwrap_or(*self);
        (left, right)
    }
}

fn histogram(grid: &IntensityGrid) -> [u64; 256] {
    let mut hist = [0u64; 256];
    for &v in grid.cells() {
        hist[v as usize] += 1;
    }
    hist
}

/// Pick at most `color_count` representative intensities by median cut.
fn median_cut(hist: &[u64; 256], color_count: usize) -> Vec<u8> {
    let Some(root) = Bucket::span(hist, 0, 255) else {
        return Vec::new();
    };
    let mut buckets = vec![root];

    while buckets.len() < color_count {
        let candidate = buckets
            .iter()
            .enumerate()
            .filter(|(_, b)| b.can_split())
            .max_by_key(|(_, b)| (b.count, b.hi - b.lo, Reverse(b.lo)))
            .map(|(i, _)| i);
        let Some(idx) = candidate else {
            break;
        };
        let (left, right) = buckets[idx].split(hist);
        buckets[idx] = left;
        buckets.push(right);
    }

    let mut reps: Vec<u8> = buckets.iter().map(|b| b.median(hist) as u8).collect();
    reps.sort_unstable();
    reps.dedup();
    reps
}

/// Nearest representative for every possible intensity (ties pick the lower).
fn nearest_lut(reps: &[u8]) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (v, slot) in lut.iter_mut().enumerate() {
        let mut best = reps[0];
        let mut best_dist = usize::MAX;
        for &r in reps {
            let dist = (v as isize - r as isize).unsigned_abs();
            if dist < best_dist {
                best = r;
                best_dist = dist;
            }
        }
        *slot = best;
    }
    lut
}

/// Quantize to grayscale display colors. See [`quantize_with`].
pub fn quantize(grid: &IntensityGrid, color_count: i64) -> QuantizedGrid {
    quantize_with(grid, color_count, ColorMapping::Grayscale)
}

/// Reduce `grid` to at most `color_count` levels.
///
/// `color_count` is clamped to `[2, 256]`. Every cell is assigned the
/// representative intensity nearest to its own value; representatives are
/// intensities that actually occur in the input. Cells with the same level
/// always carry the same display color.
pub fn quantize_with(grid: &IntensityGrid, color_count: i64, mapping: ColorMapping) -> QuantizedGrid {
    let color_count = clamp_color_count(color_count);
    let hist = histogram(grid);
    let reps = median_cut(&hist, color_count as usize);

    log::debug!(
        "Median cut: {} distinct intensities -> {} levels (max {})",
        hist.iter().filter(|&&n| n > 0).count(),
        reps.len(),
        color_count
    );

    let lut = nearest_lut(&reps);
    let palette: Vec<QuantizedCell> = reps
        .iter()
        .map(|&level| QuantizedCell {
            level,
            color: mapping.color_for(level),
        })
        .collect();

    let quantized = grid.map(|&v| {
        let level = lut[v as usize];
        QuantizedCell {
            level,
            color: mapping.color_for(level),
        }
    });

    QuantizedGrid {
        grid: quantized,
        palette,
        color_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hist_of(values: &[u8]) -> [u64; 256] {
        let mut hist = [0u64; 256];
        for &v in values {
            hist[v as usize] += 1;
        }
        hist
    }

    #[test]
    fn test_clamp_color_count() {
        assert_eq!(clamp_color_count(-5), 2);
        assert_eq!(clamp_color_count(1), 2);
        assert_eq!(clamp_color_count(16), 16);
        assert_eq!(clamp_color_count(1000), 256);
    }

    #[test]
    fn test_median_cut_keeps_all_values_when_budget_allows() {
        let hist = hist_of(&[10, 20, 30, 30]);
        assert_eq!(median_cut(&hist, 16), vec![10, 20, 30]);
    }

    #[test]
    fn test_median_cut_two_clusters() {
        let hist = hist_of(&[0, 1, 2, 3, 200, 201, 202, 203]);
        let reps = median_cut(&hist, 2);
        assert_eq!(reps.len(), 2);
        assert!(reps[0] <= 3);
        assert!(reps[1] >= 200);
    }

    #[test]
    fn test_representatives_are_observed_values() {
        let values = [5u8, 9, 13, 77, 78, 140, 141, 142, 250];
        let hist = hist_of(&values);
        for reps in [median_cut(&hist, 2), median_cut(&hist, 4)] {
            for r in reps {
                assert!(values.contains(&r), "{} is not an observed value", r);
            }
        }
    }

    #[test]
    fn test_nearest_lut_tie_goes_low() {
        let lut = nearest_lut(&[10, 20]);
        assert_eq!(lut[15], 10);
        assert_eq!(lut[16], 20);
        assert_eq!(lut[0], 10);
        assert_eq!(lut[255], 20);
    }

    #[test]
    fn test_empty_histogram_has_no_reps() {
        assert!(median_cut(&[0u64; 256], 4).is_empty());
    }

    #[test]
    fn test_tint_mapping() {
        let mapping = ColorMapping::Tint(Color::new(255, 0, 0));
        assert_eq!(mapping.color_for(255), Color::new(255, 0, 0));
        assert_eq!(mapping.color_for(0), Color::BLACK);
    }
}
