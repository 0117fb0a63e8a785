//! Template matching by normalized cross-correlation.
//!
//! Both images are converted to luminance. Large templates are first searched
//! on block-averaged copies of the screen, then the best coarse candidates are
//! refined at full resolution in a small neighborhood. If that finds nothing,
//! the whole screen is searched at full resolution.

use {
    image::{imageops, GrayImage, Luma, RgbaImage},
    itertools::Itertools,
    std::{cmp::min, ops::RangeInclusive},
};

/// Minimum template side for searching at 1/4 resolution first.
const QUARTER_SCALE_MIN_SIDE: u32 = 32;
/// Minimum template side for searching at 1/2 resolution first.
const HALF_SCALE_MIN_SIDE: u32 = 16;
/// How far below the requested confidence a coarse candidate may score
/// and still be refined.
const COARSE_SLACK: f32 = 0.2;
const MAX_COARSE_CANDIDATES: usize = 8;
/// Per-pixel variance below which an area is considered flat.
const FLAT_VARIANCE: f64 = 1e-3;

/// Location of a template inside a larger image, in pixels of that image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Correlation in `-1.0..=1.0`, 1.0 being a perfect match.
    pub score: f32,
}

impl Match {
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// Finds the best occurrence of `needle` in `haystack` scoring at least `confidence`.
pub fn find_template(haystack: &RgbaImage, needle: &RgbaImage, confidence: f32) -> Option<Match> {
    let (haystack_width, haystack_height) = haystack.dimensions();
    let (width, height) = needle.dimensions();
    if width == 0 || height == 0 || width > haystack_width || height > haystack_height {
        return None;
    }
    let haystack = imageops::grayscale(haystack);
    let needle = imageops::grayscale(needle);

    let factor = pyramid_factor(width, height);
    let best = if factor == 1 {
        Scorer::new(&haystack, &needle).best(
            0..=(haystack_width - width) as usize,
            0..=(haystack_height - height) as usize,
        )
    } else {
        coarse_to_fine(&haystack, &needle, factor, confidence)
    };
    let best = best?;

    (best.score >= confidence).then_some(Match {
        x: best.x as u32,
        y: best.y as u32,
        width,
        height,
        score: best.score,
    })
}

fn pyramid_factor(width: u32, height: u32) -> u32 {
    let side = min(width, height);
    if side >= QUARTER_SCALE_MIN_SIDE {
        4
    } else if side >= HALF_SCALE_MIN_SIDE {
        2
    } else {
        1
    }
}

fn coarse_to_fine(
    haystack: &GrayImage,
    needle: &GrayImage,
    factor: u32,
    confidence: f32,
) -> Option<Candidate> {
    let factor = factor as usize;
    let small_needle = downsample(needle, 0, 0, factor);

    // One coarse pass per block phase, so that a template copied from any
    // offset lines up with the blocks of exactly one pass.
    let mut ranked = Vec::new();
    for (phase_y, phase_x) in (0..factor).cartesian_product(0..factor) {
        let small_haystack = downsample(haystack, phase_x, phase_y, factor);
        if small_haystack.width() < small_needle.width()
            || small_haystack.height() < small_needle.height()
        {
            continue;
        }
        ranked.extend(
            Scorer::new(&small_haystack, &small_needle)
                .all()
                .into_iter()
                .filter(|c| c.score >= confidence - COARSE_SLACK)
                .map(|c| Candidate {
                    x: phase_x + c.x * factor,
                    y: phase_y + c.y * factor,
                    score: c.score,
                }),
        );
    }
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    // Neighbours of an accepted candidate describe the same peak.
    let min_distance = min(needle.width(), needle.height()) as usize / 2;
    let mut candidates: Vec<Candidate> = Vec::new();
    for candidate in ranked {
        if candidates.len() == MAX_COARSE_CANDIDATES {
            break;
        }
        let is_separate = candidates.iter().all(|c| {
            c.x.abs_diff(candidate.x) > min_distance || c.y.abs_diff(candidate.y) > min_distance
        });
        if is_separate {
            candidates.push(candidate);
        }
    }

    let max_x = (haystack.width() - needle.width()) as usize;
    let max_y = (haystack.height() - needle.height()) as usize;
    let fine = Scorer::new(haystack, needle);
    let refined = candidates
        .iter()
        .filter_map(|c| {
            fine.best(
                min(c.x.saturating_sub(factor), max_x)..=min(c.x + factor, max_x),
                min(c.y.saturating_sub(factor), max_y)..=min(c.y + factor, max_y),
            )
        })
        .max_by(|a, b| a.score.total_cmp(&b.score));
    match refined {
        Some(best) if best.score >= confidence => Some(best),
        // The coarse pass is a shortcut, not a filter: without a match,
        // search every position at full resolution.
        _ => fine.best(0..=max_x, 0..=max_y),
    }
}

/// Averages `factor`×`factor` blocks, starting `phase_x`/`phase_y` pixels into the image.
fn downsample(image: &GrayImage, phase_x: usize, phase_y: usize, factor: usize) -> GrayImage {
    let stride = image.width() as usize;
    let width = stride.saturating_sub(phase_x) / factor;
    let height = (image.height() as usize).saturating_sub(phase_y) / factor;
    let pixels = image.as_raw();
    let area = (factor * factor) as u32;
    GrayImage::from_fn(width as u32, height as u32, |block_x, block_y| {
        let x = phase_x + block_x as usize * factor;
        let y = phase_y + block_y as usize * factor;
        let sum: u32 = (y..y + factor)
            .flat_map(|row| &pixels[row * stride + x..row * stride + x + factor])
            .map(|&v| u32::from(v))
            .sum();
        Luma([((sum + area / 2) / area) as u8])
    })
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    x: usize,
    y: usize,
    score: f32,
}

/// Summed-area tables of pixel values and squared pixel values.
struct Integral {
    stride: usize,
    sums: Vec<f64>,
    squares: Vec<f64>,
}

impl Integral {
    fn new(image: &GrayImage) -> Self {
        let width = image.width() as usize;
        let height = image.height() as usize;
        let stride = width + 1;
        let mut sums = vec![0.0; stride * (height + 1)];
        let mut squares = vec![0.0; stride * (height + 1)];
        for (y, row) in image.as_raw().chunks_exact(width).enumerate() {
            let mut row_sum = 0.0;
            let mut row_squares = 0.0;
            for (x, &value) in row.iter().enumerate() {
                let value = f64::from(value);
                row_sum += value;
                row_squares += value * value;
                let i = (y + 1) * stride + x + 1;
                sums[i] = sums[i - stride] + row_sum;
                squares[i] = squares[i - stride] + row_squares;
            }
        }
        Self {
            stride,
            sums,
            squares,
        }
    }

    /// Returns the sum and the sum of squares of the pixels in the rectangle.
    fn window(&self, x: usize, y: usize, width: usize, height: usize) -> (f64, f64) {
        let top_left = y * self.stride + x;
        let top_right = top_left + width;
        let bottom_left = (y + height) * self.stride + x;
        let bottom_right = bottom_left + width;
        let area = |table: &[f64]| {
            table[bottom_right] - table[top_right] - table[bottom_left] + table[top_left]
        };
        (area(&self.sums), area(&self.squares))
    }
}

struct Scorer<'a> {
    haystack: &'a GrayImage,
    integral: Integral,
    width: usize,
    height: usize,
    /// Template pixels minus the template mean.
    centered: Vec<f64>,
    mean: f64,
    norm: f64,
}

impl<'a> Scorer<'a> {
    fn new(haystack: &'a GrayImage, needle: &GrayImage) -> Self {
        let values = needle.as_raw().iter().map(|&v| f64::from(v)).collect_vec();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let centered = values.iter().map(|v| v - mean).collect_vec();
        let norm = centered.iter().map(|v| v * v).sum::<f64>().sqrt();
        Self {
            haystack,
            integral: Integral::new(haystack),
            width: needle.width() as usize,
            height: needle.height() as usize,
            centered,
            mean,
            norm,
        }
    }

    fn area(&self) -> f64 {
        (self.width * self.height) as f64
    }

    fn score_at(&self, x: usize, y: usize) -> f32 {
        let n = self.area();
        let (sum, squares) = self.integral.window(x, y, self.width, self.height);
        let window_deviation = (squares - sum * sum / n).max(0.0);
        let window_is_flat = window_deviation / n < FLAT_VARIANCE;

        if self.norm * self.norm / n < FLAT_VARIANCE {
            // Correlation is undefined for a flat template; compare brightness instead.
            return if window_is_flat {
                (1.0 - (sum / n - self.mean).abs() / 255.0) as f32
            } else {
                0.0
            };
        }
        if window_is_flat {
            return 0.0;
        }

        let stride = self.haystack.width() as usize;
        let pixels = self.haystack.as_raw();
        let mut product = 0.0;
        for (row, template_row) in self.centered.chunks_exact(self.width).enumerate() {
            let start = (y + row) * stride + x;
            let screen_row = &pixels[start..start + self.width];
            for (&t, &s) in template_row.iter().zip(screen_row) {
                product += t * f64::from(s);
            }
        }
        (product / (self.norm * window_deviation.sqrt())).clamp(-1.0, 1.0) as f32
    }

    fn best(&self, xs: RangeInclusive<usize>, ys: RangeInclusive<usize>) -> Option<Candidate> {
        ys.cartesian_product(xs)
            .map(|(y, x)| Candidate {
                x,
                y,
                score: self.score_at(x, y),
            })
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }

    fn all(&self) -> Vec<Candidate> {
        let max_x = self.haystack.width() as usize - self.width;
        let max_y = self.haystack.height() as usize - self.height;
        (0..=max_y)
            .cartesian_product(0..=max_x)
            .map(|(y, x)| Candidate {
                x,
                y,
                score: self.score_at(x, y),
            })
            .collect()
    }
}
