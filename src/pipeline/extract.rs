use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result as AnyResult};
use image::{DynamicImage, GenericImageView};
use kmeans_colors::get_kmeans_hamerly;
use palette::Lab;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::color::Color;
use crate::error::{Error, Result};

/// A color extracted from the image with its cluster weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractedColor {
    pub color: Color,
    pub weight: f32,
}

pub const MAX_COLORS: usize = 256;
const MAX_SAMPLES: usize = 2000;
const MAX_ITER: usize = 20;
const CONVERGE: f64 = 2.0; // average centroid movement, RGB units
const REASSIGN_THRESHOLD: f64 = 0.01;
const HAMERLY_CONVERGE: f32 = 5.0;
const DEDUP_THRESHOLD: f32 = 25.0; // ΔE² < 25 means ΔE < 5

/// Clustering backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Algorithm {
    /// Weighted k-means in RGB space with k-means++ seeding.
    #[default]
    KMeans,
    /// Hamerly's accelerated k-means in CIELAB, with ΔE < 5 centroids merged.
    Hamerly,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::KMeans => "kmeans",
            Algorithm::Hamerly => "hamerly",
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "kmeans" => Ok(Algorithm::KMeans),
            "hamerly" => Ok(Algorithm::Hamerly),
            other => Err(Error::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Load an image from disk.
pub fn load_image(path: &Path) -> AnyResult<DynamicImage> {
    image::open(path).with_context(|| {
        if !path.exists() {
            format!("file not found: {}", path.display())
        } else {
            format!(
                "unsupported or corrupt image: {}. Supported formats: PNG, JPEG, WebP, BMP, TIFF, GIF",
                path.display()
            )
        }
    })
}

/// Reduces a pixel sample to a small set of weighted representative colors.
#[derive(Debug, Clone)]
pub struct Extractor {
    algorithm: Algorithm,
    max_iterations: usize,
    convergence: f64,
    max_samples: usize,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(Algorithm::default())
    }
}

impl Extractor {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            max_iterations: MAX_ITER,
            convergence: CONVERGE,
            max_samples: MAX_SAMPLES,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Every pixel for small images, a regular grid for large ones.
    /// Never returns more than the sample cap.
    pub fn sample_pixels(&self, image: &DynamicImage) -> Vec<Color> {
        let (width, height) = image.dimensions();
        let total = width as usize * height as usize;
        let rgb = image.to_rgb8();

        if total <= self.max_samples {
            return rgb.pixels().map(|p| Color::new(p[0], p[1], p[2])).collect();
        }

        let step = ((total as f64 / self.max_samples as f64).sqrt() as usize).max(1);
        let mut pixels = Vec::with_capacity(self.max_samples);
        'rows: for y in (0..height).step_by(step) {
            for x in (0..width).step_by(step) {
                let p = rgb.get_pixel(x, y);
                pixels.push(Color::new(p[0], p[1], p[2]));
                if pixels.len() >= self.max_samples {
                    break 'rows;
                }
            }
        }
        pixels
    }

    /// Sample `image` and extract `count` colors.
    pub fn extract_image(
        &self,
        image: &DynamicImage,
        count: usize,
        seed: u64,
    ) -> Result<Vec<ExtractedColor>> {
        validate_count(count)?;
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::EmptyImage);
        }
        let samples = self.sample_pixels(image);
        self.extract_samples(&samples, count, seed)
    }

    /// Extract `count` weighted colors from a pixel sample.
    ///
    /// Returns colors sorted by weight (descending); weights sum to 1.0. When the
    /// sample holds at most `count` unique colors they are returned unclustered
    /// with uniform weights. Identical seed and samples give identical output.
    pub fn extract_samples(
        &self,
        samples: &[Color],
        count: usize,
        seed: u64,
    ) -> Result<Vec<ExtractedColor>> {
        validate_count(count)?;
        if samples.is_empty() {
            return Err(Error::EmptySample);
        }

        let unique = unique_colors(samples);
        if unique.len() <= count {
            debug!(
                unique = unique.len(),
                count, "few unique colors, skipping clustering"
            );
            let weight = 1.0 / unique.len() as f32;
            return Ok(unique
                .into_iter()
                .map(|color| ExtractedColor { color, weight })
                .collect());
        }

        debug!(
            algorithm = self.algorithm.name(),
            samples = samples.len(),
            count,
            seed,
            "clustering"
        );
        let mut colors = match self.algorithm {
            Algorithm::KMeans => self.kmeans(samples, count, seed),
            Algorithm::Hamerly => self.hamerly(samples, count, seed),
        };

        colors.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        Ok(colors)
    }

    fn kmeans(&self, samples: &[Color], k: usize, seed: u64) -> Vec<ExtractedColor> {
        let mut rng = StdRng::seed_from_u64(seed);
        let points: Vec<Point> = samples.iter().map(|c| Point::from(*c)).collect();

        let mut centroids = init_centroids(&points, k, &mut rng);
        let mut assignments = vec![0usize; points.len()];

        for iteration in 0..self.max_iterations {
            let mut changed = 0usize;
            for (assignment, point) in assignments.iter_mut().zip(&points) {
                let nearest = nearest_centroid(point, &centroids);
                if *assignment != nearest {
                    *assignment = nearest;
                    changed += 1;
                }
            }

            if (changed as f64 / points.len() as f64) < REASSIGN_THRESHOLD {
                debug!(iteration, changed, "k-means converged on reassignments");
                break;
            }

            let updated = recompute_centroids(&points, &assignments, k, &mut rng);
            let movement = centroids
                .iter()
                .zip(&updated)
                .map(|(old, new)| old.distance(new))
                .sum::<f64>()
                / k as f64;
            centroids = updated;

            if movement < self.convergence {
                debug!(iteration, movement, "k-means converged on centroid movement");
                break;
            }
        }

        let mut counts = vec![0usize; k];
        for &cluster in &assignments {
            counts[cluster] += 1;
        }

        let total = points.len() as f32;
        centroids
            .iter()
            .zip(counts)
            .map(|(centroid, members)| ExtractedColor {
                color: centroid.to_color(),
                weight: members as f32 / total,
            })
            .collect()
    }

    /// Hamerly k-means in LAB, seeded the same way.
    fn hamerly(&self, samples: &[Color], k: usize, seed: u64) -> Vec<ExtractedColor> {
        let pixels: Vec<Lab> = samples.iter().map(|c| c.to_lab()).collect();
        let result = get_kmeans_hamerly(
            k,
            self.max_iterations,
            HAMERLY_CONVERGE,
            false,
            &pixels,
            seed,
        );

        let total = pixels.len() as f32;

        // Count pixels per centroid to compute weights
        let mut counts = vec![0u32; result.centroids.len()];
        for &idx in &result.indices {
            counts[idx as usize] += 1;
        }

        let mut colors: Vec<ExtractedColor> = result
            .centroids
            .iter()
            .enumerate()
            .filter(|(i, _)| counts[*i] > 0)
            .map(|(i, lab)| ExtractedColor {
                color: Color::from_lab(*lab),
                weight: counts[i] as f32 / total,
            })
            .collect();

        deduplicate(&mut colors);
        colors
    }
}

fn validate_count(count: usize) -> Result<()> {
    if count == 0 || count > MAX_COLORS {
        return Err(Error::InvalidColorCount(count));
    }
    Ok(())
}

/// Unique colors in first-seen order.
fn unique_colors(samples: &[Color]) -> Vec<Color> {
    let mut seen = HashSet::with_capacity(samples.len());
    samples
        .iter()
        .copied()
        .filter(|c| seen.insert(*c))
        .collect()
}

/// A point in RGB space.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Point {
    r: f64,
    g: f64,
    b: f64,
}

impl Point {
    fn distance_sq(&self, other: &Point) -> f64 {
        let dr = self.r - other.r;
        let dg = self.g - other.g;
        let db = self.b - other.b;
        dr * dr + dg * dg + db * db
    }

    fn distance(&self, other: &Point) -> f64 {
        self.distance_sq(other).sqrt()
    }

    fn to_color(self) -> Color {
        let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        Color::new(channel(self.r), channel(self.g), channel(self.b))
    }
}

impl From<Color> for Point {
    fn from(c: Color) -> Self {
        Self {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
        }
    }
}

/// k-means++ seeding: the first centroid is uniform random, each next one is drawn
/// with probability proportional to its squared distance from the closest centroid.
/// If every point already coincides with a centroid, the last centroid is
/// duplicated with a small perturbation instead.
fn init_centroids(points: &[Point], k: usize, rng: &mut StdRng) -> Vec<Point> {
    if points.is_empty() || k == 0 {
        return Vec::new();
    }

    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.random_range(0..points.len())]);

    while centroids.len() < k {
        let distances: Vec<f64> = points
            .iter()
            .map(|p| {
                centroids
                    .iter()
                    .map(|c| p.distance_sq(c))
                    .fold(f64::MAX, f64::min)
            })
            .collect();
        let total: f64 = distances.iter().sum();

        if total == 0.0 {
            let last = centroids[centroids.len() - 1];
            centroids.push(Point {
                r: last.r + 0.1,
                g: last.g + 0.1,
                b: last.b + 0.1,
            });
            continue;
        }

        let target = rng.random::<f64>() * total;
        let mut cumulative = 0.0;
        let mut chosen = points.len() - 1;
        for (i, d) in distances.iter().enumerate() {
            cumulative += d;
            if cumulative >= target {
                chosen = i;
                break;
            }
        }
        centroids.push(points[chosen]);
    }

    centroids
}

fn nearest_centroid(point: &Point, centroids: &[Point]) -> usize {
    let mut nearest = 0;
    let mut best = f64::MAX;
    for (i, c) in centroids.iter().enumerate() {
        let d = point.distance_sq(c);
        if d < best {
            best = d;
            nearest = i;
        }
    }
    nearest
}

/// Per-cluster means. Empty clusters are reseeded from a random point.
fn recompute_centroids(
    points: &[Point],
    assignments: &[usize],
    k: usize,
    rng: &mut StdRng,
) -> Vec<Point> {
    let mut sums = vec![
        Point {
            r: 0.0,
            g: 0.0,
            b: 0.0
        };
        k
    ];
    let mut counts = vec![0usize; k];

    for (point, &cluster) in points.iter().zip(assignments) {
        sums[cluster].r += point.r;
        sums[cluster].g += point.g;
        sums[cluster].b += point.b;
        counts[cluster] += 1;
    }

    sums.into_iter()
        .zip(counts)
        .map(|(sum, n)| {
            if n > 0 {
                let n = n as f64;
                Point {
                    r: sum.r / n,
                    g: sum.g / n,
                    b: sum.b / n,
                }
            } else {
                points[rng.random_range(0..points.len())]
            }
        })
        .collect()
}

/// Merge colors that are too similar (ΔE < 5 in LAB space).
/// Keeps the first color and accumulates the weight.
fn deduplicate(colors: &mut Vec<ExtractedColor>) {
    let mut i = 0;
    while i < colors.len() {
        let mut j = i + 1;
        while j < colors.len() {
            let lab_i = colors[i].color.to_lab();
            let lab_j = colors[j].color.to_lab();
            let delta_e_sq = (lab_i.l - lab_j.l).powi(2)
                + (lab_i.a - lab_j.a).powi(2)
                + (lab_i.b - lab_j.b).powi(2);
            if delta_e_sq < DEDUP_THRESHOLD {
                colors[i].weight += colors[j].weight;
                colors.remove(j);
            } else {
                j += 1;
            }
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const RED: Color = Color::new(200, 50, 50);
    const BLUE: Color = Color::new(50, 50, 200);
    const GREEN: Color = Color::new(50, 200, 50);

    fn scratch_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("tinct-extract-tests");
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    fn weight_sum(colors: &[ExtractedColor]) -> f32 {
        colors.iter().map(|c| c.weight).sum()
    }

    /// Shades around a few base colors, so there are many unique samples.
    fn noisy_samples(bases: &[(Color, usize)]) -> Vec<Color> {
        let mut samples = Vec::new();
        for (base, n) in bases {
            for i in 0..*n {
                let jitter = (i % 7) as u8;
                samples.push(Color::new(
                    base.r.saturating_add(jitter),
                    base.g.saturating_add(jitter / 2),
                    base.b.saturating_sub(jitter),
                ));
            }
        }
        samples
    }

    // --- load_image tests ---

    #[test]
    fn load_file_not_found() {
        let result = load_image(Path::new("/nonexistent/image.png"));
        let err = format!("{:#}", result.unwrap_err());
        assert!(
            err.contains("file not found") || err.contains("No such file"),
            "expected file-not-found error, got: {err}"
        );
    }

    #[test]
    fn load_unsupported_format() {
        let path = scratch_path("not_an_image.txt");
        std::fs::write(&path, "this is not an image").unwrap();

        let err = load_image(&path).unwrap_err().to_string();
        assert!(
            err.contains("unsupported") || err.contains("Unsupported"),
            "expected unsupported format error, got: {err}"
        );
    }

    #[test]
    fn load_png_round_trip() {
        let path = scratch_path("4x4_test.png");
        image::RgbImage::from_fn(4, 4, |_, _| image::Rgb([128, 128, 128]))
            .save(&path)
            .unwrap();

        let img = load_image(&path).unwrap();
        assert_eq!(img.dimensions(), (4, 4));
    }

    // --- sampling tests ---

    #[test]
    fn small_image_samples_every_pixel() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_fn(10, 10, |x, _| {
            image::Rgb([x as u8, 0, 0])
        }));
        let samples = Extractor::default().sample_pixels(&img);
        assert_eq!(samples.len(), 100);
    }

    #[test]
    fn large_image_is_grid_sampled() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_fn(400, 300, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 0])
        }));
        let samples = Extractor::default().sample_pixels(&img);
        assert!(samples.len() <= MAX_SAMPLES);
        assert!(samples.len() > MAX_SAMPLES / 4, "got {}", samples.len());
    }

    // --- validation tests ---

    #[test]
    fn count_out_of_range_is_rejected() {
        let extractor = Extractor::default();
        assert_eq!(
            extractor.extract_samples(&[RED], 0, 1),
            Err(Error::InvalidColorCount(0))
        );
        assert_eq!(
            extractor.extract_samples(&[RED], 257, 1),
            Err(Error::InvalidColorCount(257))
        );
        assert!(extractor.extract_samples(&[RED], 256, 1).is_ok());
    }

    #[test]
    fn empty_samples_are_rejected() {
        assert_eq!(
            Extractor::default().extract_samples(&[], 4, 1),
            Err(Error::EmptySample)
        );
    }

    #[test]
    fn empty_image_is_rejected() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::new(0, 0));
        assert_eq!(
            Extractor::default().extract_image(&img, 4, 1),
            Err(Error::EmptyImage)
        );
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        assert_eq!("kmeans".parse::<Algorithm>(), Ok(Algorithm::KMeans));
        assert_eq!("hamerly".parse::<Algorithm>(), Ok(Algorithm::Hamerly));
        assert_eq!(
            "mediancut".parse::<Algorithm>(),
            Err(Error::UnknownAlgorithm("mediancut".to_string()))
        );
    }

    // --- clustering tests ---

    #[test]
    fn few_unique_colors_skip_clustering() {
        let mut samples = vec![RED; 500];
        samples.extend(vec![BLUE; 300]);
        samples.extend(vec![GREEN; 200]);

        let colors = Extractor::default().extract_samples(&samples, 8, 7).unwrap();

        assert_eq!(colors.len(), 3);
        assert_eq!(colors[0].color, RED);
        assert_eq!(colors[1].color, BLUE);
        assert_eq!(colors[2].color, GREEN);
        for c in &colors {
            assert!((c.weight - 1.0 / 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn kmeans_returns_k_weighted_centroids() {
        let samples = noisy_samples(&[(RED, 600), (BLUE, 300), (GREEN, 100)]);
        let colors = Extractor::default().extract_samples(&samples, 3, 42).unwrap();

        assert_eq!(colors.len(), 3);
        assert!((weight_sum(&colors) - 1.0).abs() < 1e-4);
        for window in colors.windows(2) {
            assert!(window[0].weight >= window[1].weight);
        }
        // The red cluster dominates.
        assert!(colors[0].color.r > colors[0].color.b);
        assert!((colors[0].weight - 0.6).abs() < 0.05, "got {}", colors[0].weight);
    }

    #[test]
    fn same_seed_is_deterministic() {
        let samples = noisy_samples(&[(RED, 400), (BLUE, 400), (GREEN, 400)]);
        let extractor = Extractor::default();
        let first = extractor.extract_samples(&samples, 5, 1234).unwrap();
        let second = extractor.extract_samples(&samples, 5, 1234).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn hamerly_is_deterministic_and_normalized() {
        let samples = noisy_samples(&[(RED, 500), (BLUE, 500)]);
        let extractor = Extractor::new(Algorithm::Hamerly);
        let first = extractor.extract_samples(&samples, 4, 99).unwrap();
        let second = extractor.extract_samples(&samples, 4, 99).unwrap();

        assert_eq!(first, second);
        assert!(first.len() >= 2);
        assert!((weight_sum(&first) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn init_perturbs_when_points_coincide() {
        let points = vec![Point::from(RED); 10];
        let mut rng = StdRng::seed_from_u64(3);
        let centroids = init_centroids(&points, 3, &mut rng);

        assert_eq!(centroids.len(), 3);
        assert_eq!(centroids[0], Point::from(RED));
        assert!((centroids[2].r - centroids[0].r - 0.2).abs() < 1e-9);
    }

    #[test]
    fn empty_cluster_is_reseeded_from_points() {
        let points = vec![Point::from(RED), Point::from(BLUE)];
        let mut rng = StdRng::seed_from_u64(5);
        let centroids = recompute_centroids(&points, &[0, 0], 2, &mut rng);
        assert!(points.contains(&centroids[1]));
    }
}
