//! Visual regression testing with screenshot comparison
//!
//! A baseline comparison is exposed as a `Condition<f64>` over the percentage
//! of differing pixels, so it batches with every other condition.

use std::path::{Path, PathBuf};

use image::{GenericImageView, Pixel, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use uiverify_common::{expect, BoxError, Condition};

use crate::error::{E2eError, E2eResult};
use crate::playwright::hash_file;

/// Per-channel difference tolerated before a pixel counts as changed
const TOLERANCE: i32 = 5;

/// Result of a visual comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualDiff {
    /// Whether the images match (within threshold)
    pub matches: bool,

    /// Percentage of pixels that differ
    pub diff_percent: f64,

    pub diff_pixels: u64,
    pub total_pixels: u64,

    pub diff_image_path: Option<PathBuf>,
    pub actual_hash: String,
    pub baseline_hash: String,
}

/// Configuration for visual testing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    pub baseline_dir: PathBuf,
    pub actual_dir: PathBuf,
    pub diff_dir: PathBuf,
    /// Default threshold (0.0 - 100.0 percent)
    pub threshold: f64,
    /// Create missing baselines from the actual screenshot
    pub auto_update: bool,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            baseline_dir: PathBuf::from("test-results/baselines"),
            actual_dir: PathBuf::from("test-results/actual"),
            diff_dir: PathBuf::from("test-results/diffs"),
            threshold: 0.5,
            auto_update: false,
        }
    }
}

/// Visual regression testing utilities
#[derive(Debug, Clone)]
pub struct VisualTester {
    config: VisualConfig,
}

impl VisualTester {
    pub fn new(config: VisualConfig) -> E2eResult<Self> {
        std::fs::create_dir_all(&config.baseline_dir)?;
        std::fs::create_dir_all(&config.actual_dir)?;
        std::fs::create_dir_all(&config.diff_dir)?;
        Ok(Self { config })
    }

    pub fn actual_path(&self, name: &str) -> PathBuf {
        self.config.actual_dir.join(format!("{}.png", name))
    }

    pub fn baseline_path(&self, name: &str) -> PathBuf {
        self.config.baseline_dir.join(format!("{}.png", name))
    }

    /// Condition comparing the existing actual screenshot `name` with its baseline.
    pub fn condition(&self, name: &str, threshold: Option<f64>) -> Condition<f64> {
        self.capture_condition(name, threshold, |_: &Path| -> Result<(), BoxError> { Ok(()) })
    }

    /// Like [`condition`](Self::condition), but `capture` first writes the actual screenshot.
    pub fn capture_condition<C>(&self, name: &str, threshold: Option<f64>, capture: C) -> Condition<f64>
    where
        C: FnOnce(&Path) -> Result<(), BoxError> + Send + 'static,
    {
        let threshold = threshold.unwrap_or(self.config.threshold);
        let tester = self.clone();
        let name = name.to_string();
        Condition::new(
            format!("screenshot [{}] differs from baseline by percent", name),
            move || -> Result<f64, BoxError> {
                capture(&tester.actual_path(&name))?;
                Ok(tester.compare(&name, Some(threshold))?.diff_percent)
            },
            expect::is_less_than_or_equal_to(threshold),
        )
    }

    /// Compare a screenshot against its baseline
    pub fn compare(&self, name: &str, threshold: Option<f64>) -> E2eResult<VisualDiff> {
        let threshold = threshold.unwrap_or(self.config.threshold);
        let actual_path = self.actual_path(name);
        let baseline_path = self.baseline_path(name);

        if !actual_path.exists() {
            return Err(E2eError::ActualNotFound(actual_path.display().to_string()));
        }

        if !baseline_path.exists() {
            if !self.config.auto_update {
                return Err(E2eError::BaselineNotFound(baseline_path.display().to_string()));
            }
            info!("Creating baseline for '{}' (auto-update enabled)", name);
            std::fs::copy(&actual_path, &baseline_path)?;
            let actual_hash = hash_file(&actual_path)?;
            return Ok(VisualDiff {
                matches: true,
                diff_percent: 0.0,
                diff_pixels: 0,
                total_pixels: 0,
                diff_image_path: None,
                actual_hash: actual_hash.clone(),
                baseline_hash: actual_hash,
            });
        }

        let actual_img = image::open(&actual_path)?;
        let baseline_img = image::open(&baseline_path)?;
        let actual_hash = hash_file(&actual_path)?;
        let baseline_hash = hash_file(&baseline_path)?;

        if actual_hash == baseline_hash {
            debug!("Screenshots match exactly (same hash)");
            return Ok(VisualDiff {
                matches: true,
                diff_percent: 0.0,
                diff_pixels: 0,
                total_pixels: u64::from(actual_img.width()) * u64::from(actual_img.height()),
                diff_image_path: None,
                actual_hash,
                baseline_hash,
            });
        }

        if actual_img.dimensions() != baseline_img.dimensions() {
            warn!(
                "Screenshot dimensions differ: actual {:?} vs baseline {:?}",
                actual_img.dimensions(),
                baseline_img.dimensions()
            );
        }

        let baseline_rgba = baseline_img.to_rgba8();
        let actual_rgba = actual_img.to_rgba8();

        // Compare over the union of both canvases; pixels present in only one
        // image count as changed.
        let width = actual_img.width().max(baseline_img.width());
        let height = actual_img.height().max(baseline_img.height());
        let overlap_w = actual_img.width().min(baseline_img.width());
        let overlap_h = actual_img.height().min(baseline_img.height());
        let mut diff_img = RgbaImage::new(width, height);
        let total_pixels = u64::from(width) * u64::from(height);
        let mut diff_pixels = total_pixels - u64::from(overlap_w) * u64::from(overlap_h);

        for y in 0..height {
            for x in 0..width {
                if x >= overlap_w || y >= overlap_h {
                    diff_img.put_pixel(x, y, image::Rgba([255, 0, 0, 255]));
                    continue;
                }
                let actual_pixel = actual_rgba.get_pixel(x, y);
                if pixels_differ(actual_pixel, baseline_rgba.get_pixel(x, y)) {
                    diff_pixels += 1;
                    diff_img.put_pixel(x, y, image::Rgba([255, 0, 0, 255]));
                } else {
                    let channels = actual_pixel.channels();
                    diff_img.put_pixel(
                        x,
                        y,
                        image::Rgba([channels[0] / 2, channels[1] / 2, channels[2] / 2, 128]),
                    );
                }
            }
        }

        let diff_percent = if total_pixels == 0 {
            0.0
        } else {
            (diff_pixels as f64 / total_pixels as f64) * 100.0
        };
        let matches = diff_percent <= threshold;

        let diff_image_path = if diff_pixels > 0 {
            let path = self.config.diff_dir.join(format!("{}-diff.png", name));
            diff_img.save(&path)?;
            Some(path)
        } else {
            None
        };

        if !matches {
            warn!(
                "Visual regression detected in '{}': {:.2}% pixels differ (threshold: {:.2}%)",
                name, diff_percent, threshold
            );
        }

        Ok(VisualDiff {
            matches,
            diff_percent,
            diff_pixels,
            total_pixels,
            diff_image_path,
            actual_hash,
            baseline_hash,
        })
    }
}

fn pixels_differ(a: &image::Rgba<u8>, b: &image::Rgba<u8>) -> bool {
    a.channels()
        .iter()
        .zip(b.channels())
        .any(|(x, y)| (i32::from(*x) - i32::from(*y)).abs() > TOLERANCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uiverify_common::{NumberLocale, Outcome};

    fn tester(dir: &Path, auto_update: bool) -> VisualTester {
        VisualTester::new(VisualConfig {
            baseline_dir: dir.join("baselines"),
            actual_dir: dir.join("actual"),
            diff_dir: dir.join("diffs"),
            threshold: 1.0,
            auto_update,
        })
        .unwrap()
    }

    fn solid(path: &Path, width: u32, height: u32, rgba: [u8; 4]) {
        RgbaImage::from_pixel(width, height, image::Rgba(rgba)).save(path).unwrap();
    }

    #[test]
    fn test_identical_images_match() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester(dir.path(), false);
        solid(&tester.actual_path("home"), 4, 4, [10, 10, 10, 255]);
        solid(&tester.baseline_path("home"), 4, 4, [10, 10, 10, 255]);
        let diff = tester.compare("home", None).unwrap();
        assert!(diff.matches);
        assert_eq!(diff.diff_pixels, 0);
    }

    #[test]
    fn test_changed_pixels_counted_and_diff_written() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester(dir.path(), false);
        let mut actual = RgbaImage::from_pixel(10, 10, image::Rgba([0, 0, 0, 255]));
        actual.put_pixel(0, 0, image::Rgba([255, 255, 255, 255]));
        actual.put_pixel(1, 0, image::Rgba([255, 255, 255, 255]));
        actual.save(tester.actual_path("cart")).unwrap();
        solid(&tester.baseline_path("cart"), 10, 10, [0, 0, 0, 255]);

        let diff = tester.compare("cart", None).unwrap();
        assert_eq!(diff.diff_pixels, 2);
        assert!((diff.diff_percent - 2.0).abs() < f64::EPSILON);
        assert!(!diff.matches);
        assert!(diff.diff_image_path.unwrap().exists());
    }

    #[test]
    fn test_smaller_actual_counts_missing_baseline_area() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester(dir.path(), false);
        solid(&tester.actual_path("modal"), 2, 2, [0, 0, 0, 255]);
        solid(&tester.baseline_path("modal"), 4, 4, [0, 0, 0, 255]);

        let diff = tester.compare("modal", None).unwrap();
        assert_eq!(diff.total_pixels, 16);
        assert_eq!(diff.diff_pixels, 12);
        assert!((diff.diff_percent - 75.0).abs() < f64::EPSILON);
        assert!(!diff.matches);
        let written = image::open(diff.diff_image_path.unwrap()).unwrap();
        assert_eq!(written.dimensions(), (4, 4));
    }

    #[test]
    fn test_condition_fails_over_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester(dir.path(), false);
        solid(&tester.actual_path("banner"), 2, 2, [255, 255, 255, 255]);
        solid(&tester.baseline_path("banner"), 2, 2, [0, 0, 0, 255]);
        match tester.condition("banner", None).evaluate(&NumberLocale::en_us()) {
            Outcome::Fail(diag) => assert_eq!(diag, "expected: is less than or equal to [1] but found: [100]"),
            other => panic!("expected fail, got {}", other),
        }
    }

    #[test]
    fn test_missing_baseline_is_error_unless_auto_update() {
        let dir = tempfile::tempdir().unwrap();
        let strict = tester(dir.path(), false);
        solid(&strict.actual_path("new"), 2, 2, [1, 2, 3, 255]);
        assert!(strict.condition("new", None).evaluate(&NumberLocale::en_us()).is_error());

        let lenient = tester(dir.path(), true);
        assert!(lenient.condition("new", None).evaluate(&NumberLocale::en_us()).is_pass());
        assert!(lenient.baseline_path("new").exists());
    }
}
