// THEORY:
// Every tunable number of the pipeline lives here instead of being scattered
// across the stages. The two presets reproduce the values the detector was tuned
// with on its sample media (a green-field background for the color strategy, a
// generic scene for the edge strategy). They are empirical, so they are exposed as
// configuration rather than derived.
//
// A TOML file may override any section. Sections left out of the file fall back
// to the preset of the selected strategy, so a file that only says
// `strategy = "edge"` yields the full edge preset.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core_modules::mask_cleaner::MorphOp;
use crate::error::{Result, ShapeVisionError};

const BACKGROUND_HSV_LOWER: [u8; 3] = [35, 50, 50];
const BACKGROUND_HSV_UPPER: [u8; 3] = [95, 255, 155];
const EDGE_BLUR_KERNEL: u32 = 1;
const EDGE_LOW_THRESHOLD: f32 = 30.0;
const EDGE_HIGH_THRESHOLD: f32 = 130.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    ColorRange,
    Edge,
}

/// Parameters of the segmentation stage, tagged by strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case", deny_unknown_fields)]
pub enum StrategyConfig {
    /// Background is every pixel whose 8-bit HSV triple lies inside
    /// `[lower_hsv, upper_hsv]` (inclusive). Hue uses the 0..=179 scale.
    ColorRange {
        #[serde(default = "default_lower_hsv")]
        lower_hsv: [u8; 3],
        #[serde(default = "default_upper_hsv")]
        upper_hsv: [u8; 3],
    },
    Edge {
        /// Odd Gaussian kernel size; 1 leaves the grayscale frame untouched.
        #[serde(default = "default_blur_kernel")]
        blur_kernel: u32,
        #[serde(default = "default_low_threshold")]
        low_threshold: f32,
        #[serde(default = "default_high_threshold")]
        high_threshold: f32,
    },
}

fn default_lower_hsv() -> [u8; 3] {
    BACKGROUND_HSV_LOWER
}

fn default_upper_hsv() -> [u8; 3] {
    BACKGROUND_HSV_UPPER
}

fn default_blur_kernel() -> u32 {
    EDGE_BLUR_KERNEL
}

fn default_low_threshold() -> f32 {
    EDGE_LOW_THRESHOLD
}

fn default_high_threshold() -> f32 {
    EDGE_HIGH_THRESHOLD
}

impl StrategyConfig {
    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyConfig::ColorRange { .. } => StrategyKind::ColorRange,
            StrategyConfig::Edge { .. } => StrategyKind::Edge,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CleanupConfig {
    /// Side of the square structuring element. Odd, so the element is centred.
    pub kernel_size: u32,
    /// Applied in order.
    pub operations: Vec<MorphOp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Contours enclosing less than this many square pixels are noise.
    pub min_area: f64,
    /// Simplification tolerance as a fraction of the contour perimeter.
    pub epsilon_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotationConfig {
    pub outline_color: [u8; 3],
    pub outline_thickness: u32,
    pub marker_color: [u8; 3],
    pub marker_radius: u32,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            outline_color: [0, 255, 0],
            outline_thickness: 2,
            marker_color: [0, 0, 255],
            marker_radius: 5,
        }
    }
}

/// Complete configuration of a `ShapePipeline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub segmentation: StrategyConfig,
    pub cleanup: CleanupConfig,
    pub filter: FilterConfig,
    pub annotation: AnnotationConfig,
}

/// Shape of a configuration file: every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialPipelineConfig {
    segmentation: Option<StrategyConfig>,
    cleanup: Option<CleanupConfig>,
    filter: Option<FilterConfig>,
    annotation: Option<AnnotationConfig>,
}

impl PipelineConfig {
    /// Color-range preset: green background band removed, 5x5 open + close,
    /// 500 px minimum area.
    pub fn color_range() -> Self {
        Self {
            segmentation: StrategyConfig::ColorRange {
                lower_hsv: BACKGROUND_HSV_LOWER,
                upper_hsv: BACKGROUND_HSV_UPPER,
            },
            cleanup: CleanupConfig {
                kernel_size: 5,
                operations: vec![MorphOp::Open, MorphOp::Close],
            },
            filter: FilterConfig {
                min_area: 500.0,
                epsilon_ratio: 0.02,
            },
            annotation: AnnotationConfig::default(),
        }
    }

    /// Edge preset: near-identity blur, Canny 30/130, 3x3 close only, 1500 px
    /// minimum area since edge noise yields many small closed loops.
    pub fn edge_based() -> Self {
        Self {
            segmentation: StrategyConfig::Edge {
                blur_kernel: EDGE_BLUR_KERNEL,
                low_threshold: EDGE_LOW_THRESHOLD,
                high_threshold: EDGE_HIGH_THRESHOLD,
            },
            cleanup: CleanupConfig {
                kernel_size: 3,
                operations: vec![MorphOp::Close],
            },
            filter: FilterConfig {
                min_area: 1500.0,
                epsilon_ratio: 0.02,
            },
            annotation: AnnotationConfig::default(),
        }
    }

    pub fn preset(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::ColorRange => Self::color_range(),
            StrategyKind::Edge => Self::edge_based(),
        }
    }

    /// Parses a TOML document. `default_kind` picks the preset used when the
    /// document has no `[segmentation]` section.
    pub fn from_toml_str(text: &str, default_kind: StrategyKind) -> Result<Self> {
        let partial: PartialPipelineConfig = toml::from_str(text)?;
        let kind = partial
            .segmentation
            .as_ref()
            .map(StrategyConfig::kind)
            .unwrap_or(default_kind);

        let mut config = Self::preset(kind);
        if let Some(segmentation) = partial.segmentation {
            config.segmentation = segmentation;
        }
        if let Some(cleanup) = partial.cleanup {
            config.cleanup = cleanup;
        }
        if let Some(filter) = partial.filter {
            config.filter = filter;
        }
        if let Some(annotation) = partial.annotation {
            config.annotation = annotation;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>, default_kind: StrategyKind) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text, default_kind)
    }

    pub fn validate(&self) -> Result<()> {
        match &self.segmentation {
            StrategyConfig::ColorRange {
                lower_hsv,
                upper_hsv,
            } => {
                if lower_hsv.iter().zip(upper_hsv).any(|(lo, hi)| lo > hi) {
                    return Err(invalid(format!(
                        "lower_hsv {:?} exceeds upper_hsv {:?}",
                        lower_hsv, upper_hsv
                    )));
                }
            }
            StrategyConfig::Edge {
                blur_kernel,
                low_threshold,
                high_threshold,
            } => {
                if *blur_kernel == 0 || blur_kernel % 2 == 0 {
                    return Err(invalid(format!(
                        "blur_kernel must be odd, got {}",
                        blur_kernel
                    )));
                }
                if !(low_threshold.is_finite() && high_threshold.is_finite())
                    || *low_threshold < 0.0
                {
                    return Err(invalid(format!(
                        "canny thresholds must be finite and non-negative, got {} and {}",
                        low_threshold, high_threshold
                    )));
                }
                if !(low_threshold <= high_threshold) {
                    return Err(invalid(format!(
                        "low_threshold {} exceeds high_threshold {}",
                        low_threshold, high_threshold
                    )));
                }
            }
        }

        let kernel_size = self.cleanup.kernel_size;
        if kernel_size % 2 == 0 {
            return Err(invalid(format!(
                "cleanup kernel_size must be odd, got {}",
                kernel_size
            )));
        }
        if kernel_size > 255 {
            return Err(invalid(format!(
                "cleanup kernel_size {} is too large",
                kernel_size
            )));
        }
        if !(self.filter.min_area >= 0.0) {
            return Err(invalid(format!(
                "min_area must be non-negative, got {}",
                self.filter.min_area
            )));
        }
        if !(self.filter.epsilon_ratio > 0.0) {
            return Err(invalid(format!(
                "epsilon_ratio must be positive, got {}",
                self.filter.epsilon_ratio
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> ShapeVisionError {
    ShapeVisionError::InvalidConfig(message)
}
