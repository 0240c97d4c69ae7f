// THEORY:
// The `mask_cleaner` suppresses the two kinds of damage a raw mask carries.
// Opening (erode then dilate) deletes speckles smaller than the structuring
// element; closing (dilate then erode) fills pinholes and bridges broken edge
// fragments so that contour tracing sees one closed region instead of many.
//
// The structuring element is a `k x k` square, which is exactly the L-infinity
// ball of radius `k / 2` that imageproc's binary morphology works with.

use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MorphOp {
    Open,
    Close,
}

#[derive(Debug, Clone)]
pub struct MaskCleaner {
    kernel_size: u32,
    operations: Vec<MorphOp>,
}

impl MaskCleaner {
    /// `kernel_size` should be odd; an even size acts like the next odd one.
    pub fn new(kernel_size: u32, operations: Vec<MorphOp>) -> Self {
        Self {
            kernel_size,
            operations,
        }
    }

    /// Applies the configured operations in order. The result has the extent of
    /// `mask` and only holds 0 and 255.
    pub fn clean(&self, mask: &GrayImage) -> GrayImage {
        let radius = self.radius();
        if radius == 0 {
            return mask.clone();
        }

        self.operations
            .iter()
            .fold(mask.clone(), |current, op| match op {
                MorphOp::Open => morphology::open(&current, Norm::LInf, radius),
                MorphOp::Close => morphology::close(&current, Norm::LInf, radius),
            })
    }

    fn radius(&self) -> u8 {
        (self.kernel_size / 2).min(u8::MAX as u32) as u8
    }
}
