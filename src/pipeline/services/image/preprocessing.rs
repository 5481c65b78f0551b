//! Shared low-level filters: grayscale, denoise, local contrast equalization
//! and the binary edge map every detector starts from.

use image::{imageops, GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;

use super::analysis::config::{ClaheConfig, DenoiseFilter, PreprocessConfig};

/// Binary edge image: edge pixels are 255, everything else 0.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMap(GrayImage);

impl EdgeMap {
    /// Binarizes `mask`: any non-zero pixel becomes an edge.
    pub fn from_mask(mut mask: GrayImage) -> Self {
        for pixel in mask.pixels_mut() {
            if pixel[0] != 0 {
                pixel[0] = 255;
            }
        }
        Self(mask)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    pub fn edge_count(&self) -> usize {
        self.0.pixels().filter(|p| p[0] != 0).count()
    }

    /// Edge coordinates in raster order.
    pub fn edge_points(&self) -> Vec<(u32, u32)> {
        self.0
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] != 0)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct Preprocessor {
    config: PreprocessConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    pub fn grayscale(image: &RgbImage) -> GrayImage {
        imageops::grayscale(image)
    }

    pub fn denoise(&self, gray: &GrayImage) -> GrayImage {
        match self.config.denoise {
            DenoiseFilter::None => gray.clone(),
            DenoiseFilter::Median { radius } => imageproc::filter::median_filter(gray, radius, radius),
            DenoiseFilter::Gaussian { sigma } if sigma > 0.0 => {
                imageproc::filter::gaussian_blur_f32(gray, sigma)
            }
            DenoiseFilter::Gaussian { .. } => gray.clone(),
        }
    }

    /// Grayscale, denoise and, when configured, CLAHE.
    pub fn preprocess_contrast(&self, image: &RgbImage) -> GrayImage {
        let denoised = self.denoise(&Self::grayscale(image));
        match &self.config.contrast {
            Some(clahe) => equalize_adaptive(&denoised, clahe),
            None => denoised,
        }
    }

    /// Edge map of an already filtered intensity image.
    pub fn detect_edges(&self, gray: &GrayImage) -> EdgeMap {
        let thresholds = self.config.edges;
        let edges = imageproc::edges::canny(gray, thresholds.low, thresholds.high);
        let edges = match self.config.dilation_radius {
            0 => edges,
            radius => imageproc::morphology::dilate(&edges, Norm::LInf, radius),
        };
        EdgeMap::from_mask(edges)
    }

    pub fn preprocess(&self, image: &RgbImage) -> EdgeMap {
        self.detect_edges(&self.preprocess_contrast(image))
    }
}

/// Contrast-limited adaptive histogram equalization.
///
/// The image is split into a grid of tiles; each tile gets its own clipped
/// equalization curve and pixels blend the curves of the four nearest tile
/// centers bilinearly.
pub fn equalize_adaptive(gray: &GrayImage, config: &ClaheConfig) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }

    let tile_w = width.div_ceil(config.tiles.clamp(1, width));
    let tile_h = height.div_ceil(config.tiles.clamp(1, height));
    let tiles_x = width.div_ceil(tile_w);
    let tiles_y = height.div_ceil(tile_h);

    let mut curves = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);
            curves.push(tile_curve(gray, (x0, y0, x1, y1), config.clip_limit));
        }
    }

    let curve = |tx: u32, ty: u32| &curves[(ty * tiles_x + tx) as usize];
    let neighbours = |pos: u32, tile: u32, count: u32| {
        let f = (pos as f32 + 0.5) / tile as f32 - 0.5;
        let lo = (f.floor().max(0.0) as u32).min(count - 1);
        let hi = (lo + 1).min(count - 1);
        let weight = (f - lo as f32).clamp(0.0, 1.0);
        (lo, hi, weight)
    };

    GrayImage::from_fn(width, height, |x, y| {
        let v = gray.get_pixel(x, y)[0] as usize;
        let (tx0, tx1, wx) = neighbours(x, tile_w, tiles_x);
        let (ty0, ty1, wy) = neighbours(y, tile_h, tiles_y);
        let top = curve(tx0, ty0)[v] as f32 * (1.0 - wx) + curve(tx1, ty0)[v] as f32 * wx;
        let bottom = curve(tx0, ty1)[v] as f32 * (1.0 - wx) + curve(tx1, ty1)[v] as f32 * wx;
        Luma([(top * (1.0 - wy) + bottom * wy).round().clamp(0.0, 255.0) as u8])
    })
}

fn tile_curve(gray: &GrayImage, (x0, y0, x1, y1): (u32, u32, u32, u32), clip_limit: f32) -> [u8; 256] {
    let mut histogram = [0u32; 256];
    for y in y0..y1 {
        for x in x0..x1 {
            histogram[gray.get_pixel(x, y)[0] as usize] += 1;
        }
    }
    let count = (x1 - x0) * (y1 - y0);

    let limit = ((clip_limit * count as f32 / 256.0) as u32).max(1);
    let mut excess = 0;
    for bin in histogram.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }
    let bonus = excess / 256;
    let remainder = (excess % 256) as usize;
    for (i, bin) in histogram.iter_mut().enumerate() {
        *bin += bonus + u32::from(i < remainder);
    }

    let mut curve = [0u8; 256];
    let mut cumulative = 0u32;
    for (value, bin) in histogram.iter().enumerate() {
        cumulative += bin;
        curve[value] = ((cumulative as f32 * 255.0 / count as f32).round()).min(255.0) as u8;
    }
    curve
}
