//! Gradient Hough transform for circles.
//!
//! Every edge pixel votes along both directions of its intensity gradient at
//! each radius of the search window. Circle rims make these votes converge on
//! the center, so accumulator peaks are center candidates. Each accepted
//! center then takes the radius most edge pixels agree on.

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::pipeline::services::image::preprocessing::EdgeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedCircle {
    pub center: (f32, f32),
    pub radius: f32,
    /// Accumulator votes at the center.
    pub votes: u32,
}

impl DetectedCircle {
    /// Same circle in an image scaled by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            center: (self.center.0 * factor, self.center.1 * factor),
            radius: self.radius * factor,
            votes: self.votes,
        }
    }
}

/// Search parameters in pixels of the image being searched.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleSearch {
    pub min_radius: u32,
    pub max_radius: u32,
    pub min_center_distance: f32,
    pub gradient_threshold: f32,
    pub vote_threshold: u32,
    pub max_candidates: usize,
}

#[derive(Debug, Clone)]
pub struct CircleDetector {
    search: CircleSearch,
}

impl CircleDetector {
    pub fn new(search: CircleSearch) -> Self {
        Self { search }
    }

    /// Circles supported by `edges`, strongest center first.
    ///
    /// `gray` supplies gradient directions and must have the edge map's size.
    pub fn detect(&self, gray: &GrayImage, edges: &EdgeMap) -> Vec<DetectedCircle> {
        let (w, h) = edges.dimensions();
        let search = &self.search;
        if w < 3 || h < 3 || gray.dimensions() != (w, h) || search.min_radius > search.max_radius {
            return Vec::new();
        }

        let points = edges.edge_points();
        let accum = self.vote(gray, &points, w, h);
        let candidates = self.center_candidates(&accum, w, h);

        let mut circles: Vec<DetectedCircle> = Vec::new();
        let min_dist_sq = search.min_center_distance * search.min_center_distance;
        for (idx, votes) in candidates.into_iter().take(search.max_candidates) {
            let center = ((idx % w as usize) as f32, (idx / w as usize) as f32);
            let crowded = circles.iter().any(|c| {
                let dx = c.center.0 - center.0;
                let dy = c.center.1 - center.1;
                dx * dx + dy * dy < min_dist_sq
            });
            if crowded {
                continue;
            }
            if let Some(radius) = self.estimate_radius(center, &points) {
                circles.push(DetectedCircle {
                    center,
                    radius,
                    votes,
                });
            }
        }
        circles
    }

    fn vote(&self, gray: &GrayImage, points: &[(u32, u32)], w: u32, h: u32) -> Vec<u32> {
        let gx = imageproc::gradients::horizontal_sobel(gray);
        let gy = imageproc::gradients::vertical_sobel(gray);

        let mut accum = vec![0u32; (w * h) as usize];
        for &(x, y) in points {
            let gxv = gx.get_pixel(x, y)[0] as f32;
            let gyv = gy.get_pixel(x, y)[0] as f32;
            let mag = gxv.hypot(gyv);
            if mag < self.search.gradient_threshold || mag == 0.0 {
                continue;
            }
            let dx = gxv / mag;
            let dy = gyv / mag;

            for sign in [-1.0f32, 1.0] {
                for r in self.search.min_radius..=self.search.max_radius {
                    let cx = (x as f32 + sign * dx * r as f32).round();
                    let cy = (y as f32 + sign * dy * r as f32).round();
                    if cx < 0.0 || cy < 0.0 || cx >= w as f32 || cy >= h as f32 {
                        break;
                    }
                    accum[cy as usize * w as usize + cx as usize] += 1;
                }
            }
        }
        accum
    }

    /// Local accumulator maxima above the vote threshold, by votes descending.
    fn center_candidates(&self, accum: &[u32], w: u32, h: u32) -> Vec<(usize, u32)> {
        let stride = w as usize;
        let mut candidates = Vec::new();
        for y in 1..(h as usize - 1) {
            for x in 1..(stride - 1) {
                let idx = y * stride + x;
                let v = accum[idx];
                if v > self.search.vote_threshold
                    && v > accum[idx - 1]
                    && v >= accum[idx + 1]
                    && v > accum[idx - stride]
                    && v >= accum[idx + stride]
                {
                    candidates.push((idx, v));
                }
            }
        }
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        candidates
    }

    /// Radius with the most edge support around `center`, using a 3-bin window.
    fn estimate_radius(&self, center: (f32, f32), points: &[(u32, u32)]) -> Option<f32> {
        let min_r = self.search.min_radius;
        let bins = (self.search.max_radius - min_r + 1) as usize;
        let mut histogram = vec![0u32; bins];
        for &(x, y) in points {
            let d = (x as f32 - center.0).hypot(y as f32 - center.1).round() as i64 - min_r as i64;
            if (0..bins as i64).contains(&d) {
                histogram[d as usize] += 1;
            }
        }

        let (best_bin, support) = (0..bins)
            .map(|i| {
                let lo = i.saturating_sub(1);
                let hi = (i + 1).min(bins - 1);
                (i, histogram[lo..=hi].iter().sum::<u32>())
            })
            .fold((0, 0), |best, cur| if cur.1 > best.1 { cur } else { best });

        if support < self.search.vote_threshold {
            return None;
        }
        Some((min_r as usize + best_bin) as f32)
    }
}
