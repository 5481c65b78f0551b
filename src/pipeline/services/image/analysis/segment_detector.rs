//! Progressive probabilistic Hough transform for line segments.
//!
//! Edge points are visited in a shuffled order and vote into a (angle, rho)
//! accumulator one at a time. As soon as a bin crosses the vote threshold the
//! line through the current point is walked in both directions, tolerating
//! short gaps, and every pixel on it is taken out of play. Long enough walks
//! become segments and withdraw their votes.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::config::SegmentSearchConfig;
use crate::pipeline::services::image::preprocessing::EdgeMap;

/// Fixed-point fraction bits used while stepping along a line.
const SHIFT: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: (u32, u32),
    pub end: (u32, u32),
}

impl LineSegment {
    pub fn delta(&self) -> (f32, f32) {
        (
            self.end.0 as f32 - self.start.0 as f32,
            self.end.1 as f32 - self.start.1 as f32,
        )
    }

    pub fn length(&self) -> f32 {
        let (dx, dy) = self.delta();
        dx.hypot(dy)
    }

    /// Direction from start to end in degrees, in (-180, 180].
    pub fn angle_degrees(&self) -> f32 {
        let (dx, dy) = self.delta();
        dy.atan2(dx).to_degrees()
    }
}

#[derive(Debug, Clone)]
pub struct SegmentDetector {
    config: SegmentSearchConfig,
}

impl SegmentDetector {
    pub fn new(config: SegmentSearchConfig) -> Self {
        Self { config }
    }

    /// Segments in discovery order. Invalid search parameters find nothing.
    pub fn detect(&self, edges: &EdgeMap) -> Vec<LineSegment> {
        let (w, h) = edges.dimensions();
        if w == 0 || h == 0 || self.config.validate().is_err() {
            return Vec::new();
        }

        let mut points = edges.edge_points();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        points.shuffle(&mut rng);

        let mut accumulator = Accumulator::new(self.config.angle_step_degrees, w, h);
        let index = |(x, y): (u32, u32)| (y * w + x) as usize;
        let mut pending = vec![false; (w * h) as usize];
        let mut voted = vec![false; (w * h) as usize];
        for &point in &points {
            pending[index(point)] = true;
        }

        let mut segments = Vec::new();
        for &point in &points {
            if !pending[index(point)] {
                continue;
            }
            let (best_angle, votes) = accumulator.vote(point);
            voted[index(point)] = true;
            if votes < self.config.vote_threshold {
                continue;
            }

            let (cos, sin) = accumulator.trig[best_angle];
            let walk = Walk::new(point, -sin, cos);

            let mut ends = [point; 2];
            for (end, reverse) in ends.iter_mut().zip([false, true]) {
                let mut gap = 0;
                for pixel in walk.pixels(reverse, w, h) {
                    if pending[index(pixel)] {
                        gap = 0;
                        *end = pixel;
                    } else {
                        gap += 1;
                        if gap > self.config.max_gap {
                            break;
                        }
                    }
                }
            }

            let segment = LineSegment {
                start: ends[0],
                end: ends[1],
            };
            let good = segment.length() >= self.config.min_length;

            for (end, reverse) in ends.iter().zip([false, true]) {
                for pixel in walk.pixels(reverse, w, h) {
                    let i = index(pixel);
                    if pending[i] {
                        if good && voted[i] {
                            accumulator.unvote(pixel);
                            voted[i] = false;
                        }
                        pending[i] = false;
                    }
                    if pixel == *end {
                        break;
                    }
                }
            }

            if good {
                segments.push(segment);
            }
        }
        segments
    }
}

struct Accumulator {
    trig: Vec<(f64, f64)>,
    rho_offset: i64,
    rho_bins: usize,
    cells: Vec<u32>,
}

impl Accumulator {
    fn new(angle_step_degrees: f32, width: u32, height: u32) -> Self {
        let angles = ((180.0 / angle_step_degrees as f64).round() as usize).max(1);
        let trig = (0..angles)
            .map(|n| {
                let theta = (n as f64 * angle_step_degrees as f64).to_radians();
                (theta.cos(), theta.sin())
            })
            .collect();
        let rho_offset = width as i64 + height as i64;
        let rho_bins = (2 * rho_offset + 1) as usize;
        Self {
            trig,
            rho_offset,
            rho_bins,
            cells: vec![0; angles * rho_bins],
        }
    }

    fn cell(&self, angle: usize, (x, y): (u32, u32)) -> usize {
        let (cos, sin) = self.trig[angle];
        let rho = (x as f64 * cos + y as f64 * sin).round() as i64 + self.rho_offset;
        angle * self.rho_bins + rho as usize
    }

    /// Adds the point's votes; returns the first angle holding the most votes.
    fn vote(&mut self, point: (u32, u32)) -> (usize, u32) {
        let mut best = (0, 0);
        for angle in 0..self.trig.len() {
            let cell = self.cell(angle, point);
            self.cells[cell] += 1;
            if self.cells[cell] > best.1 {
                best = (angle, self.cells[cell]);
            }
        }
        best
    }

    fn unvote(&mut self, point: (u32, u32)) {
        for angle in 0..self.trig.len() {
            let cell = self.cell(angle, point);
            self.cells[cell] = self.cells[cell].saturating_sub(1);
        }
    }
}

/// Fixed-point stepping along direction (a, b), one pixel per step on the
/// dominant axis.
#[derive(Debug, Clone, Copy)]
struct Walk {
    x0: i64,
    y0: i64,
    dx: i64,
    dy: i64,
    x_major: bool,
}

impl Walk {
    fn new((x, y): (u32, u32), a: f64, b: f64) -> Self {
        let (x, y) = (x as i64, y as i64);
        let one = (1i64 << SHIFT) as f64;
        let half = 1i64 << (SHIFT - 1);
        if a.abs() > b.abs() {
            Self {
                x0: x,
                y0: (y << SHIFT) + half,
                dx: if a > 0.0 { 1 } else { -1 },
                dy: (b * one / a.abs()).round() as i64,
                x_major: true,
            }
        } else {
            Self {
                x0: (x << SHIFT) + half,
                y0: y,
                dx: (a * one / b.abs()).round() as i64,
                dy: if b > 0.0 { 1 } else { -1 },
                x_major: false,
            }
        }
    }

    /// Pixels from the start point until the walk leaves the image.
    fn pixels(self, reverse: bool, width: u32, height: u32) -> impl Iterator<Item = (u32, u32)> {
        let sign = if reverse { -1 } else { 1 };
        (0i64..)
            .map(move |k| {
                let x = self.x0 + sign * k * self.dx;
                let y = self.y0 + sign * k * self.dy;
                if self.x_major {
                    (x, y >> SHIFT)
                } else {
                    (x >> SHIFT, y)
                }
            })
            .take_while(move |&(x, y)| x >= 0 && y >= 0 && x < width as i64 && y < height as i64)
            .map(|(x, y)| (x as u32, y as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn edges_from(size: u32, pixels: impl IntoIterator<Item = (u32, u32)>) -> EdgeMap {
        let mut mask = GrayImage::new(size, size);
        for (x, y) in pixels {
            mask.put_pixel(x, y, Luma([255]));
        }
        EdgeMap::from_mask(mask)
    }

    fn detector() -> SegmentDetector {
        SegmentDetector::new(SegmentSearchConfig::default())
    }

    #[test]
    fn horizontal_line_yields_one_segment() {
        let edges = edges_from(400, (50..300).map(|x| (x, 200)));
        let segments = detector().detect(&edges);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, (50, 200));
        assert_eq!(segments[0].end, (299, 200));
        assert_eq!(segments[0].angle_degrees(), 0.0);
    }

    #[test]
    fn diagonal_line_runs_down_right() {
        let edges = edges_from(400, (0..=177).map(|i| (50 + i, 50 + i)));
        let segments = detector().detect(&edges);
        assert_eq!(segments.len(), 1);
        assert!((segments[0].angle_degrees() - 45.0).abs() < 1.0);
        assert!((segments[0].length() - 250.3).abs() < 2.0);
    }

    #[test]
    fn small_gaps_are_bridged() {
        let edges = edges_from(400, (50..300).filter(|x| x % 20 != 0).map(|x| (x, 120)));
        let segments = detector().detect(&edges);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].length() > 240.0);
    }

    #[test]
    fn crossing_lines_are_both_found() {
        let horizontal = (50..300).map(|x| (x, 200));
        let vertical = (50..300).map(|y| (175, y));
        let segments = detector().detect(&edges_from(400, horizontal.chain(vertical)));
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn scattered_points_yield_nothing() {
        let dots = (0..40).map(|i| ((i * 37) % 400, (i * 91) % 400));
        assert!(detector().detect(&edges_from(400, dots)).is_empty());
    }

    #[test]
    fn short_line_is_not_a_segment() {
        let edges = edges_from(400, (100..160).map(|x| (x, 30)));
        assert!(detector().detect(&edges).is_empty());
    }

    #[test]
    fn zero_angle_step_finds_nothing() {
        let detector = SegmentDetector::new(SegmentSearchConfig {
            angle_step_degrees: 0.0,
            ..SegmentSearchConfig::default()
        });
        let edges = edges_from(400, (50..300).map(|x| (x, 200)));
        assert!(detector.detect(&edges).is_empty());
    }

    #[test]
    fn same_seed_gives_same_segments() {
        let points: Vec<_> = (50..300)
            .map(|x| (x, 200))
            .chain((0..=177).map(|i| (50 + i, 50 + i)))
            .collect();
        let edges = edges_from(400, points);
        assert_eq!(detector().detect(&edges), detector().detect(&edges));
    }
}
