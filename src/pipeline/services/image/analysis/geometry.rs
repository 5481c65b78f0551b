//! Measurements over closed pixel contours.

use imageproc::point::Point;

/// Enclosed area of a closed polygon (shoelace formula).
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice_area: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();
    twice_area.abs() as f64 / 2.0
}

/// Pixels covered by the region a closed 8-connected contour traces.
///
/// Pick's theorem over the boundary pixel centres: each chain step adds half a
/// pixel to the shoelace area, plus one for the closed turn. Spurs walked out
/// and back count once per pixel.
pub fn enclosed_pixel_area(points: &[Point<i32>]) -> f64 {
    match points.len() {
        0 => 0.0,
        1 => 1.0,
        steps => polygon_area(points) + steps as f64 / 2.0 + 1.0,
    }
}

/// Length of the closed polygon through `points`.
pub fn perimeter(points: &[Point<i32>]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| {
            let dx = (b.x - a.x) as f64;
            let dy = (b.y - a.y) as f64;
            dx.hypot(dy)
        })
        .sum()
}

/// `4π·area / perimeter²`, 1.0 for a perfect circle. `None` for a zero perimeter.
pub fn circularity(area: f64, perimeter: f64) -> Option<f64> {
    if perimeter <= 0.0 {
        return None;
    }
    Some(4.0 * std::f64::consts::PI * area / (perimeter * perimeter))
}
