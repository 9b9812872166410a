use std::f32::consts::TAU;

/// The classic parametric heart spans roughly ±16 horizontally; dividing by 20
/// keeps both axes inside [-1, 1].
const HEART_NORMALIZER: f32 = 20.0;

/// A point in normalized shape space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapePoint {
    pub x: f32,
    pub y: f32,
}

/// Sample `count` points of the heart curve at equally spaced parameter values
/// over one revolution. Y grows downward, so the lobes sit at the top.
pub fn heart_points(count: usize) -> Vec<ShapePoint> {
    (0..count)
        .map(|i| {
            let t = i as f32 / count as f32 * TAU;
            let x = 16.0 * t.sin().powi(3);
            let y = -(13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos());
            ShapePoint {
                x: x / HEART_NORMALIZER,
                y: y / HEART_NORMALIZER,
            }
        })
        .collect()
}
