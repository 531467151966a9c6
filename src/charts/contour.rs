//! Iso-line extraction on a rectilinear grid (marching squares).

/// A line segment in data coordinates.
pub type Segment = [(f64, f64); 2];

/// Iso-line of a grid at a single level.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourLine {
    pub level: f64,
    pub segments: Vec<Segment>,
}

// Cell edges, counter-clockwise from the bottom.
#[derive(Clone, Copy)]
enum Edge {
    Bottom,
    Right,
    Top,
    Left,
}

/// Trace the `level` iso-line of `z`, where `z[r][c]` sits at `(xs[c], ys[r])`.
///
/// Returns `None` when the grid is smaller than 2x2 or no cell crosses `level`.
/// Cells touching a non-finite value are skipped.
pub fn iso_line(xs: &[f64], ys: &[f64], z: &[Vec<f64>], level: f64) -> Option<ContourLine> {
    if xs.len() < 2 || ys.len() < 2 || z.len() != ys.len() {
        return None;
    }
    if z.iter().any(|row| row.len() != xs.len()) {
        return None;
    }

    let mut segments = Vec::new();
    for r in 0..ys.len() - 1 {
        for c in 0..xs.len() - 1 {
            let corners = [z[r][c], z[r][c + 1], z[r + 1][c + 1], z[r + 1][c]];
            if corners.iter().any(|v| !v.is_finite()) {
                continue;
            }
            let [bl, br, tr, tl] = corners;

            let case = (bl >= level) as u8
                | ((br >= level) as u8) << 1
                | ((tr >= level) as u8) << 2
                | ((tl >= level) as u8) << 3;

            let point = |edge: Edge| -> (f64, f64) {
                let (x0, x1, y0, y1) = (xs[c], xs[c + 1], ys[r], ys[r + 1]);
                match edge {
                    Edge::Bottom => (lerp(x0, x1, bl, br, level), y0),
                    Edge::Right => (x1, lerp(y0, y1, br, tr, level)),
                    Edge::Top => (lerp(x0, x1, tl, tr, level), y1),
                    Edge::Left => (x0, lerp(y0, y1, bl, tl, level)),
                }
            };
            let center_high = (bl + br + tr + tl) / 4.0 >= level;

            let pairs: &[(Edge, Edge)] = match case {
                0 | 15 => &[],
                1 | 14 => &[(Edge::Left, Edge::Bottom)],
                2 | 13 => &[(Edge::Bottom, Edge::Right)],
                3 | 12 => &[(Edge::Left, Edge::Right)],
                4 | 11 => &[(Edge::Right, Edge::Top)],
                6 | 9 => &[(Edge::Bottom, Edge::Top)],
                7 | 8 => &[(Edge::Left, Edge::Top)],
                // Saddles: the cell center decides which corners connect
                5 if center_high => &[(Edge::Left, Edge::Top), (Edge::Bottom, Edge::Right)],
                5 => &[(Edge::Left, Edge::Bottom), (Edge::Right, Edge::Top)],
                10 if center_high => &[(Edge::Left, Edge::Bottom), (Edge::Right, Edge::Top)],
                10 => &[(Edge::Bottom, Edge::Right), (Edge::Left, Edge::Top)],
                _ => &[],
            };

            for &(a, b) in pairs {
                segments.push([point(a), point(b)]);
            }
        }
    }

    if segments.is_empty() {
        None
    } else {
        Some(ContourLine { level, segments })
    }
}

/// Position between `p0` and `p1` where the value crosses `level`.
fn lerp(p0: f64, p1: f64, v0: f64, v1: f64, level: f64) -> f64 {
    let dv = v1 - v0;
    let t = if dv == 0.0 { 0.5 } else { (level - v0) / dv };
    p0 + (p1 - p0) * t
}
