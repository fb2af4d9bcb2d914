use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm.
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw a thicker line (used for the hover highlight outline).
pub fn draw_thick_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    draw_line(canvas, x0, y0, x1, y1);
    draw_line(canvas, x0 + 1, y0, x1 + 1, y1);
    draw_line(canvas, x0, y0 + 1, x1, y1 + 1);
}

/// Fill a polygon given its projected rings using even-odd scanline
/// filling. Holes fall out naturally: a scanline crossing into a hole has
/// an even crossing count and stays unfilled.
pub fn fill_polygon(canvas: &mut BrailleCanvas, rings: &[Vec<(i32, i32)>]) {
    let ys = rings.iter().flatten().map(|&(_, y)| y);
    let (min_y, max_y) = match ys.clone().min().zip(ys.max()) {
        Some(bounds) => bounds,
        None => return,
    };

    let min_y = min_y.max(0);
    let max_y = max_y.min(canvas.pixel_height() as i32 - 1);
    let max_x = canvas.pixel_width() as i32 - 1;

    let mut crossings: Vec<i32> = Vec::new();
    for y in min_y..=max_y {
        crossings.clear();

        for ring in rings {
            if ring.len() < 3 {
                continue;
            }
            for i in 0..ring.len() {
                let (ax, ay) = ring[i];
                let (bx, by) = ring[(i + 1) % ring.len()];
                if ay == by {
                    continue;
                }
                // Half-open span [min, max) so shared vertices count once.
                let (lo_y, lo_x, hi_y, hi_x) = if ay < by {
                    (ay, ax, by, bx)
                } else {
                    (by, bx, ay, ax)
                };
                if y >= lo_y && y < hi_y {
                    let t = (y - lo_y) as f64 / (hi_y - lo_y) as f64;
                    let x = lo_x as f64 + t * (hi_x - lo_x) as f64;
                    crossings.push(x.round() as i32);
                }
            }
        }

        crossings.sort_unstable();
        for pair in crossings.chunks_exact(2) {
            let start = pair[0].max(0);
            let end = pair[1].min(max_x);
            for x in start..=end {
                canvas.set_pixel_signed(x, y);
            }
        }
    }
}

/// Even-odd point-in-polygon test over geographic rings. A point inside a
/// hole crosses the boundary an even number of times and tests false.
pub fn point_in_polygon(lon: f64, lat: f64, rings: &[Vec<(f64, f64)>]) -> bool {
    let mut inside = false;
    for ring in rings {
        let n = ring.len();
        if n < 3 {
            continue;
        }
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = ring[i];
            let (xj, yj) = ring[j];
            if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
    }
    inside
}
