/// Braille Unicode canvas for high-resolution terminal graphics.
/// Each character cell is a 2x4 dot grid, so a canvas of `width` x
/// `height` characters exposes a `width*2` x `height*4` pixel surface.
/// Unicode Braille patterns: U+2800 to U+28FF.
pub struct BrailleCanvas {
    width: usize,      // character columns
    height: usize,     // character rows
    cells: Vec<u8>,    // dot bit pattern per cell, row-major
}

/// Dot bit for pixel (x % 2, y % 4) within one cell:
/// ```text
/// (0,0) (1,0)   bits: 0x01 0x08
/// (0,1) (1,1)   bits: 0x02 0x10
/// (0,2) (1,2)   bits: 0x04 0x20
/// (0,3) (1,3)   bits: 0x40 0x80
/// ```
const DOT_BITS: [[u8; 2]; 4] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

impl BrailleCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0u8; width * height],
        }
    }

    /// Pixel resolution horizontally (2 dots per character column).
    pub fn pixel_width(&self) -> usize {
        self.width * 2
    }

    /// Pixel resolution vertically (4 dots per character row).
    pub fn pixel_height(&self) -> usize {
        self.height * 4
    }

    /// Reset every cell to the blank pattern.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Set the dot at pixel coordinates. Out-of-range pixels are ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let cx = x / 2;
        let cy = y / 4;
        if cx >= self.width || cy >= self.height {
            return;
        }
        self.cells[cy * self.width + cx] |= DOT_BITS[y % 4][x % 2];
    }

    /// Set a dot using signed coordinates (negative values are ignored).
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    /// Get a specific character row as a string (for line-by-line rendering).
    pub fn row_to_string(&self, row: usize) -> String {
        if row >= self.height {
            return String::new();
        }
        self.cells[row * self.width..(row + 1) * self.width]
            .iter()
            .map(|&bits| char::from_u32(0x2800 + bits as u32).unwrap_or(' '))
            .collect()
    }

    /// All character rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.height).map(|row| self.row_to_string(row))
    }

    #[cfg(test)]
    pub fn render_to_string(&self) -> String {
        self.rows().collect::<Vec<_>>().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_dot() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set_pixel(0, 0);
        assert_eq!(canvas.render_to_string(), "⠁"); // U+2801
    }

    #[test]
    fn test_full_cell() {
        let mut canvas = BrailleCanvas::new(1, 1);
        for x in 0..2 {
            for y in 0..4 {
                canvas.set_pixel(x, y);
            }
        }
        assert_eq!(canvas.render_to_string(), "⣿"); // U+28FF (all dots)
    }

    #[test]
    fn test_diagonal_spans_cells() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.set_pixel(0, 0);
        canvas.set_pixel(1, 1);
        canvas.set_pixel(2, 2);
        canvas.set_pixel(3, 3);
        // First cell: (0,0) and (1,1) = 0x01 | 0x10 = 0x11
        // Second cell: (0,2) and (1,3) = 0x04 | 0x80 = 0x84
        assert_eq!(canvas.render_to_string(), "⠑⢄");
    }

    #[test]
    fn test_clear_resets_all_cells() {
        let mut canvas = BrailleCanvas::new(2, 2);
        canvas.set_pixel(1, 1);
        canvas.set_pixel(3, 7);
        canvas.clear();
        assert_eq!(canvas.render_to_string(), "⠀⠀\n⠀⠀");
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set_pixel(2, 0);
        canvas.set_pixel(0, 4);
        canvas.set_pixel_signed(-1, 0);
        assert_eq!(canvas.render_to_string(), "⠀");
    }
}
