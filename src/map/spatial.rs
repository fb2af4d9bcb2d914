use std::collections::HashMap;

/// Spatial index over shape bounding boxes using fixed-size degree cells.
/// Conservative: a shape is registered in every cell its bbox overlaps, so
/// point queries can return false positives but never miss a shape. Exact
/// point-in-polygon tests happen downstream.
pub struct ShapeGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl ShapeGrid {
    /// Build the grid from shape bounding boxes, in index order.
    pub fn build(
        bboxes: impl Iterator<Item = (f64, f64, f64, f64)>,
        cell_size: f64,
    ) -> Self {
        let mut grid = Self {
            cells: HashMap::new(),
            cell_size,
        };
        for (idx, (min_lon, min_lat, max_lon, max_lat)) in bboxes.enumerate() {
            let (cx0, cy0) = grid.to_cell(min_lon, min_lat);
            let (cx1, cy1) = grid.to_cell(max_lon, max_lat);
            for cy in cy0..=cy1 {
                for cx in cx0..=cx1 {
                    grid.cells.entry((cx, cy)).or_default().push(idx);
                }
            }
        }
        grid
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        (
            (lon / self.cell_size).floor() as i32,
            (lat / self.cell_size).floor() as i32,
        )
    }

    /// Candidate shape indices whose bbox overlaps the cell containing the
    /// point, in ascending index order.
    pub fn candidates_at(&self, lon: f64, lat: f64) -> &[usize] {
        self.cells
            .get(&self.to_cell(lon, lat))
            .map(|indices| indices.as_slice())
            .unwrap_or(&[])
    }
}
