use std::f64::consts::PI;

/// Zoom bounds for the whole viewer; 1.0 shows the full world across the
/// canvas width.
pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 100.0;

/// Latitude limit of the Web Mercator projection.
const LAT_LIMIT: f64 = 85.05113;

/// Mercator-normalized y in [0, 1] for a latitude in degrees.
fn mercator_y(lat: f64) -> f64 {
    let lat_rad = lat.clamp(-LAT_LIMIT, LAT_LIMIT).to_radians();
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

/// Inverse of `mercator_y`, back to degrees.
fn inv_mercator_y(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees()
}

/// Mercator-normalized x in [0, 1] for a longitude in degrees.
fn mercator_x(lon: f64) -> f64 {
    (lon + 180.0) / 360.0
}

/// Viewport representing the visible map area and zoom level.
#[derive(Clone)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-90 to 90)
    pub center_lat: f64,
    /// Zoom level (higher = more zoomed in)
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
        }
    }

    /// Pan the viewport by pixel delta.
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = 360.0 / (self.zoom * self.width as f64);
        self.center_lon += dx as f64 * scale;
        self.center_lat -= dy as f64 * scale * 0.5; // Mercator distortion

        // Wrap longitude
        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }

        // Clamp latitude
        self.center_lat = self.center_lat.clamp(-85.0, 85.0);
    }

    /// Zoom in by a fixed factor.
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(MAX_ZOOM);
    }

    /// Zoom out by a fixed factor.
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(MIN_ZOOM);
    }

    /// Zoom in towards a specific pixel location.
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.5);
    }

    /// Zoom out from a specific pixel location.
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / 1.5);
    }

    /// Zoom by factor while keeping the point under `(px, py)` fixed.
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let (lon, lat) = self.unproject(px, py);

        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);

        // Pan so the anchor point lands back under the cursor.
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Fit the viewport to a geographic bounding box, keeping `padding`
    /// pixels free on every side and never zooming past `max_zoom`
    /// (prevents over-zooming tiny regions).
    pub fn fit_bounds(&mut self, bbox: (f64, f64, f64, f64), padding: usize, max_zoom: f64) {
        let (min_lon, min_lat, max_lon, max_lat) = bbox;

        self.center_lon = (min_lon + max_lon) / 2.0;
        self.center_lat = ((min_lat + max_lat) / 2.0).clamp(-85.0, 85.0);

        let x_span = (mercator_x(max_lon) - mercator_x(min_lon)).abs().max(1e-9);
        let y_span = (mercator_y(min_lat) - mercator_y(max_lat)).abs().max(1e-9);

        let usable_w = self.width.saturating_sub(2 * padding).max(1) as f64;
        let usable_h = self.height.saturating_sub(2 * padding).max(1) as f64;

        // Zoom is expressed in multiples of the canvas width (see project).
        let zoom_x = usable_w / (x_span * self.width as f64);
        let zoom_y = usable_h / (y_span * self.width as f64);
        self.zoom = zoom_x.min(zoom_y).clamp(MIN_ZOOM, max_zoom.min(MAX_ZOOM));
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates.
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let scale = self.zoom * self.width as f64;

        let px = (mercator_x(lon) - mercator_x(self.center_lon)) * scale + self.width as f64 / 2.0;
        let py = (mercator_y(lat) - mercator_y(self.center_lat)) * scale + self.height as f64 / 2.0;

        (px as i32, py as i32)
    }

    /// Unproject pixel coordinates back to geographic coordinates.
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let scale = self.zoom * self.width as f64;

        let x = (px as f64 - self.width as f64 / 2.0) / scale + mercator_x(self.center_lon);
        let y = (py as f64 - self.height as f64 / 2.0) / scale + mercator_y(self.center_lat);

        (x * 360.0 - 180.0, inv_mercator_y(y))
    }

    /// Rough cull: does the projected box overlap the viewport at all?
    pub fn box_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0 && min_x < self.width as i32 && max_y >= 0 && min_y < self.height as i32
    }
}
