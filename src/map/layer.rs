use crate::braille::BrailleCanvas;
use crate::data::{District, DistrictProps};
use crate::map::geometry::{draw_line, draw_thick_line, fill_polygon, point_in_polygon};
use crate::map::projection::Viewport;
use crate::map::spatial::ShapeGrid;
use crate::risk::{classify, RiskCategory};

/// Grid cell size for hit-test candidate lookup, in degrees.
const GRID_CELL_DEGREES: f64 = 1.0;

/// Visibility toggles for the three known risk categories. There is
/// deliberately no toggle governing Unknown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Filters {
    pub high: bool,
    pub medium: bool,
    pub low: bool,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            high: true,
            medium: true,
            low: true,
        }
    }
}

/// One rendered district: geometry, classification, and transient style
/// state. Hidden shapes stay in the layer and stay hit-testable; they
/// only stop drawing.
pub struct DistrictShape {
    pub props: DistrictProps,
    pub category: RiskCategory,
    /// Lower-cased primary name, used by search to re-resolve a feature
    /// match against the layer. Empty when the feature has no name.
    pub name_key: String,
    pub rings: Vec<Vec<(f64, f64)>>,
    pub bbox: (f64, f64, f64, f64),
    pub visible: bool,
}

/// Per-frame render output: one fill canvas per category plus stroke and
/// hover-highlight canvases, composited by the UI in z-order.
pub struct LayerCanvases {
    pub high: BrailleCanvas,
    pub medium: BrailleCanvas,
    pub low: BrailleCanvas,
    pub unknown: BrailleCanvas,
    pub stroke: BrailleCanvas,
    pub highlight: BrailleCanvas,
}

impl LayerCanvases {
    fn new(cols: usize, rows: usize) -> Self {
        Self {
            high: BrailleCanvas::new(cols, rows),
            medium: BrailleCanvas::new(cols, rows),
            low: BrailleCanvas::new(cols, rows),
            unknown: BrailleCanvas::new(cols, rows),
            stroke: BrailleCanvas::new(cols, rows),
            highlight: BrailleCanvas::new(cols, rows),
        }
    }

    fn fill_canvas_mut(&mut self, category: RiskCategory) -> &mut BrailleCanvas {
        match category {
            RiskCategory::High => &mut self.high,
            RiskCategory::Medium => &mut self.medium,
            RiskCategory::Low => &mut self.low,
            RiskCategory::Unknown => &mut self.unknown,
        }
    }
}

/// The choropleth layer: every district shape plus a spatial index for
/// hover and click hit tests.
#[derive(Default)]
pub struct ChoroplethLayer {
    shapes: Vec<DistrictShape>,
    grid: Option<ShapeGrid>,
}

impl ChoroplethLayer {
    /// Build the layer from the loaded feature collection. Every shape
    /// starts visible, including Unknown (hidden only once filters run).
    pub fn from_districts(districts: &[District]) -> Self {
        let shapes: Vec<DistrictShape> = districts
            .iter()
            .map(|district| DistrictShape {
                props: district.props.clone(),
                category: classify(district.props.risk_level.as_deref().unwrap_or("")),
                name_key: district
                    .props
                    .primary_name()
                    .unwrap_or("")
                    .to_lowercase(),
                rings: district.rings.clone(),
                bbox: district.bbox,
                visible: true,
            })
            .collect();

        let grid = ShapeGrid::build(shapes.iter().map(|s| s.bbox), GRID_CELL_DEGREES);
        Self {
            shapes,
            grid: Some(grid),
        }
    }

    pub fn shapes(&self) -> &[DistrictShape] {
        &self.shapes
    }

    pub fn shape(&self, idx: usize) -> Option<&DistrictShape> {
        self.shapes.get(idx)
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Re-scan every shape against the filter toggles. A shape is shown
    /// iff its category's toggle is on; Unknown has no toggle and is
    /// hidden by every re-scan.
    pub fn apply_filters(&mut self, filters: Filters) {
        for shape in &mut self.shapes {
            shape.visible = match shape.category {
                RiskCategory::High => filters.high,
                RiskCategory::Medium => filters.medium,
                RiskCategory::Low => filters.low,
                RiskCategory::Unknown => false,
            };
        }
    }

    /// Topmost shape under the geographic point. Hidden shapes are still
    /// hit: filtering zeroes their style, it does not remove them.
    pub fn hit_test(&self, lon: f64, lat: f64) -> Option<usize> {
        let grid = self.grid.as_ref()?;
        grid.candidates_at(lon, lat)
            .iter()
            .copied()
            .filter(|&idx| {
                let shape = &self.shapes[idx];
                let (min_lon, min_lat, max_lon, max_lat) = shape.bbox;
                lon >= min_lon
                    && lon <= max_lon
                    && lat >= min_lat
                    && lat <= max_lat
                    && point_in_polygon(lon, lat, &shape.rings)
            })
            .max()
    }

    /// First shape whose lower-cased name equals `name_key`. This is the
    /// search controller's second pass: matches resolve by name equality,
    /// not by index, so duplicate district names land on the first shape.
    pub fn find_by_name(&self, name_key: &str) -> Option<usize> {
        if name_key.is_empty() {
            return None;
        }
        self.shapes.iter().position(|s| s.name_key == name_key)
    }

    /// Render every visible shape into per-category canvases. The hovered
    /// shape is drawn last with a thick accent outline, raised above its
    /// siblings, and is drawn even when a filter hides it.
    pub fn render(
        &self,
        cols: usize,
        rows: usize,
        viewport: &Viewport,
        hovered: Option<usize>,
    ) -> LayerCanvases {
        let mut out = LayerCanvases::new(cols, rows);

        for (idx, shape) in self.shapes.iter().enumerate() {
            if hovered == Some(idx) {
                continue;
            }
            draw_shape(&mut out, shape, viewport, false);
        }
        if let Some(shape) = hovered.and_then(|idx| self.shapes.get(idx)) {
            draw_shape(&mut out, shape, viewport, true);
        }

        out
    }
}

fn draw_shape(out: &mut LayerCanvases, shape: &DistrictShape, viewport: &Viewport, highlight: bool) {
    if !shape.visible && !highlight {
        return;
    }

    // Cull whole shapes outside the viewport.
    let (min_lon, min_lat, max_lon, max_lat) = shape.bbox;
    let corner_a = viewport.project(min_lon, max_lat);
    let corner_b = viewport.project(max_lon, min_lat);
    if !viewport.box_might_be_visible(corner_a, corner_b) {
        return;
    }

    let projected: Vec<Vec<(i32, i32)>> = shape
        .rings
        .iter()
        .map(|ring| {
            ring.iter()
                .map(|&(lon, lat)| viewport.project(lon, lat))
                .collect()
        })
        .collect();

    fill_polygon(out.fill_canvas_mut(shape.category), &projected);

    let stroke = if highlight {
        &mut out.highlight
    } else {
        &mut out.stroke
    };
    for ring in &projected {
        if ring.len() < 2 {
            continue;
        }
        let mut prev: Option<(i32, i32)> = None;
        for &(px, py) in ring.iter().chain(ring.first()) {
            if let Some((prev_x, prev_y)) = prev {
                // Skip segments that wrap across most of the canvas.
                let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
                if dist < viewport.width && viewport.box_might_be_visible((prev_x, prev_y), (px, py))
                {
                    if highlight {
                        draw_thick_line(stroke, prev_x, prev_y, px, py);
                    } else {
                        draw_line(stroke, prev_x, prev_y, px, py);
                    }
                }
            }
            prev = Some((px, py));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DistrictProps;

    fn district(name: &str, state: &str, risk: Option<&str>, x0: f64, y0: f64) -> District {
        District {
            props: DistrictProps {
                district_name: Some(name.to_string()),
                state: Some(state.to_string()),
                risk_level: risk.map(String::from),
                ..DistrictProps::default()
            },
            rings: vec![vec![(x0, y0), (x0 + 1.0, y0), (x0 + 1.0, y0 + 1.0), (x0, y0 + 1.0)]],
            bbox: (x0, y0, x0 + 1.0, y0 + 1.0),
        }
    }

    fn sample_layer() -> ChoroplethLayer {
        ChoroplethLayer::from_districts(&[
            district("Patna", "Bihar", Some("High"), 85.0, 25.0),
            district("Guwahati", "Assam", Some("Medium Risk"), 91.0, 26.0),
            district("Jaipur", "Rajasthan", Some("Low"), 75.0, 26.0),
            district("Aizawl", "Mizoram", None, 92.0, 23.0),
        ])
    }

    #[test]
    fn test_filters_hide_exactly_the_toggled_off_categories() {
        let mut layer = sample_layer();
        layer.apply_filters(Filters {
            high: true,
            medium: false,
            low: true,
        });

        let visible: Vec<bool> = layer.shapes().iter().map(|s| s.visible).collect();
        assert_eq!(visible, [true, false, true, false]);
    }

    #[test]
    fn test_unknown_is_never_visible_after_any_filter_pass() {
        let mut layer = sample_layer();
        // Unknown starts visible, before any filter interaction.
        assert!(layer.shapes()[3].visible);

        for filters in [
            Filters::default(),
            Filters {
                high: false,
                medium: false,
                low: false,
            },
        ] {
            layer.apply_filters(filters);
            assert!(!layer.shapes()[3].visible);
        }
    }

    #[test]
    fn test_hit_test_finds_containing_shape_even_when_hidden() {
        let mut layer = sample_layer();
        assert_eq!(layer.hit_test(85.5, 25.5), Some(0));
        assert_eq!(layer.hit_test(50.0, 10.0), None);

        // Filtered-out shapes keep responding to hits.
        layer.apply_filters(Filters {
            high: false,
            medium: true,
            low: true,
        });
        assert_eq!(layer.hit_test(85.5, 25.5), Some(0));
    }

    #[test]
    fn test_find_by_name_is_first_match_and_ignores_empty() {
        let layer = ChoroplethLayer::from_districts(&[
            district("Aurangabad", "Bihar", Some("High"), 84.0, 24.0),
            district("Aurangabad", "Maharashtra", Some("Low"), 75.0, 19.0),
        ]);
        // Duplicate names resolve to the first shape; the second state's
        // district is unreachable by name (known limitation).
        assert_eq!(layer.find_by_name("aurangabad"), Some(0));
        assert_eq!(layer.find_by_name(""), None);
    }

    #[test]
    fn test_render_draws_visible_fills_only() {
        let mut layer = sample_layer();
        let viewport = Viewport::new(85.5, 25.5, 20.0, 120, 120);

        let canvases = layer.render(60, 30, &viewport, None);
        let lit = |c: &BrailleCanvas| c.rows().any(|r| r.chars().any(|ch| ch != '\u{2800}'));
        assert!(lit(&canvases.high));

        layer.apply_filters(Filters {
            high: false,
            medium: true,
            low: true,
        });
        let canvases = layer.render(60, 30, &viewport, None);
        assert!(!lit(&canvases.high));
        // Hovering the hidden shape raises it with the accent outline.
        let canvases = layer.render(60, 30, &viewport, Some(0));
        assert!(lit(&canvases.highlight));
        assert!(lit(&canvases.high));
    }
}
