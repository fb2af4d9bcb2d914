use std::path::PathBuf;

use crate::data::{self, District};
use crate::map::{ChoroplethLayer, Filters, Viewport};
use crate::popup::{build_popup, PopupContent};
use crate::risk::{RiskCategory, RiskTally};

/// Default view: centered on India at a country-level zoom.
pub const DEFAULT_CENTER: (f64, f64) = (78.9629, 20.5937);
pub const DEFAULT_ZOOM: f64 = 4.0;

/// Padding and zoom ceiling applied when fitting the view to one district
/// (click or search focus).
const FOCUS_PADDING_PX: usize = 12;
const FOCUS_MAX_ZOOM: f64 = 40.0;

/// Counters advance every other frame; at the ~60fps poll rate the ramp
/// takes about a second.
const COUNTER_TICK_FRAMES: u64 = 2;

/// Shown when a search is submitted with nothing to search for.
pub const EMPTY_QUERY_PROMPT: &str = "Please enter a district or city name";

/// Animated count-up display for one tally figure.
#[derive(Clone, Copy, Debug)]
pub struct Counter {
    current: usize,
    target: usize,
    step: usize,
}

impl Counter {
    /// The step size ramps the display from 0 to target in at most 30
    /// ticks. A zero target is done from the start; the `max(1)` keeps
    /// the step well-defined for it.
    pub fn new(target: usize) -> Self {
        Self {
            current: 0,
            target,
            step: target.div_ceil(30).max(1),
        }
    }

    /// Advance one step, clamping exactly at the target.
    pub fn tick(&mut self) {
        if self.current < self.target {
            self.current = (self.current + self.step).min(self.target);
        }
    }

    pub fn value(&self) -> usize {
        self.current
    }

    pub fn is_done(&self) -> bool {
        self.current >= self.target
    }
}

/// Outcome of the dataset load. A failure replaces the map with an error
/// panel until the user reloads or quits.
pub enum LoadState {
    Ready,
    Failed(String),
}

/// Keyboard focus: normal dispatch, or the search prompt capturing text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

/// Application state: the feature collection, derived tally, rendered
/// layer, and every piece of transient UI state. Constructed once at
/// startup and handed to each event handler; nothing lives in globals.
pub struct App {
    pub data_path: PathBuf,
    pub load_state: LoadState,
    /// Full ordered feature collection, read-only after load.
    pub features: Vec<District>,
    pub layer: ChoroplethLayer,
    pub tally: RiskTally,
    /// Animated counters in category order: high, medium, low.
    pub counters: [Counter; 3],
    pub filters: Filters,
    pub viewport: Viewport,
    pub input_mode: InputMode,
    pub search_query: String,
    /// Blocking notice (empty query, no results); the next key or click
    /// dismisses it.
    pub notice: Option<String>,
    pub popup: Option<PopupContent>,
    /// Shape index under the mouse cursor, recomputed every frame.
    pub hovered: Option<usize>,
    pub legend_open: bool,
    pub panel_open: bool,
    pub should_quit: bool,
    /// Current mouse position for the cursor marker.
    pub mouse_pos: Option<(u16, u16)>,
    /// Last mouse position while a drag is in progress.
    pub last_mouse: Option<(u16, u16)>,
    drag_moved: bool,
    frame: u64,
}

impl App {
    pub fn new(width: usize, height: usize, data_path: PathBuf) -> Self {
        let (pixel_width, pixel_height) = Self::canvas_pixels(width, height);
        Self {
            data_path,
            load_state: LoadState::Ready,
            features: Vec::new(),
            layer: ChoroplethLayer::default(),
            tally: RiskTally::default(),
            counters: [Counter::new(0); 3],
            filters: Filters::default(),
            viewport: Viewport::new(
                DEFAULT_CENTER.0,
                DEFAULT_CENTER.1,
                DEFAULT_ZOOM,
                pixel_width,
                pixel_height,
            ),
            input_mode: InputMode::Normal,
            search_query: String::new(),
            notice: None,
            popup: None,
            hovered: None,
            legend_open: true,
            panel_open: true,
            should_quit: false,
            mouse_pos: None,
            last_mouse: None,
            drag_moved: false,
            frame: 0,
        }
    }

    /// Braille gives 2x4 pixels per character; the border and status bar
    /// take 2 columns and 3 rows off the terminal size.
    fn canvas_pixels(width: usize, height: usize) -> (usize, usize) {
        let inner_width = width.saturating_sub(2);
        let inner_height = height.saturating_sub(3);
        (inner_width * 2, inner_height * 4)
    }

    /// Update viewport size when the terminal resizes.
    pub fn resize(&mut self, width: usize, height: usize) {
        let (pixel_width, pixel_height) = Self::canvas_pixels(width, height);
        self.viewport.width = pixel_width;
        self.viewport.height = pixel_height;
    }

    // ---- dataset lifecycle ----

    /// Load (or re-load) the dataset. All-or-nothing: failure drops into
    /// the error state with an empty collection.
    pub fn load(&mut self) {
        match data::load_districts(&self.data_path) {
            Ok(districts) => self.set_districts(districts),
            Err(err) => {
                self.features = Vec::new();
                self.layer = ChoroplethLayer::default();
                self.tally = RiskTally::default();
                self.counters = [Counter::new(0); 3];
                self.load_state = LoadState::Failed(format!("{err:#}"));
            }
        }
    }

    /// Install a loaded feature collection: rebuild the layer, recompute
    /// the tally in full, and restart the counters from zero.
    pub fn set_districts(&mut self, districts: Vec<District>) {
        self.tally = RiskTally::from_levels(
            districts
                .iter()
                .map(|d| d.props.risk_level.as_deref().unwrap_or("")),
        );
        self.counters = [
            Counter::new(self.tally.high),
            Counter::new(self.tally.medium),
            Counter::new(self.tally.low),
        ];
        self.layer = ChoroplethLayer::from_districts(&districts);
        self.features = districts;
        self.load_state = LoadState::Ready;
    }

    /// Manual reload: a full reset of view and UI state followed by a
    /// fresh load, the terminal analog of reloading the page.
    pub fn reload(&mut self) {
        self.filters = Filters::default();
        self.viewport = Viewport::new(
            DEFAULT_CENTER.0,
            DEFAULT_CENTER.1,
            DEFAULT_ZOOM,
            self.viewport.width,
            self.viewport.height,
        );
        self.input_mode = InputMode::Normal;
        self.search_query.clear();
        self.notice = None;
        self.popup = None;
        self.hovered = None;
        self.load();
    }

    // ---- per-frame work ----

    /// Advance animations and recompute the hovered shape. Runs once per
    /// main-loop iteration.
    pub fn tick(&mut self) {
        self.frame = self.frame.wrapping_add(1);
        if self.frame % COUNTER_TICK_FRAMES == 0 {
            for counter in &mut self.counters {
                counter.tick();
            }
        }
        self.hovered = self
            .mouse_geo()
            .and_then(|(lon, lat)| self.layer.hit_test(lon, lat));
    }

    // ---- filters ----

    /// Flip one category's visibility toggle and re-scan the layer.
    /// Unknown has no toggle; asking for it is a no-op.
    pub fn toggle_filter(&mut self, category: RiskCategory) {
        match category {
            RiskCategory::High => self.filters.high = !self.filters.high,
            RiskCategory::Medium => self.filters.medium = !self.filters.medium,
            RiskCategory::Low => self.filters.low = !self.filters.low,
            RiskCategory::Unknown => return,
        }
        self.layer.apply_filters(self.filters);
    }

    // ---- search ----

    pub fn open_search(&mut self) {
        self.input_mode = InputMode::Search;
        self.search_query.clear();
    }

    pub fn cancel_search(&mut self) {
        self.input_mode = InputMode::Normal;
        self.search_query.clear();
    }

    pub fn search_input(&mut self, c: char) {
        self.search_query.push(c);
    }

    pub fn search_backspace(&mut self) {
        self.search_query.pop();
    }

    /// Run the search. Matching scans the feature collection for a
    /// case-insensitive substring hit on district/name or state; the
    /// first hit is then re-resolved against the rendered layer by name
    /// equality (a second pass, so duplicate names are not
    /// disambiguated) and focused.
    pub fn submit_search(&mut self) {
        self.input_mode = InputMode::Normal;
        let term = self.search_query.trim().to_lowercase();
        self.search_query.clear();

        if term.is_empty() {
            self.notice = Some(EMPTY_QUERY_PROMPT.to_string());
            return;
        }

        let mut found = false;
        let mut target = None;
        for district in &self.features {
            let name = district
                .props
                .primary_name()
                .unwrap_or("")
                .to_lowercase();
            let state = district
                .props
                .state
                .as_deref()
                .unwrap_or("")
                .to_lowercase();
            if !name.contains(&term) && !state.contains(&term) {
                continue;
            }
            found = true;
            if let Some(idx) = self.layer.find_by_name(&name) {
                target = Some(idx);
                break;
            }
        }

        if let Some(idx) = target {
            self.focus_shape(idx);
        } else if !found {
            self.notice = Some(format!("No results found for \"{term}\""));
        }
    }

    // ---- focus, popup, notices ----

    /// Zoom the viewport to one shape and open its popup.
    pub fn focus_shape(&mut self, idx: usize) {
        if let Some(shape) = self.layer.shape(idx) {
            self.viewport
                .fit_bounds(shape.bbox, FOCUS_PADDING_PX, FOCUS_MAX_ZOOM);
            self.popup = Some(build_popup(&shape.props));
        }
    }

    pub fn close_popup(&mut self) {
        self.popup = None;
    }

    /// Clear a blocking notice. Returns true when one was showing, so the
    /// dispatcher can swallow the dismissing key press.
    pub fn dismiss_notice(&mut self) -> bool {
        self.notice.take().is_some()
    }

    // ---- viewport controls ----

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = Self::braille_pos(col, row);
        self.viewport.zoom_in_at(px, py);
    }

    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = Self::braille_pos(col, row);
        self.viewport.zoom_out_at(px, py);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    // ---- mouse ----

    /// Convert terminal coordinates to braille pixel coordinates,
    /// accounting for the one-cell border.
    fn braille_pos(col: u16, row: u16) -> (i32, i32) {
        (
            (col.saturating_sub(1) as i32) * 2,
            (row.saturating_sub(1) as i32) * 4,
        )
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Mouse position in braille pixels (for the cursor marker).
    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos.map(|(col, row)| Self::braille_pos(col, row))
    }

    /// Mouse position as geographic coordinates.
    pub fn mouse_geo(&self) -> Option<(f64, f64)> {
        self.mouse_pixel_pos()
            .map(|(px, py)| self.viewport.unproject(px, py))
    }

    pub fn begin_drag(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        self.drag_moved = false;
    }

    /// Continue a drag: pan with zoom-scaled sensitivity.
    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_col, last_row)) = self.last_mouse {
            let dx = last_col as i32 - col as i32;
            let dy = last_row as i32 - row as i32;
            if dx != 0 || dy != 0 {
                self.drag_moved = true;
            }
            let scale = if self.viewport.zoom < 2.0 {
                2
            } else if self.viewport.zoom < 4.0 {
                3
            } else {
                4
            };
            self.pan(dx * scale, dy * scale);
        }
        self.last_mouse = Some((col, row));
    }

    /// Finish a press: a press that never moved is a click, which either
    /// dismisses a notice, focuses the shape under the cursor, or closes
    /// the popup when the click lands on empty map.
    pub fn end_drag(&mut self, col: u16, row: u16) {
        let was_click = self.last_mouse.is_some() && !self.drag_moved;
        self.last_mouse = None;
        if !was_click {
            return;
        }
        if self.dismiss_notice() {
            return;
        }
        let (px, py) = Self::braille_pos(col, row);
        let (lon, lat) = self.viewport.unproject(px, py);
        match self.layer.hit_test(lon, lat) {
            Some(idx) => self.focus_shape(idx),
            None => self.popup = None,
        }
    }

    // ---- panel toggles ----

    pub fn toggle_legend(&mut self) {
        self.legend_open = !self.legend_open;
    }

    pub fn toggle_panel(&mut self) {
        self.panel_open = !self.panel_open;
    }

    // ---- status bar text ----

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    pub fn center_coords(&self) -> String {
        format!(
            "{:.1}°{}, {:.1}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DistrictProps;

    fn district(name: &str, state: &str, risk: &str, x0: f64, y0: f64) -> District {
        District {
            props: DistrictProps {
                district_name: Some(name.to_string()),
                state: Some(state.to_string()),
                risk_level: Some(risk.to_string()),
                ..DistrictProps::default()
            },
            rings: vec![vec![(x0, y0), (x0 + 1.0, y0), (x0 + 1.0, y0 + 1.0), (x0, y0 + 1.0)]],
            bbox: (x0, y0, x0 + 1.0, y0 + 1.0),
        }
    }

    fn app_with_sample_data() -> App {
        let mut app = App::new(80, 24, PathBuf::from("unused.geojson"));
        app.set_districts(vec![
            district("Mumbai", "Maharashtra", "High", 72.7, 18.9),
            district("Patna", "Bihar", "Medium Risk", 85.0, 25.0),
            district("Jaipur", "Rajasthan", "Low", 75.5, 26.7),
        ]);
        app
    }

    #[test]
    fn test_counter_terminates_exactly_at_target() {
        for target in [0usize, 1, 29, 30, 31, 97, 1000] {
            let mut counter = Counter::new(target);
            let mut ticks = 0;
            while !counter.is_done() {
                counter.tick();
                assert!(counter.value() <= target, "overshot target {target}");
                ticks += 1;
                assert!(ticks <= 31, "counter for {target} did not terminate");
            }
            assert_eq!(counter.value(), target);
        }
    }

    #[test]
    fn test_counter_zero_target_is_done_immediately() {
        let counter = Counter::new(0);
        assert!(counter.is_done());
        assert_eq!(counter.value(), 0);
    }

    #[test]
    fn test_counters_reach_tally_through_ticks() {
        let mut app = app_with_sample_data();
        assert_eq!(
            app.tally,
            RiskTally {
                high: 1,
                medium: 1,
                low: 1
            }
        );
        for _ in 0..120 {
            app.tick();
        }
        assert_eq!(app.counters[0].value(), 1);
        assert_eq!(app.counters[1].value(), 1);
        assert_eq!(app.counters[2].value(), 1);
    }

    #[test]
    fn test_search_matches_by_district_name() {
        let mut app = app_with_sample_data();
        app.open_search();
        for c in "mumbai".chars() {
            app.search_input(c);
        }
        app.submit_search();

        assert!(app.notice.is_none());
        let popup = app.popup.expect("search focuses the matched district");
        assert_eq!(popup.title, "Mumbai");
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_search_matches_by_state() {
        let mut app = app_with_sample_data();
        app.open_search();
        for c in "rajasthan".chars() {
            app.search_input(c);
        }
        app.submit_search();
        assert_eq!(app.popup.expect("state match").title, "Jaipur");
    }

    #[test]
    fn test_whitespace_query_is_rejected_before_scanning() {
        let mut app = app_with_sample_data();
        app.open_search();
        for c in "   ".chars() {
            app.search_input(c);
        }
        app.submit_search();

        assert_eq!(app.notice.as_deref(), Some(EMPTY_QUERY_PROMPT));
        assert!(app.popup.is_none());
    }

    #[test]
    fn test_no_match_notice_contains_query_text() {
        let mut app = app_with_sample_data();
        app.open_search();
        for c in "zzz-no-such-place".chars() {
            app.search_input(c);
        }
        app.submit_search();

        let notice = app.notice.expect("no-results notice");
        assert!(notice.contains("zzz-no-such-place"));
        assert!(app.popup.is_none());
    }

    #[test]
    fn test_notice_blocks_until_dismissed() {
        let mut app = app_with_sample_data();
        app.notice = Some("anything".to_string());
        assert!(app.dismiss_notice());
        assert!(!app.dismiss_notice());
    }

    #[test]
    fn test_filter_toggle_rescans_layer() {
        let mut app = app_with_sample_data();
        app.toggle_filter(RiskCategory::Medium);
        assert!(!app.filters.medium);
        let visible: Vec<bool> = app.layer.shapes().iter().map(|s| s.visible).collect();
        assert_eq!(visible, [true, false, true]);

        app.toggle_filter(RiskCategory::Medium);
        assert!(app.layer.shapes().iter().all(|s| s.visible));

        // Unknown has no toggle: nothing changes.
        app.toggle_filter(RiskCategory::Unknown);
        assert!(app.layer.shapes().iter().all(|s| s.visible));
    }

    #[test]
    fn test_focus_shape_zooms_and_opens_popup() {
        let mut app = app_with_sample_data();
        app.focus_shape(1);
        assert_eq!(app.popup.as_ref().map(|p| p.title.as_str()), Some("Patna"));
        assert!((app.viewport.center_lon - 85.5).abs() < 1e-9);
        assert!((app.viewport.center_lat - 25.5).abs() < 1e-9);
        assert!(app.viewport.zoom > DEFAULT_ZOOM);
    }

    #[test]
    fn test_reload_failure_enters_error_state() {
        let mut app = App::new(80, 24, PathBuf::from("definitely-missing.geojson"));
        app.load();
        assert!(matches!(app.load_state, LoadState::Failed(_)));
        assert!(app.features.is_empty());
        assert!(app.layer.is_empty());
    }
}
