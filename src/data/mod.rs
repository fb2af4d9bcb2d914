use anyhow::{bail, Context, Result};
use geojson::{Feature, GeoJson, JsonObject, JsonValue, Value};
use rayon::prelude::*;
use std::fs;
use std::path::Path;

/// Properties carried by one district feature. All fields are optional in
/// the source data; classification and display apply their own fallbacks.
#[derive(Clone, Debug, Default)]
pub struct DistrictProps {
    pub district_name: Option<String>,
    pub name: Option<String>,
    pub state: Option<String>,
    pub risk_level: Option<String>,
    pub elevation: Option<String>,
    pub rainfall: Option<String>,
    pub population: Option<String>,
}

impl DistrictProps {
    /// Primary name used for search and layer lookup: the dedicated
    /// district name when present, otherwise the generic name field.
    pub fn primary_name(&self) -> Option<&str> {
        self.district_name.as_deref().or(self.name.as_deref())
    }
}

/// One geographic district: polygon rings plus properties.
///
/// Rings are stored flattened across polygons, each as a closed loop of
/// (lon, lat) pairs. Fill and hit tests use even-odd rules, so exterior
/// rings and holes need no distinction here.
#[derive(Clone, Debug)]
pub struct District {
    pub props: DistrictProps,
    pub rings: Vec<Vec<(f64, f64)>>,
    /// (min_lon, min_lat, max_lon, max_lat)
    pub bbox: (f64, f64, f64, f64),
}

/// Load the flood risk dataset from a GeoJSON file. All-or-nothing: any
/// read or parse failure bubbles up and the caller enters its error state.
pub fn load_districts(path: &Path) -> Result<Vec<District>> {
    let mut bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    parse_districts(&mut bytes).with_context(|| format!("parsing {}", path.display()))
}

/// Parse a GeoJSON byte buffer into district records. Features without
/// polygon geometry cannot be drawn and are skipped; missing properties
/// are kept as None for downstream fallbacks.
pub fn parse_districts(bytes: &mut [u8]) -> Result<Vec<District>> {
    let geojson: GeoJson =
        simd_json::serde::from_slice(bytes).context("malformed GeoJSON document")?;

    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => bail!("expected a FeatureCollection, found a bare geometry"),
    };

    // Ring extraction and bbox computation per feature; order is preserved.
    let districts: Vec<District> = features
        .into_par_iter()
        .filter_map(district_from_feature)
        .collect();

    Ok(districts)
}

fn district_from_feature(feature: Feature) -> Option<District> {
    let rings = polygon_rings(&feature.geometry.as_ref()?.value)?;
    let bbox = rings_bbox(&rings)?;

    let props = feature.properties.as_ref();
    Some(District {
        props: DistrictProps {
            district_name: prop_text(props, "district_name"),
            name: prop_text(props, "name"),
            state: prop_text(props, "state"),
            risk_level: prop_text(props, "risk_level"),
            elevation: prop_text(props, "elevation"),
            rainfall: prop_text(props, "rainfall"),
            population: prop_text(props, "population"),
        },
        rings,
        bbox,
    })
}

/// Extract all rings of a Polygon or MultiPolygon as (lon, lat) loops.
/// Other geometry kinds have no area to shade and yield nothing.
fn polygon_rings(value: &Value) -> Option<Vec<Vec<(f64, f64)>>> {
    fn to_ring(coords: &[Vec<f64>]) -> Vec<(f64, f64)> {
        coords
            .iter()
            .filter(|c| c.len() >= 2)
            .map(|c| (c[0], c[1]))
            .collect()
    }

    let rings: Vec<Vec<(f64, f64)>> = match value {
        Value::Polygon(rings) => rings.iter().map(|r| to_ring(r)).collect(),
        Value::MultiPolygon(polygons) => polygons
            .iter()
            .flat_map(|rings| rings.iter().map(|r| to_ring(r)))
            .collect(),
        _ => return None,
    };

    let rings: Vec<_> = rings.into_iter().filter(|r| r.len() >= 3).collect();
    if rings.is_empty() {
        None
    } else {
        Some(rings)
    }
}

fn rings_bbox(rings: &[Vec<(f64, f64)>]) -> Option<(f64, f64, f64, f64)> {
    let mut points = rings.iter().flatten();
    let &(first_lon, first_lat) = points.next()?;
    let mut bbox = (first_lon, first_lat, first_lon, first_lat);
    for &(lon, lat) in points {
        bbox.0 = bbox.0.min(lon);
        bbox.1 = bbox.1.min(lat);
        bbox.2 = bbox.2.max(lon);
        bbox.3 = bbox.3.max(lat);
    }
    Some(bbox)
}

/// Read a property as display text. Strings pass through; numbers are
/// formatted; anything else counts as absent.
fn prop_text(props: Option<&JsonObject>, key: &str) -> Option<String> {
    match props?.get(key)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
