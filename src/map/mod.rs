pub mod geometry;
pub mod layer;
pub mod projection;
pub mod spatial;

pub use layer::{ChoroplethLayer, Filters, LayerCanvases};
pub use projection::Viewport;
