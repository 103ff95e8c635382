pub mod dataset;
pub mod palette;
pub mod point;
pub mod source;

pub use dataset::{MergedDataset, MergedPoint};
pub use palette::{ColorPalette, MarkerColor};
pub use point::GeoPoint;
pub use source::{Selection, SourceFile, SourceId};
