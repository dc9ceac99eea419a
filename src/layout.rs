pub mod choropleth;
pub mod curve;
pub mod label_placement;
pub mod scale;
pub mod stack;
pub mod stream;
mod types;

pub use choropleth::compute_choropleth_layout;
pub use curve::PathCommand;
pub use stream::compute_stream_layout;
pub use types::*;

/// A fully positioned chart, ready for the renderer. All coordinates are
/// screen-space pixels; nothing here touches the output surface.
#[derive(Debug, Clone)]
pub enum Layout {
    Stream(StreamLayout),
    Choropleth(ChoroplethLayout),
}

impl Layout {
    pub fn width(&self) -> f32 {
        match self {
            Layout::Stream(stream) => stream.width,
            Layout::Choropleth(choropleth) => choropleth.width,
        }
    }

    pub fn height(&self) -> f32 {
        match self {
            Layout::Stream(stream) => stream.height,
            Layout::Choropleth(choropleth) => choropleth.height,
        }
    }
}
