#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod parser;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{load_config, Config, LayoutConfig, RenderConfig};
pub use error::DataError;
pub use layout::{compute_choropleth_layout, compute_stream_layout, Layout};
pub use parser::{parse_population, parse_portfolio, parse_topology};
pub use render::render_svg;
pub use theme::Theme;
