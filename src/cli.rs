use crate::config::{load_config, Config};
use crate::layout::{compute_choropleth_layout, compute_stream_layout, Layout};
use crate::parser::{parse_population, parse_portfolio, parse_topology};
use crate::render::{render_svg, write_output_svg};
use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "dvz",
    version,
    about = "Static data visualization renderer in Rust (stream graph + choropleth)"
)]
pub struct Args {
    #[command(subcommand)]
    pub chart: ChartCommand,
}

#[derive(Subcommand, Debug)]
pub enum ChartCommand {
    /// Render the portfolio holdings stream graph
    Stream {
        /// Portfolio disclosures JSON, or '-' for stdin
        #[arg(short = 'i', long = "input")]
        input: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Render the district population-density choropleth
    Choropleth {
        /// District boundaries (TopoJSON)
        #[arg(long = "districts")]
        districts: PathBuf,

        /// State boundaries overlay (TopoJSON)
        #[arg(long = "states")]
        states: PathBuf,

        /// Census population table (JSON)
        #[arg(long = "population")]
        population: PathBuf,

        /// Name of the topology object holding the features
        #[arg(long = "object", default_value = "-")]
        object: String,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(ClapArgs, Debug)]
pub struct CommonArgs {
    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON5 file (theme/layout/render overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Height
    #[arg(short = 'H', long = "height", default_value_t = 700.0)]
    pub height: f32,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    match args.chart {
        ChartCommand::Stream { input, common } => {
            let config = prepared_config(&common)?;
            let table = parse_portfolio(&read_input(&input)?)?;
            let layout = Layout::Stream(compute_stream_layout(
                &table,
                &config.theme,
                &config.layout,
                &config.render,
            ));
            emit(&layout, &config, &common)
        }
        ChartCommand::Choropleth {
            districts,
            states,
            population,
            object,
            common,
        } => {
            let config = prepared_config(&common)?;
            let districts = parse_topology(&std::fs::read_to_string(districts)?, &object)?;
            let states = parse_topology(&std::fs::read_to_string(states)?, &object)?;
            let population = parse_population(&std::fs::read_to_string(population)?)?;
            let layout = Layout::Choropleth(compute_choropleth_layout(
                &districts,
                &states,
                &population,
                &config.theme,
                &config.layout,
                &config.render,
            ));
            emit(&layout, &config, &common)
        }
    }
}

fn emit(layout: &Layout, config: &Config, common: &CommonArgs) -> Result<()> {
    let svg = render_svg(layout, &config.theme, &config.layout);
    match common.output_format {
        OutputFormat::Svg => write_output_svg(&svg, common.output.as_deref()),
        OutputFormat::Png => {
            let output = ensure_output(&common.output, "png")?;
            write_png(&svg, &output)
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

fn prepared_config(common: &CommonArgs) -> Result<Config> {
    let mut config = load_config(common.config.as_deref())?;
    config.render.width = common.width;
    config.render.height = common.height;
    Ok(config)
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read_to_string(path)?)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path) -> Result<()> {
    crate::render::write_output_png(svg, output)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires building with the 'png' feature"
    ))
}
