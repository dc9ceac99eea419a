use crate::error::DataError;
use crate::ir::{
    DistrictRecord, DistrictTable, FeatureSet, GeoFeature, Holding, PortfolioMonth, PortfolioTable,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

// Corporate suffixes and annotations stripped from company names before the
// name is used as a band label: "Foo Ltd.", "Foo Corpn (new)" -> "Foo".
static LABEL_NOISE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)ltd|corpn?|inc|[*.]|\(.*$").unwrap());

static NON_DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9]").unwrap());

// ---------------------------------------------------------------------------
// Portfolio disclosures (stream graph input)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PortfolioMonthFile {
    date: String,
    values: Vec<Vec<serde_json::Value>>,
}

/// Parse the monthly disclosure dump into the wide table the stream layout
/// stacks. Rows come out date-ascending, columns ticker-sorted, gaps zeroed.
pub fn parse_portfolio(input: &str) -> Result<PortfolioTable, DataError> {
    let months: Vec<PortfolioMonthFile> = serde_json::from_str(input)?;
    if months.is_empty() {
        return Err(DataError::EmptyPortfolio);
    }

    let mut parsed: Vec<PortfolioMonth> = Vec::with_capacity(months.len());
    for (index, month) in months.into_iter().enumerate() {
        let date = parse_month(&month.date).ok_or_else(|| DataError::BadDate {
            index,
            date: month.date.clone(),
        })?;
        let mut holdings = Vec::with_capacity(month.values.len());
        for entry in &month.values {
            // Entries are positional rows from the source table:
            // [company name, ticker, .., .., amount].
            if entry.len() < 5 {
                return Err(DataError::ShortHolding { index });
            }
            let name = entry[0].as_str().unwrap_or_default().to_string();
            let ticker = entry[1].as_str().unwrap_or_default().to_string();
            if ticker.is_empty() {
                continue;
            }
            let amount = parse_amount(&entry[4]);
            holdings.push(Holding {
                name,
                ticker,
                amount,
            });
        }
        parsed.push(PortfolioMonth { date, holdings });
    }
    parsed.sort_by_key(|month| month.date);

    let tickers: Vec<String> = parsed
        .iter()
        .flat_map(|month| month.holdings.iter().map(|h| h.ticker.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut labels: BTreeMap<String, String> = BTreeMap::new();
    let mut dates = Vec::with_capacity(parsed.len());
    let mut values = Vec::with_capacity(parsed.len());
    for month in &parsed {
        dates.push(month.date);
        let mut row = vec![0.0_f64; tickers.len()];
        for holding in &month.holdings {
            if let Ok(column) = tickers.binary_search(&holding.ticker) {
                row[column] = holding.amount;
                labels.insert(holding.ticker.clone(), clean_label(&holding.name));
            }
        }
        values.push(row);
    }

    Ok(PortfolioTable {
        dates,
        tickers,
        labels,
        values,
    })
}

// "Apr-2016" -> first of that month.
fn parse_month(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("01-{}", raw.trim()), "%d-%b-%Y").ok()
}

// Amounts arrive either as numbers or as display strings with embedded
// spaces and thousands separators ("4,56,78,900").
fn parse_amount(value: &serde_json::Value) -> f64 {
    if let Some(number) = value.as_f64() {
        return number;
    }
    let Some(raw) = value.as_str() else {
        return 0.0;
    };
    let cleaned: String = raw.chars().filter(|c| *c != ' ' && *c != ',').collect();
    cleaned.parse().unwrap_or(0.0)
}

pub fn clean_label(name: &str) -> String {
    LABEL_NOISE_RE.replace_all(name, "").trim().to_string()
}

// ---------------------------------------------------------------------------
// Census population table (choropleth input)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PopulationRowFile {
    #[serde(rename = "District")]
    district: serde_json::Value,
    #[serde(rename = "Total Population Person")]
    total: Option<serde_json::Value>,
    #[serde(rename = "Area")]
    area: Option<serde_json::Value>,
}

pub fn parse_population(input: &str) -> Result<DistrictTable, DataError> {
    let rows: Vec<PopulationRowFile> = serde_json::from_str(input)?;
    let mut table = DistrictTable::default();
    for row in rows {
        let Some(code) = district_code(&row.district) else {
            continue;
        };
        let record = DistrictRecord {
            code,
            total: row.total.as_ref().and_then(parse_count),
            area: row.area.as_ref().and_then(parse_count),
        };
        table.records.insert(code, record);
    }
    Ok(table)
}

// District identifiers come formatted ("District - Nicobars (638)"); only
// the digits carry the census code.
fn district_code(value: &serde_json::Value) -> Option<u32> {
    let raw = match value {
        serde_json::Value::Number(n) => return u32::try_from(n.as_u64()?).ok(),
        serde_json::Value::String(s) => s,
        _ => return None,
    };
    let digits = NON_DIGIT_RE.replace_all(raw, "");
    digits.parse().ok()
}

fn parse_count(value: &serde_json::Value) -> Option<u64> {
    if let Some(number) = value.as_u64() {
        return Some(number);
    }
    let raw = value.as_str()?;
    let cleaned: String = raw.chars().filter(|c| *c != ' ' && *c != ',').collect();
    cleaned.parse().ok()
}

// ---------------------------------------------------------------------------
// TopoJSON topologies (district / state boundaries)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TopologyFile {
    transform: Option<TransformFile>,
    objects: BTreeMap<String, GeometryFile>,
    arcs: Vec<Vec<Vec<f64>>>,
}

#[derive(Debug, Deserialize)]
struct TransformFile {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum GeometryFile {
    GeometryCollection {
        geometries: Vec<GeometryFile>,
    },
    Polygon {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        properties: serde_json::Value,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
        #[serde(default)]
        properties: serde_json::Value,
    },
    #[serde(other)]
    Unsupported,
}

/// Decode one named object of a TopoJSON topology into plain polygon
/// features, the equivalent of topojson-client's `feature()`.
pub fn parse_topology(input: &str, object: &str) -> Result<FeatureSet, DataError> {
    let topology: TopologyFile = serde_json::from_str(input)?;
    let arcs = decode_arcs(&topology)?;
    let root = topology
        .objects
        .get(object)
        .ok_or_else(|| DataError::MissingObject(object.to_string()))?;

    let mut features = Vec::new();
    collect_features(root, &arcs, &mut features)?;
    Ok(FeatureSet { features })
}

// Arcs are delta-encoded when a transform is present: each coordinate is a
// running sum over the arc, then scaled and translated.
fn decode_arcs(topology: &TopologyFile) -> Result<Vec<Vec<(f64, f64)>>, DataError> {
    if topology.arcs.is_empty() {
        return Err(DataError::NoArcs);
    }
    let mut decoded = Vec::with_capacity(topology.arcs.len());
    for arc in &topology.arcs {
        let mut points = Vec::with_capacity(arc.len());
        match &topology.transform {
            Some(transform) => {
                let mut x = 0.0;
                let mut y = 0.0;
                for position in arc {
                    x += position.first().copied().unwrap_or(0.0);
                    y += position.get(1).copied().unwrap_or(0.0);
                    points.push((
                        x * transform.scale[0] + transform.translate[0],
                        y * transform.scale[1] + transform.translate[1],
                    ));
                }
            }
            None => {
                for position in arc {
                    points.push((
                        position.first().copied().unwrap_or(0.0),
                        position.get(1).copied().unwrap_or(0.0),
                    ));
                }
            }
        }
        decoded.push(points);
    }
    Ok(decoded)
}

fn collect_features(
    geometry: &GeometryFile,
    arcs: &[Vec<(f64, f64)>],
    out: &mut Vec<GeoFeature>,
) -> Result<(), DataError> {
    match geometry {
        GeometryFile::GeometryCollection { geometries } => {
            for child in geometries {
                collect_features(child, arcs, out)?;
            }
        }
        GeometryFile::Polygon {
            arcs: rings,
            properties,
        } => {
            out.push(GeoFeature {
                properties: properties.clone(),
                polygons: vec![decode_polygon(rings, arcs)?],
            });
        }
        GeometryFile::MultiPolygon {
            arcs: polygons,
            properties,
        } => {
            let mut decoded = Vec::with_capacity(polygons.len());
            for rings in polygons {
                decoded.push(decode_polygon(rings, arcs)?);
            }
            out.push(GeoFeature {
                properties: properties.clone(),
                polygons: decoded,
            });
        }
        GeometryFile::Unsupported => {}
    }
    Ok(())
}

fn decode_polygon(
    rings: &[Vec<i64>],
    arcs: &[Vec<(f64, f64)>],
) -> Result<Vec<Vec<(f64, f64)>>, DataError> {
    rings.iter().map(|ring| stitch_ring(ring, arcs)).collect()
}

// A ring is a sequence of arc references; `~i` (negative) means arc `i`
// walked backwards. Consecutive arcs share their join point, so every arc
// after the first drops its leading coordinate.
fn stitch_ring(refs: &[i64], arcs: &[Vec<(f64, f64)>]) -> Result<Vec<(f64, f64)>, DataError> {
    let mut ring: Vec<(f64, f64)> = Vec::new();
    for reference in refs {
        let index = if *reference < 0 { !*reference } else { *reference };
        let arc = usize::try_from(index)
            .ok()
            .and_then(|i| arcs.get(i))
            .ok_or(DataError::ArcOutOfRange(*reference))?;
        let mut points = arc.clone();
        if *reference < 0 {
            points.reverse();
        }
        if !ring.is_empty() {
            points.remove(0);
        }
        ring.extend(points);
    }
    Ok(ring)
}
