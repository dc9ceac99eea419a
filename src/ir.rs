use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Holding {
    pub name: String,
    pub ticker: String,
    pub amount: f64,
}

/// One monthly disclosure: a reporting date plus the holdings listed for it.
#[derive(Debug, Clone)]
pub struct PortfolioMonth {
    pub date: NaiveDate,
    pub holdings: Vec<Holding>,
}

/// Wide form of the monthly reports: one row per date, one column per
/// ticker. Tickers are sorted and unique (this is the stacking key order);
/// months that do not mention a ticker hold zero.
#[derive(Debug, Clone)]
pub struct PortfolioTable {
    pub dates: Vec<NaiveDate>,
    pub tickers: Vec<String>,
    pub labels: BTreeMap<String, String>,
    pub values: Vec<Vec<f64>>,
}

impl PortfolioTable {
    pub fn step_count(&self) -> usize {
        self.dates.len()
    }

    pub fn series_count(&self) -> usize {
        self.tickers.len()
    }

    /// Sum of a ticker's column across all dates, truncated toward zero the
    /// way the source data treats volumes (whole currency units).
    pub fn volume(&self, series: usize) -> f64 {
        self.values.iter().map(|row| row[series]).sum::<f64>().trunc()
    }

    pub fn label<'a>(&'a self, ticker: &'a str) -> &'a str {
        self.labels
            .get(ticker)
            .map(String::as_str)
            .unwrap_or(ticker)
    }
}

#[derive(Debug, Clone)]
pub struct DistrictRecord {
    pub code: u32,
    pub total: Option<u64>,
    pub area: Option<u64>,
}

impl DistrictRecord {
    /// People per km², rounded to two decimals. Zero when either side of the
    /// ratio is missing or zero.
    pub fn density(&self) -> f64 {
        match (self.total, self.area) {
            (Some(total), Some(area)) if total > 0 && area > 0 => {
                let raw = total as f64 / area as f64;
                (raw * 100.0).round() / 100.0
            }
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DistrictTable {
    pub records: BTreeMap<u32, DistrictRecord>,
}

impl DistrictTable {
    pub fn get(&self, code: u32) -> Option<&DistrictRecord> {
        self.records.get(&code)
    }
}

/// A decoded geographic feature: polygon rings in (lon, lat) degrees plus
/// the raw JSON properties carried through from the topology.
#[derive(Debug, Clone)]
pub struct GeoFeature {
    pub properties: serde_json::Value,
    /// polygons -> rings -> points; ring 0 is the exterior.
    pub polygons: Vec<Vec<Vec<(f64, f64)>>>,
}

impl GeoFeature {
    pub fn census_code(&self) -> Option<u32> {
        let code = self.properties.get("censuscode")?;
        if let Some(n) = code.as_u64() {
            return u32::try_from(n).ok();
        }
        code.as_str().and_then(|s| s.trim().parse().ok())
    }

    pub fn district_name(&self) -> Option<&str> {
        self.properties.get("DISTRICT").and_then(|v| v.as_str())
    }

    pub fn state_name(&self) -> Option<&str> {
        self.properties.get("ST_NM").and_then(|v| v.as_str())
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.polygons
            .iter()
            .flat_map(|polygon| polygon.iter())
            .flat_map(|ring| ring.iter().copied())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    pub features: Vec<GeoFeature>,
}

impl FeatureSet {
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.features.iter().flat_map(|feature| feature.points())
    }
}
