// Wide GDP table: one row per country, one column per year

use crate::error::{DashboardError, Result};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// Header used by the GDP export; older exports use `Country`
pub const COUNTRY_COLUMN: &str = "Name of country";
pub const COUNTRY_COLUMN_FALLBACK: &str = "Country";
pub const CONTINENT_COLUMN: &str = "Continent";

#[derive(Debug, Clone, PartialEq)]
pub struct GdpRow {
    pub country: String,
    pub continent: String,
    /// Aligned with `GdpTable::years`
    pub values: Vec<Option<f64>>,
}

/// Long-form observation produced by [`GdpTable::melt`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GdpObservation {
    pub country: String,
    pub continent: String,
    pub year: i32,
    pub gdp: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct GdpTable {
    years: Vec<i32>,
    rows: Vec<GdpRow>,
}

fn is_year_header(header: &str) -> bool {
    !header.is_empty() && header.bytes().all(|b| b.is_ascii_digit())
}

fn parse_cell(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

impl GdpTable {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DashboardError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let file = std::fs::File::open(path)?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_reader(file, &source)
    }

    /// Parse a wide GDP CSV. `source` names the input in error messages.
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self> {
        // rows may stop before the last year column
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let report_err = |e: csv::Error| DashboardError::Report {
            file: source.to_string(),
            source: e,
        };

        let headers = rdr.headers().map_err(report_err)?.clone();
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        let country_idx = position(COUNTRY_COLUMN)
            .or_else(|| position(COUNTRY_COLUMN_FALLBACK))
            .ok_or_else(|| DashboardError::MissingColumn {
                file: source.to_string(),
                column: COUNTRY_COLUMN.to_string(),
            })?;
        let continent_idx = position(CONTINENT_COLUMN).ok_or_else(|| DashboardError::MissingColumn {
            file: source.to_string(),
            column: CONTINENT_COLUMN.to_string(),
        })?;

        let mut year_columns = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            let header = header.trim();
            if !is_year_header(header) {
                continue;
            }
            let year = header.parse::<i32>().map_err(|_| DashboardError::InvalidValue {
                file: source.to_string(),
                column: header.to_string(),
                value: header.to_string(),
            })?;
            year_columns.push((year, idx));
        }
        year_columns.sort_by_key(|(year, _)| *year);
        year_columns.dedup_by_key(|(year, _)| *year);

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(report_err)?;
            let country = record.get(country_idx).unwrap_or("").trim().to_string();
            if country.is_empty() {
                continue;
            }
            let continent = record.get(continent_idx).unwrap_or("").trim().to_string();
            let values = year_columns
                .iter()
                .map(|(_, idx)| record.get(*idx).and_then(parse_cell))
                .collect();
            rows.push(GdpRow {
                country,
                continent,
                values,
            });
        }

        Ok(Self {
            years: year_columns.into_iter().map(|(year, _)| year).collect(),
            rows,
        })
    }

    /// Year columns in ascending order
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn rows(&self) -> &[GdpRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn find(&self, country: &str) -> Option<&GdpRow> {
        self.rows.iter().find(|row| row.country == country)
    }

    pub fn value(&self, row: &GdpRow, year: i32) -> Option<f64> {
        let idx = self.years.iter().position(|y| *y == year)?;
        row.values.get(idx).copied().flatten()
    }

    /// Ascending (year, gdp) pairs for a country, missing years skipped
    pub fn series(&self, country: &str) -> Option<Vec<(i32, f64)>> {
        let row = self.find(country)?;
        Some(
            self.years
                .iter()
                .zip(&row.values)
                .filter_map(|(year, value)| value.map(|v| (*year, v)))
                .collect(),
        )
    }

    /// Latest year column holding at least one value. Falls back to the
    /// greatest year column when every cell is empty.
    pub fn latest_year_with_data(&self) -> Option<i32> {
        self.years
            .iter()
            .enumerate()
            .rev()
            .find(|(idx, _)| self.rows.iter().any(|row| row.values[*idx].is_some()))
            .map(|(_, year)| *year)
            .or_else(|| self.years.last().copied())
    }

    /// Long form sorted by (country, year); missing cells are kept as `None`
    pub fn melt(&self) -> Vec<GdpObservation> {
        let mut observations: Vec<GdpObservation> = self
            .rows
            .iter()
            .flat_map(|row| {
                self.years.iter().zip(&row.values).map(|(year, value)| GdpObservation {
                    country: row.country.clone(),
                    continent: row.continent.clone(),
                    year: *year,
                    gdp: *value,
                })
            })
            .collect();
        observations.sort_by(|a, b| a.country.cmp(&b.country).then(a.year.cmp(&b.year)));
        observations
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDE: &str = "\
Name of country,Continent,2001,2000,Code
Zambia,Africa,,20000000000,ZMB
Brazil,South America,700000000000,650000000000,BRA
";

    fn table() -> GdpTable {
        GdpTable::from_reader(WIDE.as_bytes(), "gdp.csv").unwrap()
    }

    #[test]
    fn test_year_columns_sorted_and_other_columns_ignored() {
        let table = table();
        assert_eq!(table.years(), &[2000, 2001]);
        assert_eq!(table.len(), 2);

        let zambia = table.find("Zambia").unwrap();
        assert_eq!(zambia.values, vec![Some(20_000_000_000.0), None]);
        assert_eq!(table.value(zambia, 2000), Some(20_000_000_000.0));
        assert_eq!(table.value(zambia, 1999), None);
    }

    #[test]
    fn test_short_rows_fill_missing_years() {
        let csv = "Country,Continent,2020,2021\nChile,South America,300\nPeru,South America,200,210\n";
        let table = GdpTable::from_reader(csv.as_bytes(), "gdp.csv").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.find("Chile").unwrap().values, vec![Some(300.0), None]);
        assert_eq!(table.find("Peru").unwrap().values, vec![Some(200.0), Some(210.0)]);
        assert_eq!(table.series("Chile").unwrap(), vec![(2020, 300.0)]);
    }

    #[test]
    fn test_fallback_country_header() {
        let csv = "Country,Continent,2020\nChile,South America,300\n";
        let table = GdpTable::from_reader(csv.as_bytes(), "gdp.csv").unwrap();
        assert!(table.find("Chile").is_some());
    }

    #[test]
    fn test_missing_continent_column() {
        let csv = "Country,2020\nChile,300\n";
        let err = GdpTable::from_reader(csv.as_bytes(), "gdp.csv").unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumn { ref column, .. } if column == "Continent"));
    }

    #[test]
    fn test_non_numeric_cells_are_missing() {
        let csv = "Country,Continent,2020,2021\nChile,South America,n/a,  310 \n";
        let table = GdpTable::from_reader(csv.as_bytes(), "gdp.csv").unwrap();
        assert_eq!(table.series("Chile").unwrap(), vec![(2021, 310.0)]);
    }

    #[test]
    fn test_melt_sorted_by_country_then_year() {
        let melted = table().melt();
        let keys: Vec<(&str, i32)> = melted.iter().map(|o| (o.country.as_str(), o.year)).collect();
        assert_eq!(
            keys,
            vec![("Brazil", 2000), ("Brazil", 2001), ("Zambia", 2000), ("Zambia", 2001)]
        );
        assert_eq!(melted[3].gdp, None);
        assert_eq!(melted[2].continent, "Africa");
    }

    #[test]
    fn test_latest_year_with_data() {
        assert_eq!(table().latest_year_with_data(), Some(2001));

        let csv = "Country,Continent,2020,2021\nChile,South America,300,\n";
        let table = GdpTable::from_reader(csv.as_bytes(), "gdp.csv").unwrap();
        assert_eq!(table.latest_year_with_data(), Some(2020));

        let csv = "Country,Continent,2020,2021\nChile,South America,,\n";
        let table = GdpTable::from_reader(csv.as_bytes(), "gdp.csv").unwrap();
        assert_eq!(table.latest_year_with_data(), Some(2021));

        let csv = "Country,Continent\nChile,South America\n";
        let table = GdpTable::from_reader(csv.as_bytes(), "gdp.csv").unwrap();
        assert_eq!(table.latest_year_with_data(), None);
    }


    #[test]
    fn test_unknown_country_has_no_series() {
        assert!(table().series("Atlantis").is_none());
    }
}
