// Country table view state: filtering, sorting, and CSV export.
// Everything here is a pure function of (rows, view state).

use crate::error::Result;
use crate::metrics::Model;
use crate::queries::CountryPerformance;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::io::Write;

pub const EXPORT_HEADERS: [&str; 9] = [
    "country",
    "continent",
    "arima_mae",
    "arima_rmse",
    "arima_mape",
    "prophet_mae",
    "prophet_rmse",
    "prophet_mape",
    "winner",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryFilter {
    /// Case-insensitive substring of the country name
    pub search: String,
    pub continent: Option<String>,
    pub winner: Option<Model>,
}

impl CountryFilter {
    pub fn is_active(&self) -> bool {
        !self.search.trim().is_empty() || self.continent.is_some() || self.winner.is_some()
    }

    pub fn matches(&self, row: &CountryPerformance) -> bool {
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() && !row.country.to_lowercase().contains(&needle) {
            return false;
        }
        if let Some(continent) = &self.continent {
            if &row.continent != continent {
                return false;
            }
        }
        if let Some(winner) = self.winner {
            if row.winner != winner {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortColumn {
    #[default]
    Country,
    Continent,
    ArimaMae,
    ArimaRmse,
    ArimaMape,
    ProphetMae,
    ProphetRmse,
    ProphetMape,
    Winner,
}

impl SortColumn {
    pub const ALL: [SortColumn; 9] = [
        SortColumn::Country,
        SortColumn::Continent,
        SortColumn::ArimaMae,
        SortColumn::ArimaRmse,
        SortColumn::ArimaMape,
        SortColumn::ProphetMae,
        SortColumn::ProphetRmse,
        SortColumn::ProphetMape,
        SortColumn::Winner,
    ];

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn title(&self) -> &str {
        match self {
            SortColumn::Country => "Country",
            SortColumn::Continent => "Continent",
            SortColumn::ArimaMae => "ARIMA MAE",
            SortColumn::ArimaRmse => "ARIMA RMSE",
            SortColumn::ArimaMape => "ARIMA MAPE",
            SortColumn::ProphetMae => "Prophet MAE",
            SortColumn::ProphetRmse => "Prophet RMSE",
            SortColumn::ProphetMape => "Prophet MAPE",
            SortColumn::Winner => "Winner",
        }
    }

    fn numeric(&self, row: &CountryPerformance) -> Option<f64> {
        match self {
            SortColumn::ArimaMae => Some(row.arima_mae),
            SortColumn::ArimaRmse => Some(row.arima_rmse),
            SortColumn::ArimaMape => Some(row.arima_mape),
            SortColumn::ProphetMae => Some(row.prophet_mae),
            SortColumn::ProphetRmse => Some(row.prophet_rmse),
            SortColumn::ProphetMape => Some(row.prophet_mape),
            SortColumn::Country | SortColumn::Continent | SortColumn::Winner => None,
        }
    }

    /// Column ordering with direction applied. NaN sorts last either way.
    fn compare(&self, a: &CountryPerformance, b: &CountryPerformance, direction: SortDirection) -> Ordering {
        let ordering = match (self.numeric(a), self.numeric(b)) {
            (Some(x), Some(y)) => match (x.is_nan(), y.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => return Ordering::Greater,
                (false, true) => return Ordering::Less,
                (false, false) => x.total_cmp(&y),
            },
            _ => match self {
                SortColumn::Continent => a.continent.cmp(&b.continent),
                SortColumn::Winner => a.winner.as_str().cmp(b.winner.as_str()),
                _ => a.country.cmp(&b.country),
            },
        };
        direction.apply(ordering)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggle(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    pub fn arrow(&self) -> &str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableView {
    pub filter: CountryFilter,
    pub sort: SortColumn,
    pub direction: SortDirection,
}

impl TableView {
    /// Select `column`, flipping the direction when it is already selected
    pub fn sort_by(&mut self, column: SortColumn) {
        if self.sort == column {
            self.direction = self.direction.toggle();
        } else {
            self.sort = column;
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Rows passing the filter, sorted by the view's column. Equal keys fall
/// back to country name.
pub fn visible_rows(rows: &[CountryPerformance], view: &TableView) -> Vec<CountryPerformance> {
    let mut visible: Vec<CountryPerformance> = rows
        .iter()
        .filter(|row| view.filter.matches(row))
        .cloned()
        .collect();

    visible.sort_by(|a, b| {
        view.sort
            .compare(a, b, view.direction)
            .then_with(|| a.country.cmp(&b.country))
    });
    visible
}

/// Distinct continents, sorted, for filter pickers
pub fn continents(rows: &[CountryPerformance]) -> Vec<String> {
    let mut names: Vec<String> = rows.iter().map(|r| r.continent.clone()).collect();
    names.sort();
    names.dedup();
    names
}

/// Step through `None -> options[0] -> ... -> options[n-1] -> None`
pub fn cycle<T: Clone + PartialEq>(current: &Option<T>, options: &[T]) -> Option<T> {
    match current {
        None => options.first().cloned(),
        Some(value) => {
            let idx = options.iter().position(|o| o == value)?;
            options.get(idx + 1).cloned()
        }
    }
}

/// Header row plus one record per row, in table column order
pub fn export_csv<W: Write>(rows: &[CountryPerformance], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(EXPORT_HEADERS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("country_performance_{}.csv", now.format("%Y%m%d_%H%M%S"))
}
