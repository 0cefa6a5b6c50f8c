//! Date-indexed table of numeric time series.
//!
//! The table is the only data structure the calculator reads from and the
//! only one it writes to (the misalignment column appended by the search).
//!
//! Invariants (enforced by the constructors):
//! - dates are unique and strictly ascending
//! - every column has exactly one value per date

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::error::AppError;
use crate::math::WeightMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeriesTable {
    dates: Vec<NaiveDate>,
    index: HashMap<NaiveDate, usize>,
    /// Column names in insertion order (for stable exports).
    order: Vec<String>,
    columns: HashMap<String, Vec<f64>>,
}

impl TimeSeriesTable {
    /// Create an empty-column table over `dates`.
    pub fn new(dates: Vec<NaiveDate>) -> Result<Self, AppError> {
        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(AppError::InvalidConfig(format!(
                    "table dates must be unique and ascending ({} follows {})",
                    pair[1], pair[0]
                )));
            }
        }
        let index = dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();
        Ok(Self {
            dates,
            index,
            order: Vec::new(),
            columns: HashMap::new(),
        })
    }

    /// Builder-style [`insert_column`](Self::insert_column).
    pub fn with_column(mut self, name: &str, values: Vec<f64>) -> Result<Self, AppError> {
        self.insert_column(name, values)?;
        Ok(self)
    }

    /// Add a column, replacing any existing column of the same name.
    pub fn insert_column(&mut self, name: &str, values: Vec<f64>) -> Result<(), AppError> {
        if values.len() != self.dates.len() {
            return Err(AppError::InvalidConfig(format!(
                "column '{name}' has {} values for {} dates",
                values.len(),
                self.dates.len()
            )));
        }
        if self.columns.insert(name.to_string(), values).is_none() {
            self.order.push(name.to_string());
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn column_names(&self) -> &[String] {
        &self.order
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Result<&[f64], AppError> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| AppError::missing_column(name))
    }

    /// Position of `date` in the index.
    pub fn row_index(&self, date: NaiveDate) -> Result<usize, AppError> {
        self.index
            .get(&date)
            .copied()
            .ok_or_else(|| AppError::missing_date(date))
    }

    /// Single cell lookup (`table.loc[date, column]`).
    pub fn value(&self, date: NaiveDate, column: &str) -> Result<f64, AppError> {
        let i = self.row_index(date)?;
        Ok(self.column(column)?[i])
    }

    /// Row `i` restricted to `codes`, as a code → value map.
    ///
    /// Codes without a column are left out of the map.
    pub fn row(&self, i: usize, codes: &[String]) -> WeightMap {
        codes
            .iter()
            .filter_map(|c| {
                self.columns
                    .get(c)
                    .and_then(|col| col.get(i))
                    .map(|v| (c.clone(), *v))
            })
            .collect()
    }

    /// Fail with `MissingKey` on the first absent column.
    pub fn require_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<(), AppError> {
        match names.iter().map(|n| n.as_ref()).find(|n| !self.has_column(n)) {
            Some(missing) => Err(AppError::missing_column(missing)),
            None => Ok(()),
        }
    }
}
