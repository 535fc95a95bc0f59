//! Records in the IAMC tabular format, used for both input and output data.
//!
//! Each row has the columns `model,scenario,region,variable,unit,year,value`.
use serde::{Deserialize, Serialize};

/// A single row of an IAMC-format table
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IamcRow {
    /// The model which produced the data
    pub model: String,
    /// The scenario the value applies to
    pub scenario: String,
    /// The region the value applies to
    pub region: String,
    /// What is being measured (e.g. a technology or "Population")
    pub variable: String,
    /// The unit of `value`
    pub unit: String,
    /// The year the value applies to
    pub year: u32,
    /// The value itself
    pub value: f64,
}

/// Keep only rows for the given year
pub fn filter_year<I>(iter: I, year: u32) -> impl Iterator<Item = IamcRow>
where
    I: IntoIterator<Item = IamcRow>,
{
    iter.into_iter().filter(move |row| row.year == year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::iamc_row;
    use itertools::Itertools;

    #[test]
    fn test_filter_year() {
        let rows = [
            iamc_row("s", "r", "v", 2030, 1.0),
            iamc_row("s", "r", "v", 2050, 2.0),
            iamc_row("s", "r2", "v", 2050, 3.0),
        ];
        let values = filter_year(rows, 2050).map(|row| row.value).collect_vec();
        assert_eq!(values, [2.0, 3.0]);
    }
}
