use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// Horizon – the time window the risk/return metrics are computed over
// ---------------------------------------------------------------------------

/// Time window for stdev / return / alpha / beta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Horizon {
    #[default]
    ThreeYears,
    FiveYears,
    TenYears,
}

/// The four metric columns that belong to one horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizonColumns {
    pub stdev: &'static str,
    pub ret: &'static str,
    pub alpha: &'static str,
    pub beta: &'static str,
}

impl HorizonColumns {
    pub fn all(&self) -> [&'static str; 4] {
        [self.stdev, self.ret, self.alpha, self.beta]
    }
}

impl Horizon {
    pub const ALL: [Horizon; 3] = [Horizon::ThreeYears, Horizon::FiveYears, Horizon::TenYears];

    /// Label shown in the horizon selector.
    pub fn label(self) -> &'static str {
        match self {
            Horizon::ThreeYears => "3 Years",
            Horizon::FiveYears => "5 Years",
            Horizon::TenYears => "10 Years",
        }
    }

    pub fn columns(self) -> HorizonColumns {
        match self {
            Horizon::ThreeYears => HorizonColumns {
                stdev: "fund_stdev_3years",
                ret: "fund_return_3years",
                alpha: "fund_alpha_3years",
                beta: "fund_beta_3years",
            },
            Horizon::FiveYears => HorizonColumns {
                stdev: "fund_stdev_5years",
                ret: "fund_return_5years",
                alpha: "fund_alpha_5years",
                beta: "fund_beta_5years",
            },
            Horizon::TenYears => HorizonColumns {
                stdev: "fund_stdev_10years",
                ret: "fund_return_10years",
                alpha: "fund_alpha_10years",
                beta: "fund_beta_10years",
            },
        }
    }

    fn index(self) -> usize {
        match self {
            Horizon::ThreeYears => 0,
            Horizon::FiveYears => 1,
            Horizon::TenYears => 2,
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Categorical filter values
// ---------------------------------------------------------------------------

/// Security classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QuoteType {
    Etf,
    MutualFund,
}

impl QuoteType {
    pub const ALL: [QuoteType; 2] = [QuoteType::Etf, QuoteType::MutualFund];

    pub fn label(self) -> &'static str {
        match self {
            QuoteType::Etf => "ETF",
            QuoteType::MutualFund => "Mutual Fund",
        }
    }

    /// The value as stored in the `quote_type` column (spaces stripped).
    pub fn column_value(self) -> String {
        self.label().replace(' ', "")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InvestmentType {
    Value,
    Growth,
    Blend,
}

impl InvestmentType {
    pub const ALL: [InvestmentType; 3] = [
        InvestmentType::Value,
        InvestmentType::Growth,
        InvestmentType::Blend,
    ];

    pub fn label(self) -> &'static str {
        match self {
            InvestmentType::Value => "Value",
            InvestmentType::Growth => "Growth",
            InvestmentType::Blend => "Blend",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SizeType {
    Large,
    Medium,
    Small,
}

impl SizeType {
    pub const ALL: [SizeType; 3] = [SizeType::Large, SizeType::Medium, SizeType::Small];

    pub fn label(self) -> &'static str {
        match self {
            SizeType::Large => "Large",
            SizeType::Medium => "Medium",
            SizeType::Small => "Small",
        }
    }
}

// ---------------------------------------------------------------------------
// FundRecord – one row of the source table
// ---------------------------------------------------------------------------

/// Risk / return / alpha / beta for one horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizonMetrics {
    pub stdev: f64,
    pub ret: f64,
    pub alpha: f64,
    pub beta: f64,
}

/// A single fund (one row of the source table).
#[derive(Debug, Clone, PartialEq)]
pub struct FundRecord {
    pub fund_symbol: String,
    pub fund_long_name: String,
    /// Stored without spaces, e.g. `MutualFund`.
    pub quote_type: String,
    pub investment_type: Option<String>,
    pub size_type: Option<String>,
    /// Fractions in `[0, 1]`; NaN when the source cell is null.
    pub asset_bonds: f64,
    pub asset_stocks: f64,
    /// Indexed by horizon; `None` when the fund has no data for it.
    pub horizons: [Option<HorizonMetrics>; 3],
}

impl FundRecord {
    pub fn metrics(&self, horizon: Horizon) -> Option<HorizonMetrics> {
        self.horizons[horizon.index()]
    }

    pub fn set_metrics(&mut self, horizon: Horizon, metrics: Option<HorizonMetrics>) {
        self.horizons[horizon.index()] = metrics;
    }
}

/// Categorical columns that can drive point colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoryColumn {
    InvestmentType,
    SizeType,
}

impl CategoryColumn {
    pub const ALL: [CategoryColumn; 2] = [CategoryColumn::InvestmentType, CategoryColumn::SizeType];

    pub fn label(self) -> &'static str {
        match self {
            CategoryColumn::InvestmentType => "Investment type",
            CategoryColumn::SizeType => "Size type",
        }
    }

    pub fn value_of(self, record: &FundRecord) -> Option<&str> {
        match self {
            CategoryColumn::InvestmentType => record.investment_type.as_deref(),
            CategoryColumn::SizeType => record.size_type.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// FundDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct FundDataset {
    records: Vec<FundRecord>,
    /// Sorted distinct non-null values of each colourable column.
    unique_values: BTreeMap<CategoryColumn, BTreeSet<String>>,
}

impl FundDataset {
    /// Build category indices from the loaded records.
    pub fn from_records(records: Vec<FundRecord>) -> Self {
        let mut unique_values: BTreeMap<CategoryColumn, BTreeSet<String>> = BTreeMap::new();
        for rec in &records {
            for col in CategoryColumn::ALL {
                if let Some(v) = col.value_of(rec) {
                    unique_values
                        .entry(col)
                        .or_default()
                        .insert(v.to_string());
                }
            }
        }
        FundDataset {
            records,
            unique_values,
        }
    }

    pub fn records(&self) -> &[FundRecord] {
        &self.records
    }

    pub fn get(&self, row: usize) -> Option<&FundRecord> {
        self.records.get(row)
    }

    /// Distinct values of a colourable column, sorted.
    pub fn unique_values(&self, column: CategoryColumn) -> BTreeSet<String> {
        self.unique_values
            .get(&column)
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Subset – a filtered view over the dataset
// ---------------------------------------------------------------------------

/// Rows of a dataset that passed the active filters, in dataset order.
#[derive(Debug, Clone, Copy)]
pub struct Subset<'a> {
    dataset: &'a FundDataset,
    rows: &'a [usize],
}

impl<'a> Subset<'a> {
    pub fn new(dataset: &'a FundDataset, rows: &'a [usize]) -> Self {
        Subset { dataset, rows }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a FundRecord> + 'a {
        let dataset = self.dataset;
        let rows = self.rows;
        rows.iter().filter_map(move |&r| dataset.get(r))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::record;

    #[test]
    fn test_horizon_columns_use_normalized_label() {
        for h in Horizon::ALL {
            let suffix = h.label().replace(' ', "").to_lowercase();
            for col in h.columns().all() {
                assert!(col.ends_with(&format!("_{suffix}")), "{col}");
            }
        }
        assert_eq!(Horizon::FiveYears.columns().ret, "fund_return_5years");
    }

    #[test]
    fn test_quote_type_column_value_strips_spaces() {
        assert_eq!(QuoteType::MutualFund.column_value(), "MutualFund");
        assert_eq!(QuoteType::Etf.column_value(), "ETF");
    }

    #[test]
    fn test_metrics_per_horizon() {
        let mut rec = record("AAA", "ETF", Some("Growth"), Some("Large"));
        rec.set_metrics(Horizon::TenYears, None);
        assert!(rec.metrics(Horizon::ThreeYears).is_some());
        assert!(rec.metrics(Horizon::TenYears).is_none());
    }

    #[test]
    fn test_unique_values_skip_nulls() {
        let ds = FundDataset::from_records(vec![
            record("AAA", "ETF", Some("Growth"), Some("Large")),
            record("BBB", "ETF", Some("Value"), None),
            record("CCC", "ETF", Some("Growth"), Some("Small")),
        ]);
        let inv: Vec<_> = ds.unique_values(CategoryColumn::InvestmentType).into_iter().collect();
        assert_eq!(inv, vec!["Growth", "Value"]);
        assert_eq!(ds.unique_values(CategoryColumn::SizeType).len(), 2);
    }

    #[test]
    fn test_subset_iterates_in_row_order() {
        let ds = FundDataset::from_records(vec![
            record("AAA", "ETF", None, None),
            record("BBB", "ETF", None, None),
            record("CCC", "ETF", None, None),
        ]);
        let rows = [2, 0];
        let subset = Subset::new(&ds, &rows);
        let symbols: Vec<_> = subset.iter().map(|r| r.fund_symbol.as_str()).collect();
        assert_eq!(symbols, vec!["CCC", "AAA"]);
        assert_eq!(subset.len(), 2);
    }
}
