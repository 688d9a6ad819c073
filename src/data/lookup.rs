use super::error::LookupError;
use super::model::{Horizon, HorizonMetrics, Subset};

/// Everything the metrics panel shows for one fund at one horizon.
/// Values are raw; formatting happens in the view.
#[derive(Debug, Clone, PartialEq)]
pub struct FundMetrics {
    pub symbol: String,
    pub name: String,
    pub investment_type: Option<String>,
    pub size_type: Option<String>,
    pub asset_bonds: f64,
    pub asset_stocks: f64,
    pub horizon: Horizon,
    /// `None` when the fund has no data for `horizon`.
    pub performance: Option<HorizonMetrics>,
}

/// Look up `symbol` in `subset` and extract its metrics for `horizon`.
///
/// A symbol that was filtered out of the subset is [`LookupError::NotFound`],
/// even if it exists in the full dataset.
pub fn resolve_metrics(
    subset: &Subset<'_>,
    symbol: &str,
    horizon: Horizon,
) -> Result<FundMetrics, LookupError> {
    let rec = subset
        .iter()
        .find(|r| r.fund_symbol == symbol)
        .ok_or_else(|| LookupError::NotFound(symbol.to_string()))?;

    Ok(FundMetrics {
        symbol: rec.fund_symbol.clone(),
        name: rec.fund_long_name.clone(),
        investment_type: rec.investment_type.clone(),
        size_type: rec.size_type.clone(),
        asset_bonds: rec.asset_bonds,
        asset_stocks: rec.asset_stocks,
        horizon,
        performance: rec.metrics(horizon),
    })
}

/// Symbols of the subset in row order.
pub fn list_symbols<'a>(subset: &Subset<'a>) -> Vec<&'a str> {
    subset.iter().map(|r| r.fund_symbol.as_str()).collect()
}
