use super::model::{FundDataset, FundRecord, InvestmentType, QuoteType, SizeType};

// ---------------------------------------------------------------------------
// Filter predicate: which categorical values are required
// ---------------------------------------------------------------------------

/// Optional equality constraints on the categorical columns.
/// A `None` field means "no filter" for that column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FilterCriteria {
    pub quote: Option<QuoteType>,
    pub investment: Option<InvestmentType>,
    pub size: Option<SizeType>,
}

impl FilterCriteria {
    /// Whether no constraint is active.
    pub fn is_unfiltered(&self) -> bool {
        self.quote.is_none() && self.investment.is_none() && self.size.is_none()
    }

    /// Whether `record` satisfies every active constraint.
    ///
    /// * quote type: compared against the label with spaces stripped
    /// * investment / size type: exact match; a null cell never matches
    pub fn matches(&self, record: &FundRecord) -> bool {
        if let Some(q) = self.quote {
            if record.quote_type != q.column_value() {
                return false;
            }
        }
        if let Some(inv) = self.investment {
            if record.investment_type.as_deref() != Some(inv.label()) {
                return false;
            }
        }
        if let Some(size) = self.size {
            if record.size_type.as_deref() != Some(size.label()) {
                return false;
            }
        }
        true
    }
}

/// Return indices of records that pass all active filters, in dataset order.
pub fn filter(dataset: &FundDataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{record, sample_dataset};
    use crate::data::model::Subset;
    use proptest::prelude::*;

    fn symbols(dataset: &FundDataset, rows: &[usize]) -> Vec<String> {
        Subset::new(dataset, rows)
            .iter()
            .map(|r| r.fund_symbol.clone())
            .collect()
    }

    #[test]
    fn test_unfiltered_is_identity() {
        let ds = sample_dataset();
        let rows = filter(&ds, &FilterCriteria::default());
        assert_eq!(rows, (0..ds.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_quote_type_label_is_space_normalized() {
        let ds = sample_dataset();
        let criteria = FilterCriteria {
            quote: Some(QuoteType::MutualFund),
            ..Default::default()
        };
        assert_eq!(symbols(&ds, &filter(&ds, &criteria)), vec!["BBB", "DDD", "FFF"]);
    }

    #[test]
    fn test_quote_type_with_space_in_data_does_not_match() {
        let ds = FundDataset::from_records(vec![record("AAA", "Mutual Fund", None, None)]);
        let criteria = FilterCriteria {
            quote: Some(QuoteType::MutualFund),
            ..Default::default()
        };
        assert!(filter(&ds, &criteria).is_empty());
    }

    #[test]
    fn test_investment_type_is_exact() {
        let ds = FundDataset::from_records(vec![
            record("AAA", "ETF", Some("Growth"), None),
            record("BBB", "ETF", Some("growth"), None),
            record("CCC", "ETF", Some(" Growth"), None),
        ]);
        let criteria = FilterCriteria {
            investment: Some(InvestmentType::Growth),
            ..Default::default()
        };
        assert_eq!(symbols(&ds, &filter(&ds, &criteria)), vec!["AAA"]);
    }

    #[test]
    fn test_null_category_never_matches() {
        let ds = sample_dataset();
        let criteria = FilterCriteria {
            size: Some(SizeType::Small),
            ..Default::default()
        };
        // EEE has no size type and is excluded; FFF has no investment type
        // but that column is unconstrained.
        assert_eq!(symbols(&ds, &filter(&ds, &criteria)), vec!["CCC", "FFF"]);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let ds = sample_dataset();
        let criteria = FilterCriteria {
            quote: Some(QuoteType::Etf),
            investment: Some(InvestmentType::Value),
            size: Some(SizeType::Small),
        };
        assert_eq!(symbols(&ds, &filter(&ds, &criteria)), vec!["CCC"]);
    }

    #[test]
    fn test_empty_result_is_valid() {
        let ds = sample_dataset();
        let criteria = FilterCriteria {
            quote: Some(QuoteType::Etf),
            investment: Some(InvestmentType::Blend),
            size: None,
        };
        assert!(filter(&ds, &criteria).is_empty());
        assert!(filter(&FundDataset::default(), &criteria).is_empty());
    }

    #[test]
    fn test_is_unfiltered() {
        assert!(FilterCriteria::default().is_unfiltered());
        let c = FilterCriteria {
            size: Some(SizeType::Large),
            ..Default::default()
        };
        assert!(!c.is_unfiltered());
    }

    // -- property tests --

    fn arb_record() -> impl Strategy<Value = FundRecord> {
        (
            "[A-Z]{3,5}",
            prop::sample::select(vec!["ETF", "MutualFund", "Mutual Fund"]),
            prop::option::of(prop::sample::select(vec!["Value", "Growth", "Blend"])),
            prop::option::of(prop::sample::select(vec!["Large", "Medium", "Small"])),
        )
            .prop_map(|(sym, q, inv, size)| record(&sym, q, inv, size))
    }

    fn arb_criteria() -> impl Strategy<Value = FilterCriteria> {
        (
            prop::option::of(prop::sample::select(QuoteType::ALL.to_vec())),
            prop::option::of(prop::sample::select(InvestmentType::ALL.to_vec())),
            prop::option::of(prop::sample::select(SizeType::ALL.to_vec())),
        )
            .prop_map(|(quote, investment, size)| FilterCriteria {
                quote,
                investment,
                size,
            })
    }

    /// Apply one constraint at a time, in the given order, narrowing rows.
    fn filter_stepwise(ds: &FundDataset, c: &FilterCriteria, order: &[usize]) -> Vec<usize> {
        let steps = [
            FilterCriteria {
                quote: c.quote,
                ..Default::default()
            },
            FilterCriteria {
                investment: c.investment,
                ..Default::default()
            },
            FilterCriteria {
                size: c.size,
                ..Default::default()
            },
        ];
        let mut rows: Vec<usize> = (0..ds.len()).collect();
        for &i in order {
            rows.retain(|&r| ds.get(r).is_some_and(|rec| steps[i].matches(rec)));
        }
        rows
    }

    proptest! {
        #[test]
        fn prop_filter_output_is_valid_subset(
            recs in prop::collection::vec(arb_record(), 0..40),
            criteria in arb_criteria(),
        ) {
            let ds = FundDataset::from_records(recs);
            let rows = filter(&ds, &criteria);
            prop_assert!(rows.windows(2).all(|w| w[0] < w[1]));
            for &r in &rows {
                let rec = ds.get(r);
                prop_assert!(rec.is_some());
                prop_assert!(criteria.matches(rec.unwrap()));
            }
            // Nothing that matches was dropped.
            let expected = ds.records().iter().filter(|r| criteria.matches(r)).count();
            prop_assert_eq!(rows.len(), expected);
        }

        #[test]
        fn prop_filter_is_order_independent(
            recs in prop::collection::vec(arb_record(), 0..40),
            criteria in arb_criteria(),
            order in Just(vec![0usize, 1, 2]).prop_shuffle(),
        ) {
            let ds = FundDataset::from_records(recs);
            prop_assert_eq!(filter(&ds, &criteria), filter_stepwise(&ds, &criteria, &order));
        }

        #[test]
        fn prop_unfiltered_returns_everything(recs in prop::collection::vec(arb_record(), 0..40)) {
            let ds = FundDataset::from_records(recs);
            prop_assert_eq!(filter(&ds, &FilterCriteria::default()), (0..ds.len()).collect::<Vec<_>>());
        }
    }
}
