// Chain annotation and imbalance through the public API

use options_activity::activity::imbalance::aggregate_imbalance;
use options_activity::activity::{
    annotate_chain, ActivityTier, ChainContext, FlowBias, MetricsOptions, Moneyness, OptionType,
};
use options_activity::config::ActivityThresholds;
use options_activity::market_data::RawContract;

fn ctx(option_type: OptionType) -> ChainContext<'static> {
    ChainContext {
        ticker: "AAA",
        expiration: "2026-10-23",
        option_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_extreme_call() {
        let contracts = vec![RawContract::new(100.0, Some(500), Some(100))
            .with_implied_volatility(0.42)
            .with_contract_symbol("AAA261023C00100000")];

        let records = annotate_chain(
            ctx(OptionType::Call),
            &contracts,
            Some(80.0),
            &ActivityThresholds::default(),
            MetricsOptions::default(),
        );

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.vol_over_oi, Some(5.0));
        assert_eq!(r.activity_tier, ActivityTier::Extreme);
        assert_eq!(r.relative_volume, Some(1.0));
        assert_eq!(r.pct_from_spot, Some(25.0));
        assert_eq!(r.moneyness, Some(Moneyness::Otm));
        assert_eq!(r.implied_volatility, Some(0.42));
        assert_eq!(r.contract_symbol.as_deref(), Some("AAA261023C00100000"));
    }

    #[test]
    fn test_put_moneyness_and_missing_fields() {
        let contracts = vec![
            RawContract::new(120.0, None, Some(10)),
            RawContract::new(100.0, Some(40), None),
        ];

        let records = annotate_chain(
            ctx(OptionType::Put),
            &contracts,
            Some(100.0),
            &ActivityThresholds::default(),
            MetricsOptions::default(),
        );

        assert_eq!(records[0].volume, 0);
        assert_eq!(records[0].vol_over_oi, Some(0.0));
        assert_eq!(records[0].activity_tier, ActivityTier::Normal);
        assert_eq!(records[0].moneyness, Some(Moneyness::Itm));

        assert_eq!(records[1].activity_tier, ActivityTier::Unknown);
        assert_eq!(records[1].moneyness, Some(Moneyness::Atm));
        assert_eq!(records[1].pct_from_spot, Some(0.0));
    }

    #[test]
    fn test_empty_chain() {
        let records = annotate_chain(
            ctx(OptionType::Call),
            &[],
            Some(100.0),
            &ActivityThresholds::default(),
            MetricsOptions::default(),
        );
        assert!(records.is_empty());

        let row = aggregate_imbalance("AAA", "2026-10-23", &[], &[]);
        assert_eq!(row.call_volume, 0);
        assert_eq!(row.ratio, None);
        assert_eq!(row.bias, FlowBias::Neutral);
    }

    #[test]
    fn test_put_heavy_imbalance() {
        let calls = vec![RawContract::new(100.0, Some(100), Some(10))];
        let puts = vec![
            RawContract::new(95.0, Some(150), Some(10)),
            RawContract::new(90.0, None, Some(10)),
        ];

        let row = aggregate_imbalance("AAA", "2026-10-23", &calls, &puts);

        assert_eq!(row.put_volume, 150);
        assert!(row.ratio.is_some_and(|r| (r - 2.0 / 3.0).abs() < 1e-12));
        assert_eq!(row.bias, FlowBias::PutHeavy);
    }
}
