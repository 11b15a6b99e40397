//! Property-based tests for the ledger arithmetic.
//!
//! Records are generated with any mix of missing figures so the three
//! aggregation paths are exercised on the same shapes of data.

use chrono::NaiveDate;
use proptest::prelude::*;
use vegetable_vendor_api::{
    entities::vegetable_sale::Model,
    reports::{clamp_profit_loss, has_activity, DailyTotals, MonthlyAnalysis, ReportLine, ReportTotals},
};

const NAMES: [&str; 4] = ["Onion", "Tomato", "Potato", "Carrot"];

fn figure_strategy() -> impl Strategy<Value = Option<f64>> {
    prop::option::weighted(0.8, (0u32..100_000).prop_map(|cents| f64::from(cents) / 100.0))
}

fn complete_figure_strategy() -> impl Strategy<Value = f64> {
    (0u32..100_000).prop_map(|cents| f64::from(cents) / 100.0)
}

fn record_strategy() -> impl Strategy<Value = Model> {
    (
        0usize..NAMES.len(),
        figure_strategy(),
        figure_strategy(),
        figure_strategy(),
    )
        .prop_map(|(name, quantity, purchase_price, selling_price)| Model {
            id: 0,
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            vegetable: NAMES[name].to_string(),
            quantity,
            purchase_price,
            selling_price,
        })
}

fn records_strategy() -> impl Strategy<Value = Vec<Model>> {
    prop::collection::vec(record_strategy(), 0..30)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * (1.0 + a.abs().max(b.abs()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn clamp_never_reports_profit_and_loss_together(
        revenue in complete_figure_strategy(),
        cost in complete_figure_strategy(),
    ) {
        let (profit, loss) = clamp_profit_loss(revenue, cost);
        prop_assert!(profit >= 0.0 && loss >= 0.0);
        prop_assert!(profit == 0.0 || loss == 0.0);
        prop_assert!(close(profit - loss, revenue - cost));
    }

    #[test]
    fn daily_totals_net_out(records in records_strategy()) {
        let totals = DailyTotals::from_records(&records);
        prop_assert!(totals.profit == 0.0 || totals.loss == 0.0);
        prop_assert!(close(
            totals.profit - totals.loss,
            totals.total_selling_price - totals.total_purchase_price,
        ));
    }

    #[test]
    fn report_totals_are_sums_of_line_clamps(records in records_strategy()) {
        let lines: Vec<ReportLine> = records
            .iter()
            .filter(|r| has_activity(r))
            .map(ReportLine::from_record)
            .collect();
        let totals = ReportTotals::from_lines(&lines);

        let profit: f64 = lines.iter().map(|l| l.profit).sum();
        let loss: f64 = lines.iter().map(|l| l.loss).sum();
        prop_assert!(close(totals.profit, profit));
        prop_assert!(close(totals.loss, loss));

        // per-row clamping can only widen both sides relative to the daily view
        let daily = DailyTotals::from_records(&records);
        prop_assert!(totals.profit + 1e-6 >= daily.profit);
        prop_assert!(totals.loss + 1e-6 >= daily.loss);
    }

    #[test]
    fn monthly_ignores_incomplete_records(
        records in records_strategy(),
        extra in record_strategy(),
    ) {
        prop_assume!(
            extra.quantity.is_none() || extra.purchase_price.is_none() || extra.selling_price.is_none()
        );

        let before = MonthlyAnalysis::from_records(&records);
        let mut with_extra = records.clone();
        with_extra.push(extra);
        let after = MonthlyAnalysis::from_records(&with_extra);

        prop_assert_eq!(before.summary, after.summary);
        prop_assert!(after.vegetables.len() >= before.vegetables.len());
        for (b, a) in before.vegetables.iter().zip(after.vegetables.iter()) {
            prop_assert_eq!(b, a);
        }
    }

    #[test]
    fn monthly_vegetables_sum_to_summary(records in records_strategy()) {
        let analysis = MonthlyAnalysis::from_records(&records);
        let profit: f64 = analysis.vegetables.iter().map(|v| v.profit).sum();
        let loss: f64 = analysis.vegetables.iter().map(|v| v.loss).sum();
        prop_assert!(close(analysis.summary.total_profit, profit));
        prop_assert!(close(analysis.summary.total_loss, loss));
        prop_assert!(close(
            analysis.summary.total_profit - analysis.summary.total_loss,
            analysis.summary.total_revenue - analysis.summary.total_investment,
        ));
    }
}
