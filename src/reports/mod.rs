//! Profit and loss arithmetic behind the daily totals, the per-date report
//! and the monthly analysis.
//!
//! The three views deliberately disagree on how missing figures are treated:
//! daily totals and reports count a missing quantity or price as zero, while
//! the monthly analysis drops a record from every total unless all three
//! figures are present. Daily totals and report lines clamp profit and loss
//! separately; the monthly analysis routes each record's whole margin into
//! either profit or loss.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::entities::vegetable_sale;

/// Splits a revenue/cost pair into `(profit, loss)`, each clamped at zero.
pub fn clamp_profit_loss(revenue: f64, cost: f64) -> (f64, f64) {
    ((revenue - cost).max(0.0), (cost - revenue).max(0.0))
}

fn product(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? * b?)
}

fn is_positive(value: Option<f64>) -> bool {
    value.map_or(false, |v| v > 0.0)
}

/// Totals for a single day, as returned by the calculate endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailyTotals {
    pub total_purchase_price: f64,
    pub total_selling_price: f64,
    pub profit: f64,
    pub loss: f64,
}

impl DailyTotals {
    /// Sums `quantity * price` per side; a term with either factor missing adds nothing.
    /// The clamp is applied once, to the day's totals.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a vegetable_sale::Model>,
    {
        let (cost, revenue) = records.into_iter().fold((0.0, 0.0), |(cost, revenue), r| {
            (
                cost + product(r.quantity, r.purchase_price).unwrap_or(0.0),
                revenue + product(r.quantity, r.selling_price).unwrap_or(0.0),
            )
        });
        let (profit, loss) = clamp_profit_loss(revenue, cost);

        Self {
            total_purchase_price: cost,
            total_selling_price: revenue,
            profit,
            loss,
        }
    }
}

/// Whether a record carries any figure worth reporting.
pub fn has_activity(record: &vegetable_sale::Model) -> bool {
    is_positive(record.quantity)
        || is_positive(record.purchase_price)
        || is_positive(record.selling_price)
}

/// One computed row of the per-date report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReportLine {
    pub vegetable: String,
    pub quantity: f64,
    pub purchase_price: f64,
    pub selling_price: f64,
    pub total_purchase: f64,
    pub total_selling: f64,
    pub profit: f64,
    pub loss: f64,
}

impl ReportLine {
    pub fn from_record(record: &vegetable_sale::Model) -> Self {
        let quantity = record.quantity.unwrap_or(0.0);
        let purchase_price = record.purchase_price.unwrap_or(0.0);
        let selling_price = record.selling_price.unwrap_or(0.0);

        let total_purchase = purchase_price * quantity;
        let total_selling = selling_price * quantity;
        let (profit, loss) = clamp_profit_loss(total_selling, total_purchase);

        Self {
            vegetable: record.vegetable.clone(),
            quantity,
            purchase_price,
            selling_price,
            total_purchase,
            total_selling,
            profit,
            loss,
        }
    }
}

/// Running sums over report lines. Profit and loss are sums of the per-line
/// clamped values, so both can be positive for the same day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReportTotals {
    pub total_purchase: f64,
    pub total_selling: f64,
    pub profit: f64,
    pub loss: f64,
}

impl ReportTotals {
    pub fn add(&mut self, line: &ReportLine) {
        self.total_purchase += line.total_purchase;
        self.total_selling += line.total_selling;
        self.profit += line.profit;
        self.loss += line.loss;
    }

    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a ReportLine>,
    {
        let mut totals = Self::default();
        for line in lines {
            totals.add(line);
        }
        totals
    }
}

/// `(profit, loss)` of one record for the stacked chart: the whole margin
/// `(selling - purchase) * quantity` goes to one side. Missing figures count as zero.
pub fn margin_split(record: &vegetable_sale::Model) -> (f64, f64) {
    let quantity = record.quantity.unwrap_or(0.0);
    let margin = (record.selling_price.unwrap_or(0.0) - record.purchase_price.unwrap_or(0.0))
        * quantity;
    if margin > 0.0 {
        (margin, 0.0)
    } else {
        (0.0, margin.abs())
    }
}

/// A calendar month, parsed from `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid month format")]
pub struct ParseYearMonthError;

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, ParseYearMonthError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|_| Self { year, month })
            .ok_or(ParseYearMonthError)
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn last_day(&self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|next| next.pred_opt())
            .unwrap_or_else(|| self.first_day())
    }
}

impl FromStr for YearMonth {
    type Err = ParseYearMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('-');
        let (Some(year), Some(month), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ParseYearMonthError);
        };
        let year = year.trim().parse::<i32>().map_err(|_| ParseYearMonthError)?;
        let month = month.trim().parse::<u32>().map_err(|_| ParseYearMonthError)?;
        Self::new(year, month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Per-vegetable line of the monthly analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VegetableMonthly {
    pub vegetable: String,
    pub quantity: f64,
    pub profit: f64,
    pub loss: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonthlySummary {
    pub total_investment: f64,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub total_loss: f64,
}

#[derive(Debug, Default)]
struct VegetableAccumulator {
    line: VegetableMonthly,
    purchase_value: f64,
    selling_value: f64,
}

/// Monthly figures grouped by vegetable, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyAnalysis {
    pub vegetables: Vec<VegetableMonthly>,
    pub summary: MonthlySummary,
}

impl MonthlyAnalysis {
    /// Every vegetable seen gets a line, but only records with quantity and
    /// both prices present contribute to any total.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a vegetable_sale::Model>,
    {
        let mut order: Vec<VegetableAccumulator> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut summary = MonthlySummary::default();

        for record in records {
            let slot = *index.entry(record.vegetable.clone()).or_insert_with(|| {
                order.push(VegetableAccumulator {
                    line: VegetableMonthly {
                        vegetable: record.vegetable.clone(),
                        ..Default::default()
                    },
                    ..Default::default()
                });
                order.len() - 1
            });

            let (Some(quantity), Some(purchase_price), Some(selling_price)) =
                (record.quantity, record.purchase_price, record.selling_price)
            else {
                continue;
            };

            let purchase_value = purchase_price * quantity;
            let selling_value = selling_price * quantity;
            let acc = &mut order[slot];
            acc.purchase_value += purchase_value;
            acc.selling_value += selling_value;
            acc.line.quantity += quantity;

            let margin = selling_value - purchase_value;
            if margin >= 0.0 {
                acc.line.profit += margin;
                summary.total_profit += margin;
            } else {
                acc.line.loss += margin.abs();
                summary.total_loss += margin.abs();
            }

            summary.total_investment += purchase_value;
            summary.total_revenue += selling_value;
        }

        Self {
            vegetables: order.into_iter().map(|acc| acc.line).collect(),
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(
        vegetable: &str,
        quantity: Option<f64>,
        purchase_price: Option<f64>,
        selling_price: Option<f64>,
    ) -> vegetable_sale::Model {
        vegetable_sale::Model {
            id: 0,
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            vegetable: vegetable.to_string(),
            quantity,
            purchase_price,
            selling_price,
        }
    }

    #[test]
    fn daily_totals_for_single_profitable_record() {
        let records = [record("Onion", Some(10.0), Some(5.0), Some(8.0))];
        let totals = DailyTotals::from_records(&records);
        assert_eq!(
            totals,
            DailyTotals {
                total_purchase_price: 50.0,
                total_selling_price: 80.0,
                profit: 30.0,
                loss: 0.0,
            }
        );
    }

    #[test]
    fn daily_totals_treat_missing_factor_as_zero_per_side() {
        let records = [
            record("Onion", Some(10.0), None, Some(8.0)),
            record("Tomato", None, Some(3.0), Some(4.0)),
            record("Carrot", Some(2.0), Some(5.0), None),
        ];
        let totals = DailyTotals::from_records(&records);
        assert_eq!(totals.total_purchase_price, 10.0);
        assert_eq!(totals.total_selling_price, 80.0);
        assert_eq!(totals.profit, 70.0);
        assert_eq!(totals.loss, 0.0);
    }

    #[test]
    fn daily_totals_clamp_at_day_level() {
        let records = [
            record("Onion", Some(10.0), Some(5.0), Some(8.0)),
            record("Tomato", Some(10.0), Some(8.0), Some(2.0)),
        ];
        let totals = DailyTotals::from_records(&records);
        assert_eq!(totals.total_purchase_price, 130.0);
        assert_eq!(totals.total_selling_price, 100.0);
        assert_eq!(totals.profit, 0.0);
        assert_eq!(totals.loss, 30.0);
    }

    #[test]
    fn daily_totals_of_nothing_are_zero() {
        let totals = DailyTotals::from_records(std::iter::empty());
        assert_eq!(totals, DailyTotals::default());
    }

    #[rstest]
    #[case(Some(1.0), None, None, true)]
    #[case(None, Some(1.0), None, true)]
    #[case(None, None, Some(1.0), true)]
    #[case(None, None, None, false)]
    #[case(Some(0.0), Some(0.0), Some(0.0), false)]
    #[case(Some(-2.0), None, Some(0.0), false)]
    fn activity_requires_a_positive_figure(
        #[case] quantity: Option<f64>,
        #[case] purchase: Option<f64>,
        #[case] selling: Option<f64>,
        #[case] expected: bool,
    ) {
        assert_eq!(
            has_activity(&record("Potato", quantity, purchase, selling)),
            expected
        );
    }

    #[test]
    fn report_totals_sum_per_line_clamps() {
        // purchase totals 50 / 80, selling totals 80 / 60
        let lines = [
            ReportLine::from_record(&record("Onion", Some(10.0), Some(5.0), Some(8.0))),
            ReportLine::from_record(&record("Tomato", Some(10.0), Some(8.0), Some(6.0))),
        ];
        assert_eq!(lines[0].profit, 30.0);
        assert_eq!(lines[1].loss, 20.0);

        let totals = ReportTotals::from_lines(&lines);
        assert_eq!(totals.total_purchase, 130.0);
        assert_eq!(totals.total_selling, 140.0);
        // Not max(140 - 130, 0): each row is clamped before summing.
        assert_eq!(totals.profit, 30.0);
        assert_eq!(totals.loss, 20.0);
    }

    #[test]
    fn report_line_defaults_missing_figures_to_zero() {
        let line = ReportLine::from_record(&record("Brinjal", Some(4.0), None, Some(3.0)));
        assert_eq!(line.purchase_price, 0.0);
        assert_eq!(line.total_purchase, 0.0);
        assert_eq!(line.total_selling, 12.0);
        assert_eq!(line.profit, 12.0);
        assert_eq!(line.loss, 0.0);
    }

    #[rstest]
    #[case(Some(10.0), Some(5.0), Some(8.0), (30.0, 0.0))]
    #[case(Some(10.0), Some(8.0), Some(5.0), (0.0, 30.0))]
    #[case(Some(10.0), Some(5.0), Some(5.0), (0.0, 0.0))]
    #[case(None, Some(5.0), Some(8.0), (0.0, 0.0))]
    #[case(Some(2.0), None, Some(3.0), (6.0, 0.0))]
    fn margin_goes_entirely_to_one_side(
        #[case] quantity: Option<f64>,
        #[case] purchase: Option<f64>,
        #[case] selling: Option<f64>,
        #[case] expected: (f64, f64),
    ) {
        assert_eq!(
            margin_split(&record("Onion", quantity, purchase, selling)),
            expected
        );
    }

    #[test]
    fn monthly_groups_by_vegetable_in_first_seen_order() {
        let records = [
            record("Tomato", Some(5.0), Some(2.0), Some(3.0)),
            record("Onion", Some(10.0), Some(5.0), Some(4.0)),
            record("Tomato", Some(5.0), Some(2.0), Some(4.0)),
        ];
        let analysis = MonthlyAnalysis::from_records(&records);

        let names: Vec<_> = analysis
            .vegetables
            .iter()
            .map(|v| v.vegetable.as_str())
            .collect();
        assert_eq!(names, ["Tomato", "Onion"]);

        assert_eq!(analysis.vegetables[0].quantity, 10.0);
        assert_eq!(analysis.vegetables[0].profit, 15.0);
        assert_eq!(analysis.vegetables[1].loss, 10.0);

        assert_eq!(
            analysis.summary,
            MonthlySummary {
                total_investment: 70.0,
                total_revenue: 75.0,
                total_profit: 15.0,
                total_loss: 10.0,
            }
        );
    }

    #[test]
    fn monthly_excludes_incomplete_records_from_every_total() {
        let incomplete = record("Carrot", Some(10.0), Some(5.0), None);
        let analysis = MonthlyAnalysis::from_records([&incomplete]);

        assert_eq!(analysis.vegetables.len(), 1);
        assert_eq!(analysis.vegetables[0], VegetableMonthly {
            vegetable: "Carrot".into(),
            ..Default::default()
        });
        assert_eq!(analysis.summary, MonthlySummary::default());

        // The same record still counts towards the daily and report figures.
        let daily = DailyTotals::from_records([&incomplete]);
        assert_eq!(daily.total_purchase_price, 50.0);
        assert_eq!(daily.loss, 50.0);
        let line = ReportLine::from_record(&incomplete);
        assert_eq!(line.loss, 50.0);
    }

    #[test]
    fn monthly_of_nothing_is_empty() {
        let analysis = MonthlyAnalysis::from_records(std::iter::empty());
        assert!(analysis.vegetables.is_empty());
        assert_eq!(analysis.summary, MonthlySummary::default());
    }

    #[rstest]
    #[case("2024-05", 2024, 5)]
    #[case("2024-5", 2024, 5)]
    #[case(" 2023-12 ", 2023, 12)]
    fn year_month_parses(#[case] input: &str, #[case] year: i32, #[case] month: u32) {
        assert_eq!(input.parse::<YearMonth>(), Ok(YearMonth { year, month }));
    }

    #[rstest]
    #[case("")]
    #[case("2024")]
    #[case("2024-13")]
    #[case("2024-00")]
    #[case("May-2024")]
    #[case("2024-05-01")]
    fn year_month_rejects_malformed(#[case] input: &str) {
        assert_eq!(input.parse::<YearMonth>(), Err(ParseYearMonthError));
    }

    #[test]
    fn year_month_bounds_cover_the_whole_month() {
        let feb = YearMonth::new(2024, 2).unwrap();
        assert_eq!(feb.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let dec = YearMonth::new(2023, 12).unwrap();
        assert_eq!(dec.last_day(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(dec.to_string(), "2023-12");
    }
}
