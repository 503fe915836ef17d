use crate::dates::duration_days;
use crate::models::{Expense, ExpenseCategory, Hotel, Transport, TransportFare, TripSnapshot};
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Category name to accumulated cost, kept in first-declared order so a chart
/// legend stays stable between renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTotals {
    entries: Vec<(String, Decimal)>,
}

impl CategoryTotals {
    pub fn new() -> Self {
        Self::default()
    }

    fn declare(&mut self, category: &str) -> &mut Decimal {
        let index = match self.entries.iter().position(|(name, _)| name == category) {
            Some(index) => index,
            None => {
                self.entries.push((category.to_string(), Decimal::ZERO));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    fn add(&mut self, category: &str, amount: Decimal) {
        let bucket = self.declare(category);
        *bucket = bucket.saturating_add(amount);
    }

    pub fn get(&self, category: &str) -> Option<Decimal> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, amount)| *amount)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> + '_ {
        self.entries.iter().map(|(name, amount)| (name.as_str(), *amount))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sum(&self) -> Decimal {
        self.entries
            .iter()
            .fold(Decimal::ZERO, |total, (_, amount)| total.saturating_add(*amount))
    }
}

impl Serialize for CategoryTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, amount) in &self.entries {
            map.serialize_entry(name, amount)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub per_category: CategoryTotals,
    /// Booked plus logged cost across every bucket.
    pub grand_total: Decimal,
    /// Logged expenses only.
    pub total_spent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSlice {
    pub label: String,
    pub amount: Decimal,
}

impl CostBreakdown {
    pub fn remaining_budget(&self, total_budget: Decimal) -> Decimal {
        total_budget.saturating_sub(self.grand_total)
    }

    /// Buckets worth drawing: empty categories are left out of the chart.
    pub fn chart_slices(&self) -> Vec<ChartSlice> {
        self.per_category
            .iter()
            .filter(|(_, amount)| *amount > Decimal::ZERO)
            .map(|(label, amount)| ChartSlice {
                label: label.to_string(),
                amount,
            })
            .collect()
    }
}

/// Cost of one transport: fuel plus tolls for a car, the ticket price otherwise.
pub fn transport_cost(transport: &Transport) -> Decimal {
    match &transport.fare {
        TransportFare::Car(estimate) => estimate
            .estimated_fuel
            .value()
            .saturating_add(estimate.estimated_toll.value()),
        TransportFare::Plane(fare) | TransportFare::Train(fare) => fare.price.value(),
    }
}

/// Folds a trip's booked (hotel, transport) and logged (expense) costs into
/// category buckets.
///
/// Every name in `categories` appears in the result even with zero spend.
/// Hotels land in "Lodging", transports in "Transport", and each expense in
/// the bucket named by its own category, created on demand. Booked and logged
/// amounts in the same bucket are added, never deduplicated. Unparseable
/// amounts count as zero, so the function is total over its input.
pub fn compute_cost_breakdown(
    categories: &[String],
    hotels: &[Hotel],
    transports: &[Transport],
    expenses: &[Expense],
) -> CostBreakdown {
    let mut per_category = CategoryTotals::new();
    for category in categories {
        per_category.declare(category);
    }

    let lodging = ExpenseCategory::Lodging.label();
    for hotel in hotels {
        per_category.add(lodging, hotel.total_price.value());
    }

    let transport_bucket = ExpenseCategory::Transport.label();
    for transport in transports {
        per_category.add(transport_bucket, transport_cost(transport));
    }

    let mut total_spent = Decimal::ZERO;
    for expense in expenses {
        let amount = expense.amount.value();
        total_spent = total_spent.saturating_add(amount);
        per_category.add(&expense.category, amount);
    }

    CostBreakdown {
        grand_total: per_category.sum(),
        per_category,
        total_spent,
    }
}

pub fn snapshot_breakdown(snapshot: &TripSnapshot, categories: &[String]) -> CostBreakdown {
    compute_cost_breakdown(
        categories,
        &snapshot.hotels,
        &snapshot.transports,
        &snapshot.expenses,
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripCosts {
    #[serde(flatten)]
    pub breakdown: CostBreakdown,
    pub total_budget: Decimal,
    pub remaining_budget: Decimal,
    pub chart: Vec<ChartSlice>,
}

pub fn trip_costs(snapshot: &TripSnapshot) -> TripCosts {
    let breakdown = snapshot_breakdown(snapshot, &ExpenseCategory::default_labels());
    let total_budget = snapshot.trip.total_budget.value();
    TripCosts {
        remaining_budget: breakdown.remaining_budget(total_budget),
        chart: breakdown.chart_slices(),
        total_budget,
        breakdown,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    pub id: String,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub duration_days: i64,
    pub total_budget: Decimal,
    pub total_calculated_cost: Decimal,
    pub remaining_budget: Decimal,
}

pub fn summarize_trip(snapshot: &TripSnapshot) -> TripSummary {
    let trip = &snapshot.trip;
    let breakdown = snapshot_breakdown(snapshot, &[]);
    let total_budget = trip.total_budget.value();
    TripSummary {
        id: trip.id.clone(),
        name: trip.name.clone(),
        start_date: trip.start_date.clone(),
        end_date: trip.end_date.clone(),
        duration_days: duration_days(&trip.start_date, &trip.end_date),
        total_budget,
        total_calculated_cost: breakdown.grand_total,
        remaining_budget: breakdown.remaining_budget(total_budget),
    }
}
