//! Plan summaries for provider detail pages

use serde::Serialize;

use crate::models::{Plan, PlanView};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    fn of(values: impl Iterator<Item = f64>) -> Option<Self> {
        values.fold(None, |acc, v| match acc {
            None => Some(Self { min: v, max: v }),
            Some(r) => Some(Self {
                min: r.min.min(v),
                max: r.max.max(v),
            }),
        })
    }
}

/// Budget / value / premium picks over a provider's priced plans
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanTiers<'a> {
    pub budget: Option<&'a Plan>,
    pub value: Option<&'a Plan>,
    pub premium: Option<&'a Plan>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub total_plans: usize,
    pub price_range: Option<ValueRange>,
    pub speed_range: Option<ValueRange>,
    pub best_value: Option<PlanView>,
    pub budget: Option<PlanView>,
    pub value: Option<PlanView>,
    pub premium: Option<PlanView>,
}

impl PlanSummary {
    pub fn from_plans(plans: &[Plan]) -> Self {
        let tiers = assign_tiers(plans);
        let view = |plan: Option<&Plan>| plan.cloned().map(PlanView::from);

        Self {
            total_plans: plans.len(),
            price_range: ValueRange::of(plans.iter().map(|p| p.monthly_price)),
            speed_range: ValueRange::of(plans.iter().map(|p| p.download_speed).filter(|s| *s > 0.0)),
            best_value: view(best_value(plans)),
            budget: view(tiers.budget),
            value: view(tiers.value),
            premium: view(tiers.premium),
        }
    }
}

/// Mbps per dollar; a zero price counts as one dollar
pub fn value_score(plan: &Plan) -> f64 {
    let price = if plan.monthly_price > 0.0 { plan.monthly_price } else { 1.0 };
    plan.download_speed / price
}

/// Highest speed-per-dollar plan; ties keep the earliest
pub fn best_value(plans: &[Plan]) -> Option<&Plan> {
    plans.iter().fold(None, |best: Option<&Plan>, plan| match best {
        Some(b) if value_score(b) >= value_score(plan) => Some(b),
        _ => Some(plan),
    })
}

/// Pick tiers from plans with a positive price, ordered cheapest first.
///
/// One plan is the value pick alone; two plans are budget and premium.
/// With three or more, budget is the cheapest, value is the best
/// speed-per-dollar plan in the middle price tertile, and premium is the
/// fastest of the rest (higher price wins a speed tie).
pub fn assign_tiers(plans: &[Plan]) -> PlanTiers<'_> {
    let mut sorted: Vec<&Plan> = plans.iter().filter(|p| p.monthly_price > 0.0).collect();
    sorted.sort_by(|a, b| a.monthly_price.total_cmp(&b.monthly_price));

    match sorted.as_slice() {
        [] => PlanTiers::default(),
        [only] => PlanTiers {
            value: Some(*only),
            ..Default::default()
        },
        [cheap, dear] => PlanTiers {
            budget: Some(*cheap),
            premium: Some(*dear),
            ..Default::default()
        },
        [budget, ..] => {
            let budget = *budget;
            let third = sorted.len() / 3;
            let middle = &sorted[third..=(third * 2).min(sorted.len() - 1)];
            let value = middle
                .iter()
                .copied()
                .reduce(|best, plan| if value_score(plan) > value_score(best) { plan } else { best });

            let rest: Vec<&Plan> = sorted
                .iter()
                .copied()
                .filter(|p| p.id != budget.id && Some(p.id) != value.map(|v| v.id))
                .collect();
            let pool = if rest.is_empty() { sorted.as_slice() } else { rest.as_slice() };

            let premium = pool.iter().rev().copied().reduce(|best, plan| {
                let faster = plan.download_speed > best.download_speed;
                let pricier_tie =
                    plan.download_speed == best.download_speed && plan.monthly_price > best.monthly_price;
                if faster || pricier_tie {
                    plan
                } else {
                    best
                }
            });

            PlanTiers {
                budget: Some(budget),
                value,
                premium,
            }
        }
    }
}
