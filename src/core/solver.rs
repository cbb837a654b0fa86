use serde::Serialize;

use super::engine::{run_flip_model, run_rental_model};
use super::types::InputParameters;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    MaxOfferForProfit,
    MaxOfferForCashFlow,
    BreakEvenRent,
}

#[derive(Debug, Clone, Copy)]
pub struct SolveConfig {
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            search_min: 0.0,
            search_max: 5_000_000.0,
            tolerance: 1.0,
            max_iterations: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub metric_value: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveResult {
    pub kind: TargetKind,
    pub target: f64,
    pub solved_value: Option<f64>,
    pub achieved_metric: Option<f64>,
    pub iterations: Vec<SolveIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

pub fn max_offer_for_profit(
    params: &InputParameters,
    target_profit: f64,
    config: SolveConfig,
) -> Result<SolveResult, String> {
    solve_max_purchase_price(
        params,
        TargetKind::MaxOfferForProfit,
        target_profit,
        config,
        |candidate| run_flip_model(candidate).profit,
    )
}

pub fn max_offer_for_cash_flow(
    params: &InputParameters,
    target_cash_flow: f64,
    config: SolveConfig,
) -> Result<SolveResult, String> {
    solve_max_purchase_price(
        params,
        TargetKind::MaxOfferForCashFlow,
        target_cash_flow,
        config,
        |candidate| run_rental_model(candidate).monthly_cash_flow,
    )
}

// Management and vacancy scale with rent, so fixed costs are grossed up by
// the share of rent left after them.
pub fn break_even_rent(params: &InputParameters) -> SolveResult {
    let rental = run_rental_model(params);
    let rent_load =
        (params.rental.property_management_pct + params.rental.vacancy_pct_of_rent) / 100.0;
    let fixed = rental.maintenance_expense
        + rental.tax_expense
        + params.rental.monthly_insurance
        + params.rental.monthly_hoa
        + rental.monthly_mortgage;

    let base = SolveResult {
        kind: TargetKind::BreakEvenRent,
        target: 0.0,
        solved_value: None,
        achieved_metric: None,
        iterations: Vec::new(),
        converged: false,
        feasible: false,
        message: String::new(),
    };

    if rent_load >= 1.0 {
        return SolveResult {
            message: "Management and vacancy consume all rent; no rent breaks even.".to_string(),
            ..base
        };
    }
    if !fixed.is_finite() {
        return SolveResult {
            message: "Financing inputs produce a non-finite mortgage payment.".to_string(),
            ..base
        };
    }

    let rent = fixed / (1.0 - rent_load);
    let achieved = run_rental_model(&params.with_monthly_rent(rent)).monthly_cash_flow;
    SolveResult {
        solved_value: Some(rent),
        achieved_metric: Some(achieved),
        converged: true,
        feasible: true,
        message: "Solved break-even rent.".to_string(),
        ..base
    }
}

fn solve_max_purchase_price<F>(
    params: &InputParameters,
    kind: TargetKind,
    target: f64,
    config: SolveConfig,
    metric: F,
) -> Result<SolveResult, String>
where
    F: Fn(&InputParameters) -> f64,
{
    validate_config(target, config)?;

    let evaluate = |price: f64| metric(&params.with_purchase_price(price));
    let low_metric = evaluate(config.search_min);
    let high_metric = evaluate(config.search_max);

    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let mut solved_value = None;
    let mut converged = false;
    let feasible;
    let message;

    if !low_metric.is_finite() || !high_metric.is_finite() {
        feasible = false;
        message = "Model produced a non-finite value inside the search bounds.".to_string();
    } else if low_metric < target {
        feasible = false;
        message = "Target is not reachable even at the lower price bound.".to_string();
    } else if high_metric >= target {
        solved_value = Some(config.search_max);
        converged = true;
        feasible = true;
        message = "Upper price bound still meets the target; increase search max.".to_string();
    } else {
        let mut lo = config.search_min;
        let mut hi = config.search_max;
        let mut it = 0;
        while it < config.max_iterations {
            it += 1;
            let mid = (lo + hi) * 0.5;
            let value = evaluate(mid);
            iterations.push(SolveIteration {
                iteration: it,
                lower_bound: lo,
                upper_bound: hi,
                candidate_value: mid,
                metric_value: value,
            });

            if value >= target {
                lo = mid;
            } else {
                hi = mid;
            }

            if (hi - lo).abs() <= config.tolerance {
                converged = true;
                break;
            }
        }
        solved_value = Some(lo);
        feasible = true;
        message = if converged {
            "Solved maximum purchase price.".to_string()
        } else {
            "Reached max iterations before tolerance was met; returning best estimate."
                .to_string()
        };
    }

    Ok(SolveResult {
        kind,
        target,
        solved_value,
        achieved_metric: solved_value.map(evaluate),
        iterations,
        converged,
        feasible,
        message,
    })
}

fn validate_config(target: f64, config: SolveConfig) -> Result<(), String> {
    if !target.is_finite() {
        return Err("target must be finite".to_string());
    }
    if !config.search_min.is_finite() || !config.search_max.is_finite() {
        return Err("search bounds must be finite".to_string());
    }
    if config.search_max <= config.search_min {
        return Err("search_max must be greater than search_min".to_string());
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err("tolerance must be > 0".to_string());
    }
    if config.max_iterations == 0 {
        return Err("max_iterations must be > 0".to_string());
    }
    Ok(())
}
