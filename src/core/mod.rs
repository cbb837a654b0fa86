mod coerce;
mod engine;
mod solver;
mod types;

pub use coerce::{coerce_json, parse_or_default};
pub use engine::{
    FlipAssumptions, MAX_HOLD_YEARS, analyze, flip_breakdown, monthly_payment, resolve_budget,
    run_flip_model, run_hold_projection, run_rehab_model, run_rental_model,
};
pub use solver::{
    SolveConfig, SolveIteration, SolveResult, TargetKind, break_even_rent,
    max_offer_for_cash_flow, max_offer_for_profit,
};
pub use types::{
    Analysis, Field, FlipResult, HoldYearResult, InputParameters, MortgageTerms, RehabInputs,
    RehabResult, RentalInputs, RentalResult, ResellInputs, View,
};
