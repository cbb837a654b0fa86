use super::types::{
    Analysis, FlipResult, HoldYearResult, InputParameters, RehabResult, RentalInputs,
    RentalResult, ResellInputs,
};

pub const ACQUISITION_COST_RATE: f64 = 0.0033;
pub const ACQUISITION_FLAT_FEE: f64 = 550.0;
pub const CARRY_INSURANCE_ANNUAL_RATE: f64 = 0.004;
pub const CARRY_UTILITIES_PER_MONTH: f64 = 135.0;
pub const LISTING_COMMISSION_RATE: f64 = 0.025;
pub const BUYER_COMMISSION_RATE: f64 = 0.025;
pub const DISPOSITION_FLAT_FEE: f64 = 550.0;

pub const MAX_HOLD_YEARS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlipAssumptions {
    pub acquisition_cost_rate: f64,
    pub acquisition_flat_fee: f64,
    pub carry_insurance_annual_rate: f64,
    pub carry_utilities_per_month: f64,
    pub listing_commission_rate: f64,
    pub buyer_commission_rate: f64,
    pub disposition_flat_fee: f64,
}

impl Default for FlipAssumptions {
    fn default() -> Self {
        Self {
            acquisition_cost_rate: ACQUISITION_COST_RATE,
            acquisition_flat_fee: ACQUISITION_FLAT_FEE,
            carry_insurance_annual_rate: CARRY_INSURANCE_ANNUAL_RATE,
            carry_utilities_per_month: CARRY_UTILITIES_PER_MONTH,
            listing_commission_rate: LISTING_COMMISSION_RATE,
            buyer_commission_rate: BUYER_COMMISSION_RATE,
            disposition_flat_fee: DISPOSITION_FLAT_FEE,
        }
    }
}

/// `annual_rate` is a fraction (`0.06` for 6%). Zero or negative `months`
/// is not guarded and produces a non-finite payment.
pub fn monthly_payment(annual_rate: f64, months: f64, principal: f64) -> f64 {
    let r = annual_rate / 12.0;
    if r == 0.0 {
        return principal / months;
    }
    r * principal / (1.0 - (1.0 + r).powf(-months))
}

fn remaining_balance(
    annual_rate: f64,
    months: f64,
    principal: f64,
    payment: f64,
    payments_made: f64,
) -> f64 {
    if payments_made >= months {
        return 0.0;
    }
    let r = annual_rate / 12.0;
    let balance = if r == 0.0 {
        principal - payment * payments_made
    } else {
        let growth = (1.0 + r).powf(payments_made);
        principal * growth - payment * (growth - 1.0) / r
    };
    balance.max(0.0)
}

/// An explicit budget wins; `0` falls through to `per_area_rate * area`.
pub fn resolve_budget(explicit_budget: f64, per_area_rate: f64, area: f64) -> f64 {
    if explicit_budget != 0.0 {
        explicit_budget
    } else {
        per_area_rate * area
    }
}

pub fn run_rehab_model(params: &InputParameters) -> RehabResult {
    let budget = resolve_budget(
        params.rehab.budget_override,
        params.rehab.per_area_rate,
        params.shared_area,
    );
    RehabResult {
        budget,
        per_area: budget / params.shared_area.max(1.0),
    }
}

pub fn run_flip_model(params: &InputParameters) -> FlipResult {
    let rehab = run_rehab_model(params);
    flip_breakdown(
        &params.resell,
        rehab.budget,
        params.rental.annual_property_taxes,
        &FlipAssumptions::default(),
    )
}

pub fn flip_breakdown(
    resell: &ResellInputs,
    rehab_budget: f64,
    annual_property_taxes: f64,
    assumptions: &FlipAssumptions,
) -> FlipResult {
    let carry_fraction_of_year = resell.carry_months / 12.0;

    let acquisition_cost = resell.purchase_price * assumptions.acquisition_cost_rate
        + assumptions.acquisition_flat_fee;
    let monthly_carry_insurance = resell.after_repair_value
        * assumptions.carry_insurance_annual_rate
        * carry_fraction_of_year;
    let monthly_carry_utilities = assumptions.carry_utilities_per_month * resell.carry_months;
    let monthly_carry_taxes = annual_property_taxes * carry_fraction_of_year;
    let total_carry_cost = monthly_carry_insurance + monthly_carry_utilities + monthly_carry_taxes;
    let disposition_cost = resell.after_repair_value
        * (assumptions.listing_commission_rate + assumptions.buyer_commission_rate)
        + assumptions.disposition_flat_fee;
    let total_cost = resell.purchase_price
        + rehab_budget
        + acquisition_cost
        + total_carry_cost
        + disposition_cost;

    FlipResult {
        rehab_budget,
        acquisition_cost,
        monthly_carry_insurance,
        monthly_carry_utilities,
        monthly_carry_taxes,
        total_carry_cost,
        disposition_cost,
        total_cost,
        profit: resell.after_repair_value - total_cost,
    }
}

#[derive(Debug, Clone, Copy)]
struct MonthlyExpenses {
    property_management: f64,
    vacancy: f64,
    maintenance: f64,
    taxes: f64,
    insurance: f64,
    hoa: f64,
}

impl MonthlyExpenses {
    fn for_rent(rental: &RentalInputs, shared_area: f64, monthly_rent: f64) -> Self {
        Self {
            property_management: monthly_rent * (rental.property_management_pct / 100.0),
            vacancy: monthly_rent * (rental.vacancy_pct_of_rent / 100.0),
            maintenance: (shared_area * rental.maintenance_per_area_per_year) / 12.0,
            taxes: rental.annual_property_taxes / 12.0,
            insurance: rental.monthly_insurance,
            hoa: rental.monthly_hoa,
        }
    }

    fn total(self) -> f64 {
        self.property_management
            + self.vacancy
            + self.maintenance
            + self.taxes
            + self.insurance
            + self.hoa
    }
}

#[derive(Debug, Clone, Copy)]
struct Financing {
    down_payment: f64,
    principal: f64,
    annual_rate: f64,
    months: f64,
    payment: f64,
}

impl Financing {
    fn from_params(params: &InputParameters) -> Self {
        let mortgage = &params.rental.mortgage;
        let purchase_price = params.resell.purchase_price;
        let down_payment = purchase_price * (mortgage.down_payment_pct / 100.0);
        let principal = purchase_price - down_payment;
        let annual_rate = mortgage.annual_rate_pct / 100.0;
        let months = mortgage.term_years * 12.0;
        Self {
            down_payment,
            principal,
            annual_rate,
            months,
            payment: monthly_payment(annual_rate, months, principal),
        }
    }
}

pub fn run_rental_model(params: &InputParameters) -> RentalResult {
    let rental = &params.rental;
    let financing = Financing::from_params(params);
    let expenses = MonthlyExpenses::for_rent(rental, params.shared_area, rental.monthly_rent);

    let operating_expenses = expenses.total();
    let monthly_cash_flow = rental.monthly_rent - operating_expenses - financing.payment;
    let annual_cash_flow = monthly_cash_flow * 12.0;
    let net_operating_income = (rental.monthly_rent * 12.0) - (operating_expenses * 12.0);

    RentalResult {
        down_payment: financing.down_payment,
        loan_principal: financing.principal,
        monthly_mortgage: financing.payment,
        property_management_expense: expenses.property_management,
        vacancy_expense: expenses.vacancy,
        maintenance_expense: expenses.maintenance,
        tax_expense: expenses.taxes,
        operating_expenses,
        monthly_cash_flow,
        annual_cash_flow,
        net_operating_income,
        cap_rate: net_operating_income / params.resell.purchase_price,
        cash_on_cash: annual_cash_flow / financing.down_payment,
    }
}

pub fn run_hold_projection(params: &InputParameters) -> Vec<HoldYearResult> {
    let rental = &params.rental;
    let hold_years = if rental.hold_years > 0.0 {
        (rental.hold_years.floor() as u32).min(MAX_HOLD_YEARS)
    } else {
        0
    };

    let financing = Financing::from_params(params);
    let rent_growth = 1.0 + rental.annual_rent_inflation_pct / 100.0;
    let value_growth = 1.0 + rental.annual_appreciation_pct / 100.0;

    let mut rows = Vec::with_capacity(hold_years as usize);
    let mut cumulative_cash_flow = 0.0;
    for year in 1..=hold_years {
        let months_before = f64::from(year - 1) * 12.0;
        let months_through = f64::from(year) * 12.0;

        let monthly_rent = rental.monthly_rent * rent_growth.powi(year as i32 - 1);
        let operating_expenses =
            MonthlyExpenses::for_rent(rental, params.shared_area, monthly_rent).total();
        let payments_this_year = (financing.months - months_before).clamp(0.0, 12.0);
        let mortgage_paid = financing.payment * payments_this_year;
        let annual_cash_flow = (monthly_rent - operating_expenses) * 12.0 - mortgage_paid;
        cumulative_cash_flow += annual_cash_flow;

        let property_value = params.resell.purchase_price * value_growth.powi(year as i32);
        let loan_balance = remaining_balance(
            financing.annual_rate,
            financing.months,
            financing.principal,
            financing.payment,
            months_through,
        );

        rows.push(HoldYearResult {
            year,
            monthly_rent,
            operating_expenses,
            mortgage_paid,
            annual_cash_flow,
            cumulative_cash_flow,
            property_value,
            loan_balance,
            equity: property_value - loan_balance,
        });
    }
    rows
}

pub fn analyze(params: &InputParameters) -> Analysis {
    Analysis {
        selected_view: params.selected_view,
        rehab: run_rehab_model(params),
        flip: run_flip_model(params),
        rental: run_rental_model(params),
        hold_projection: run_hold_projection(params),
    }
}
