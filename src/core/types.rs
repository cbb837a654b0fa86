use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::coerce::parse_or_default;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum View {
    Rehab,
    #[default]
    Resell,
    Rental,
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REHAB" => Ok(View::Rehab),
            "RESELL" => Ok(View::Resell),
            "RENTAL" => Ok(View::Rental),
            other => Err(format!("unknown view '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RehabInputs {
    /// Explicit budget; `0` means unset and the per-area rate applies.
    pub budget_override: f64,
    pub per_area_rate: f64,
}

impl Default for RehabInputs {
    fn default() -> Self {
        Self {
            budget_override: 0.0,
            per_area_rate: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResellInputs {
    pub purchase_price: f64,
    pub carry_months: f64,
    pub after_repair_value: f64,
}

impl Default for ResellInputs {
    fn default() -> Self {
        Self {
            purchase_price: 300_000.0,
            carry_months: 5.0,
            after_repair_value: 360_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MortgageTerms {
    pub term_years: f64,
    pub down_payment_pct: f64,
    pub annual_rate_pct: f64,
}

impl Default for MortgageTerms {
    fn default() -> Self {
        Self {
            term_years: 30.0,
            down_payment_pct: 20.0,
            annual_rate_pct: 7.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RentalInputs {
    pub monthly_rent: f64,
    pub mortgage: MortgageTerms,
    pub property_management_pct: f64,
    pub annual_property_taxes: f64,
    pub monthly_insurance: f64,
    pub maintenance_per_area_per_year: f64,
    pub vacancy_pct_of_rent: f64,
    pub hold_years: f64,
    pub annual_appreciation_pct: f64,
    pub annual_rent_inflation_pct: f64,
    #[serde(rename = "monthlyHOA")]
    pub monthly_hoa: f64,
}

impl Default for RentalInputs {
    fn default() -> Self {
        Self {
            monthly_rent: 1_850.0,
            mortgage: MortgageTerms::default(),
            property_management_pct: 8.0,
            annual_property_taxes: 2_200.0,
            monthly_insurance: 80.0,
            maintenance_per_area_per_year: 1.2,
            vacancy_pct_of_rent: 5.0,
            hold_years: 30.0,
            annual_appreciation_pct: 3.0,
            annual_rent_inflation_pct: 3.0,
            monthly_hoa: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputParameters {
    pub shared_area: f64,
    pub rehab: RehabInputs,
    pub resell: ResellInputs,
    pub rental: RentalInputs,
    pub selected_view: View,
}

impl Default for InputParameters {
    fn default() -> Self {
        Self {
            shared_area: 1_811.0,
            rehab: RehabInputs::default(),
            resell: ResellInputs::default(),
            rental: RentalInputs::default(),
            selected_view: View::default(),
        }
    }
}

impl InputParameters {
    pub fn with_view(self, view: View) -> Self {
        Self {
            selected_view: view,
            ..self
        }
    }

    pub fn with_shared_area(self, area: f64) -> Self {
        Self {
            shared_area: area,
            ..self
        }
    }

    pub fn with_rehab(self, rehab: RehabInputs) -> Self {
        Self { rehab, ..self }
    }

    pub fn with_resell(self, resell: ResellInputs) -> Self {
        Self { resell, ..self }
    }

    pub fn with_rental(self, rental: RentalInputs) -> Self {
        Self { rental, ..self }
    }

    pub fn with_mortgage(self, mortgage: MortgageTerms) -> Self {
        self.with_rental(RentalInputs {
            mortgage,
            ..self.rental
        })
    }

    pub fn with_purchase_price(self, purchase_price: f64) -> Self {
        self.with_resell(ResellInputs {
            purchase_price,
            ..self.resell
        })
    }

    pub fn with_monthly_rent(self, monthly_rent: f64) -> Self {
        self.with_rental(RentalInputs {
            monthly_rent,
            ..self.rental
        })
    }

    /// Non-finite values are stored as `0`.
    pub fn with_field(self, field: Field, value: f64) -> Self {
        let value = if value.is_finite() { value } else { 0.0 };
        let mut next = self;
        *next.slot_mut(field) = value;
        next
    }

    pub fn with_raw_field(self, field: Field, raw: &str) -> Self {
        self.with_field(field, parse_or_default(raw, 0.0))
    }

    pub fn field(&self, field: Field) -> f64 {
        let mut copy = *self;
        *copy.slot_mut(field)
    }

    fn slot_mut(&mut self, field: Field) -> &mut f64 {
        match field {
            Field::SharedArea => &mut self.shared_area,
            Field::RehabBudgetOverride => &mut self.rehab.budget_override,
            Field::RehabPerAreaRate => &mut self.rehab.per_area_rate,
            Field::PurchasePrice => &mut self.resell.purchase_price,
            Field::CarryMonths => &mut self.resell.carry_months,
            Field::AfterRepairValue => &mut self.resell.after_repair_value,
            Field::MonthlyRent => &mut self.rental.monthly_rent,
            Field::MortgageTermYears => &mut self.rental.mortgage.term_years,
            Field::MortgageDownPaymentPct => &mut self.rental.mortgage.down_payment_pct,
            Field::MortgageAnnualRatePct => &mut self.rental.mortgage.annual_rate_pct,
            Field::PropertyManagementPct => &mut self.rental.property_management_pct,
            Field::AnnualPropertyTaxes => &mut self.rental.annual_property_taxes,
            Field::MonthlyInsurance => &mut self.rental.monthly_insurance,
            Field::MaintenancePerAreaPerYear => &mut self.rental.maintenance_per_area_per_year,
            Field::VacancyPctOfRent => &mut self.rental.vacancy_pct_of_rent,
            Field::HoldYears => &mut self.rental.hold_years,
            Field::AnnualAppreciationPct => &mut self.rental.annual_appreciation_pct,
            Field::AnnualRentInflationPct => &mut self.rental.annual_rent_inflation_pct,
            Field::MonthlyHoa => &mut self.rental.monthly_hoa,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Field {
    SharedArea,
    RehabBudgetOverride,
    RehabPerAreaRate,
    PurchasePrice,
    CarryMonths,
    AfterRepairValue,
    MonthlyRent,
    MortgageTermYears,
    MortgageDownPaymentPct,
    MortgageAnnualRatePct,
    PropertyManagementPct,
    AnnualPropertyTaxes,
    MonthlyInsurance,
    MaintenancePerAreaPerYear,
    VacancyPctOfRent,
    HoldYears,
    AnnualAppreciationPct,
    AnnualRentInflationPct,
    MonthlyHoa,
}

impl Field {
    pub const ALL: [Field; 19] = [
        Field::SharedArea,
        Field::RehabBudgetOverride,
        Field::RehabPerAreaRate,
        Field::PurchasePrice,
        Field::CarryMonths,
        Field::AfterRepairValue,
        Field::MonthlyRent,
        Field::MortgageTermYears,
        Field::MortgageDownPaymentPct,
        Field::MortgageAnnualRatePct,
        Field::PropertyManagementPct,
        Field::AnnualPropertyTaxes,
        Field::MonthlyInsurance,
        Field::MaintenancePerAreaPerYear,
        Field::VacancyPctOfRent,
        Field::HoldYears,
        Field::AnnualAppreciationPct,
        Field::AnnualRentInflationPct,
        Field::MonthlyHoa,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Field::SharedArea => "sharedArea",
            Field::RehabBudgetOverride => "rehab.budgetOverride",
            Field::RehabPerAreaRate => "rehab.perAreaRate",
            Field::PurchasePrice => "resell.purchasePrice",
            Field::CarryMonths => "resell.carryMonths",
            Field::AfterRepairValue => "resell.afterRepairValue",
            Field::MonthlyRent => "rental.monthlyRent",
            Field::MortgageTermYears => "rental.mortgage.termYears",
            Field::MortgageDownPaymentPct => "rental.mortgage.downPaymentPct",
            Field::MortgageAnnualRatePct => "rental.mortgage.annualRatePct",
            Field::PropertyManagementPct => "rental.propertyManagementPct",
            Field::AnnualPropertyTaxes => "rental.annualPropertyTaxes",
            Field::MonthlyInsurance => "rental.monthlyInsurance",
            Field::MaintenancePerAreaPerYear => "rental.maintenancePerAreaPerYear",
            Field::VacancyPctOfRent => "rental.vacancyPctOfRent",
            Field::HoldYears => "rental.holdYears",
            Field::AnnualAppreciationPct => "rental.annualAppreciationPct",
            Field::AnnualRentInflationPct => "rental.annualRentInflationPct",
            Field::MonthlyHoa => "rental.monthlyHOA",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Field::ALL
            .into_iter()
            .find(|field| field.path().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown field '{wanted}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RehabResult {
    pub budget: f64,
    pub per_area: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlipResult {
    pub rehab_budget: f64,
    pub acquisition_cost: f64,
    pub monthly_carry_insurance: f64,
    pub monthly_carry_utilities: f64,
    pub monthly_carry_taxes: f64,
    pub total_carry_cost: f64,
    pub disposition_cost: f64,
    pub total_cost: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalResult {
    pub down_payment: f64,
    pub loan_principal: f64,
    pub monthly_mortgage: f64,
    pub property_management_expense: f64,
    pub vacancy_expense: f64,
    pub maintenance_expense: f64,
    pub tax_expense: f64,
    pub operating_expenses: f64,
    pub monthly_cash_flow: f64,
    pub annual_cash_flow: f64,
    pub net_operating_income: f64,
    pub cap_rate: f64,
    pub cash_on_cash: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldYearResult {
    pub year: u32,
    pub monthly_rent: f64,
    pub operating_expenses: f64,
    pub mortgage_paid: f64,
    pub annual_cash_flow: f64,
    pub cumulative_cash_flow: f64,
    pub property_value: f64,
    pub loan_balance: f64,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub selected_view: View,
    pub rehab: RehabResult,
    pub flip: FlipResult,
    pub rental: RentalResult,
    pub hold_projection: Vec<HoldYearResult>,
}
