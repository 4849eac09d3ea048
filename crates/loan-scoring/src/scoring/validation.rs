use serde::{Deserialize, Serialize};

use super::domain::ApplicationInput;
use crate::error::ValidationFailure;

const DEFAULT_TENURE_MONTHS: u32 = 12;

/// Bounds enforced before any scoring happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeLimits {
    pub min_loan_amount: f64,
    pub max_loan_amount: f64,
    pub min_declared_income: f64,
    pub min_tenure_months: u32,
    pub max_tenure_months: u32,
    pub min_age: u32,
    pub max_age: u32,
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self {
            min_loan_amount: 1_000.0,
            max_loan_amount: 100_000.0,
            min_declared_income: 1_000.0,
            min_tenure_months: 1,
            max_tenure_months: 36,
            min_age: 18,
            max_age: 100,
        }
    }
}

/// Loan terms that survived validation. Income and amount are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub declared_income: f64,
    pub loan_amount: f64,
    pub tenure_months: u32,
}

impl LoanTerms {
    pub fn monthly_installment(&self) -> f64 {
        self.loan_amount / f64::from(self.tenure_months.max(1))
    }
}

/// Guard producing [`LoanTerms`] from a raw submission.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard {
    limits: IntakeLimits,
}

impl IntakeGuard {
    pub fn with_limits(limits: IntakeLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &IntakeLimits {
        &self.limits
    }

    pub fn check(&self, input: &ApplicationInput) -> Result<LoanTerms, ValidationFailure> {
        let declared_income = required_positive(input.declared_income, "declared_income")?;
        let loan_amount = required_positive(input.loan_amount, "loan_amount")?;

        if loan_amount < self.limits.min_loan_amount || loan_amount > self.limits.max_loan_amount
        {
            return Err(ValidationFailure::new(
                "loan_amount",
                format!(
                    "must be between {} and {}",
                    self.limits.min_loan_amount, self.limits.max_loan_amount
                ),
            ));
        }

        if declared_income < self.limits.min_declared_income {
            return Err(ValidationFailure::new(
                "declared_income",
                format!("must be at least {}", self.limits.min_declared_income),
            ));
        }

        let tenure_months = match input.tenure_months {
            Some(months)
                if months < self.limits.min_tenure_months
                    || months > self.limits.max_tenure_months =>
            {
                return Err(ValidationFailure::new(
                    "tenure_months",
                    format!(
                        "must be between {} and {} months",
                        self.limits.min_tenure_months, self.limits.max_tenure_months
                    ),
                ));
            }
            Some(months) => months,
            None => DEFAULT_TENURE_MONTHS,
        };

        if let Some(age) = input.age {
            if age < self.limits.min_age || age > self.limits.max_age {
                return Err(ValidationFailure::new(
                    "age",
                    format!(
                        "must be between {} and {}",
                        self.limits.min_age, self.limits.max_age
                    ),
                ));
            }
        }

        Ok(LoanTerms {
            declared_income,
            loan_amount,
            tenure_months,
        })
    }
}

fn required_positive(value: Option<f64>, field: &str) -> Result<f64, ValidationFailure> {
    match value {
        Some(amount) if amount.is_finite() && amount > 0.0 => Ok(amount),
        Some(_) => Err(ValidationFailure::new(field, "must be a positive amount")),
        None => Err(ValidationFailure::new(field, "is required")),
    }
}
