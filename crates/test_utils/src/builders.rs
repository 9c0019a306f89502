//! Test data builders
//!
//! Thin layers over the domain constructors that fill in defaults so a
//! test only states what it is about.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, PolicyId, UserId};
use domain_billing::PremiumInstallment;
use domain_claims::Claim;
use domain_policy::{Beneficiary, Policy, PolicyBuilder, PolicyKind, PremiumFrequency};

use crate::fixtures::date;

/// Builder for test policies with defaults suitable to most tests
pub struct TestPolicy {
    kind: PolicyKind,
    policyholder_id: UserId,
    servicing_agent_id: Option<UserId>,
    coverage: Decimal,
    premium: Decimal,
    currency: Currency,
    frequency: PremiumFrequency,
    start: NaiveDate,
    end: NaiveDate,
    beneficiaries: Vec<Beneficiary>,
}

impl TestPolicy {
    pub fn new() -> Self {
        Self {
            kind: PolicyKind::Health,
            policyholder_id: UserId::new(),
            servicing_agent_id: None,
            coverage: dec!(500000),
            premium: dec!(1000),
            currency: Currency::USD,
            frequency: PremiumFrequency::Monthly,
            start: date(2024, 1, 1),
            end: date(2025, 1, 1),
            beneficiaries: Vec::new(),
        }
    }

    pub fn kind(mut self, kind: PolicyKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn held_by(mut self, id: UserId) -> Self {
        self.policyholder_id = id;
        self
    }

    pub fn serviced_by(mut self, id: UserId) -> Self {
        self.servicing_agent_id = Some(id);
        self
    }

    pub fn coverage(mut self, amount: Decimal) -> Self {
        self.coverage = amount;
        self
    }

    pub fn premium(mut self, amount: Decimal, frequency: PremiumFrequency) -> Self {
        self.premium = amount;
        self.frequency = frequency;
        self
    }

    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn term(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn beneficiaries(mut self, beneficiaries: Vec<Beneficiary>) -> Self {
        self.beneficiaries = beneficiaries;
        self
    }

    pub fn build(self) -> Policy {
        let mut builder = PolicyBuilder::new()
            .kind(self.kind)
            .policyholder(self.policyholder_id)
            .coverage(Money::new(self.coverage, self.currency))
            .premium(Money::new(self.premium, self.currency), self.frequency)
            .term(self.start, self.end)
            .beneficiaries(self.beneficiaries);
        if let Some(agent) = self.servicing_agent_id {
            builder = builder.servicing_agent(agent);
        }
        builder.build().expect("test policy is valid")
    }
}

impl Default for TestPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for test installments
pub struct TestInstallment {
    policy_id: PolicyId,
    policyholder_id: UserId,
    amount: Decimal,
    currency: Currency,
    due_date: NaiveDate,
    discount: Option<Decimal>,
}

impl TestInstallment {
    pub fn new() -> Self {
        Self {
            policy_id: PolicyId::new(),
            policyholder_id: UserId::new(),
            amount: dec!(1000),
            currency: Currency::USD,
            due_date: date(2024, 2, 1),
            discount: None,
        }
    }

    pub fn against(mut self, policy: &Policy) -> Self {
        self.policy_id = policy.id;
        self.policyholder_id = policy.policyholder_id;
        self.currency = policy.premium_amount.currency();
        self
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    pub fn due(mut self, due_date: NaiveDate) -> Self {
        self.due_date = due_date;
        self
    }

    pub fn discounted(mut self, discount: Decimal) -> Self {
        self.discount = Some(discount);
        self
    }

    pub fn build(self) -> PremiumInstallment {
        let installment = PremiumInstallment::new(
            self.policy_id,
            self.policyholder_id,
            Money::new(self.amount, self.currency),
            self.due_date,
        )
        .expect("test installment is valid");

        match self.discount {
            Some(discount) => installment
                .with_discount(Money::new(discount, self.currency))
                .expect("test discount is valid"),
            None => installment,
        }
    }
}

impl Default for TestInstallment {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for test claims
pub struct TestClaim {
    policy_id: PolicyId,
    claimant_id: UserId,
    incident_date: NaiveDate,
    description: String,
    amount: Decimal,
    currency: Currency,
}

impl TestClaim {
    pub fn new() -> Self {
        Self {
            policy_id: PolicyId::new(),
            claimant_id: UserId::new(),
            incident_date: date(2024, 6, 15),
            description: "Incident covered by the policy".to_string(),
            amount: dec!(2500),
            currency: Currency::USD,
        }
    }

    pub fn against(mut self, policy: &Policy) -> Self {
        self.policy_id = policy.id;
        self.claimant_id = policy.policyholder_id;
        self.currency = policy.coverage_amount.currency();
        self
    }

    pub fn incident_on(mut self, date: NaiveDate) -> Self {
        self.incident_date = date;
        self
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    pub fn build(self) -> Claim {
        Claim::submit(
            self.policy_id,
            self.claimant_id,
            self.incident_date,
            self.description,
            Money::new(self.amount, self.currency),
        )
        .expect("test claim is valid")
    }
}

impl Default for TestClaim {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_billing::PremiumStatus;

    #[test]
    fn installment_builder_tracks_its_policy() {
        let policy = TestPolicy::new().currency(Currency::EUR).build();
        let installment = TestInstallment::new().against(&policy).build();

        assert_eq!(installment.policy_id, policy.id);
        assert_eq!(installment.amount.currency(), Currency::EUR);
        assert_eq!(installment.status, PremiumStatus::Pending);
    }

    #[test]
    fn discount_flows_into_final_amount() {
        let installment = TestInstallment::new()
            .amount(dec!(1000))
            .discounted(dec!(100))
            .build();
        assert_eq!(installment.final_amount.amount(), dec!(900));
    }
}
