use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::ConfirmedDonation;

/// One line of the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub donor_name: String,
    pub amount: Decimal,
    pub confirmed_at: DateTime<Utc>,
}

impl From<&ConfirmedDonation> for ReportRow {
    fn from(donation: &ConfirmedDonation) -> Self {
        Self {
            donor_name: donation.donor_name.clone(),
            amount: donation.amount,
            confirmed_at: donation.confirmed_at,
        }
    }
}
