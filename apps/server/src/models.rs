use serde::Deserialize;

use pledgeboard_core::confirmation::{ConfirmDraftRequest, ReverseDonationRequest};
use pledgeboard_core::lifecycle::NewEvent;

/// Amount as sent by a client: `"2,000.00"` or `2000`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawAmount {
    Text(String),
    Number(serde_json::Number),
}

impl RawAmount {
    pub fn into_raw(self) -> String {
        match self {
            RawAmount::Text(text) => text,
            RawAmount::Number(number) => number.to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StartEventBody {
    pub goal_amount: RawAmount,
    pub name: Option<String>,
}

impl From<StartEventBody> for NewEvent {
    fn from(body: StartEventBody) -> Self {
        NewEvent {
            name: body.name,
            goal_amount: body.goal_amount.into_raw(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SubmitByRefBody {
    pub image_ref: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OpenDraftBody {
    pub version: i64,
    pub editor_id: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmDraftBody {
    pub version: i64,
    pub donor_name: String,
    pub amount: RawAmount,
    pub editor_id: String,
}

impl ConfirmDraftBody {
    pub fn into_request(self, draft_id: String) -> ConfirmDraftRequest {
        ConfirmDraftRequest {
            draft_id,
            expected_version: self.version,
            donor_name: self.donor_name,
            amount: self.amount.into_raw(),
            editor_id: self.editor_id,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RejectDraftBody {
    pub version: i64,
    pub editor_id: String,
    pub reason: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReverseDonationBody {
    pub editor_id: String,
    pub reason: Option<String>,
}

impl ReverseDonationBody {
    pub fn into_request(self, event_id: String, donation_id: String) -> ReverseDonationRequest {
        ReverseDonationRequest {
            event_id,
            donation_id,
            editor_id: self.editor_id,
            reason: self.reason,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct EntriesQuery {
    pub after_seq: Option<i64>,
}
