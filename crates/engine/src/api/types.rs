use serde::{Deserialize, Serialize};

use crate::prompt::PatientHistory;
use caregate_shared::ChatMessage;

// Chat endpoint
#[derive(Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(rename = "patientHistory")]
    pub patient_history: Option<PatientHistory>,
}

// Referral endpoint
#[derive(Deserialize)]
pub struct ReferralRequest {
    #[serde(rename = "patientHistory")]
    pub patient_history: PatientHistory,
    pub symptoms: String,
}

#[derive(Serialize)]
pub struct ReferralResponse {
    pub recommendation: String,
}
