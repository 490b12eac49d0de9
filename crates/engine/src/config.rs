use anyhow::Result;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a course of care and diagnostics agent. You are required to determine the optimal course of care and diagnosis for the patient with ICD10 and CPT codes that are relevant to the diagnosis.";

/// Remote-provider configuration, resolved from the environment per request
/// so the server can boot without it and report the failure on use.
#[derive(Clone, Debug)]
pub struct RunpodConfig {
    pub endpoint_id: String,
    pub api_key: String,
    pub system_prompt: String,
}

impl RunpodConfig {
    pub fn from_env() -> Result<Self> {
        let endpoint_id = std::env::var("RUNPOD_ENDPOINT_ID")
            .map_err(|_| anyhow::anyhow!("RunPod endpoint not configured"))?;
        let api_key = std::env::var("RUNPOD_API_KEY")
            .map_err(|_| anyhow::anyhow!("RunPod API key not configured"))?;
        let system_prompt =
            std::env::var("SYSTEM_PROMPT").unwrap_or_else(|_| DEFAULT_SYSTEM_PROMPT.to_string());

        Ok(Self {
            endpoint_id,
            api_key,
            system_prompt,
        })
    }

    pub fn run_url(&self) -> String {
        format!("https://api.runpod.ai/v2/{}/run", self.endpoint_id)
    }

    pub fn status_url(&self, job_id: &str) -> String {
        format!(
            "https://api.runpod.ai/v2/{}/status/{}",
            self.endpoint_id, job_id
        )
    }
}
