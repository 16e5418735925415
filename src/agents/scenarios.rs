//! Scenario Agent
//!
//! Third oracle call: projects three named scenarios into a fixed-schema CSV.
//! Replies that do not parse into that shape are replaced by a built-in table.

use crate::llm::LLM;
use crate::types::{AppError, AppResult};
use crate::utils::strip_code_fences;
use tracing::info;

use super::SYSTEM_PROMPT;

pub const COLUMNS: [&str; 9] = [
    "scenario",
    "energy_saving_pct",
    "turnover_delta_pp",
    "capex",
    "carbon_price",
    "ROI_pct",
    "SROI_ratio",
    "VAR_R$",
    "VBI_index",
];

pub const SCENARIO_NAMES: [&str; 3] = ["Conservador", "Provável", "Agressivo"];

pub const FALLBACK_CSV: &str = "\
scenario,energy_saving_pct,turnover_delta_pp,capex,carbon_price,ROI_pct,SROI_ratio,VAR_R$,VBI_index
Conservador,5,-0.5,500000,60,8,1.5,250000,0.60
Provável,10,-1.0,1000000,85,14,2.3,600000,0.75
Agressivo,18,-2.0,2000000,120,22,3.4,1200000,0.90
";

// Low temperature keeps the table format stable.
const TEMPERATURE: f32 = 0.1;

/// A parsed scenario table: one header row and exactly three data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ScenarioTable {
    pub fn parse(text: &str) -> AppResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| AppError::LLMApi(format!("scenario header unreadable: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect();

        if headers.len() != COLUMNS.len() {
            return Err(AppError::LLMApi(format!(
                "scenario table has {} columns, expected {}",
                headers.len(),
                COLUMNS.len()
            )));
        }
        if let Some((got, want)) = headers
            .iter()
            .zip(COLUMNS)
            .find(|(got, want)| !got.eq_ignore_ascii_case(want))
        {
            return Err(AppError::LLMApi(format!(
                "scenario column {:?} found where {:?} was expected",
                got, want
            )));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| AppError::LLMApi(format!("scenario row unreadable: {}", e)))?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        if rows.len() != SCENARIO_NAMES.len() {
            return Err(AppError::LLMApi(format!(
                "scenario table has {} rows, expected {}",
                rows.len(),
                SCENARIO_NAMES.len()
            )));
        }

        Ok(Self { headers, rows })
    }
}

pub struct ScenarioAgent;

impl ScenarioAgent {
    pub fn build_prompt(findings: &str) -> String {
        format!(
            "Simule 3 cenários ({names}). Devolva apenas CSV com colunas: {columns}. \
             Use valores plausíveis com base no contexto a seguir:\n{findings}",
            names = SCENARIO_NAMES.join(", "),
            columns = COLUMNS.join(","),
            findings = findings,
        )
    }

    pub async fn generate(llm: &LLM, findings: &str) -> AppResult<String> {
        let prompt = Self::build_prompt(findings);
        let reply = llm.complete(SYSTEM_PROMPT, &prompt, TEMPERATURE).await?;
        let csv_text = strip_code_fences(&reply);

        ScenarioTable::parse(csv_text)?;

        info!(csv_len = csv_text.len(), "Scenarios generated");
        Ok(format!("{}\n", csv_text))
    }

    pub fn fallback() -> String {
        FALLBACK_CSV.to_string()
    }
}
