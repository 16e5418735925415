//! Findings Agent
//!
//! First oracle call: condenses the report text into a compact KPI / risk /
//! opportunity blob. The reply is kept verbatim and never parsed.

use crate::llm::LLM;
use crate::types::{AppError, AppResult};
use crate::utils::{strip_code_fences, truncate_chars};
use tracing::info;

use super::SYSTEM_PROMPT;

/// Characters of report text forwarded to the oracle.
pub const TEXT_WINDOW: usize = 60_000;

/// Used instead of report text when nothing could be extracted.
pub const NO_TEXT_NOTE: &str = "Nenhum texto foi extraído do relatório. \
Baseie-se no contexto setorial geral da empresa e sinalize explicitamente as incertezas.";

/// Findings blob when the oracle is unavailable.
pub const FALLBACK_FINDINGS: &str = "{}";

const TEMPERATURE: f32 = 0.2;

pub struct FindingsAgent;

impl FindingsAgent {
    pub fn build_prompt(report_text: &str) -> String {
        let body = if report_text.trim().is_empty() {
            NO_TEXT_NOTE
        } else {
            truncate_chars(report_text, TEXT_WINDOW)
        };

        format!(
            "Extraia do texto os KPIs E/S/G, riscos e oportunidades, metas e status. \
             Devolva um JSON enxuto com: kpis (lista), riscos_top3, oportunidades_top3.\n\n\
             Texto do relatório:\n{}",
            body
        )
    }

    pub async fn extract(llm: &LLM, report_text: &str) -> AppResult<String> {
        let prompt = Self::build_prompt(report_text);
        let reply = llm.complete(SYSTEM_PROMPT, &prompt, TEMPERATURE).await?;
        let findings = strip_code_fences(&reply);

        if findings.is_empty() {
            return Err(AppError::LLMApi("empty findings reply".to_string()));
        }

        info!(findings_len = findings.len(), "Findings extracted");
        Ok(findings.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::static_llm;

    #[test]
    fn test_prompt_uses_note_without_text() {
        let prompt = FindingsAgent::build_prompt("  \n ");
        assert!(prompt.contains(NO_TEXT_NOTE));
    }

    #[test]
    fn test_prompt_truncates_text_window() {
        let text = "a".repeat(TEXT_WINDOW) + "TAIL_MARKER";
        let prompt = FindingsAgent::build_prompt(&text);
        assert!(prompt.contains(&"a".repeat(100)));
        assert!(!prompt.contains("TAIL_MARKER"));
    }

    #[tokio::test]
    async fn test_blank_reply_is_a_failure() {
        for reply in ["", "   \n\t", "```json\n```"] {
            let err = FindingsAgent::extract(&static_llm(reply), "texto").await.unwrap_err();
            assert!(matches!(err, AppError::LLMApi(_)), "reply {:?}", reply);
        }
    }

    #[tokio::test]
    async fn test_reply_is_unfenced() {
        let findings = FindingsAgent::extract(&static_llm("```json\n{\"kpis\":[]}\n```"), "texto")
            .await
            .unwrap();
        assert_eq!(findings, "{\"kpis\":[]}");
    }

    #[test]
    fn test_prompt_carries_text() {
        let prompt = FindingsAgent::build_prompt("Emissões escopo 1: 120 tCO2e");
        assert!(prompt.contains("Emissões escopo 1: 120 tCO2e"));
        assert!(prompt.contains("riscos_top3"));
    }
}
