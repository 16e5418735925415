//! Brief Agent
//!
//! Second oracle call: turns the findings into a one-page executive brief in HTML.

use crate::llm::LLM;
use crate::models::WebhookPayload;
use crate::types::{AppError, AppResult};
use crate::utils::{escape_html, strip_code_fences};
use tracing::info;

use super::SYSTEM_PROMPT;

const TEMPERATURE: f32 = 0.2;

pub struct BriefAgent;

impl BriefAgent {
    pub fn build_prompt(payload: &WebhookPayload, findings: &str) -> String {
        format!(
            "Gere um brief de 1 página em HTML SEM CSS inline. Empresa: {company}. \
             Traga 3 mensagens-chave, 3-5 KPIs (valor/meta/status), top3 riscos e oportunidades, \
             plano 90 dias, visão 12 meses, e ROI/SROI/VAR/VBI. \
             Foco: {focus}. Horizonte: {horizon}. Idioma de saída: {language}. Base:\n{findings}",
            company = payload.company,
            focus = payload.focus,
            horizon = payload.horizon,
            language = payload.language,
            findings = findings,
        )
    }

    pub async fn generate(llm: &LLM, payload: &WebhookPayload, findings: &str) -> AppResult<String> {
        let prompt = Self::build_prompt(payload, findings);
        let reply = llm.complete(SYSTEM_PROMPT, &prompt, TEMPERATURE).await?;
        let html = strip_code_fences(&reply);

        if html.is_empty() {
            return Err(AppError::LLMApi("empty brief reply".to_string()));
        }

        info!(brief_len = html.len(), "Brief generated");
        Ok(html.to_string())
    }

    /// Placeholder page that points the reader back at the source report.
    pub fn fallback(payload: &WebhookPayload) -> String {
        let company = if payload.company.is_empty() {
            "empresa".to_string()
        } else {
            escape_html(&payload.company)
        };
        let link = escape_html(&payload.document_reference);

        format!(
            "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head><meta charset=\"utf-8\"><title>Brief ESG - {company}</title></head>\n\
             <body>\n<h1>Brief ESG - {company}</h1>\n\
             <p>Desculpe, não foi possível gerar o brief automaticamente desta vez.</p>\n\
             <p>Relatório original: <a href=\"{link}\">{link}</a></p>\n</body>\n</html>\n",
            lang = escape_html(&payload.language),
            company = company,
            link = link,
        )
    }
}
