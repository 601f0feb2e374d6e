//! The first-pass document audit.
//!
//! One request, one outcome: transport and API failures propagate, while an
//! empty-but-successful response degrades to a fallback report string.

use crate::ai::gemini::{
    Content, GeminiClient, GeminiError, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, Part, SystemInstruction, ThinkingConfig,
};
use crate::encode::UploadedFile;
use crate::persona;

/// Low temperature for a precise, reproducible audit.
pub const AUDIT_TEMPERATURE: f32 = 0.2;

/// Internal reasoning budget for the audit call.
pub const AUDIT_THINKING_BUDGET: u32 = 16384;

/// Substituted when the model answers successfully but with no text.
pub const EMPTY_REPORT_FALLBACK: &str = "Analysis failed to generate text.";

/// Assemble the audit request: fixed instruction, inline document, persona,
/// and fixed generation parameters.
pub fn build_audit_request(file: &UploadedFile, persona_text: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user(vec![
            Part::text(persona::AUDIT_INSTRUCTION),
            Part::inline_data(&file.mime_type, &file.data),
        ])],
        system_instruction: Some(SystemInstruction::new(persona_text)),
        generation_config: Some(GenerationConfig {
            temperature: AUDIT_TEMPERATURE,
            thinking_config: Some(ThinkingConfig {
                thinking_budget: AUDIT_THINKING_BUDGET,
            }),
        }),
    }
}

/// Report text from an audit response, degrading an empty response to the
/// fallback string.
pub fn report_text(response: &GenerateContentResponse) -> String {
    response
        .text()
        .unwrap_or_else(|| EMPTY_REPORT_FALLBACK.to_string())
}

/// Run the audit against the model.
pub async fn analyze_document(
    client: &GeminiClient,
    model: &str,
    file: &UploadedFile,
    persona_text: &str,
) -> Result<String, GeminiError> {
    let request = build_audit_request(file, persona_text);
    let response = client.generate_content(model, &request).await?;
    Ok(report_text(&response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_file() -> UploadedFile {
        UploadedFile {
            name: "term-sheet.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            data: "QkFTRTY0".to_string(),
        }
    }

    #[test]
    fn test_audit_request_carries_instruction_and_document() {
        let request = build_audit_request(&sample_file(), "persona");

        assert_eq!(request.contents.len(), 1);
        let parts = &request.contents[0].parts;
        assert_eq!(parts[0], Part::text(persona::AUDIT_INSTRUCTION));
        assert_eq!(parts[1], Part::inline_data("application/pdf", "QkFTRTY0"));

        let config = request.generation_config.unwrap();
        assert_eq!(config.temperature, AUDIT_TEMPERATURE);
        assert_eq!(
            config.thinking_config.unwrap().thinking_budget,
            AUDIT_THINKING_BUDGET
        );
    }

    #[test]
    fn test_empty_response_degrades_to_fallback_report() {
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(report_text(&response), EMPTY_REPORT_FALLBACK);
    }

    #[test]
    fn test_textual_response_is_returned_verbatim() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "1. EXECUTIVE SUMMARY"}]}}]
        }))
        .unwrap();
        assert_eq!(report_text(&response), "1. EXECUTIVE SUMMARY");
    }
}
