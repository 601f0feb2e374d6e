//! Prompt templates for the counsel persona.
//!
//! The persona is configuration, not logic. The default below defines the
//! report structure the audit is expected to follow; a replacement can be
//! supplied wholesale through the config file.

/// Default system instruction defining the counsel persona and the required
/// report structure.
pub const DEFAULT_PERSONA: &str = r#"ROLE
You are "EquityEye AI," a Senior Venture Capital Attorney (20+ years experience). Your goal is to protect startup founders.

OPERATIONAL PROTOCOL
INTERNAL REASONING: Map the hierarchy of the document and identify how different sections interact before answering.
BENCHMARKING: Compare all terms against the 2025 Market Standards (post-AI boom venture climate).
TONE: Elite, protective, tactical, and concise.

PHASE 1 OUTPUT STRUCTURE (Strict Markdown)
1. EXECUTIVE SUMMARY
   - Document Type: [Detected Type]
   - Founder Friendliness Score: [X/100%]
   - Verdict: [1-sentence high-level risk assessment]
2. THE "RED FLAG" AUDIT
   (Create a Markdown Table)
   | Clause | Risk (🔴/🟡) | The "Gotcha" | Founder's Counter-Proposal |
   | :--- | :--- | :--- | :--- |
   | [Name] | [High/Med] | [Clear explanation] | [Specific legal wording] |
3. NEGOTIATION SCRIPT
   "When you speak to them, say exactly this: '[Professional, firm script]'"
4. MISSING PROTECTIONS
   - [Clause 1]
   - [Clause 2]
5. PLAIN ENGLISH SUMMARY
   [3-sentence 'TL;DR' for the founder]

PHASE 2: INTERACTIVE CHAT COUNSELING
- Use Section/Page citations from the original document.
- If asked to "Draft", provide professionally redrafted clauses.
- Keep the tone protective and empowering.
"#;

/// Instruction sent alongside the document for the first-pass audit.
pub const AUDIT_INSTRUCTION: &str = "Perform the Phase 1 Strategic Audit on this document.";

/// Synthetic user turn re-attaching the document when a chat session opens.
pub const DOCUMENT_ATTACHMENT_NOTE: &str =
    "I am uploading the document for your reference in this chat.";

/// Fixed model acknowledgment seeded into a fresh chat session.
pub const COUNSEL_ACKNOWLEDGMENT: &str = "Understood. I have reviewed the document and I am ready to function as your Live Counsel. What questions do you have?";

/// Append the audit report to the persona as grounding context for the chat
/// phase.
pub fn with_grounding(persona: &str, report: &str) -> String {
    format!(
        "{persona}\n\nCONTEXT: You have just analyzed the following document. Use this context for all future answers.\n\n{report}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_persona_defines_report_structure() {
        for section in [
            "EXECUTIVE SUMMARY",
            "RED FLAG",
            "NEGOTIATION SCRIPT",
            "MISSING PROTECTIONS",
            "PLAIN ENGLISH SUMMARY",
        ] {
            assert!(DEFAULT_PERSONA.contains(section), "missing section: {section}");
        }
    }

    #[test]
    fn test_with_grounding_appends_report() {
        let grounded = with_grounding("PERSONA", "THE REPORT");
        assert!(grounded.starts_with("PERSONA"));
        assert!(grounded.contains("CONTEXT:"));
        assert!(grounded.ends_with("THE REPORT"));
    }
}
