//! Prompt construction for the company analysis.

/// Build the business-analyst prompt for `company` over its website text.
///
/// The prompt asks for a bare JSON object with exactly the keys
/// `summary`, `target_customer` and `ai_automation_idea`, and shows one
/// literal example of the expected shape.
pub fn build_prompt(company: &str, content: &str) -> String {
    format!(
        r#"You are an expert business analyst.

Analyze the company's website text below. Provide your answers strictly as JSON with keys: "summary", "target_customer", and "ai_automation_idea".

Company Name: "{company}"

Website Text:
{content}

Output JSON exactly like this example:
{{
  "summary": "OpenAI develops cutting-edge artificial intelligence models and tools.",
  "target_customer": "Businesses and developers who need advanced AI capabilities.",
  "ai_automation_idea": "Offer customized AI model fine-tuning services to improve client-specific workflows."
}}
"#
    )
}
