//! Prompt templates for value extraction and risk narratives.
//!
//! Parsing never depends on prompt wording; the numeric pattern is applied to
//! whatever text comes back.

use bloodwise_core::RiskMap;

/// Instruction for extracting one parameter's value from report passages.
pub fn make_extraction_prompt(query: &str, context: &str) -> String {
    format!(
        r#"Extract the following key component: {query} from the given content.
{context}
Provide clear output (single value in number) in key-value format."#
    )
}

/// Instruction for turning a risk table into structured bullets.
pub fn make_narrative_prompt(risks: &RiskMap) -> String {
    format!(
        r#"List each health vulnerability below in structured bulleted points. Include:

    • Description of the condition
    • Vulnerability level
    • Two to three suggested lifestyle or monitoring changes to reduce vulnerability

Strictly present only the structured points without any introductory or closing text.
{}
"#,
        risks.to_lines()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bloodwise_core::{classify, ValueMap};

    #[test]
    fn test_extraction_prompt() {
        let prompt = make_extraction_prompt("CREATININE", "CREATININE 1.5 mg/dL");
        assert!(prompt.contains("key component: CREATININE"));
        assert!(prompt.contains("CREATININE 1.5 mg/dL"));
        assert!(prompt.contains("single value in number"));
    }

    #[test]
    fn test_extraction_prompt_empty_context() {
        let prompt = make_extraction_prompt("SODIUM", "");
        assert!(prompt.contains("SODIUM"));
        assert!(prompt.ends_with("key-value format."));
    }

    #[test]
    fn test_narrative_prompt_lists_risks_in_order() {
        let risks = classify(&ValueMap::new());
        let prompt = make_narrative_prompt(&risks);

        assert!(prompt.contains("Vitamin B12 Deficiency and Anemia: High"));
        assert!(prompt.contains("Cardiovascular Disease: Low"));
        let anemia = prompt.find("Vitamin B12").unwrap();
        let gout = prompt.find("Gout: Low").unwrap();
        assert!(anemia < gout);
        assert!(prompt.contains("without any introductory or closing text"));
    }
}
