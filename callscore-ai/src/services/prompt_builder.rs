//! Analysis prompt template
//!
//! The transcript is embedded verbatim. No escaping is applied, so
//! instructions inside a transcript reach the model unchanged.

/// Placeholder replaced by the transcript text
const TRANSCRIPT_PLACEHOLDER: &str = "__TRANSCRIPT_TEXT__";

const ANALYSIS_TEMPLATE: &str = "
Analyze the following meeting transcript and return a JSON object with scores from 1-100 for each of the following categories: pitchScore, conversionScore, rapportScore, objectionScore, closingScore. Also include an 'overall' score and a 'rationale' string (2-3 sentences). The JSON object must be the only thing in your response.

Transcript:
---
__TRANSCRIPT_TEXT__
---
";

/// Render the analysis prompt for one transcript
pub fn build_analysis_prompt(transcript_text: &str) -> String {
    // Single substitution so placeholder text inside the transcript is left alone
    ANALYSIS_TEMPLATE.replacen(TRANSCRIPT_PLACEHOLDER, transcript_text, 1)
}
