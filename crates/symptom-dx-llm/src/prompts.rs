//! Prompts for symptom extraction and the conversational fallback.
//!
//! Written for small instruction-tuned models with JSON grammar constraints.

use symptom_dx_core::models::{Role, Turn};

/// System prompt for symptom NER.
pub const SYSTEM_PROMPT: &str = r#"You are a medical intake assistant that extracts symptoms from patient messages.

Extract every symptom the patient reports, using the patient's own words:
- text: The symptom phrase exactly as written (e.g. "sore throat", "feeling tired")
- label: Always "SYMPTOM"
- start: Character position where the phrase starts
- end: Character position where the phrase ends

Do not extract disease names, body parts on their own, durations or medications.

Output JSON with an "entities" array containing the extracted symptoms."#;

/// User prompt template for NER extraction.
pub fn make_extraction_prompt(message: &str) -> String {
    format!(
        r#"Extract all symptoms from this patient message:

"{}"

Return a JSON object with an "entities" array. Each entity should have:
- text: The exact symptom phrase
- label: "SYMPTOM"
- start: Character position where the phrase starts
- end: Character position where the phrase ends"#,
        message
    )
}

/// JSON grammar constraint to keep the model on the output format.
pub const JSON_GRAMMAR: &str = r#"
root ::= object
object ::= "{" ws "\"entities\"" ws ":" ws entities ws "}"
entities ::= "[" ws (entity (ws "," ws entity)*)? ws "]"
entity ::= "{" ws
    "\"text\"" ws ":" ws string ws "," ws
    "\"label\"" ws ":" ws "\"SYMPTOM\"" ws "," ws
    "\"start\"" ws ":" ws number ws "," ws
    "\"end\"" ws ":" ws number ws
"}"
string ::= "\"" ([^"\\] | "\\" .)* "\""
number ::= [0-9]+
ws ::= [ \t\n]*
"#;

/// Few-shot examples for better extraction accuracy.
pub const FEW_SHOT_EXAMPLES: &[(&str, &str)] = &[
    (
        "I've had a fever and a dry cough since Monday",
        r#"{"entities":[{"text":"fever","label":"SYMPTOM","start":11,"end":16},{"text":"dry cough","label":"SYMPTOM","start":23,"end":32}]}"#,
    ),
    (
        "My head is pounding and I feel sick to my stomach",
        r#"{"entities":[{"text":"head is pounding","label":"SYMPTOM","start":3,"end":19},{"text":"sick to my stomach","label":"SYMPTOM","start":31,"end":49}]}"#,
    ),
    (
        "Can you tell me about asthma?",
        r#"{"entities":[]}"#,
    ),
];

/// Build a complete extraction prompt with system context and few-shot examples.
pub fn build_full_prompt(message: &str, include_examples: bool) -> String {
    let mut prompt = String::new();

    prompt.push_str("<|system|>\n");
    prompt.push_str(SYSTEM_PROMPT);
    prompt.push_str("\n<|end|>\n");

    if include_examples {
        for (input, output) in FEW_SHOT_EXAMPLES {
            push_block(&mut prompt, "user", &make_extraction_prompt(input));
            push_block(&mut prompt, "assistant", output);
        }
    }

    push_block(&mut prompt, "user", &make_extraction_prompt(message));
    prompt.push_str("<|assistant|>\n");

    prompt
}

/// System prompt for free-text replies when nothing could be diagnosed.
pub const FALLBACK_SYSTEM_PROMPT: &str = r#"You are a friendly health assistant in a symptom checker.

The checker could not match the patient's last message to a condition.
Reply briefly and kindly. Ask the patient to list their symptoms, separated by commas.
Never give a diagnosis, and suggest seeing a doctor for anything severe or persistent."#;

/// Build a chat prompt from the conversation so far.
pub fn build_fallback_prompt(history: &[Turn]) -> String {
    let mut prompt = String::new();

    prompt.push_str("<|system|>\n");
    prompt.push_str(FALLBACK_SYSTEM_PROMPT);
    prompt.push_str("\n<|end|>\n");

    for turn in history {
        let role = match turn.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        push_block(&mut prompt, role, &turn.text);
    }

    prompt.push_str("<|assistant|>\n");
    prompt
}

fn push_block(prompt: &mut String, role: &str, text: &str) {
    prompt.push_str("<|");
    prompt.push_str(role);
    prompt.push_str("|>\n");
    prompt.push_str(text);
    prompt.push_str("\n<|end|>\n");
}
