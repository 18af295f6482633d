//! Prompt templates for the two LLM flows.

/// Prompt asking the generation model for Mermaid code plus analysis, as a
/// single strict-JSON object. The model does not always comply; the parser
/// carries the fallback.
pub fn build_generation_prompt(diagram_type_name: &str, text: &str) -> String {
    format!(
        r#"
    Generate a {diagram_type} diagram in Mermaid.js syntax and provide an analysis
    based on the following text: "{text}".

    The output MUST be a single, valid JSON object with the following structure:
    {{
      "mermaidCode": "YOUR_MERMAID_CODE_HERE (string, without markdown backticks or 'mermaid' keyword)",
      "analysis": {{
        "summary": "A concise paragraph summarizing the diagram and its purpose based on the input text.",
        "flowPoints": ["Key element or step 1 described", "Key element or step 2 described", "..."],
        "arrowMeanings": {{"A-->B": "Description of what A to B represents", "C-.->D": "Description of C to D"}}
      }}
    }}

    Important Rules:
    - The "mermaidCode" value should be ONLY the Mermaid syntax (e.g., "graph TD; A-->B;"). Do NOT include ```mermaid or ```.
    - The "analysis.flowPoints" should be an array of strings, describing key components or steps.
    - The "analysis.arrowMeanings" should be an object where keys are Mermaid arrows (e.g., "X-->Y") and values are their explanations.
    - Ensure the entire response is a single, valid JSON object. Do not add any text before or after the JSON object.
    - If you cannot generate a meaningful diagram or analysis from the text, respond with:
      {{ "error": "Unable to generate diagram from the provided text." }}
    "#,
        diagram_type = diagram_type_name.to_uppercase(),
        text = text,
    )
}

/// Prompt asking the enhancement model to refine a rough idea into a usable
/// diagram-generation prompt. The model is told to return only the refined
/// prompt text.
pub fn build_enhancement_prompt(idea: &str, context: &str) -> String {
    format!(
        r#"You are an AI assistant helping users formulate detailed prompts for diagram generation.
The user has a rough idea: "{idea}".
The context for this idea is: "{context}".
Based on this, generate a more detailed and effective prompt that can be used to generate the diagram.
The refined prompt should be clear, specific, and provide enough detail for a diagramming AI to work effectively.
Return *only* the refined prompt text, without any preamble or explanation. For example, if the idea is "user login" and context is "for a flowchart", a good response would be "A flowchart detailing the steps a user takes to log into a web application, including success and failure paths.""#
    )
}
