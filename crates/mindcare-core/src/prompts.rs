//! Prompt templates sent to the generation service, one per endpoint.

pub const SYMPTOM_SUMMARY_TEMPLATE: &str = r#"You are a compassionate mental health assistant.

Condition detected: {condition}
Symptoms reported: {symptoms}

Provide a brief, empathetic summary (3-4 sentences) that includes:
1. A supportive acknowledgment of the condition
2. General recommendations for managing these symptoms
3. Gentle encouragement to seek professional help

Keep the tone warm, supportive, and non-judgmental."#;

pub const TEXT_RESPONSE_TEMPLATE: &str = r#"You are a compassionate mental health assistant.

A person wrote: "{statement}"

Based on this, {condition} was detected.

Provide a brief, empathetic response (2-3 sentences) that:
1. Acknowledges their feelings
2. Offers a supportive message
3. Gently encourages seeking help if appropriate

Keep the tone warm and non-judgmental."#;

pub const EMOTION_SUPPORT_TEMPLATE: &str = r#"You are a compassionate mental health assistant.

The detected emotion is: {emotion}

Provide a brief, empathetic supportive message (2-3 sentences) that:
1. Acknowledges the emotion
2. Offers comfort or encouragement
3. Provides a gentle suggestion for wellbeing

Keep it warm and supportive."#;

pub const MULTIMODAL_RESPONSE_TEMPLATE: &str = r#"You are a compassionate mental health assistant.

A person wrote: "{statement}"

Analysis shows: {status} with a {tone} tone

Provide a brief, empathetic response (2-3 sentences) that:
1. Acknowledges their emotional state
2. Offers supportive guidance
3. Encourages healthy coping or professional help if appropriate

Keep it warm and supportive."#;

pub const CHAT_TEMPLATE: &str =
    "You are a friendly and supportive mental health assistant. Respond to: {message}";

/// `symptoms` empty renders as "general symptoms".
pub fn symptom_summary_prompt(condition: &str, symptoms: &[String]) -> String {
    let symptom_text = if symptoms.is_empty() {
        "general symptoms".to_string()
    } else {
        symptoms.join(", ")
    };
    SYMPTOM_SUMMARY_TEMPLATE
        .replace("{condition}", condition)
        .replace("{symptoms}", &symptom_text)
}

pub fn text_response_prompt(statement: &str, condition: &str) -> String {
    TEXT_RESPONSE_TEMPLATE
        .replace("{condition}", condition)
        .replace("{statement}", statement)
}

pub fn emotion_support_prompt(emotion: &str) -> String {
    EMOTION_SUPPORT_TEMPLATE.replace("{emotion}", emotion)
}

pub fn multimodal_response_prompt(statement: &str, status: &str, tone: &str) -> String {
    MULTIMODAL_RESPONSE_TEMPLATE
        .replace("{status}", status)
        .replace("{tone}", tone)
        .replace("{statement}", statement)
}

pub fn chat_prompt(message: &str) -> String {
    CHAT_TEMPLATE.replace("{message}", message)
}
