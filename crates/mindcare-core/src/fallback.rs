//! Fallback resolver: prefer generated text, otherwise a static supportive template.

use serde::Serialize;

/// Used only if a table's own default renders empty.
const LAST_RESORT: &str =
    "Your mental health matters. Please consider reaching out to a mental health professional for support.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationSource {
    Generated,
    Fallback,
}

/// Text shown to the user next to a prediction. `text` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub text: String,
    pub source: ExplanationSource,
}

/// Label -> pre-written message, with a default for labels not in the table.
/// The default may contain `{label}`, which is replaced with the subject being explained.
#[derive(Debug, Clone, Copy)]
pub struct FallbackTable {
    pub entries: &'static [(&'static str, &'static str)],
    pub default: &'static str,
}

impl FallbackTable {
    /// Template for `label` by exact match, or the interpolated default.
    pub fn template(&self, label: &str) -> String {
        self.template_keyed(label, label)
    }

    /// Template looked up by `key`; the default interpolates `subject` instead.
    pub fn template_keyed(&self, key: &str, subject: &str) -> String {
        let text = match self.entries.iter().find(|(k, _)| *k == key) {
            Some((_, text)) => (*text).to_string(),
            None => self.default.replace("{label}", subject),
        };
        if text.trim().is_empty() {
            LAST_RESORT.to_string()
        } else {
            text
        }
    }

    pub fn resolve(&self, label: &str, generated: Option<String>) -> Explanation {
        self.resolve_keyed(label, label, generated)
    }

    pub fn resolve_keyed(&self, key: &str, subject: &str, generated: Option<String>) -> Explanation {
        match generated.filter(|g| !g.trim().is_empty()) {
            Some(text) => Explanation {
                text,
                source: ExplanationSource::Generated,
            },
            None => {
                tracing::warn!("[FALLBACK] Using template for {:?}", key);
                Explanation {
                    text: self.template_keyed(key, subject),
                    source: ExplanationSource::Fallback,
                }
            }
        }
    }
}

pub const SYMPTOM_FALLBACKS: FallbackTable = FallbackTable {
    entries: &[
        ("Depression", "Depression is a common but serious condition. It's important to reach out for support from friends, family, or a mental health professional. Self-care activities like exercise, good sleep, and social connection can help. Remember, seeking help is a sign of strength."),
        ("Anxiety", "Anxiety disorders are treatable conditions. Consider practicing relaxation techniques like deep breathing or meditation. Regular exercise and maintaining a consistent sleep schedule can help. A mental health professional can provide effective treatments."),
        ("Anxiety Disorder", "Anxiety disorders are treatable conditions. Consider practicing relaxation techniques like deep breathing or meditation. Regular exercise and maintaining a consistent sleep schedule can help. A mental health professional can provide effective treatments."),
        ("Bipolar Disorder", "Bipolar disorder requires professional management for the best outcomes. Maintaining a regular sleep schedule and taking prescribed medications consistently are important. Working with a psychiatrist and therapist can help manage mood episodes effectively."),
        ("Normal", "Your responses suggest you're in a good mental health state. Continue maintaining healthy habits like regular exercise, good sleep, and social connections. Remember, it's always okay to reach out for support if things change."),
        ("Stress", "Stress is a normal response but chronic stress needs attention. Try stress management techniques like exercise, meditation, or talking to someone. If stress persists, consider consulting a mental health professional."),
    ],
    default: "Based on your symptoms, it appears you may have {label}. Please consult with a qualified mental health professional for proper evaluation and treatment. Your mental health matters.",
};

pub const STATUS_FALLBACKS: FallbackTable = FallbackTable {
    entries: &[
        ("Depression", "It sounds like you're going through a difficult time. Depression is treatable, and reaching out for support is an important step. Consider talking to a mental health professional who can help."),
        ("Anxiety", "Anxiety can be overwhelming. Remember that what you're feeling is valid. Consider practicing relaxation techniques and speaking with a therapist who can provide effective coping strategies."),
        ("Sleep Disorder", "Sleep issues can significantly impact your well-being. Try maintaining a consistent sleep schedule and creating a relaxing bedtime routine. If problems persist, consult a healthcare provider."),
        ("Social Anxiety", "Social anxiety is common and manageable. Taking small steps and being kind to yourself is important. A therapist can help you develop strategies to feel more comfortable in social situations."),
        ("Bipolar Disorder", "Mood fluctuations can be challenging. Professional support is important for managing bipolar disorder effectively. Consider reaching out to a psychiatrist who can provide appropriate treatment."),
        ("PTSD", "Trauma can have lasting effects. You deserve support in processing these experiences. A trauma-informed therapist can help you work through what you've been through."),
        ("OCD", "Intrusive thoughts and compulsions can be distressing. OCD is treatable with proper therapy. Consider consulting a mental health professional who specializes in OCD treatment."),
        ("ADHD", "Difficulty focusing is a common experience. ADHD is manageable with the right support and strategies. Consider talking to a healthcare provider about evaluation and treatment options."),
        ("Eating Disorder", "Your relationship with food and body image matters. Eating disorders require specialized treatment. Please reach out to a healthcare provider who can offer appropriate support."),
        ("General Stress", "It's understandable to feel stressed. Remember to take care of yourself through this challenging time. If stress becomes overwhelming, don't hesitate to seek professional support."),
    ],
    default: "Thank you for sharing. Your mental health matters. Consider reaching out to a mental health professional for personalized support and guidance.",
};

/// Keyed by the lowercased analyzer emotion.
pub const EMOTION_FALLBACKS: FallbackTable = FallbackTable {
    entries: &[
        ("happy", "It's wonderful to see you happy! Keep embracing the positive moments. 😊"),
        ("sad", "It's okay to feel sad. Remember, this feeling is temporary and you're not alone. 💙"),
        ("angry", "Take a deep breath. It's natural to feel angry, but you have the strength to work through it. 💪"),
        ("fear", "Feeling fearful is valid. Take things one step at a time, and be kind to yourself. 🌟"),
        ("surprise", "Surprises can be overwhelming! Take a moment to process what you're feeling. ✨"),
        ("neutral", "You seem calm and balanced. This is a great state for reflection. 🧘"),
        ("disgust", "If something is bothering you, it's okay to step away and take care of yourself. 🌿"),
    ],
    default: "You are stronger than you think. Take care of your mental health. ❤️",
};

/// Keyed by text tone; the default interpolates the lowercased status prediction.
pub const TONE_FALLBACKS: FallbackTable = FallbackTable {
    entries: &[
        ("Sad", "It's okay to feel sad. These feelings are valid and temporary. Consider reaching out to someone you trust or a mental health professional."),
        ("Anxious", "Anxiety can feel overwhelming. Try taking slow, deep breaths. If anxiety persists, professional support can provide effective coping strategies."),
        ("Angry", "Anger is a natural emotion. Take a moment to breathe and identify what's causing these feelings. Talking to someone can help process these emotions."),
        ("Stressed", "Stress is a normal response to challenges. Make sure you're taking breaks and practicing self-care. If stress becomes unmanageable, seek support."),
        ("Happy", "It's wonderful that you're feeling positive! Keep nurturing your mental wellbeing through healthy activities and connections."),
        ("Neutral", "You seem balanced right now. Continue with healthy habits and remember that support is available if you need it."),
    ],
    default: "Your emotional state suggests {label}. Taking care of your mental health is important. Consider speaking with a professional for personalized support.",
};

pub const CHAT_FALLBACK: FallbackTable = FallbackTable {
    entries: &[],
    default: "I'm here to listen and support you. How can I help you today?",
};
