//! AI categorization: external classifier call + merge-back.
//!
//! The classifier is a best-effort enrichment, never a blocking requirement.
//! Every failure mode (missing key, HTTP error, malformed response) degrades
//! to an empty mapping, which makes the merge step a no-op.

use crate::model::Bookmark;
use crate::settings;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Apply a partial id -> category mapping onto the collection.
///
/// Bookmarks with an entry get the mapped category; everything else is left
/// untouched. Ids in the mapping that don't exist in the collection are
/// silently ignored. Never removes or reorders bookmarks; an empty mapping
/// is the identity.
pub fn merge_categories(bookmarks: &mut [Bookmark], mapping: &HashMap<String, String>) {
    if mapping.is_empty() {
        return;
    }
    for bookmark in bookmarks.iter_mut() {
        if let Some(category) = mapping.get(&bookmark.id) {
            bookmark.category = category.clone();
        }
    }
}

/// Classifier configuration. The sample bound is a policy value, not a
/// hardcoded constant, so callers can compose multiple batches later without
/// changing the contract.
#[derive(Debug, Clone)]
pub struct ClassifierOptions {
    pub model: String,
    pub batch_size: usize,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            model: settings::get_classifier_model(),
            batch_size: settings::get_classifier_batch_size(),
        }
    }
}

/// The slice of a bookmark the classifier sees.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationSample {
    pub id: String,
    pub title: String,
    pub url: String,
}

/// Truncate the collection to at most `batch_size` samples for one
/// classification call. The external service is not expected to classify the
/// whole collection in one request.
pub fn sample_for_classification(bookmarks: &[Bookmark], batch_size: usize) -> Vec<ClassificationSample> {
    bookmarks
        .iter()
        .take(batch_size)
        .map(|b| ClassificationSample {
            id: b.id.clone(),
            title: b.title.clone(),
            url: b.url.clone(),
        })
        .collect()
}

// Gemini generateContent wire format

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

/// Gemini-backed bookmark classifier.
pub struct Classifier {
    options: ClassifierOptions,
}

impl Classifier {
    pub fn new(options: ClassifierOptions) -> Self {
        Self { options }
    }

    pub fn batch_size(&self) -> usize {
        self.options.batch_size
    }

    /// Classify a bookmark sample into short high-level categories.
    ///
    /// Returns a partial id -> category mapping. On any failure the mapping
    /// is empty; this never raises to the caller.
    pub async fn classify(&self, sample: &[ClassificationSample]) -> HashMap<String, String> {
        if sample.is_empty() {
            return HashMap::new();
        }

        let api_key = match settings::get_api_key() {
            Some(key) => key,
            None => {
                eprintln!("[Classify] Gemini API key missing, skipping categorization");
                return HashMap::new();
            }
        };

        match self.request_categories(&api_key, sample).await {
            Ok(mapping) => {
                println!("[Classify] {} of {} bookmarks categorized", mapping.len(), sample.len());
                mapping
            }
            Err(e) => {
                eprintln!("[Classify] categorization failed: {}", e);
                HashMap::new()
            }
        }
    }

    async fn request_categories(
        &self,
        api_key: &str,
        sample: &[ClassificationSample],
    ) -> Result<HashMap<String, String>, String> {
        let sample_json = serde_json::to_string(sample)
            .map_err(|e| format!("Failed to serialize sample: {}", e))?;

        let prompt = format!(
            r#"You are an expert bookmark organizer. Analyze the following list of bookmarks and assign a single, short, 1-word or 2-word high-level category to each one (e.g., 'Development', 'News', 'Shopping', 'Social', 'Design').

Return JSON of the shape {{"categorization":[{{"id":"...","category":"..."}}]}}.

Bookmarks to process:
{}"#,
            sample_json
        );

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.options.model
        );

        let client = reqwest::Client::new();
        let response = client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("API error {}: {}", status, body));
        }

        let api_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e))?;

        let text = api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();

        Ok(parse_classification(&text))
    }
}

/// Parse the classifier's JSON payload into an id -> category mapping.
///
/// Defensively checks the expected shape before use: anything unexpected
/// (non-JSON, wrong shape, entries missing fields) contributes nothing.
pub fn parse_classification(text: &str) -> HashMap<String, String> {
    // Handle potential markdown fencing around the JSON
    let json_text = if text.trim_start().starts_with("```") {
        text.lines()
            .skip(1)
            .take_while(|l| !l.starts_with("```"))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        text.to_string()
    };

    let mut mapping = HashMap::new();

    let Ok(json) = serde_json::from_str::<serde_json::Value>(&json_text) else {
        return mapping;
    };

    if let Some(entries) = json.get("categorization").and_then(|v| v.as_array()) {
        for entry in entries {
            let id = entry.get("id").and_then(|v| v.as_str());
            let category = entry.get("category").and_then(|v| v.as_str());
            if let (Some(id), Some(category)) = (id, category) {
                if !id.is_empty() && !category.is_empty() {
                    mapping.insert(id.to_string(), category.to_string());
                }
            }
        }
    }

    mapping
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bookmark(id: &str, category: &str) -> Bookmark {
        Bookmark {
            id: id.to_string(),
            title: format!("title-{}", id),
            url: format!("https://example.com/{}", id),
            date_added: None,
            category: category.to_string(),
            parent_id: None,
        }
    }

    #[test]
    fn test_merge_updates_only_mapped_ids() {
        let mut bookmarks = vec![bookmark("1", "General"), bookmark("2", "General"), bookmark("3", "General")];
        let before_2 = bookmarks[1].clone();

        let mut mapping = HashMap::new();
        mapping.insert("3".to_string(), "AI".to_string());
        merge_categories(&mut bookmarks, &mapping);

        assert_eq!(bookmarks[2].category, "AI");
        assert_eq!(bookmarks[0].category, "General");
        assert_eq!(bookmarks[1], before_2);
        assert_eq!(bookmarks.len(), 3);
    }

    #[test]
    fn test_merge_empty_mapping_is_identity() {
        let mut bookmarks = vec![bookmark("1", "Design"), bookmark("2", "News")];
        let before = bookmarks.clone();
        merge_categories(&mut bookmarks, &HashMap::new());
        assert_eq!(bookmarks, before);
    }

    #[test]
    fn test_merge_ignores_unknown_ids() {
        let mut bookmarks = vec![bookmark("1", "Design")];
        let mut mapping = HashMap::new();
        mapping.insert("999".to_string(), "Shopping".to_string());
        merge_categories(&mut bookmarks, &mapping);
        assert_eq!(bookmarks[0].category, "Design");
    }

    #[test]
    fn test_sample_truncates_to_batch_size() {
        let bookmarks: Vec<Bookmark> = (0..80).map(|i| bookmark(&i.to_string(), "General")).collect();
        let sample = sample_for_classification(&bookmarks, 50);
        assert_eq!(sample.len(), 50);
        assert_eq!(sample[0].id, "0");
        assert_eq!(sample[49].id, "49");
    }

    #[test]
    fn test_sample_of_small_collection() {
        let bookmarks = vec![bookmark("1", "General")];
        assert_eq!(sample_for_classification(&bookmarks, 50).len(), 1);
    }

    #[test]
    fn test_parse_classification_happy_path() {
        let text = r#"{"categorization":[{"id":"1","category":"Development"},{"id":"2","category":"News"}]}"#;
        let mapping = parse_classification(text);
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping["1"], "Development");
        assert_eq!(mapping["2"], "News");
    }

    #[test]
    fn test_parse_classification_markdown_fenced() {
        let text = "```json\n{\"categorization\":[{\"id\":\"1\",\"category\":\"AI\"}]}\n```";
        let mapping = parse_classification(text);
        assert_eq!(mapping["1"], "AI");
    }

    #[test]
    fn test_parse_classification_malformed() {
        assert!(parse_classification("not json at all").is_empty());
        assert!(parse_classification("{}").is_empty());
        assert!(parse_classification(r#"{"categorization": "wrong shape"}"#).is_empty());
        // Entries missing fields contribute nothing
        let partial = r#"{"categorization":[{"id":"1"},{"category":"News"},{"id":"2","category":"AI"}]}"#;
        let mapping = parse_classification(partial);
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping["2"], "AI");
    }
}
