//! Podcast script model and parsing of generated scripts.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PodcastError;
use crate::presenter::Presenter;

/// One line of dialogue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScriptLine {
    /// Presenter name speaking this line.
    pub speaker: String,
    /// The dialogue text.
    pub line: String,
}

impl ScriptLine {
    pub fn new(speaker: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            line: line.into(),
        }
    }
}

/// A podcast script. Line order is playback order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Script {
    pub title: String,
    #[serde(rename = "script")]
    pub lines: Vec<ScriptLine>,
}

impl Script {
    pub fn new(title: impl Into<String>, lines: Vec<ScriptLine>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }

    /// Distinct speaker names, in order of first appearance.
    pub fn speakers(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.lines
            .iter()
            .map(|l| l.speaker.as_str())
            .filter(|s| seen.insert(*s))
            .collect()
    }

    /// Reject empty scripts, blank lines and speakers outside `presenters`.
    pub fn validate_against(&self, presenters: &[Presenter]) -> Result<(), PodcastError> {
        match self.problem(presenters) {
            Some(problem) => Err(PodcastError::Validation(problem)),
            None => Ok(()),
        }
    }

    fn problem(&self, presenters: &[Presenter]) -> Option<String> {
        if self.lines.is_empty() {
            return Some("script has no lines".to_string());
        }

        self.lines.iter().enumerate().find_map(|(i, line)| {
            if line.line.trim().is_empty() {
                Some(format!("script line {} is empty", i + 1))
            } else if !presenters
                .iter()
                .any(|p| p.name.trim() == line.speaker.trim())
            {
                Some(format!(
                    "script line {} has unknown speaker '{}'",
                    i + 1,
                    line.speaker
                ))
            } else {
                None
            }
        })
    }
}

static REASONING_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(think|thinking|reasoning|reflection|analysis)[^>]*>.*?</(think|thinking|reasoning|reflection|analysis)>")
        .expect("valid reasoning tag pattern")
});

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[a-zA-Z]*\s*(.*?)\s*```$").expect("valid code fence pattern")
});

#[derive(Deserialize)]
struct RawScript {
    title: String,
    #[serde(alias = "lines")]
    script: Vec<ScriptLine>,
}

/// Strip reasoning blocks and a surrounding markdown code fence.
fn strip_wrapping(raw: &str) -> String {
    let without_tags = REASONING_TAGS.replace_all(raw, "");
    let trimmed = without_tags.trim();

    match CODE_FENCE.captures(trimmed) {
        Some(caps) => caps[1].trim().to_string(),
        None => trimmed.to_string(),
    }
}

/// Parse a provider response into a [`Script`].
///
/// The response must be a JSON object `{"title": ..., "script": [{"speaker", "line"}]}`
/// whose speakers are all in `presenters`. Anything else is a
/// [`PodcastError::GenerationFormat`].
pub fn parse_script(raw: &str, presenters: &[Presenter]) -> Result<Script, PodcastError> {
    let body = strip_wrapping(raw);
    if body.is_empty() {
        return Err(PodcastError::GenerationFormat(
            "provider returned an empty response".to_string(),
        ));
    }

    let parsed: RawScript = serde_json::from_str(&body).map_err(|e| {
        PodcastError::GenerationFormat(format!(
            "expected an object with 'title' and 'script': {}",
            e
        ))
    })?;

    let title = parsed.title.trim().to_string();
    if title.is_empty() {
        return Err(PodcastError::GenerationFormat("title is empty".to_string()));
    }

    let lines: Vec<ScriptLine> = parsed
        .script
        .into_iter()
        .map(|l| ScriptLine::new(l.speaker.trim(), l.line.trim()))
        .collect();

    let script = Script::new(title, lines);
    match script.problem(presenters) {
        Some(problem) => Err(PodcastError::GenerationFormat(problem)),
        None => Ok(script),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn presenters() -> Vec<Presenter> {
        vec![
            Presenter::new("Alex", "optimistic"),
            Presenter::new("Sara", "skeptical"),
        ]
    }

    #[test]
    fn test_parse_plain_json() {
        let raw = r#"{"title":"AI Today","script":[
            {"speaker":"Alex","line":"Welcome!"},
            {"speaker":"Sara","line":"Let's see."}]}"#;
        let script = parse_script(raw, &presenters()).unwrap();
        assert_eq!(script.title, "AI Today");
        assert_eq!(script.lines.len(), 2);
        assert_eq!(script.lines[1], ScriptLine::new("Sara", "Let's see."));
    }

    #[test]
    fn test_parse_fenced_json_with_reasoning() {
        let raw = "<think>plan the episode</think>\n```json\n{\"title\":\"T\",\"script\":[{\"speaker\":\"Alex\",\"line\":\"Hi\"}]}\n```";
        let script = parse_script(raw, &presenters()).unwrap();
        assert_eq!(script.title, "T");
        assert_eq!(script.speakers(), vec!["Alex"]);
    }

    #[test]
    fn test_parse_rejects_bare_list() {
        let raw = r#"[{"speaker":"Alex","line":"Hi"}]"#;
        let err = parse_script(raw, &presenters()).unwrap_err();
        assert!(matches!(err, PodcastError::GenerationFormat(_)));
    }

    #[test]
    fn test_parse_rejects_unknown_speaker() {
        let raw = r#"{"title":"T","script":[{"speaker":"Bob","line":"Hi"}]}"#;
        let err = parse_script(raw, &presenters()).unwrap_err();
        assert!(matches!(err, PodcastError::GenerationFormat(msg) if msg.contains("Bob")));
    }

    #[test]
    fn test_parse_error_message_is_not_nested() {
        let raw = r#"{"title":"T","script":[{"speaker":"Bob","line":"Hi"}]}"#;
        let err = parse_script(raw, &presenters()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Generated script has an unexpected format: script line 1 has unknown speaker 'Bob'"
        );
    }

    #[test]
    fn test_padded_presenter_names_match_generated_speakers() {
        let presenters: Vec<Presenter> =
            serde_json::from_str(r#"[{"name":" Alex "},{"name":"Sara"}]"#).unwrap();
        assert!(crate::presenter::validate_presenters(&presenters, 2).is_ok());

        let raw = r#"{"title":"T","script":[
            {"speaker":"Alex","line":"Hi"},
            {"speaker":" Sara ","line":"Hello"}]}"#;
        let script = parse_script(raw, &presenters).unwrap();
        assert_eq!(script.speakers(), vec!["Alex", "Sara"]);
    }

    #[test]
    fn test_parse_rejects_empty_script() {
        let raw = r#"{"title":"T","script":[]}"#;
        assert!(parse_script(raw, &presenters()).is_err());
    }

    #[test]
    fn test_parse_rejects_empty_response() {
        assert!(matches!(
            parse_script("  ", &presenters()),
            Err(PodcastError::GenerationFormat(_))
        ));
    }

    #[test]
    fn test_script_wire_format_uses_script_field() {
        let script = Script::new("T", vec![ScriptLine::new("Alex", "Hi")]);
        let json = serde_json::to_value(&script).unwrap();
        assert_eq!(json["script"][0]["speaker"], "Alex");
        assert!(json.get("lines").is_none());
    }

    #[test]
    fn test_validate_against_blank_line() {
        let script = Script::new("T", vec![ScriptLine::new("Alex", "  ")]);
        assert!(matches!(
            script.validate_against(&presenters()),
            Err(PodcastError::Validation(_))
        ));
    }
}
