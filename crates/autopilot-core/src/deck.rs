//! Extract the ordered action list from a remark-style markdown deck.
//!
//! Slides are separated by `--` / `---` lines. Runnable snippets are the
//! triple-backtick blocks inside `.exercise[ ... ]` sections. The first word
//! (or first line, for multi-line blocks) of a snippet is its method.

use crate::action::Action;
use crate::error::{AutopilotError, Result};
use crate::types::Method;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

const FENCE: &str = "```";

static SLIDE_SEPARATOR_RE: OnceLock<Regex> = OnceLock::new();

fn slide_separator() -> &'static Regex {
    SLIDE_SEPARATOR_RE.get_or_init(|| Regex::new(r"\n---?\n").unwrap())
}

static SPEAKER_NOTES_RE: OnceLock<Regex> = OnceLock::new();

fn speaker_notes() -> &'static Regex {
    SPEAKER_NOTES_RE.get_or_init(|| Regex::new(r"\n\?\?\?\n").unwrap())
}

static EXCLUDED_CLASSES_RE: OnceLock<Regex> = OnceLock::new();

fn excluded_classes_re() -> &'static Regex {
    EXCLUDED_CLASSES_RE.get_or_init(|| Regex::new(r"excludedClasses: (\[.*\])").unwrap())
}

static CLASS_RE: OnceLock<Regex> = OnceLock::new();

fn class_re() -> &'static Regex {
    CLASS_RE.get_or_init(|| Regex::new(r"class: (.*)").unwrap())
}

static EXERCISE_RE: OnceLock<Regex> = OnceLock::new();

fn exercise_re() -> &'static Regex {
    EXERCISE_RE.get_or_init(|| Regex::new(r"(?s)\.exercise\[(.*)\]").unwrap())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    pub number: u32,
    /// Slide markdown with speaker notes removed.
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct Deck {
    pub slides: Vec<Slide>,
    pub actions: Vec<Action>,
}

impl Deck {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let excluded = excluded_classes(content)?;
        let mut deck = Deck::default();

        for chunk in slide_separator().split(content) {
            let classes = slide_classes(chunk);
            if classes.iter().any(|c| excluded.contains(c)) {
                tracing::debug!(classes = ?classes, "skipping excluded slide");
                continue;
            }

            let number = deck.slides.len() as u32 + 1;
            let body = speaker_notes()
                .split(chunk)
                .next()
                .unwrap_or_default()
                .to_string();

            for (index, snippet) in snippets(number, &body).into_iter().enumerate() {
                let (method, payload) = split_method(number, snippet)?;
                deck.actions.push(Action {
                    slide: number,
                    snippet: index,
                    method,
                    payload: payload.to_string(),
                    source: snippet.to_string(),
                });
            }

            deck.slides.push(Slide {
                number,
                content: body,
            });
        }

        Ok(deck)
    }

    pub fn slide(&self, number: u32) -> Option<&Slide> {
        number
            .checked_sub(1)
            .and_then(|i| self.slides.get(i as usize))
    }
}

/// Classes listed in the deck's `excludedClasses: [...]` setting.
fn excluded_classes(content: &str) -> Result<HashSet<String>> {
    let Some(caps) = excluded_classes_re().captures(content) else {
        return Ok(HashSet::new());
    };
    let list: Vec<String> =
        serde_yaml::from_str(&caps[1]).map_err(|e| AutopilotError::Deck {
            slide: 0,
            reason: format!("unreadable excludedClasses {}: {e}", &caps[1]),
        })?;
    Ok(list.into_iter().collect())
}

fn slide_classes(chunk: &str) -> Vec<String> {
    class_re()
        .captures(chunk)
        .map(|caps| {
            caps[1]
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn snippets(number: u32, body: &str) -> Vec<&str> {
    let mut found = Vec::new();
    for caps in exercise_re().captures_iter(body) {
        let Some(exercise) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if exercise.contains(FENCE) {
            found.extend(exercise.split(FENCE).skip(1).step_by(2));
        } else {
            tracing::warn!(slide = number, "exercise does not have any ``` snippet");
            tracing::debug!(slide = number, content = body, "slide without snippet");
        }
    }
    found
}

/// Multi-line snippets carry the method alone on the first line; single-line
/// snippets have the payload right after the method.
fn split_method(number: u32, snippet: &str) -> Result<(Method, &str)> {
    let split = if snippet.contains('\n') {
        snippet.split_once('\n')
    } else {
        snippet.split_once(' ')
    };
    match split {
        Some((method, payload)) => Ok((Method::parse(method), payload)),
        None => Err(AutopilotError::Deck {
            slide: number,
            reason: format!("snippet {snippet:?} has no payload after its method"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECK: &str = r#"name: title
excludedClasses: ["self-paced", "extra-details"]

# Container training
---

## Getting started

.exercise[

- Check the version:
  ```bash docker version```

- Run a container:
  ```bash
  docker run -d
    nginx
  ```

- Wait for it:
  ```wait Running```

]

???

Speaker notes ```bash rm -rf /```
---

class: extra-details

## Skipped

.exercise[
```bash never```
]
--

## Keys

.exercise[
```keys ^C```
]
"#;

    #[test]
    fn parses_actions_in_order() {
        let deck = Deck::parse(DECK).unwrap();
        let methods: Vec<&str> = deck.actions.iter().map(|a| a.method.as_str()).collect();
        assert_eq!(methods, vec!["bash", "bash", "wait", "keys"]);
        assert_eq!(deck.actions[0].payload, "docker version");
        assert_eq!(deck.actions[2].payload, "Running");
        assert_eq!(deck.actions[3].payload, "^C");
    }

    #[test]
    fn multi_line_snippet_keeps_body() {
        let deck = Deck::parse(DECK).unwrap();
        let run = &deck.actions[1];
        assert_eq!(run.method, Method::Bash);
        assert!(run.payload.contains("docker run -d\n    nginx"));
        assert_eq!(run.snippet, 1);
        assert!(run.source.starts_with("bash\n"));
    }

    #[test]
    fn excluded_slides_are_not_numbered() {
        let deck = Deck::parse(DECK).unwrap();
        assert_eq!(deck.slides.len(), 3);
        assert_eq!(deck.actions[0].slide, 2);
        assert_eq!(deck.actions[3].slide, 3);
        assert!(deck.slide(3).unwrap().content.contains("## Keys"));
        assert!(deck.slide(0).is_none());
    }

    #[test]
    fn speaker_notes_are_dropped() {
        let deck = Deck::parse(DECK).unwrap();
        assert!(deck.actions.iter().all(|a| !a.payload.contains("rm -rf")));
        assert!(!deck.slide(2).unwrap().content.contains("Speaker notes"));
    }

    #[test]
    fn exercise_without_snippet_is_skipped() {
        let deck = Deck::parse("# One\n.exercise[\n- just read this\n]\n").unwrap();
        assert_eq!(deck.slides.len(), 1);
        assert!(deck.actions.is_empty());
    }

    #[test]
    fn snippet_without_payload_is_an_error() {
        let err = Deck::parse("# One\n.exercise[\n```bash```\n]\n").unwrap_err();
        assert!(matches!(err, AutopilotError::Deck { slide: 1, .. }));
    }

    #[test]
    fn unknown_method_is_preserved() {
        let deck = Deck::parse(".exercise[\n```zsh echo hi```\n]").unwrap();
        assert_eq!(deck.actions[0].method, Method::Other("zsh".to_string()));
    }
}
