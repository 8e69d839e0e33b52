//! Response envelope and parameter payloads.
//!
//! Every game endpoint answers `{"completion": "...", "parameters": {...}}`.
//! Numeric fields arrive as strings on most servers, so they are parsed
//! leniently. The hall of fame is plain XML with no envelope.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use std::fmt::Display;
use std::str::FromStr;

use crate::game::error::{GameError, GameResult};
use crate::game::types::{Guess, HallOfFameEntry, Question};

const COMPLETION_OK: &str = "OK";
const COMPLETION_TIMEOUT: &str = "KO - TIMEOUT";

#[derive(Debug, Deserialize)]
struct Envelope {
    completion: String,
    #[serde(default)]
    parameters: serde_json::Value,
}

/// Check the completion of `body` and decode its parameters.
pub fn parse_parameters<T: DeserializeOwned>(url: &str, body: &str) -> GameResult<T> {
    let envelope: Envelope = serde_json::from_str(body).map_err(|e| GameError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    match envelope.completion.as_str() {
        COMPLETION_OK => {}
        COMPLETION_TIMEOUT => {
            return Err(GameError::Timeout {
                url: url.to_string(),
                response: body.to_string(),
            })
        }
        other => {
            return Err(GameError::Api {
                url: url.to_string(),
                response: body.to_string(),
                description: other.to_string(),
            })
        }
    }

    serde_json::from_value(envelope.parameters).map_err(|e| GameError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Text(String),
    Value(T),
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: Display,
{
    match Lenient::<T>::deserialize(deserializer)? {
        Lenient::Text(text) => text.trim().parse().map_err(de::Error::custom),
        Lenient::Value(value) => Ok(value),
    }
}

fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: Display,
{
    match Option::<Lenient<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Lenient::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Lenient::Text(text)) => text.trim().parse().map(Some).map_err(de::Error::custom),
        Some(Lenient::Value(value)) => Ok(Some(value)),
    }
}

/// Parameters of answer, undo and exclusion responses.
#[derive(Debug, Deserialize)]
pub struct QuestionParameters {
    pub question: String,
    #[serde(deserialize_with = "lenient")]
    pub step: u32,
    #[serde(deserialize_with = "lenient", default)]
    pub progression: f64,
}

impl From<QuestionParameters> for Question {
    fn from(p: QuestionParameters) -> Self {
        Question {
            text: p.question,
            progression: p.progression,
            step: p.step,
        }
    }
}

/// Guess lists carry `id`, searches carry `id_base`; some carry both.
#[derive(Debug, Deserialize)]
struct CharacterElement {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    id_base: Option<String>,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    absolute_picture_path: Option<String>,
    #[serde(default)]
    photo: Option<String>,
    #[serde(rename = "proba", deserialize_with = "lenient_option", default)]
    probability: Option<f64>,
}

impl From<CharacterElement> for Guess {
    fn from(c: CharacterElement) -> Self {
        let photo_path = c
            .absolute_picture_path
            .or(c.photo)
            .filter(|p| !p.is_empty());
        Guess {
            id: c.id.or(c.id_base).unwrap_or_default(),
            name: c.name,
            description: c.description,
            photo_path,
            probability: c.probability,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListedElement {
    element: CharacterElement,
}

/// Parameters of the guess list response.
#[derive(Debug, Deserialize)]
pub struct GuessParameters {
    #[serde(default)]
    elements: Vec<ListedElement>,
}

impl GuessParameters {
    pub fn into_guesses(self) -> Vec<Guess> {
        self.elements.into_iter().map(|e| e.element.into()).collect()
    }
}

/// Parameters of the character search response.
#[derive(Debug, Deserialize)]
pub struct SearchParameters {
    #[serde(default)]
    characters: Vec<CharacterElement>,
}

impl SearchParameters {
    pub fn into_guesses(self) -> Vec<Guess> {
        self.characters.into_iter().map(Guess::from).collect()
    }
}

/// Hall of fame document.
///
/// ```text
/// <RESULT>
///   <AWARDS>
///     <AWARD>
///       <AWARD_ID>..</AWARD_ID> <CHARACTER_NAME>..</CHARACTER_NAME>
///       <DESCRIPTION>..</DESCRIPTION> <TYPE>..</TYPE>
///       <WINNER_NAME>..</WINNER_NAME> <DELAI>..</DELAI> <POS>..</POS>
///     </AWARD>
///   </AWARDS>
/// </RESULT>
/// ```
#[derive(Debug, Default, Deserialize)]
struct HallOfFameDocument {
    #[serde(rename = "AWARDS", default)]
    awards: Option<Awards>,
}

#[derive(Debug, Default, Deserialize)]
struct Awards {
    #[serde(rename = "AWARD", default)]
    awards: Vec<Award>,
}

#[derive(Debug, Deserialize)]
struct Award {
    #[serde(rename = "AWARD_ID", default)]
    award_id: String,
    #[serde(rename = "CHARACTER_NAME", default)]
    character_name: String,
    #[serde(rename = "DESCRIPTION", default)]
    description: String,
    #[serde(rename = "TYPE", default)]
    award_type: String,
    #[serde(rename = "WINNER_NAME", default)]
    winner_name: String,
    #[serde(rename = "DELAI", default)]
    delay: String,
    #[serde(rename = "POS", default)]
    position: String,
}

/// Decode a hall of fame document, in document order.
pub fn parse_hall_of_fame(url: &str, body: &str) -> GameResult<Vec<HallOfFameEntry>> {
    let decode_error = |message: String| GameError::Decode {
        url: url.to_string(),
        message,
    };

    let document: HallOfFameDocument =
        quick_xml::de::from_str(body).map_err(|e| decode_error(e.to_string()))?;

    document
        .awards
        .map(|a| a.awards)
        .unwrap_or_default()
        .into_iter()
        .map(|award| {
            let position = award
                .position
                .trim()
                .parse()
                .map_err(|_| decode_error(format!("invalid award position `{}`", award.position)))?;
            Ok(HallOfFameEntry {
                award_id: award.award_id.trim().to_string(),
                character_name: award.character_name,
                description: award.description,
                award_type: award.award_type,
                winner_name: award.winner_name,
                delay: award.delay,
                position,
            })
        })
        .collect()
}
