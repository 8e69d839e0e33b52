//! Values returned to the player.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Possible answers to a question. Discriminants are the wire values.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOption {
    Yes = 0,
    No = 1,
    DontKnow = 2,
    Probably = 3,
    ProbablyNot = 4,
}

impl AnswerOption {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for AnswerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AnswerOption::Yes => "yes",
            AnswerOption::No => "no",
            AnswerOption::DontKnow => "dont_know",
            AnswerOption::Probably => "probably",
            AnswerOption::ProbablyNot => "probably_not",
        };
        f.write_str(text)
    }
}

impl FromStr for AnswerOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "yes" | "y" | "0" => Ok(AnswerOption::Yes),
            "no" | "n" | "1" => Ok(AnswerOption::No),
            "dont_know" | "idk" | "2" => Ok(AnswerOption::DontKnow),
            "probably" | "3" => Ok(AnswerOption::Probably),
            "probably_not" | "4" => Ok(AnswerOption::ProbablyNot),
            other => Err(format!("unknown answer `{}`", other)),
        }
    }
}

/// The question currently asked by the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub text: String,
    /// Confidence of the server in percent.
    pub progression: f64,
    pub step: u32,
}

/// A character the server proposes or found by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Guess {
    pub id: String,
    pub name: String,
    pub description: String,
    pub photo_path: Option<String>,
    /// Only present in guess lists, not in name searches.
    pub probability: Option<f64>,
}

/// One award of a base's hall of fame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HallOfFameEntry {
    pub award_id: String,
    pub character_name: String,
    pub description: String,
    pub award_type: String,
    pub winner_name: String,
    /// Time the winner took, as published.
    pub delay: String,
    pub position: u32,
}


mod tests {
    use super::*;

    #[test]
    fn test_answer_parsing() {
        assert_eq!("yes".parse(), Ok(AnswerOption::Yes));
        assert_eq!("Probably Not".parse(), Ok(AnswerOption::ProbablyNot));
        assert_eq!("dont-know".parse(), Ok(AnswerOption::DontKnow));
        assert_eq!("3".parse(), Ok(AnswerOption::Probably));
        assert!("maybe".parse::<AnswerOption>().is_err());
        assert_eq!(AnswerOption::ProbablyNot.code(), 4);
    }
}
