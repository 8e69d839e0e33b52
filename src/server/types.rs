//! Server descriptor and the closed code vocabularies of the directory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A code that is not part of a closed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported {kind} code `{code}`")]
pub struct UnknownCode {
    pub kind: &'static str,
    pub code: String,
}

impl UnknownCode {
    fn new(kind: &'static str, code: &str) -> Self {
        Self {
            kind,
            code: code.to_string(),
        }
    }
}

/// Game language. Each language is served by its own set of regional servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Arabic,
    Chinese,
    Dutch,
    English,
    French,
    German,
    Indonesian,
    Israeli,
    Italian,
    Japanese,
    Korean,
    Polski,
    Portuguese,
    Spanish,
    Russian,
    Turkish,
}

impl Language {
    pub const ALL: [Language; 16] = [
        Language::Arabic,
        Language::Chinese,
        Language::Dutch,
        Language::English,
        Language::French,
        Language::German,
        Language::Indonesian,
        Language::Israeli,
        Language::Italian,
        Language::Japanese,
        Language::Korean,
        Language::Polski,
        Language::Portuguese,
        Language::Spanish,
        Language::Russian,
        Language::Turkish,
    ];

    /// Two-letter code used by the directory document.
    pub fn code(self) -> &'static str {
        match self {
            Language::Arabic => "ar",
            Language::Chinese => "cn",
            Language::Dutch => "nl",
            Language::English => "en",
            Language::French => "fr",
            Language::German => "de",
            Language::Indonesian => "id",
            Language::Israeli => "il",
            Language::Italian => "it",
            Language::Japanese => "jp",
            Language::Korean => "kr",
            Language::Polski => "pl",
            Language::Portuguese => "pt",
            Language::Spanish => "es",
            Language::Russian => "ru",
            Language::Turkish => "tr",
        }
    }

    /// Resolve a directory language code.
    pub fn from_code(code: &str) -> Result<Self, UnknownCode> {
        Self::ALL
            .into_iter()
            .find(|language| language.code() == code)
            .ok_or_else(|| UnknownCode::new("language", code))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(&s.to_ascii_lowercase())
    }
}

/// Subject domain of a game server.
///
/// Discriminants are the numeric codes of the directory document, so the
/// derived ordering is the order used when aggregating results.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerType {
    Person = 1,
    Object = 2,
    Place = 7,
    Movie = 13,
    Animal = 14,
}

impl ServerType {
    pub const ALL: [ServerType; 5] = [
        ServerType::Person,
        ServerType::Object,
        ServerType::Place,
        ServerType::Movie,
        ServerType::Animal,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            ServerType::Person => "person",
            ServerType::Object => "object",
            ServerType::Place => "place",
            ServerType::Movie => "movie",
            ServerType::Animal => "animal",
        }
    }

    /// Resolve a directory subject code (`"1"`, `"2"`, `"7"`, `"13"`, `"14"`).
    pub fn from_code(code: &str) -> Result<Self, UnknownCode> {
        let parsed: u8 = code
            .trim()
            .parse()
            .map_err(|_| UnknownCode::new("server type", code))?;
        Self::ALL
            .into_iter()
            .find(|server_type| server_type.code() == parsed)
            .ok_or_else(|| UnknownCode::new("server type", code))
    }
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ServerType {
    type Err = UnknownCode;

    /// Accepts either the numeric code or the lowercase name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|server_type| server_type.name() == lowered)
            .map_or_else(|| Self::from_code(s), Ok)
    }
}

/// One candidate game server for a language/category pairing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerDescriptor {
    pub language: Language,
    pub server_type: ServerType,
    /// Logical base shared by a primary server and its mirrors.
    pub base_id: String,
    pub url: String,
}

impl ServerDescriptor {
    pub fn new(
        language: Language,
        server_type: ServerType,
        base_id: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            language,
            server_type,
            base_id: base_id.into(),
            url: url.into(),
        }
    }
}
