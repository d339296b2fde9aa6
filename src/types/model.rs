use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Represents an Anthropic model identifier.
///
/// This can be a predefined model version or a custom string value
/// for models that may be added in the future.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Known model versions
    Known(KnownModel),

    /// Custom model identifier (for future models or private models)
    Custom(String),
}

/// Known Anthropic model versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KnownModel {
    /// Claude 3.7 Sonnet (latest version)
    Claude37SonnetLatest,

    /// Claude 3.5 Sonnet (latest version)
    Claude35SonnetLatest,

    /// Claude 3.5 Sonnet (2024-10-22 version)
    Claude35Sonnet20241022,

    /// Claude 3.5 Haiku (latest version)
    Claude35HaikuLatest,

    /// Claude 3.5 Haiku (2024-10-22 version)
    Claude35Haiku20241022,

    /// Claude 3 Opus (latest version)
    Claude3OpusLatest,

    /// Claude 3 Haiku (2024-03-07 version)
    Claude3Haiku20240307,
}

impl Model {
    /// The model used when none is specified on the command line.
    pub fn default_model() -> Self {
        Model::Known(KnownModel::Claude35SonnetLatest)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::default_model()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Known(known_model) => write!(f, "{}", known_model),
            Model::Custom(custom) => write!(f, "{}", custom),
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnownModel::Claude37SonnetLatest => write!(f, "claude-3-7-sonnet-latest"),
            KnownModel::Claude35SonnetLatest => write!(f, "claude-3-5-sonnet-latest"),
            KnownModel::Claude35Sonnet20241022 => write!(f, "claude-3-5-sonnet-20241022"),
            KnownModel::Claude35HaikuLatest => write!(f, "claude-3-5-haiku-latest"),
            KnownModel::Claude35Haiku20241022 => write!(f, "claude-3-5-haiku-20241022"),
            KnownModel::Claude3OpusLatest => write!(f, "claude-3-opus-latest"),
            KnownModel::Claude3Haiku20240307 => write!(f, "claude-3-haiku-20240307"),
        }
    }
}

impl FromStr for Model {
    type Err = std::convert::Infallible;

    /// Parse a model identifier. Unrecognized names become `Model::Custom`,
    /// so this never fails.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let model = match s {
            "claude-3-7-sonnet-latest" => Model::Known(KnownModel::Claude37SonnetLatest),
            "claude-3-5-sonnet-latest" => Model::Known(KnownModel::Claude35SonnetLatest),
            "claude-3-5-sonnet-20241022" => Model::Known(KnownModel::Claude35Sonnet20241022),
            "claude-3-5-haiku-latest" => Model::Known(KnownModel::Claude35HaikuLatest),
            "claude-3-5-haiku-20241022" => Model::Known(KnownModel::Claude35Haiku20241022),
            "claude-3-opus-latest" => Model::Known(KnownModel::Claude3OpusLatest),
            "claude-3-haiku-20240307" => Model::Known(KnownModel::Claude3Haiku20240307),
            other => Model::Custom(other.to_string()),
        };
        Ok(model)
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        model.parse().unwrap_or(Model::Custom(model))
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        Model::from(model.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_serialization() {
        let model = Model::Known(KnownModel::Claude35SonnetLatest);
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#""claude-3-5-sonnet-latest""#);
    }

    #[test]
    fn custom_model_serialization() {
        let model = Model::Custom("claude-experimental".to_string());
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#""claude-experimental""#);
    }

    #[test]
    fn parse_round_trips_through_display() {
        for name in [
            "claude-3-7-sonnet-latest",
            "claude-3-5-sonnet-latest",
            "claude-3-5-haiku-20241022",
            "claude-3-opus-latest",
        ] {
            let model: Model = name.parse().unwrap();
            assert!(matches!(model, Model::Known(_)));
            assert_eq!(model.to_string(), name);
        }
    }

    #[test]
    fn parse_unknown_becomes_custom() {
        let model: Model = "claude-next".parse().unwrap();
        assert_eq!(model, Model::Custom("claude-next".to_string()));
        assert_eq!(model.to_string(), "claude-next");
    }
}
