use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Who pays or employs: a business-unit organization number or a
/// natural person's national identity number.
///
/// Equality is structural, so `Organization("1")` and `Person("1")` differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Identity {
    Organization(String),
    Person(String),
}

impl Identity {
    pub fn organization(number: impl Into<String>) -> Self {
        Self::Organization(number.into())
    }

    pub fn person(national_id: impl Into<String>) -> Self {
        Self::Person(national_id.into())
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Organization(number) => write!(f, "org:{number}"),
            Self::Person(id) => write!(f, "person:{id}"),
        }
    }
}

/// Parses the tagged text form used in flat files: `org:<number>` or
/// `person:<national id>`.
impl FromStr for Identity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tag, value) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("identity '{s}' must be tagged 'org:' or 'person:'"))?;
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("identity '{s}' has an empty value"));
        }
        match tag {
            "org" => Ok(Self::Organization(value.into())),
            "person" => Ok(Self::Person(value.into())),
            other => Err(format!("unknown identity tag '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_includes_variant() {
        assert_ne!(Identity::organization("1"), Identity::person("1"));
        assert_eq!(Identity::organization("973861778"), Identity::organization("973861778"));
    }

    #[test]
    fn parse_tagged_text() {
        assert_eq!("org:973861778".parse::<Identity>().unwrap(), Identity::organization("973861778"));
        assert_eq!(" person:01017012345 ".parse::<Identity>().unwrap(), Identity::person("01017012345"));
        assert!("973861778".parse::<Identity>().is_err());
        assert!("org:".parse::<Identity>().is_err());
        assert!("firm:1".parse::<Identity>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let id = Identity::person("01017012345");
        assert_eq!(id.to_string().parse::<Identity>().unwrap(), id);
    }

    #[test]
    fn json_shape() {
        let json = serde_json::to_string(&Identity::organization("1")).unwrap();
        assert_eq!(json, r#"{"organization":"1"}"#);
    }
}
