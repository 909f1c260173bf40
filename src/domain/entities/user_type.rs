use serde::{Deserialize, Serialize};

/// Which side of the marketplace a waitlist signup belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Business,
    Influencer,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Business => "business",
            UserType::Influencer => "influencer",
        }
    }

    pub fn is_business(&self) -> bool {
        matches!(self, UserType::Business)
    }

    pub fn is_influencer(&self) -> bool {
        matches!(self, UserType::Influencer)
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UserType {
    type Err = String;

    /// Exact match only: the stored and submitted values are the lowercase names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "business" => Ok(UserType::Business),
            "influencer" => Ok(UserType::Influencer),
            _ => Err("User type must be either 'business' or 'influencer'.".to_string()),
        }
    }
}
