use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// The closed set of alternative phrasings the comparison produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariationKind {
    Concise,
    Detailed,
    Structured,
}

impl VariationKind {
    pub const ALL: [VariationKind; 3] = [
        VariationKind::Concise,
        VariationKind::Detailed,
        VariationKind::Structured,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VariationKind::Concise => "concise",
            VariationKind::Detailed => "detailed",
            VariationKind::Structured => "structured",
        }
    }

    /// Card heading before any model annotation.
    pub fn base_label(self) -> &'static str {
        match self {
            VariationKind::Concise => "Concise",
            VariationKind::Detailed => "Detailed",
            VariationKind::Structured => "Structured",
        }
    }
}

impl fmt::Display for VariationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concise" => Ok(VariationKind::Concise),
            "detailed" => Ok(VariationKind::Detailed),
            "structured" => Ok(VariationKind::Structured),
            other => Err(format!("unknown variation '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct VariationQuality {
    pub overall: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Variation {
    pub text: String,
    /// Character count as reported by the service.
    pub length: usize,
    pub quality: VariationQuality,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Variations {
    pub concise: Variation,
    pub detailed: Variation,
    pub structured: Variation,
}

impl Variations {
    pub fn get(&self, kind: VariationKind) -> &Variation {
        match kind {
            VariationKind::Concise => &self.concise,
            VariationKind::Detailed => &self.detailed,
            VariationKind::Structured => &self.structured,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Recommendation {
    pub best_variation: VariationKind,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VariationSet {
    pub variations: Variations,
    pub recommendation: Recommendation,
}
