use std::fmt;

use serde::{Deserialize, Serialize};

use super::{text_value, FieldValues};

pub const MAX_AGE: u8 = 120;

pub const DEVELOPMENTAL_HISTORY: &str = "historia_desarrollo";
pub const CHILD_BEHAVIOR: &str = "conducta_nino";
pub const SCHOOL_HISTORY: &str = "historia_escolar";

/// Age bands driving which narrative fields an intake collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    /// Under 6.
    EarlyChildhood,
    /// 6 to 11.
    Childhood,
    /// 12 to 17.
    Adolescence,
    /// 18 and over.
    Adult,
}

impl AgeGroup {
    pub fn from_age(age: u8) -> Self {
        match age {
            0..=5 => AgeGroup::EarlyChildhood,
            6..=11 => AgeGroup::Childhood,
            12..=17 => AgeGroup::Adolescence,
            _ => AgeGroup::Adult,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::EarlyChildhood => "Primera Infancia",
            AgeGroup::Childhood => "Niñez",
            AgeGroup::Adolescence => "Adolescencia",
            AgeGroup::Adult => "Adulto",
        }
    }

    pub fn is_minor(self) -> bool {
        !matches!(self, AgeGroup::Adult)
    }

    /// Mood and anxiety screening is only asked from age 12.
    pub fn takes_screening(self) -> bool {
        matches!(self, AgeGroup::Adolescence | AgeGroup::Adult)
    }

    /// Narrative field keys collected for this band, in display order.
    pub fn narrative_keys(self) -> &'static [&'static str] {
        match self {
            AgeGroup::EarlyChildhood => &[DEVELOPMENTAL_HISTORY],
            AgeGroup::Childhood => &[CHILD_BEHAVIOR, SCHOOL_HISTORY],
            AgeGroup::Adolescence => &[SCHOOL_HISTORY],
            AgeGroup::Adult => &[],
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Band-specific narrative; each variant carries only the fields its band asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeNarrative {
    EarlyChildhood { developmental_history: String },
    Childhood { behavior: String, school_history: String },
    Adolescence { school_history: String },
    Adult,
}

impl AgeNarrative {
    pub fn from_fields(group: AgeGroup, values: &FieldValues) -> Self {
        match group {
            AgeGroup::EarlyChildhood => AgeNarrative::EarlyChildhood {
                developmental_history: text_value(values, DEVELOPMENTAL_HISTORY),
            },
            AgeGroup::Childhood => AgeNarrative::Childhood {
                behavior: text_value(values, CHILD_BEHAVIOR),
                school_history: text_value(values, SCHOOL_HISTORY),
            },
            AgeGroup::Adolescence => AgeNarrative::Adolescence {
                school_history: text_value(values, SCHOOL_HISTORY),
            },
            AgeGroup::Adult => AgeNarrative::Adult,
        }
    }

    pub fn group(&self) -> AgeGroup {
        match self {
            AgeNarrative::EarlyChildhood { .. } => AgeGroup::EarlyChildhood,
            AgeNarrative::Childhood { .. } => AgeGroup::Childhood,
            AgeNarrative::Adolescence { .. } => AgeGroup::Adolescence,
            AgeNarrative::Adult => AgeGroup::Adult,
        }
    }

    pub fn developmental_history(&self) -> Option<&str> {
        match self {
            AgeNarrative::EarlyChildhood {
                developmental_history,
            } => Some(developmental_history),
            _ => None,
        }
    }

    pub fn behavior(&self) -> Option<&str> {
        match self {
            AgeNarrative::Childhood { behavior, .. } => Some(behavior),
            _ => None,
        }
    }

    pub fn school_history(&self) -> Option<&str> {
        match self {
            AgeNarrative::Childhood { school_history, .. }
            | AgeNarrative::Adolescence { school_history } => Some(school_history),
            _ => None,
        }
    }
}
