//! PHQ-2 / GAD-2 style screening: two Likert items (0–3) per scale, summed
//! into a 0–6 total.

use serde::{Deserialize, Serialize};

use super::{FieldValues, ValidationErrors};

pub const LIKERT_LABELS: [&str; 4] = [
    "0 - Nunca",
    "1 - Varios días",
    "2 - Más de la mitad de los días",
    "3 - Casi todos los días",
];

pub const PHQ2_INTEREST: &str = "phq2_interes";
pub const PHQ2_MOOD: &str = "phq2_animo";
pub const GAD2_NERVES: &str = "gad2_nervios";
pub const GAD2_WORRY: &str = "gad2_preocupacion";

/// Field keys and questions, mood items first.
pub const SCREENING_ITEMS: [(&str, &str); 4] = [
    (PHQ2_INTEREST, "Poco interés o placer en hacer las cosas"),
    (PHQ2_MOOD, "Sentirse decaído/a, deprimido/a o sin esperanza"),
    (GAD2_NERVES, "Sentirse nervioso/a, ansioso/a o con los nervios de punta"),
    (GAD2_WORRY, "No poder dejar de preocuparse o controlar la preocupación"),
];

/// One answer on the 0..=3 frequency scale. Deserialization goes through
/// [`LikertItem::new`], so no instance holds a value above [`LikertItem::MAX`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct LikertItem(u8);

impl TryFrom<u8> for LikertItem {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("Likert answer {value} is above {}", Self::MAX))
    }
}

impl From<LikertItem> for u8 {
    fn from(item: LikertItem) -> Self {
        item.0
    }
}

impl LikertItem {
    pub const MAX: u8 = 3;

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    /// Accepts either a bare digit or one of [`LIKERT_LABELS`].
    pub fn from_label(label: &str) -> Option<Self> {
        label
            .split_whitespace()
            .next()?
            .parse::<u8>()
            .ok()
            .and_then(Self::new)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        LIKERT_LABELS[self.0 as usize]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningPair {
    pub first: LikertItem,
    pub second: LikertItem,
}

impl ScreeningPair {
    pub fn new(first: LikertItem, second: LikertItem) -> Self {
        Self { first, second }
    }

    pub fn total(&self) -> u8 {
        self.first.value() + self.second.value()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screening {
    /// PHQ-2.
    pub mood: ScreeningPair,
    /// GAD-2.
    pub anxiety: ScreeningPair,
}

impl Screening {
    /// Reads the four items; unanswered items count as zero.
    pub fn from_fields(values: &FieldValues) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let mut items = [LikertItem::default(); 4];
        for (slot, (key, question)) in items.iter_mut().zip(SCREENING_ITEMS) {
            match values.get(key).map(|raw| raw.trim()) {
                None | Some("") => {}
                Some(raw) => match LikertItem::from_label(raw) {
                    Some(item) => *slot = item,
                    None => errors.push(format!("Respuesta fuera de rango (0 a 3): {question}.")),
                },
            }
        }
        errors.into_result(Self {
            mood: ScreeningPair::new(items[0], items[1]),
            anxiety: ScreeningPair::new(items[2], items[3]),
        })
    }

    pub fn mood_total(&self) -> u8 {
        self.mood.total()
    }

    pub fn anxiety_total(&self) -> u8 {
        self.anxiety.total()
    }
}
