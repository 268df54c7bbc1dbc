//! Player-facing advisory messages emitted alongside adjustments.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::policy::Decision;

/// Supported message locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    /// Brazilian Portuguese
    Pt,
}

impl Locale {
    pub const ALL: [Self; 2] = [Self::En, Self::Pt];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Pt => "pt",
        }
    }

    /// Resolve a locale code such as `en`, `pt` or `pt-BR`.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code.split(['-', '_']).next().unwrap_or_default();
        Self::ALL
            .into_iter()
            .find(|locale| locale.code().eq_ignore_ascii_case(primary))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Advisory shown to the player for a few seconds after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Advisory {
    DifficultyIncreased,
    DifficultyAdjusted,
    IdealZone,
    BreakSuggested,
}

impl Advisory {
    #[must_use]
    pub const fn for_decision(decision: Decision) -> Self {
        match decision {
            Decision::Increase => Self::DifficultyIncreased,
            Decision::Decrease => Self::DifficultyAdjusted,
            Decision::Maintain => Self::IdealZone,
        }
    }

    /// Get i18n key for hosts that ship their own translations
    #[must_use]
    pub const fn i18n_key(self) -> &'static str {
        match self {
            Self::DifficultyIncreased => "adaptive.advisory.increased",
            Self::DifficultyAdjusted => "adaptive.advisory.adjusted",
            Self::IdealZone => "adaptive.advisory.ideal-zone",
            Self::BreakSuggested => "cascade.advisory.break",
        }
    }

    #[must_use]
    pub const fn message(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::DifficultyIncreased, Locale::En) => "📈 Difficulty increased! You're doing great!",
            (Self::DifficultyIncreased, Locale::Pt) => {
                "📈 Dificuldade aumentada! Você está indo muito bem!"
            }
            (Self::DifficultyAdjusted, Locale::En) => "📉 Difficulty adjusted for a better experience",
            (Self::DifficultyAdjusted, Locale::Pt) => "📉 Dificuldade ajustada para melhor experiência",
            (Self::IdealZone, Locale::En) => "✅ You're in the ideal learning zone!",
            (Self::IdealZone, Locale::Pt) => "✅ Você está na zona ideal de aprendizado!",
            (Self::BreakSuggested, Locale::En) => "Offer a 30-second break",
            (Self::BreakSuggested, Locale::Pt) => "Oferecer pausa de 30 segundos",
        }
    }
}
