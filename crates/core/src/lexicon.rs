//! Phrase lexicon used to recognise attributes in free text.
//!
//! The lexicon is a declarative table of trigger phrases plus a handful of compiled
//! patterns for ages. A single instance is built on first use and shared read-only by
//! every caller for the lifetime of the process.
//!
//! Matching is plain case-insensitive substring search. There is no negation or context
//! handling: "no active infections" still mentions `infections`.

use crate::attributes::{Attribute, DiagnosisLabel};
use regex::Regex;
use std::sync::LazyLock;

/// A trigger rule: if any of `triggers` occurs in a line, `attribute` is mentioned.
///
/// Triggers must be lower case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhraseRule {
    pub triggers: &'static [&'static str],
    pub attribute: Attribute,
}

impl PhraseRule {
    pub fn fires_on(&self, folded: &str) -> bool {
        self.triggers.iter().any(|trigger| folded.contains(trigger))
    }
}

/// Default trigger table. Age is not listed here; it is read by pattern.
pub const PHRASE_RULES: &[PhraseRule] = &[
    PhraseRule {
        triggers: &["informed consent"],
        attribute: Attribute::Consent,
    },
    PhraseRule {
        triggers: &["lung cancer", "ggo"],
        attribute: Attribute::Diagnosis,
    },
    PhraseRule {
        triggers: &["fdg-pet"],
        attribute: Attribute::ScheduledForFdgPet,
    },
    PhraseRule {
        triggers: &["performance status"],
        attribute: Attribute::PerformanceStatus,
    },
    PhraseRule {
        triggers: &["pregnant", "lactating"],
        attribute: Attribute::PregnantOrLactating,
    },
    PhraseRule {
        triggers: &["malignant pleural effusion"],
        attribute: Attribute::MalignantPleuralEffusionOnly,
    },
    PhraseRule {
        triggers: &["irradiation"],
        attribute: Attribute::UndergoingIrradiation,
    },
    PhraseRule {
        triggers: &["infections"],
        attribute: Attribute::ActiveInfection,
    },
    PhraseRule {
        triggers: &["neurological", "psychiatric disorders"],
        attribute: Attribute::NeurologicalOrPsychiatricDisorders,
    },
];

/// Age bound stated by a criterion line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgeBound {
    Range { min: u32, max: u32 },
    Above(u32),
    Below(u32),
}

static SHARED: LazyLock<Lexicon> = LazyLock::new(Lexicon::new);

/// Compiled phrase and pattern tables.
#[derive(Debug)]
pub struct Lexicon {
    rules: &'static [PhraseRule],
    age_range: Regex,
    age_above: Regex,
    age_below: Regex,
    stated_age: Regex,
}

impl Lexicon {
    /// The process-wide lexicon, compiled on first access.
    pub fn shared() -> &'static Lexicon {
        &SHARED
    }

    /// Build a lexicon over the default rule table.
    pub fn new() -> Self {
        Self::with_rules(PHRASE_RULES)
    }

    /// Build a lexicon over a caller-supplied rule table.
    pub(crate) fn with_rules(rules: &'static [PhraseRule]) -> Self {
        tracing::debug!(rules = rules.len(), "compiling phrase lexicon");
        Self {
            rules,
            // Patterns are constants; a failure here is a programming error.
            age_range: Regex::new(r"age\s*(\d+)\s*-\s*(\d+)").expect("age range pattern"),
            age_above: Regex::new(r"age\s*>\s*(\d+)").expect("age lower bound pattern"),
            age_below: Regex::new(r"age\s*<\s*(\d+)").expect("age upper bound pattern"),
            stated_age: Regex::new(r"(\d+)-year-old").expect("stated age pattern"),
        }
    }

    pub fn rules(&self) -> &'static [PhraseRule] {
        self.rules
    }

    /// Attributes whose rules fire on `folded`, in rule-table order.
    ///
    /// `folded` must already be lower case.
    pub fn mentioned<'a>(&'a self, folded: &'a str) -> impl Iterator<Item = Attribute> + 'a {
        self.rules
            .iter()
            .filter(move |rule| rule.fires_on(folded))
            .map(|rule| rule.attribute)
    }

    /// Age bound stated in `folded`.
    ///
    /// A `NN - NN` range wins over `> N`, which wins over `< N`.
    pub fn age_bound(&self, folded: &str) -> Option<AgeBound> {
        if let Some(caps) = self.age_range.captures(folded) {
            if let (Some(min), Some(max)) = (parse_number(&caps[1]), parse_number(&caps[2])) {
                return Some(AgeBound::Range { min, max });
            }
        }
        if let Some(caps) = self.age_above.captures(folded) {
            if let Some(min) = parse_number(&caps[1]) {
                return Some(AgeBound::Above(min));
            }
        }
        if let Some(caps) = self.age_below.captures(folded) {
            if let Some(max) = parse_number(&caps[1]) {
                return Some(AgeBound::Below(max));
            }
        }
        None
    }

    /// Age given in the form `NN-year-old`.
    pub fn stated_age(&self, text: &str) -> Option<u32> {
        self.stated_age
            .captures(text)
            .and_then(|caps| parse_number(&caps[1]))
    }

    /// The form diagnosis label mentioned earliest in `folded`.
    pub fn diagnosis_label(&self, folded: &str) -> Option<DiagnosisLabel> {
        DiagnosisLabel::ALL
            .into_iter()
            .filter_map(|label| folded.find(label.as_str()).map(|at| (at, label)))
            .min_by_key(|(at, _)| *at)
            .map(|(_, label)| label)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}

/// Every ASCII digit in `text` as a single-digit level, in order of appearance.
pub fn digit_levels(text: &str) -> Vec<u8> {
    text.chars()
        .filter_map(|c| c.to_digit(10))
        .map(|digit| digit as u8)
        .collect()
}

fn parse_number(digits: &str) -> Option<u32> {
    match digits.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("ignoring unreadable age {digits:?}: {e}");
            None
        }
    }
}
