//! Split an eligibility statement into inclusion and exclusion lines.

use super::Category;
use crate::constants::{EXCLUSION_HEADER, INCLUSION_HEADER};
use ctm_types::CriterionText;
use serde::Serialize;

/// Criterion lines grouped by section, in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EligibilityCriteria {
    pub inclusion: Vec<CriterionText>,
    pub exclusion: Vec<CriterionText>,
}

impl EligibilityCriteria {
    pub fn lines(&self, category: Category) -> &[CriterionText] {
        match category {
            Category::Inclusion => &self.inclusion,
            Category::Exclusion => &self.exclusion,
        }
    }

    fn lines_mut(&mut self, category: Category) -> &mut Vec<CriterionText> {
        match category {
            Category::Inclusion => &mut self.inclusion,
            Category::Exclusion => &mut self.exclusion,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inclusion.is_empty() && self.exclusion.is_empty()
    }
}

/// Split `text` into inclusion and exclusion criteria.
///
/// A line containing "inclusion criteria" or "exclusion criteria" (any case) opens that
/// section and is itself dropped. Non-blank lines are trimmed and appended to the open
/// section; lines before the first header are ignored. Text without headers yields two
/// empty lists.
pub fn split_criteria(text: &str) -> EligibilityCriteria {
    let mut criteria = EligibilityCriteria::default();
    let mut section: Option<Category> = None;

    for line in text.lines() {
        let folded = line.to_lowercase();
        if folded.contains(INCLUSION_HEADER) {
            section = Some(Category::Inclusion);
            continue;
        }
        if folded.contains(EXCLUSION_HEADER) {
            section = Some(Category::Exclusion);
            continue;
        }

        let Some(category) = section else {
            continue;
        };
        if let Ok(criterion) = CriterionText::new(line) {
            criteria.lines_mut(category).push(criterion);
        }
    }

    if section.is_none() && !text.trim().is_empty() {
        tracing::debug!("no inclusion/exclusion headers found in criteria text");
    }

    criteria
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[CriterionText]) -> Vec<&str> {
        lines.iter().map(CriterionText::as_str).collect()
    }

    #[test]
    fn splits_sections_in_order() {
        let text = "\
Inclusion Criteria:
    Age > 20 years

    Informed consent obtained
    Performance status: 0, 1, 2, 3
Exclusion Criteria:
    Undergoing irradiation at accrual
    Pregnant
";
        let criteria = split_criteria(text);
        assert_eq!(
            texts(&criteria.inclusion),
            vec![
                "Age > 20 years",
                "Informed consent obtained",
                "Performance status: 0, 1, 2, 3"
            ]
        );
        assert_eq!(
            texts(&criteria.exclusion),
            vec!["Undergoing irradiation at accrual", "Pregnant"]
        );
    }

    #[test]
    fn lines_before_first_header_are_dropped() {
        let text = "Study NCT0000\nSponsor: somebody\nEXCLUSION CRITERIA\nactive infections\n";
        let criteria = split_criteria(text);
        assert!(criteria.inclusion.is_empty());
        assert_eq!(texts(&criteria.exclusion), vec!["active infections"]);
    }

    #[test]
    fn headers_can_switch_back_and_forth() {
        let text = "inclusion criteria\na\nexclusion criteria\nb\ninclusion criteria:\nc\n";
        let criteria = split_criteria(text);
        assert_eq!(texts(&criteria.inclusion), vec!["a", "c"]);
        assert_eq!(texts(&criteria.exclusion), vec!["b"]);
        assert_eq!(texts(criteria.lines(Category::Exclusion)), vec!["b"]);
    }

    #[test]
    fn empty_and_headerless_text_yield_empty_lists() {
        assert!(split_criteria("").is_empty());
        assert!(split_criteria("Adults with lung cancer\nAge > 20").is_empty());
    }

    #[test]
    fn counts_are_preserved() {
        let inclusion: Vec<String> = (0..7).map(|i| format!("inclusion line {i}")).collect();
        let exclusion: Vec<String> = (0..4).map(|i| format!("exclusion line {i}")).collect();
        let text = format!(
            "Inclusion Criteria:\n{}\nExclusion Criteria:\n{}\n",
            inclusion.join("\n"),
            exclusion.join("\n")
        );

        let criteria = split_criteria(&text);
        assert_eq!(texts(&criteria.inclusion), inclusion);
        assert_eq!(texts(&criteria.exclusion), exclusion);
    }
}
