//! Dictionary-driven skill extraction and duplicate normalisation

use crate::error::{Result, SkillGapError};
use crate::processing::skills::{SkillDictionary, SkillSet};
use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

// Vendor qualifiers that do not change which skill is meant ("MS Excel" is "Excel")
static VENDOR_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(ms|microsoft|adobe|google)\s+").expect("static regex"));

/// Lowercase, trim and collapse internal whitespace
pub fn normalize_skill_name(skill: &str) -> String {
    WHITESPACE.replace_all(skill.trim(), " ").to_lowercase()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// True when `haystack[start..end]` is not glued to neighbouring letters or digits
pub(crate) fn is_bounded(haystack: &str, start: usize, end: usize) -> bool {
    let before = haystack[..start].chars().next_back();
    let after = haystack[end..].chars().next();
    !before.map_or(false, is_word_char) && !after.map_or(false, is_word_char)
}

/// Byte offset of the first whole-word occurrence of `needle` in `haystack`
pub(crate) fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack
        .match_indices(needle)
        .map(|(start, _)| start)
        .find(|&start| is_bounded(haystack, start, start + needle.len()))
}

/// Lowercased spellings that name `skill`: the full name, then its vendor-free base form
pub fn skill_forms(skill: &str) -> Vec<String> {
    let normalized = normalize_skill_name(skill);
    let base = VENDOR_PREFIX.replace(&normalized, "").to_string();
    let mut forms = vec![normalized];
    if !base.is_empty() && base != forms[0] {
        forms.push(base);
    }
    forms
}

/// First place a dictionary skill shows up in a text.
///
/// `start` is a byte offset into `normalize_skill_name(text)` and `surface`
/// is the spelling found there, which may be a vendor-free form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillMention {
    pub skill: String,
    pub surface: String,
    pub start: usize,
}

/// Multi-pattern matcher over every canonical skill name and its vendor-free base form
pub struct SkillExtractor {
    matcher: AhoCorasick,
    patterns: Vec<String>,
    canonical: Vec<String>,
}

impl SkillExtractor {
    pub fn new(dictionary: &SkillDictionary) -> Result<Self> {
        let mut pattern_map: Vec<(String, String)> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        // Full names claim their spelling before any base form can, so "excel"
        // stays with "Excel" even when "MS Excel" is listed first
        for full_names in [true, false] {
            for skill in dictionary.values().flatten() {
                let forms = skill_forms(skill);
                let candidates = if full_names { &forms[..1] } else { &forms[1..] };
                for pattern in candidates {
                    if !pattern.is_empty() && seen.insert(pattern.clone()) {
                        pattern_map.push((pattern.clone(), skill.clone()));
                    }
                }
            }
        }

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(pattern_map.iter().map(|(p, _)| p.as_str()))
            .map_err(|e| SkillGapError::Configuration(format!("Failed to build skill matcher: {}", e)))?;

        let (patterns, canonical) = pattern_map.into_iter().unzip();
        Ok(Self {
            matcher,
            patterns,
            canonical,
        })
    }

    /// First mention of each canonical skill, ordered by position.
    ///
    /// A match lying inside a longer match ("excel" within "ms excel") is
    /// part of that mention and does not count on its own.
    pub fn mentions(&self, text: &str) -> Vec<SkillMention> {
        let haystack = normalize_skill_name(text);
        let spans: Vec<(usize, usize, usize)> = self
            .matcher
            .find_overlapping_iter(&haystack)
            .filter(|mat| is_bounded(&haystack, mat.start(), mat.end()))
            .map(|mat| (mat.start(), mat.end(), mat.pattern().as_usize()))
            .collect();

        let mut first_seen: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for &(start, end, pattern) in &spans {
            let covered = spans
                .iter()
                .any(|&(s, e, _)| s <= start && end <= e && e - s > end - start);
            if covered {
                continue;
            }
            let skill = self.canonical[pattern].as_str();
            let earlier = first_seen.get(skill).map_or(true, |&(pos, _)| start < pos);
            if earlier {
                first_seen.insert(skill, (start, pattern));
            }
        }

        let mut mentions: Vec<SkillMention> = first_seen
            .into_iter()
            .map(|(skill, (start, pattern))| SkillMention {
                skill: skill.to_string(),
                surface: self.patterns[pattern].clone(),
                start,
            })
            .collect();
        mentions.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.skill.cmp(&b.skill)));
        mentions
    }

    /// Canonical skills found in `text`, ordered by first occurrence
    pub fn extract_ordered(&self, text: &str) -> Vec<String> {
        self.mentions(text).into_iter().map(|m| m.skill).collect()
    }

    pub fn extract(&self, text: &str) -> SkillSet {
        self.extract_ordered(text).into_iter().collect()
    }

    pub fn pattern_count(&self) -> usize {
        self.canonical.len()
    }
}

/// Detect the canonical skills of `dictionary` mentioned in `text`
pub fn extract_skills(text: &str, dictionary: &SkillDictionary) -> Result<SkillSet> {
    if text.trim().is_empty() {
        return Ok(SkillSet::new());
    }
    Ok(SkillExtractor::new(dictionary)?.extract(text))
}

/// Skills of `dictionary` mentioned in `text`, ordered by first occurrence
pub fn skills_in_order(text: &str, dictionary: &SkillDictionary) -> Result<Vec<String>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(SkillExtractor::new(dictionary)?.extract_ordered(text))
}

/// Collapse near-duplicate forms.
///
/// Case/whitespace variants keep the shorter spelling. When one skill occurs
/// as whole words inside a longer one ("Excel" in "MS Excel"), only the
/// longer, more specific form survives.
pub fn normalize_duplicates(skills: &SkillSet) -> SkillSet {
    let mut by_normalized: BTreeMap<String, String> = BTreeMap::new();

    for skill in skills {
        let normalized = normalize_skill_name(skill);
        match by_normalized.get(&normalized) {
            Some(existing)
                if skill.len() < existing.len()
                    || (skill.to_lowercase() == *skill && existing.to_lowercase() != *existing) =>
            {
                by_normalized.insert(normalized, skill.clone());
            }
            Some(_) => {}
            None => {
                by_normalized.insert(normalized, skill.clone());
            }
        }
    }

    let final_skills: SkillSet = by_normalized
        .iter()
        .filter(|(normalized, _)| {
            !by_normalized.keys().any(|other| {
                other.len() > normalized.len() && find_word(other, normalized).is_some()
            })
        })
        .map(|(_, skill)| skill.clone())
        .collect();

    if final_skills.is_empty() {
        by_normalized.into_values().collect()
    } else {
        final_skills
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary() -> SkillDictionary {
        let mut dict = SkillDictionary::new();
        dict.insert(
            "programming".to_string(),
            vec!["Python", "Java", "JavaScript", "C++", "C#", "Node.js"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        dict.insert(
            "tools".to_string(),
            vec!["MS Excel", "Excel", "Git", "Machine Learning"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        dict
    }

    fn set(items: &[&str]) -> SkillSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extracts_case_insensitive_with_boundaries() {
        let skills = extract_skills(
            "Built services in PYTHON and c++, scripting in JavaScript with node.js.",
            &dictionary(),
        )
        .unwrap();

        assert!(skills.contains("Python"));
        assert!(skills.contains("C++"));
        assert!(skills.contains("JavaScript"));
        assert!(skills.contains("Node.js"));
        // "Java" only appears glued inside "JavaScript"
        assert!(!skills.contains("Java"));
    }

    #[test]
    fn test_extract_collapses_whitespace() {
        let skills = extract_skills("Applied machine\n   learning daily", &dictionary()).unwrap();
        assert!(skills.contains("Machine Learning"));
    }

    #[test]
    fn test_vendor_base_form_maps_to_canonical() {
        let mut dict = SkillDictionary::new();
        dict.insert("office".to_string(), vec!["Microsoft Word".to_string()]);

        let skills = extract_skills("Advanced Word user", &dict).unwrap();
        assert_eq!(skills, set(&["Microsoft Word"]));
    }

    #[test]
    fn test_bare_name_keeps_its_own_skill() {
        // "MS Excel" is listed before "Excel" but must not take over "excel"
        let skills = extract_skills("Advanced Excel reporting", &dictionary()).unwrap();
        assert_eq!(skills, set(&["Excel"]));
    }

    #[test]
    fn test_prefixed_mention_is_one_skill() {
        let extractor = SkillExtractor::new(&dictionary()).unwrap();
        let mentions = extractor.mentions("Daily MS Excel work");
        assert_eq!(
            mentions,
            vec![SkillMention {
                skill: "MS Excel".to_string(),
                surface: "ms excel".to_string(),
                start: 6,
            }]
        );
    }

    #[test]
    fn test_mention_records_base_form_surface() {
        let mut dict = SkillDictionary::new();
        dict.insert("office".to_string(), vec!["MS Excel".to_string(), "SQL".to_string()]);

        let mentions = SkillExtractor::new(&dict).unwrap().mentions("SQL and Excel");
        assert_eq!(mentions.len(), 2);
        assert_eq!(mentions[1].skill, "MS Excel");
        assert_eq!(mentions[1].surface, "excel");
        assert_eq!(mentions[1].start, 8);
    }

    #[test]
    fn test_skill_forms() {
        assert_eq!(skill_forms("Microsoft  Word"), vec!["microsoft word", "word"]);
        assert_eq!(skill_forms("Python"), vec!["python"]);
    }

    #[test]
    fn test_extract_ordered_follows_text() {
        let extractor = SkillExtractor::new(&dictionary()).unwrap();
        let ordered = extractor.extract_ordered("Git first, then Python, then Java");
        assert_eq!(ordered, vec!["Git", "Python", "Java"]);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert!(extract_skills("   ", &dictionary()).unwrap().is_empty());
    }

    #[test]
    fn test_normalize_duplicates_keeps_specific_form() {
        assert_eq!(normalize_duplicates(&set(&["MS Excel", "Excel"])), set(&["MS Excel"]));
    }

    #[test]
    fn test_normalize_duplicates_case_variants() {
        let normalized = normalize_duplicates(&set(&["Python", "python", "PYTHON"]));
        assert_eq!(normalized, set(&["python"]));
    }

    #[test]
    fn test_normalize_duplicates_keeps_distinct_prefixes() {
        let normalized = normalize_duplicates(&set(&["Java", "JavaScript"]));
        assert_eq!(normalized, set(&["Java", "JavaScript"]));
    }
}
