//! Job description parsing: skill categorisation and "or" alternatives
//!
//! Both passes are keyword/pattern heuristics over free text. They are
//! best-effort: incidental "or" and "/" usage next to a skill can link
//! skills that the posting did not intend as alternatives.

use crate::config::MatchingConfig;
use crate::error::{Result, SkillGapError};
use crate::processing::skill_extractor::{
    find_word, is_bounded, normalize_skill_name, skill_forms, SkillExtractor, SkillMention,
};
use crate::processing::skills::{JobRequirements, OrGroups, SkillDictionary};
use log::{debug, info, warn};
use regex::Regex;

const REQUIRED_KEYWORDS: &[&str] = &[
    "required",
    "must have",
    "must possess",
    "essential",
    "mandatory",
    "necessary",
];

const PREFERRED_KEYWORDS: &[&str] = &[
    "preferred",
    "nice to have",
    "desired",
    "advantage",
    "plus",
    "bonus",
];

// One word-ish token: letters, digits and the punctuation found in skill names
const TOKEN: &str = r"[a-z0-9+#.\-]+";

/// Job descriptions with less non-whitespace text than this are rejected
pub const MIN_JOB_DESCRIPTION_CHARS: usize = 10;

/// A job skill and where the text names it
struct Located {
    skill: String,
    /// Spelling found in the text, or the full name when absent
    surface: String,
    start: Option<usize>,
    /// Every spelling that names this skill, for resolving captured alternatives
    forms: Vec<String>,
}

impl Located {
    fn find(haystack: &str, skill: &str) -> Self {
        let forms = skill_forms(skill);
        let found = forms
            .iter()
            .find_map(|form| first_occurrence(haystack, form).map(|start| (form.clone(), start)));
        match found {
            Some((surface, start)) => Self {
                skill: skill.to_string(),
                surface,
                start: Some(start),
                forms,
            },
            None => Self {
                skill: skill.to_string(),
                surface: forms[0].clone(),
                start: None,
                forms,
            },
        }
    }

    fn from_mention(mention: &SkillMention) -> Self {
        let mut forms = skill_forms(&mention.skill);
        if !forms.contains(&mention.surface) {
            forms.insert(0, mention.surface.clone());
        }
        Self {
            skill: mention.skill.clone(),
            surface: mention.surface.clone(),
            start: Some(mention.start),
            forms,
        }
    }
}

/// Parse a job description into categorised skill lists and or-groups
pub fn extract_skills_from_job_description(
    job_description: &str,
    dictionary: &SkillDictionary,
    matching: &MatchingConfig,
) -> Result<JobRequirements> {
    let readable = job_description.chars().filter(|c| !c.is_whitespace()).count();
    if readable < MIN_JOB_DESCRIPTION_CHARS {
        return Err(SkillGapError::InvalidInput(format!(
            "Job description too short ({} characters, need at least {})",
            readable, MIN_JOB_DESCRIPTION_CHARS
        )));
    }

    let extractor = SkillExtractor::new(dictionary)?;
    let mentions = extractor.mentions(job_description);
    info!("Detected {} skills in job description", mentions.len());

    let haystack = normalize_skill_name(job_description);
    let located: Vec<Located> = mentions.iter().map(Located::from_mention).collect();

    let requirements = categorize_located(&haystack, &located, matching.category_window);
    let or_groups = or_groups_located(&haystack, &located, matching.or_group_window)?;
    if !or_groups.is_empty() {
        info!("Detected {} or-groups", or_groups.len());
    }

    Ok(requirements.with_or_groups(or_groups))
}

/// Split `skills` into required / preferred / bonus by nearby keywords.
///
/// Required keywords win when both kinds are present; neither kind means
/// bonus. When nothing lands in required or preferred, every skill is
/// treated as required. A skill is located by its full name or, failing
/// that, its vendor-free form.
pub fn categorize_skills(text: &str, skills: &[String], window: usize) -> JobRequirements {
    let haystack = normalize_skill_name(text);
    let located: Vec<Located> = skills.iter().map(|skill| Located::find(&haystack, skill)).collect();
    categorize_located(&haystack, &located, window)
}

fn categorize_located(haystack: &str, skills: &[Located], window: usize) -> JobRequirements {
    let mut required = Vec::new();
    let mut preferred = Vec::new();
    let mut bonus = Vec::new();

    for located in skills {
        let Some(position) = located.start else {
            debug!("'{}' not located in text, defaulting to bonus", located.skill);
            bonus.push(located.skill.clone());
            continue;
        };

        let context = context_window(haystack, position, located.surface.len(), window);
        let is_required = REQUIRED_KEYWORDS.iter().any(|k| context.contains(k));
        let is_preferred = PREFERRED_KEYWORDS.iter().any(|k| context.contains(k));

        if is_required {
            required.push(located.skill.clone());
        } else if is_preferred {
            preferred.push(located.skill.clone());
        } else {
            bonus.push(located.skill.clone());
        }
    }

    if required.is_empty() && preferred.is_empty() && !skills.is_empty() {
        warn!(
            "No required/preferred wording found; treating all {} skills as required",
            skills.len()
        );
        required = std::mem::take(&mut bonus);
    }

    JobRequirements::new(required, preferred, bonus)
}

/// Find alternatives phrased as "X or Y", "X, Y or Z" and "X/Y".
///
/// Each skill's first occurrence is inspected within `window` characters on
/// either side. Captured alternatives are resolved against `skills` by
/// whole-word containment and linked transitively into equivalence classes.
pub fn detect_or_groups(text: &str, skills: &[String], window: usize) -> Result<OrGroups> {
    let haystack = normalize_skill_name(text);
    let located: Vec<Located> = skills.iter().map(|skill| Located::find(&haystack, skill)).collect();
    or_groups_located(&haystack, &located, window)
}

fn or_groups_located(haystack: &str, skills: &[Located], window: usize) -> Result<OrGroups> {
    let mut links = UnionFind::new(skills.len());

    let other = format!(r"({TOKEN}(?: {TOKEN}){{0,2}})");
    let list_item = format!(r"(?:\s*,\s*{TOKEN}(?: {TOKEN}){{0,2}})*");

    for (index, located) in skills.iter().enumerate() {
        let Some(position) = located.start else {
            continue;
        };
        let context = context_window(haystack, position, located.surface.len(), window);
        let skill = regex::escape(&located.surface);

        // (pattern, alternative follows the skill)
        let patterns = [
            (format!(r"(?:^|[^a-z0-9]){skill}{list_item}\s*,?\s+or\s+{other}"), true),
            (format!(r"{other}\s+or\s+{skill}(?:$|[^a-z0-9])"), false),
            (format!(r"(?:^|[^a-z0-9]){skill}\s*/\s*{other}"), true),
            (format!(r"{other}\s*/\s*{skill}(?:$|[^a-z0-9])"), false),
        ];

        for (pattern, follows) in &patterns {
            let re = Regex::new(pattern)?;
            for caps in re.captures_iter(context) {
                let Some(captured) = caps.get(1) else { continue };
                if let Some(found) = resolve_alternative(captured.as_str(), skills, index, *follows) {
                    debug!("or-group link: '{}' <-> '{}'", located.skill, skills[found].skill);
                    links.union(index, found);
                }
            }
        }
    }

    let names: Vec<String> = skills.iter().map(|located| located.skill.clone()).collect();
    Ok(OrGroups::from_groups(links.classes(&names)))
}

/// Pick the known skill named in `captured`: the one nearest the connective
fn resolve_alternative(captured: &str, skills: &[Located], exclude: usize, follows: bool) -> Option<usize> {
    let mut best: Option<(usize, usize, usize)> = None; // (position, length, index)

    for (index, located) in skills.iter().enumerate() {
        if index == exclude || located.skill.eq_ignore_ascii_case(&skills[exclude].skill) {
            continue;
        }
        for form in &located.forms {
            // A form this skill shares with the excluded one names the excluded skill
            if form.is_empty() || skills[exclude].forms.contains(form) {
                continue;
            }
            let positions: Vec<usize> = captured
                .match_indices(form.as_str())
                .map(|(start, _)| start)
                .filter(|&start| is_bounded(captured, start, start + form.len()))
                .collect();
            let position = if follows {
                positions.first().copied()
            } else {
                positions.last().copied()
            };
            let Some(position) = position else { continue };

            let better = match best {
                None => true,
                Some((best_pos, best_len, _)) => {
                    let nearer = if follows { position < best_pos } else { position > best_pos };
                    nearer || (position == best_pos && form.len() > best_len)
                }
            };
            if better {
                best = Some((position, form.len(), index));
            }
        }
    }

    best.map(|(_, _, index)| index)
}

/// Byte offset of the first whole-word occurrence, else the first raw one
fn first_occurrence(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    find_word(haystack, needle).or_else(|| haystack.find(needle))
}

/// Slice `radius` bytes either side of `[start, start + len)`, snapped to char boundaries
fn context_window(text: &str, start: usize, len: usize, radius: usize) -> &str {
    let mut lo = start.saturating_sub(radius);
    while !text.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (start + len + radius).min(text.len());
    while !text.is_char_boundary(hi) {
        hi += 1;
    }
    &text[lo..hi]
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }

    /// Members grouped by root, each class in input order
    fn classes(&mut self, skills: &[String]) -> Vec<Vec<String>> {
        let mut classes: Vec<(usize, Vec<String>)> = Vec::new();
        for (index, skill) in skills.iter().enumerate() {
            let root = self.find(index);
            match classes.iter_mut().find(|(r, _)| *r == root) {
                Some((_, members)) => members.push(skill.clone()),
                None => classes.push((root, vec![skill.clone()])),
            }
        }
        classes
            .into_iter()
            .map(|(_, members)| members)
            .filter(|members| members.len() > 1)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn dictionary() -> SkillDictionary {
        let mut dict = SkillDictionary::new();
        dict.insert(
            "tech".to_string(),
            names(&[
                "Python", "SQL", "AWS", "Azure", "GCP", "Java", "C++", "Go", "Docker",
                "Kubernetes", "Git", "Excel",
            ]),
        );
        dict
    }

    #[test]
    fn test_required_and_preferred_keywords() {
        let text = format!(
            "Required: Python experience.{}Nice to have: Docker.",
            " filler".repeat(40)
        );
        let reqs = categorize_skills(&text, &names(&["Python", "Docker"]), 100);
        assert_eq!(reqs.required, names(&["Python"]));
        assert_eq!(reqs.preferred, names(&["Docker"]));
        assert!(reqs.bonus.is_empty());
    }

    #[test]
    fn test_required_wins_ties() {
        let reqs = categorize_skills("Python is required, Git preferred", &names(&["Python", "Git"]), 100);
        assert_eq!(reqs.required, names(&["Python", "Git"]));
        assert!(reqs.preferred.is_empty());
    }

    #[test]
    fn test_unstructured_posting_becomes_required() {
        let reqs = categorize_skills("We use Python and Git daily.", &names(&["Python", "Git"]), 100);
        assert_eq!(reqs.required, names(&["Python", "Git"]));
        assert!(reqs.bonus.is_empty());
    }

    #[test]
    fn test_bonus_kept_when_other_categories_exist() {
        let text = format!("Python required.{}We also use Git.", " filler".repeat(40));
        let reqs = categorize_skills(&text, &names(&["Python", "Git"]), 100);
        assert_eq!(reqs.required, names(&["Python"]));
        assert_eq!(reqs.bonus, names(&["Git"]));
    }

    #[test]
    fn test_simple_or_group() {
        let skills = names(&["AWS", "Azure"]);
        let groups = detect_or_groups("Preferred: AWS or Azure.", &skills, 300).unwrap();
        assert_eq!(groups.len(), 1);
        let group = groups.group_of("Azure").unwrap();
        assert!(group.contains(&"AWS".to_string()));
        assert_eq!(groups.group_of("AWS"), groups.group_of("Azure"));
    }

    #[test]
    fn test_list_or_group_is_transitive() {
        let skills = names(&["AWS", "Azure", "GCP"]);
        let groups = detect_or_groups("Cloud: AWS, Azure, or GCP experience", &skills, 300).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups.group_of("AWS").unwrap().len(), 3);
    }

    #[test]
    fn test_slash_or_group() {
        let skills = names(&["Java", "C++"]);
        let groups = detect_or_groups("Strong Java/C++ background", &skills, 300).unwrap();
        assert_eq!(groups.group_of("C++").unwrap().len(), 2);
    }

    #[test]
    fn test_alternative_with_trailing_words() {
        let skills = names(&["Java", "C++", "Git"]);
        let groups = detect_or_groups("Java or C++ experience required. Git is a must.", &skills, 300).unwrap();
        assert_eq!(groups.len(), 1);
        assert!(groups.group_of("Git").is_none());
        assert_eq!(groups.group_of("Java"), groups.group_of("C++"));
    }

    #[test]
    fn test_incidental_or_does_not_link() {
        let skills = names(&["Python", "SQL"]);
        let text = "Python is required. Leaders or mentors welcome. SQL helps.";
        let groups = detect_or_groups(text, &skills, 300).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn test_slash_conjunction_is_known_false_positive() {
        // "Docker/Kubernetes" usually means both, but the heuristic reads it as alternatives.
        let skills = names(&["Docker", "Kubernetes"]);
        let groups = detect_or_groups("Hands-on Docker/Kubernetes operations", &skills, 300).unwrap();
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_job_description_scenario() {
        let reqs = extract_skills_from_job_description(
            "Required: Python, SQL. Preferred: AWS or Azure.",
            &dictionary(),
            &MatchingConfig::default(),
        )
        .unwrap();

        // The whole posting fits in one keyword window, so "required" reaches every skill
        assert_eq!(reqs.required, names(&["Python", "SQL", "AWS", "Azure"]));
        assert!(reqs.preferred.is_empty());
        assert!(reqs.bonus.is_empty());
        assert_eq!(reqs.or_groups.groups(), &[names(&["AWS", "Azure"])]);
        assert!(reqs.or_groups.group_of("Python").is_none());
        assert!(reqs.or_groups.group_of("SQL").is_none());
    }

    #[test]
    fn test_job_description_sections_far_apart() {
        let text = format!(
            "Required: Python, SQL.{} Preferred: AWS or Azure.",
            " filler".repeat(20)
        );
        let reqs = extract_skills_from_job_description(&text, &dictionary(), &MatchingConfig::default()).unwrap();

        assert_eq!(reqs.required, names(&["Python", "SQL"]));
        assert_eq!(reqs.preferred, names(&["AWS", "Azure"]));
        assert!(reqs.bonus.is_empty());
        assert_eq!(reqs.or_groups.groups(), &[names(&["AWS", "Azure"])]);
    }

    #[test]
    fn test_bare_excel_stays_required() {
        let mut dict = SkillDictionary::new();
        dict.insert(
            "tools".to_string(),
            names(&["MS Excel", "Excel", "SQL", "Tableau"]),
        );
        let text = format!("Required: Excel and SQL.{} Nice to have: Tableau.", " filler".repeat(20));

        let reqs = extract_skills_from_job_description(&text, &dict, &MatchingConfig::default()).unwrap();
        assert_eq!(reqs.required, names(&["Excel", "SQL"]));
        assert_eq!(reqs.preferred, names(&["Tableau"]));
        assert!(reqs.bonus.is_empty());
    }

    #[test]
    fn test_vendor_skill_located_by_base_form() {
        let mut dict = SkillDictionary::new();
        dict.insert("tools".to_string(), names(&["MS Excel", "Tableau"]));
        let text = format!("Required: Excel.{} Nice to have: Tableau.", " filler".repeat(20));

        let reqs = extract_skills_from_job_description(&text, &dict, &MatchingConfig::default()).unwrap();
        assert_eq!(reqs.required, names(&["MS Excel"]));
        assert_eq!(reqs.preferred, names(&["Tableau"]));

        // Plain skill lists are located the same way
        let plain = categorize_skills(&text, &names(&["MS Excel", "Tableau"]), 100);
        assert_eq!(plain.required, names(&["MS Excel"]));
        assert_eq!(plain.preferred, names(&["Tableau"]));
    }

    #[test]
    fn test_vendor_skill_in_or_group() {
        let mut dict = SkillDictionary::new();
        dict.insert("office".to_string(), names(&["Microsoft Word", "Google Docs", "SQL"]));

        let reqs = extract_skills_from_job_description(
            "Required: Word or Google Docs, plus SQL.",
            &dict,
            &MatchingConfig::default(),
        )
        .unwrap();
        assert_eq!(reqs.or_groups.len(), 1);
        assert_eq!(reqs.or_groups.group_of("Microsoft Word"), reqs.or_groups.group_of("Google Docs"));
        assert!(reqs.or_groups.group_of("SQL").is_none());

        let groups = detect_or_groups("Word or Google Docs", &names(&["Microsoft Word", "Google Docs"]), 300).unwrap();
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_short_description_rejected() {
        for text in ["  ", "Python SQL", " J a v a "] {
            let err = extract_skills_from_job_description(text, &dictionary(), &MatchingConfig::default())
                .unwrap_err();
            assert!(matches!(err, SkillGapError::InvalidInput(_)));
        }
        assert!(
            extract_skills_from_job_description("Python, SQL", &dictionary(), &MatchingConfig::default()).is_ok()
        );
    }
}
