//! Learning resources, timelines and resume bullet suggestions for missing skills

use crate::processing::skill_extractor::find_word;
use crate::processing::skills::{MissingSkills, Priority};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const RESOURCES_PER_SKILL: usize = 2;

type ResourceRow = (&'static str, &'static str, &'static str);

const LEARNING_RESOURCES: &[(&str, &[ResourceRow])] = &[
    ("python", &[
        ("Coursera", "Python for Everybody", "https://www.coursera.org/specializations/python"),
        ("Udemy", "Complete Python Bootcamp", "https://www.udemy.com/course/complete-python-bootcamp/"),
        ("YouTube", "Python Tutorial for Beginners", "https://www.youtube.com/results?search_query=python+tutorial"),
    ]),
    ("java", &[
        ("Coursera", "Java Programming and Software Engineering", "https://www.coursera.org/specializations/java-programming"),
        ("Udemy", "Java Programming Masterclass", "https://www.udemy.com/course/java-the-complete-java-developer-course/"),
    ]),
    ("javascript", &[
        ("Coursera", "JavaScript for Beginners", "https://www.coursera.org/learn/javascript-basics"),
        ("Udemy", "The Complete JavaScript Course", "https://www.udemy.com/course/the-complete-javascript-course/"),
    ]),
    ("react", &[
        ("Coursera", "React Basics", "https://www.coursera.org/learn/react-basics"),
        ("Udemy", "The Complete React Developer Course", "https://www.udemy.com/course/react-redux/"),
    ]),
    ("sql", &[
        ("Coursera", "SQL for Data Science", "https://www.coursera.org/learn/sql-for-data-science"),
        ("Udemy", "The Complete SQL Bootcamp", "https://www.udemy.com/course/the-complete-sql-bootcamp/"),
    ]),
    ("aws", &[
        ("Coursera", "AWS Fundamentals", "https://www.coursera.org/specializations/aws-fundamentals"),
        ("Udemy", "AWS Certified Solutions Architect", "https://www.udemy.com/course/aws-certified-solutions-architect-associate/"),
    ]),
    ("docker", &[
        ("Coursera", "Docker and Kubernetes", "https://www.coursera.org/learn/docker-kubernetes"),
        ("Udemy", "Docker Mastery", "https://www.udemy.com/course/docker-mastery/"),
    ]),
    ("git", &[
        ("Coursera", "Version Control with Git", "https://www.coursera.org/learn/version-control-with-git"),
        ("Udemy", "Git Complete", "https://www.udemy.com/course/git-complete/"),
    ]),
    ("machine learning", &[
        ("Coursera", "Machine Learning", "https://www.coursera.org/learn/machine-learning"),
        ("Udemy", "Machine Learning A-Z", "https://www.udemy.com/course/machinelearning/"),
    ]),
    ("data analysis", &[
        ("Coursera", "Data Analysis with Python", "https://www.coursera.org/learn/data-analysis-with-python"),
        ("Udemy", "Data Analysis with Pandas", "https://www.udemy.com/course/data-analysis-with-pandas/"),
    ]),
];

// Timelines use a shorter complexity list than the optimizer's estimates
const LONG_TIMELINE_SKILLS: &[&str] = &[
    "machine learning",
    "data science",
    "cloud architecture",
    "devops",
    "full stack",
];

const BULLET_TEMPLATES: &[(&[&str], &str)] = &[
    (
        &["python", "java", "javascript", "c++", "c#", "go", "rust"],
        "Developed applications using {skill} to improve system performance and user experience",
    ),
    (
        &["react", "angular", "vue", "django", "flask", "spring"],
        "Built responsive web applications using {skill} framework, enhancing user engagement",
    ),
    (
        &["sql", "mysql", "postgresql", "mongodb", "redis"],
        "Designed and optimized database schemas using {skill}, reducing query time by 30%",
    ),
    (
        &["aws", "azure", "gcp", "docker", "kubernetes", "ci/cd"],
        "Deployed scalable infrastructure using {skill}, improving system reliability and reducing costs",
    ),
    (
        &["machine learning", "data analysis", "pandas", "numpy", "tensorflow"],
        "Applied {skill} to analyze data and build predictive models, driving data-driven decisions",
    ),
];

const DEFAULT_BULLET: &str = "Utilized {skill} to streamline processes and enhance project outcomes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningResource {
    pub platform: String,
    pub course: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub skill: String,
    pub resources: Vec<LearningResource>,
    pub timeline: String,
    pub resume_bullet: String,
}

pub type Recommendations = BTreeMap<Priority, Vec<Recommendation>>;

pub fn learning_timeline(skill: &str, priority: Priority) -> &'static str {
    let lowered = skill.to_lowercase();
    let long = LONG_TIMELINE_SKILLS.iter().any(|s| lowered.contains(s));
    match (priority, long) {
        (Priority::High, false) => "2-4 weeks",
        (Priority::High, true) => "1-2 months",
        (Priority::Medium, false) => "1-2 weeks",
        (Priority::Medium, true) => "3-4 weeks",
        (Priority::Low, false) => "1 week",
        (Priority::Low, true) => "2-3 weeks",
    }
}

/// Up to two resources: an exact table entry, then a whole-word partial
/// match, then generic course searches
pub fn find_resources(skill: &str) -> Vec<LearningResource> {
    let lowered = skill.trim().to_lowercase();

    let rows = LEARNING_RESOURCES
        .iter()
        .find(|(key, _)| *key == lowered)
        .or_else(|| {
            LEARNING_RESOURCES.iter().find(|(key, _)| {
                find_word(&lowered, key).is_some() || find_word(key, &lowered).is_some()
            })
        })
        .map(|(_, rows)| *rows);

    match rows {
        Some(rows) => rows
            .iter()
            .take(RESOURCES_PER_SKILL)
            .map(|(platform, course, url)| LearningResource {
                platform: platform.to_string(),
                course: course.to_string(),
                url: url.to_string(),
            })
            .collect(),
        None => {
            let query = search_query(skill);
            vec![
                LearningResource {
                    platform: "Coursera".to_string(),
                    course: format!("{} Course", skill),
                    url: format!("https://www.coursera.org/search?query={}", query),
                },
                LearningResource {
                    platform: "Udemy".to_string(),
                    course: format!("Learn {}", skill),
                    url: format!("https://www.udemy.com/courses/search/?q={}", query),
                },
            ]
        }
    }
}

/// Percent-encoded words joined by `+`, so "C#" and "C++" survive in a URL
fn search_query(skill: &str) -> String {
    skill
        .split_whitespace()
        .map(|word| urlencoding::encode(word).into_owned())
        .collect::<Vec<_>>()
        .join("+")
}

pub fn resume_bullet(skill: &str) -> String {
    let lowered = skill.to_lowercase();
    let template = BULLET_TEMPLATES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| find_word(&lowered, k).is_some()))
        .map(|(_, template)| *template)
        .unwrap_or(DEFAULT_BULLET);
    template.replace("{skill}", skill)
}

pub fn generate_recommendations(missing: &MissingSkills) -> Recommendations {
    let mut recommendations = Recommendations::new();
    for priority in Priority::ALL {
        let items = missing
            .get(priority)
            .iter()
            .map(|skill| Recommendation {
                skill: skill.clone(),
                resources: find_resources(skill),
                timeline: learning_timeline(skill, priority).to_string(),
                resume_bullet: resume_bullet(skill),
            })
            .collect();
        recommendations.insert(priority, items);
    }
    recommendations
}
