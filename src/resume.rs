//! Structured resume document: serde types, JSON loading, and the markdown
//! rendering used as chat context.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub name: String,
    pub title: String,
    pub summary: String,
    pub location: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub period: String,
    pub location: String,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub period: String,
    pub location: String,
    #[serde(default)]
    pub details: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skills {
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub frameworks_and_libraries: Vec<String>,
    #[serde(default)]
    pub databases: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub cloud: Vec<String>,
    #[serde(default)]
    pub other: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeProject {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub repo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeData {
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    pub skills: Skills,
    #[serde(default)]
    pub projects: Vec<ResumeProject>,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
}

impl ResumeData {
    /// Load a resume document from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let jd = &mut serde_json::Deserializer::from_str(&raw);
        serde_path_to_error::deserialize(jd).map_err(|e| {
            AppError::Parse(format!(
                "resume file {}: {} at {}",
                path.as_ref().display(),
                e.inner(),
                e.path()
            ))
        })
    }

    /// Render the resume as the markdown section fed to the chat model.
    pub fn to_context_markdown(&self) -> String {
        let mut out = String::new();
        let info = &self.personal_info;
        out.push_str(&format!("## {} — {}\n\n", info.name, info.title));
        out.push_str(&format!("{}\n\n", info.summary));
        out.push_str(&format!("**Location:** {}\n", info.location));
        out.push_str(&format!("**Email:** {}\n", info.email));
        if let Some(github) = &info.github {
            out.push_str(&format!("**GitHub:** {github}\n"));
        }
        if let Some(linkedin) = &info.linkedin {
            out.push_str(&format!("**LinkedIn:** {linkedin}\n"));
        }
        out.push('\n');

        if !self.experience.is_empty() {
            out.push_str("### Experience\n\n");
            for exp in &self.experience {
                out.push_str(&format!(
                    "**{}**, {} ({}, {})\n",
                    exp.title, exp.company, exp.period, exp.location
                ));
                for item in &exp.responsibilities {
                    out.push_str(&format!("- {item}\n"));
                }
                if !exp.technologies.is_empty() {
                    out.push_str(&format!("- Technologies: {}\n", exp.technologies.join(", ")));
                }
                out.push('\n');
            }
        }

        if !self.education.is_empty() {
            out.push_str("### Education\n\n");
            for edu in &self.education {
                out.push_str(&format!(
                    "**{}**, {} ({}, {})\n",
                    edu.degree, edu.institution, edu.period, edu.location
                ));
                for detail in &edu.details {
                    out.push_str(&format!("- {detail}\n"));
                }
                out.push('\n');
            }
        }

        out.push_str("### Skills\n\n");
        let skills = &self.skills;
        for (label, list) in [
            ("Languages", &skills.languages),
            ("Frameworks & Libraries", &skills.frameworks_and_libraries),
            ("Databases", &skills.databases),
            ("Tools", &skills.tools),
            ("Cloud", &skills.cloud),
            ("Other", &skills.other),
        ] {
            if !list.is_empty() {
                out.push_str(&format!("- **{label}:** {}\n", list.join(", ")));
            }
        }
        out.push('\n');

        if !self.projects.is_empty() {
            out.push_str("### Selected Projects\n\n");
            for project in &self.projects {
                out.push_str(&format!("**{}** — {}", project.name, project.description));
                if !project.technologies.is_empty() {
                    out.push_str(&format!(" ({})", project.technologies.join(", ")));
                }
                out.push('\n');
            }
            out.push('\n');
        }

        if !self.achievements.is_empty() {
            out.push_str("### Achievements\n\n");
            for achievement in &self.achievements {
                out.push_str(&format!("- {achievement}\n"));
            }
            out.push('\n');
        }

        if !self.certifications.is_empty() {
            out.push_str("### Certifications\n\n");
            for certification in &self.certifications {
                out.push_str(&format!("- {certification}\n"));
            }
            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_renders_a_minimal_resume() {
        let raw = r#"{
            "personalInfo": {
                "name": "Saurav Kumar",
                "title": "Aspiring Software Developer",
                "summary": "Building secure, scalable software with purpose.",
                "location": "New Delhi, India",
                "email": "dev@example.com",
                "github": "https://github.com/the-sauravkumar"
            },
            "skills": {
                "languages": ["Python", "Rust"],
                "tools": ["Git", "Docker"]
            },
            "projects": [
                {"name": "CurveShapeNet", "description": "2D shape analysis toolkit", "technologies": ["Python"]}
            ],
            "achievements": ["Hackathon finalist"]
        }"#;
        let resume: ResumeData = serde_json::from_str(raw).unwrap();
        let markdown = resume.to_context_markdown();
        assert!(markdown.contains("## Saurav Kumar — Aspiring Software Developer"));
        assert!(markdown.contains("**Languages:** Python, Rust"));
        assert!(markdown.contains("**CurveShapeNet** — 2D shape analysis toolkit (Python)"));
        assert!(markdown.contains("- Hackathon finalist"));
    }
}
