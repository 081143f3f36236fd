//! Typed shape of generated job recommendations and the cardinality rules they must meet.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const OPPORTUNITIES_PER_ROLE: usize = 4;
pub const RESOURCES_PER_ROLE: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaViolation {
    #[error("expected {min} to {max} job recommendations, got {actual}")]
    RecommendationCount { min: usize, max: usize, actual: usize },

    #[error("recommendation '{role}' must list exactly {expected} {field}, got {actual}")]
    ItemCount {
        role: String,
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub platform: String,
    pub search_query: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillResource {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub skills_match: Vec<String>,
    #[serde(default)]
    pub skill_gaps: Vec<String>,
    pub experience_match: String,
    pub education_match: String,
    #[serde(default)]
    pub culture_fit: String,
}

fn default_salary_description() -> String {
    "For more accurate salary estimates, consider using the following resources:".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryBenchmarks {
    #[serde(default = "default_salary_description")]
    pub description: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPotential {
    pub market_demand: String,
    pub upward_mobility: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerPathProjections {
    pub potential_paths: Vec<String>,
    pub required_steps: Vec<String>,
    pub timeline_estimate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRecommendation {
    pub role_title: String,
    pub experience_level: String,
    pub industry_focus: String,
    pub workplace_type: String,
    pub assessment: Assessment,
    pub salary_benchmarks: SalaryBenchmarks,
    pub growth_potential: GrowthPotential,
    pub current_opportunities: Vec<Link>,
    pub skill_development: Vec<SkillResource>,
    pub career_path_projections: CareerPathProjections,
    #[serde(default)]
    pub random_forest_insights: String,
    #[serde(default)]
    pub work_life_balance: String,
}

impl RoleRecommendation {
    fn validate(&self) -> Result<(), SchemaViolation> {
        exact(
            &self.role_title,
            "currentOpportunities",
            OPPORTUNITIES_PER_ROLE,
            self.current_opportunities.len(),
        )?;
        exact(
            &self.role_title,
            "skillDevelopment",
            RESOURCES_PER_ROLE,
            self.skill_development.len(),
        )
    }
}

fn exact(role: &str, field: &'static str, expected: usize, actual: usize) -> Result<(), SchemaViolation> {
    if actual == expected {
        Ok(())
    } else {
        Err(SchemaViolation::ItemCount {
            role: role.to_string(),
            field,
            expected,
            actual,
        })
    }
}

/// Output of the manual-entry structured route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualAnalysis {
    pub job_recommendations: Vec<RoleRecommendation>,
}

impl ManualAnalysis {
    pub const MIN_RECOMMENDATIONS: usize = 3;
    pub const MAX_RECOMMENDATIONS: usize = 7;

    pub fn validate(&self) -> Result<(), SchemaViolation> {
        let count = self.job_recommendations.len();
        if !(Self::MIN_RECOMMENDATIONS..=Self::MAX_RECOMMENDATIONS).contains(&count) {
            return Err(SchemaViolation::RecommendationCount {
                min: Self::MIN_RECOMMENDATIONS,
                max: Self::MAX_RECOMMENDATIONS,
                actual: count,
            });
        }
        self.job_recommendations
            .iter()
            .try_for_each(RoleRecommendation::validate)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    pub fn recommendation(title: &str, opportunities: usize, resources: usize) -> Value {
        let opportunities: Vec<Value> = (0..opportunities)
            .map(|i| {
                json!({
                    "platform": format!("Board {i}"),
                    "searchQuery": title,
                    "url": format!("https://jobs.example.com/{i}")
                })
            })
            .collect();
        let resources: Vec<Value> = (0..resources)
            .map(|i| {
                json!({
                    "title": format!("Course {i}"),
                    "description": "Hands-on practice",
                    "duration": "6h 30m",
                    "link": format!("https://learn.example.com/{i}")
                })
            })
            .collect();

        json!({
            "roleTitle": title,
            "experienceLevel": "mid",
            "industryFocus": "Software",
            "workplaceType": "hybrid",
            "assessment": {
                "skillsMatch": ["Rust", "SQL"],
                "skillGaps": ["Kubernetes"],
                "experienceMatch": "Four years building backend services",
                "educationMatch": "BSc Computer Science",
                "cultureFit": "Engineering-led teams"
            },
            "salaryBenchmarks": {
                "links": [{ "platform": "Glassdoor", "searchQuery": title, "url": "https://glassdoor.com" }]
            },
            "growthPotential": { "marketDemand": "High", "upwardMobility": "Staff engineer track" },
            "currentOpportunities": opportunities,
            "skillDevelopment": resources,
            "careerPathProjections": {
                "potentialPaths": ["Senior Engineer"],
                "requiredSteps": ["Lead a project"],
                "timelineEstimate": "2 years"
            },
            "randomForestInsights": "Strong backend overlap",
            "workLifeBalance": "Balanced"
        })
    }

    pub fn manual_analysis(roles: usize) -> Value {
        let recs: Vec<Value> = (0..roles)
            .map(|i| recommendation(&format!("Role {i}"), 4, 4))
            .collect();
        json!({ "jobRecommendations": recs })
    }
}
