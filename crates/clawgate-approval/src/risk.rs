//! Risk classification for approval prompts.
//!
//! The level only shapes how the request is phrased to the approver; it never
//! decides the request.

use std::collections::BTreeSet;
use std::fmt;

use clawgate_core::{ApprovalRequest, DurationType, ResourceType, RiskLevel};

/// Explanation shown for low-risk requests.
pub const LOW_RISK_EXPLANATION: &str = "Read-only or public access with limited impact.";
/// Explanation shown for medium-risk requests.
pub const MEDIUM_RISK_EXPLANATION: &str =
    "Involves file writes or code execution and may change system state; review carefully.";
/// Explanation shown for high-risk requests.
pub const HIGH_RISK_EXPLANATION: &str = "High-risk operation (shell execution or system path \
                                         access); strongly recommend temporary grants only.";

/// Risk level plus the sentence shown to the approver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskAssessment {
    /// Assessed level.
    pub level: RiskLevel,
    /// Human-readable explanation.
    pub explanation: String,
}

impl RiskAssessment {
    /// Assessment with the stock explanation for `level`.
    #[must_use]
    pub fn for_level(level: RiskLevel) -> Self {
        let explanation = match level {
            RiskLevel::Low => LOW_RISK_EXPLANATION,
            RiskLevel::Medium => MEDIUM_RISK_EXPLANATION,
            RiskLevel::High => HIGH_RISK_EXPLANATION,
        };
        Self {
            level,
            explanation: explanation.to_string(),
        }
    }
}

impl fmt::Display for RiskAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.explanation)
    }
}

/// Tool sets and path keywords used to classify requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskCatalogue {
    /// Tools that are always high risk.
    pub high_risk_tools: BTreeSet<String>,
    /// Tools that are always medium risk.
    pub medium_risk_tools: BTreeSet<String>,
    /// Tools that are always low risk.
    pub low_risk_tools: BTreeSet<String>,
    /// Substrings that make a path or endpoint high risk.
    pub high_risk_keywords: Vec<String>,
    /// Substrings that make a path or endpoint low risk.
    pub low_risk_keywords: Vec<String>,
}

impl Default for RiskCatalogue {
    fn default() -> Self {
        Self {
            high_risk_tools: set(&["shell"]),
            medium_risk_tools: set(&["file_write", "code_execution"]),
            low_risk_tools: set(&["web_search"]),
            high_risk_keywords: list(&["system", "/etc/", "/var/", "/usr/", "/bin/", "/sbin/"]),
            low_risk_keywords: list(&["read", "public", "readonly"]),
        }
    }
}

impl RiskCatalogue {
    /// Classify a request.
    ///
    /// Unknown tools are medium. Persistent grants of paths or endpoints are
    /// always high. Tool names and keywords match case-insensitively, high
    /// before low.
    #[must_use]
    pub fn assess(&self, request: &ApprovalRequest) -> RiskAssessment {
        RiskAssessment::for_level(self.level_of(request))
    }

    fn level_of(&self, request: &ApprovalRequest) -> RiskLevel {
        let lowered = request.resource.to_lowercase();
        match request.resource_type {
            ResourceType::Tool => {
                if contains_tool(&self.high_risk_tools, &lowered) {
                    RiskLevel::High
                } else if contains_tool(&self.medium_risk_tools, &lowered) {
                    RiskLevel::Medium
                } else if contains_tool(&self.low_risk_tools, &lowered) {
                    RiskLevel::Low
                } else {
                    RiskLevel::Medium
                }
            },
            ResourceType::DataPath | ResourceType::ApiEndpoint => {
                if request.duration_type == DurationType::Persistent {
                    return RiskLevel::High;
                }
                if contains_any(&lowered, &self.high_risk_keywords) {
                    RiskLevel::High
                } else if contains_any(&lowered, &self.low_risk_keywords) {
                    RiskLevel::Low
                } else {
                    RiskLevel::Medium
                }
            },
        }
    }
}

fn contains_tool(tools: &BTreeSet<String>, lowered: &str) -> bool {
    tools.contains(lowered) || tools.iter().any(|t| t.to_lowercase() == lowered)
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|needle| haystack.contains(needle.to_lowercase().as_str()))
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(ToString::to_string).collect()
}

fn list(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}
