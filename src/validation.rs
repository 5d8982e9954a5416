use crate::Funnel;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Validation severity level
/// Ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValidationSeverity {
    Info,    // Cosmetic, shown as a hint
    Warning, // Renders, but probably not what the operator meant
    Error,   // Structural invariant broken
}

/// Validation issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub message: String,
    /// Page or component ids involved
    pub affected_ids: Vec<String>,
    pub issue_type: ValidationIssueType,
}

/// Types of validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationIssueType {
    NoPages,
    DuplicatePageId,
    DuplicateComponentId,
    InvalidComponentData,
    ProgressOutOfRange,
    EmptyPage,
}

/// Complete validation result
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Create a new empty validation result
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    /// Add an issue
    pub fn add_issue(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Issues of one severity, in the order they were found
    pub fn with_severity(
        &self,
        severity: ValidationSeverity,
    ) -> impl Iterator<Item = &ValidationIssue> + '_ {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    /// No error-level issues
    pub fn is_valid(&self) -> bool {
        self.with_severity(ValidationSeverity::Error).next().is_none()
    }

    /// Error messages joined into one line, for logs
    pub fn error_summary(&self) -> String {
        self.with_severity(ValidationSeverity::Error)
            .map(|i| i.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validator for funnel documents
pub struct Validator;

impl Validator {
    /// Run all validations on a funnel
    pub fn validate(funnel: &Funnel) -> ValidationResult {
        let mut result = ValidationResult::new();

        if funnel.page_count() == 0 {
            result.add_issue(ValidationIssue {
                severity: ValidationSeverity::Error,
                message: "Funnel has no pages.".to_string(),
                affected_ids: vec![],
                issue_type: ValidationIssueType::NoPages,
            });
        }

        let mut page_ids = HashSet::new();
        let mut component_ids = HashSet::new();

        for page in funnel.pages() {
            if !page_ids.insert(page.id.as_str()) {
                result.add_issue(ValidationIssue {
                    severity: ValidationSeverity::Error,
                    message: format!("Duplicate page id: {}", page.id),
                    affected_ids: vec![page.id.clone()],
                    issue_type: ValidationIssueType::DuplicatePageId,
                });
            }

            if page.progress_percent > 100 {
                result.add_issue(ValidationIssue {
                    severity: ValidationSeverity::Warning,
                    message: format!(
                        "Page '{}' shows {}% progress.",
                        page.title, page.progress_percent
                    ),
                    affected_ids: vec![page.id.clone()],
                    issue_type: ValidationIssueType::ProgressOutOfRange,
                });
            }

            if page.components.is_empty() {
                result.add_issue(ValidationIssue {
                    severity: ValidationSeverity::Info,
                    message: format!("Page '{}' has no components.", page.title),
                    affected_ids: vec![page.id.clone()],
                    issue_type: ValidationIssueType::EmptyPage,
                });
            }

            for component in &page.components {
                if !component_ids.insert(component.id.as_str()) {
                    result.add_issue(ValidationIssue {
                        severity: ValidationSeverity::Error,
                        message: format!("Duplicate component id: {}", component.id),
                        affected_ids: vec![component.id.clone()],
                        issue_type: ValidationIssueType::DuplicateComponentId,
                    });
                }

                if let Err(e) = component.data.check() {
                    result.add_issue(ValidationIssue {
                        severity: ValidationSeverity::Error,
                        message: format!("Component {}: {}", component.id, e),
                        affected_ids: vec![component.id.clone()],
                        issue_type: ValidationIssueType::InvalidComponentData,
                    });
                }
            }
        }

        result
    }
}

/// Extension trait for Funnel to add validation
pub trait ValidatedFunnel {
    /// Validate the funnel
    fn validate(&self) -> ValidationResult;

    /// Highest severity per affected page/component id, for badges in the editor
    fn ids_with_issues(&self, result: &ValidationResult) -> HashMap<String, ValidationSeverity>;
}

impl ValidatedFunnel for Funnel {
    fn validate(&self) -> ValidationResult {
        Validator::validate(self)
    }

    fn ids_with_issues(&self, result: &ValidationResult) -> HashMap<String, ValidationSeverity> {
        let mut ids: HashMap<String, ValidationSeverity> = HashMap::new();

        for issue in &result.issues {
            for id in &issue.affected_ids {
                ids.entry(id.clone())
                    .and_modify(|severity| *severity = (*severity).max(issue.severity))
                    .or_insert(issue.severity);
            }
        }

        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Component, ComponentType, Page, PageKind};

    #[test]
    fn test_starter_is_valid() {
        let result = Validator::validate(&Funnel::starter());
        assert!(result.is_valid());
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_duplicate_component_id() {
        let heading = Component::new(ComponentType::Heading);
        let funnel = Funnel::new(
            "Test",
            vec![
                Page::new(PageKind::Intro, "One").with_components(vec![heading.clone()]),
                Page::new(PageKind::Result, "Two").with_components(vec![heading.clone()]),
            ],
        );

        let result = funnel.validate();
        assert!(!result.is_valid());
        let error = result.with_severity(ValidationSeverity::Error).next().unwrap();
        assert_eq!(error.issue_type, ValidationIssueType::DuplicateComponentId);
        assert_eq!(error.affected_ids, vec![heading.id]);
    }

    #[test]
    fn test_duplicate_page_id() {
        let funnel = Funnel::new(
            "Test",
            vec![
                Page::from_template(PageKind::Intro).with_id("same"),
                Page::from_template(PageKind::Result).with_id("same"),
            ],
        );

        let result = funnel.validate();
        assert!(result
            .with_severity(ValidationSeverity::Error)
            .any(|e| e.issue_type == ValidationIssueType::DuplicatePageId));
        assert_eq!(result.error_summary(), "Duplicate page id: same");
    }

    #[test]
    fn test_empty_page_is_info() {
        let funnel = Funnel::new("Test", vec![Page::new(PageKind::Other, "Blank")]);

        let result = funnel.validate();
        assert!(result.is_valid());
        let info: Vec<_> = result.with_severity(ValidationSeverity::Info).collect();
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].issue_type, ValidationIssueType::EmptyPage);
    }

    #[test]
    fn test_progress_out_of_range_is_warning() {
        let mut page = Page::from_template(PageKind::Question);
        page.progress_percent = 140;
        let funnel = Funnel::new("Test", vec![page]);

        let result = funnel.validate();
        assert!(result.is_valid());
        let warning = result.with_severity(ValidationSeverity::Warning).next().unwrap();
        assert_eq!(warning.issue_type, ValidationIssueType::ProgressOutOfRange);
    }

    #[test]
    fn test_ids_with_issues_keeps_highest_severity() {
        let heading = Component::new(ComponentType::Heading);
        let mut page = Page::new(PageKind::Intro, "One")
            .with_components(vec![heading.clone(), heading.clone()]);
        page.progress_percent = 150;
        let page_id = page.id.clone();
        let funnel = Funnel::new("Test", vec![page]);

        let result = funnel.validate();
        let ids = funnel.ids_with_issues(&result);

        assert_eq!(ids[&heading.id], ValidationSeverity::Error);
        assert_eq!(ids[&page_id], ValidationSeverity::Warning);
    }
}
