//! Weight-sum validation for criteria templates and target parameters
//!
//! Validation is synchronous, deterministic, and side-effect-free; failures
//! are returned as a structured report for UI display, never as an error.

use super::{CriteriaTemplate, ParameterType, TargetParameter};

/// Default tolerance for weight sums. The editing UI works in whole
/// percentage points, so anything further than half a point from 100 is a
/// real inconsistency rather than rounding noise.
pub const DEFAULT_WEIGHT_TOLERANCE: f64 = 0.5;

/// Structured validation outcome, intended for direct UI display
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self { is_valid: errors.is_empty(), errors }
    }
}

/// Validates that enabled weights sum to 100 at each level of a template,
/// within a single canonical tolerance.
#[derive(Debug, Clone, Copy)]
pub struct WeightValidator {
    tolerance: f64,
}

impl Default for WeightValidator {
    fn default() -> Self {
        Self { tolerance: DEFAULT_WEIGHT_TOLERANCE }
    }
}

impl WeightValidator {
    /// Create a validator with a custom tolerance
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Validate a full template: enabled category weights must sum to 100,
    /// and within each enabled category the enabled subcategory weights must
    /// sum to 100. Runs in one pass over categories + subcategories.
    pub fn validate_template(&self, template: &CriteriaTemplate) -> ValidationReport {
        let mut errors = Vec::new();

        let category_total: f64 = template.enabled_categories().map(|c| c.weight).sum();
        if (category_total - 100.0).abs() > self.tolerance {
            errors.push(format!(
                "Enabled category weights sum to {:.1}%, expected 100%",
                category_total
            ));
        }

        for category in template.enabled_categories() {
            let sub_total: f64 = category.enabled_subcategories().map(|s| s.weight).sum();
            if (sub_total - 100.0).abs() > self.tolerance {
                errors.push(format!(
                    "Subcategory weights in \"{}\" sum to {:.1}%, expected 100%",
                    category.name, sub_total
                ));
            }
        }

        ValidationReport::from_errors(errors)
    }

    /// Validate target parameters: for each parameter type with at least one
    /// enabled entry, the enabled weights must sum to 100 independently.
    pub fn validate_target_parameters(&self, parameters: &[TargetParameter]) -> ValidationReport {
        let mut errors = Vec::new();

        for param_type in [ParameterType::Sector, ParameterType::Stage, ParameterType::Geography] {
            let enabled: Vec<&TargetParameter> = parameters
                .iter()
                .filter(|p| p.param_type == param_type && p.enabled)
                .collect();
            if enabled.is_empty() {
                continue;
            }

            let total: f64 = enabled.iter().map(|p| p.weight).sum();
            if (total - 100.0).abs() > self.tolerance {
                errors.push(format!(
                    "Enabled {} weights sum to {:.1}%, expected 100%",
                    param_type.as_str(),
                    total
                ));
            }
        }

        ValidationReport::from_errors(errors)
    }
}
