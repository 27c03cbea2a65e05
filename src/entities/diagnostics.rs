use serde::{Deserialize, Serialize};

use crate::entities::Strategy;
use crate::external::optimizer::OptimizerErrorCode;
use crate::validation::{field, Issues, Validate};

/// Solve quality as reported by the optimization engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub strategy: Strategy,
    pub solver: String,
    pub iterations: u64,
    /// Relative optimality gap; 0 means proven optimal.
    pub gap: f64,
    pub fallback_used: bool,
    pub execution_ms: f64,
}

impl Validate for Diagnostics {
    fn collect_issues(&self, path: &str, issues: &mut Issues) {
        issues.check_non_empty(&self.solver, &field(path, "solver"));
        issues.check_range(self.gap, 0.0, 1.0, &field(path, "gap"));
        issues.check_non_negative(self.execution_ms, &field(path, "executionMs"));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    OptimizerFallbackSignaled,
    OptimizerGapExceeded,
    OptimizerError,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackStrategy {
    NearestNeighbor,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationDiagnostics {
    pub optimizer: Option<Diagnostics>,
    pub fallback_used: bool,
    pub fallback_reason: Option<FallbackReason>,
    pub fallback_strategy: Option<FallbackStrategy>,
    pub optimizer_error_code: Option<OptimizerErrorCode>,
}

impl OptimizationDiagnostics {
    pub fn from_optimizer(diagnostics: Diagnostics) -> Self {
        Self {
            optimizer: Some(diagnostics),
            fallback_used: false,
            fallback_reason: None,
            fallback_strategy: None,
            optimizer_error_code: None,
        }
    }

    pub fn fallback(
        reason: FallbackReason,
        optimizer: Option<Diagnostics>,
        optimizer_error_code: Option<OptimizerErrorCode>,
    ) -> Self {
        Self {
            optimizer,
            fallback_used: true,
            fallback_reason: Some(reason),
            fallback_strategy: Some(FallbackStrategy::NearestNeighbor),
            optimizer_error_code,
        }
    }
}

impl Validate for OptimizationDiagnostics {
    fn collect_issues(&self, path: &str, issues: &mut Issues) {
        self.optimizer
            .collect_issues(&field(path, "optimizer"), issues);

        issues.check(
            self.fallback_used == self.fallback_reason.is_some(),
            &field(path, "fallbackReason"),
            "must be set exactly when fallbackUsed is true",
        );
        issues.check(
            self.fallback_used == self.fallback_strategy.is_some(),
            &field(path, "fallbackStrategy"),
            "must be set exactly when fallbackUsed is true",
        );
        issues.check(
            self.optimizer_error_code.is_none()
                || self.fallback_reason == Some(FallbackReason::OptimizerError),
            &field(path, "optimizerErrorCode"),
            "only allowed when the fallback reason is optimizer_error",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_serialize_snake_case() {
        let diagnostics = OptimizationDiagnostics::fallback(
            FallbackReason::OptimizerError,
            None,
            Some(OptimizerErrorCode::Http5xx),
        );

        let json = serde_json::to_value(&diagnostics).unwrap();
        assert_eq!(json["fallbackReason"], "optimizer_error");
        assert_eq!(json["fallbackStrategy"], "nearest_neighbor");
        assert_eq!(json["optimizerErrorCode"], "HTTP_5XX");
        assert!(diagnostics.validate().is_ok());
    }

    #[test]
    fn error_code_without_error_reason_is_rejected() {
        let mut diagnostics = OptimizationDiagnostics::fallback(
            FallbackReason::OptimizerGapExceeded,
            None,
            None,
        );
        diagnostics.optimizer_error_code = Some(OptimizerErrorCode::Timeout);

        assert!(diagnostics.validate().is_err());
    }

    #[test]
    fn fallback_flag_requires_reason() {
        let diagnostics = OptimizationDiagnostics {
            optimizer: None,
            fallback_used: true,
            fallback_reason: None,
            fallback_strategy: None,
            optimizer_error_code: None,
        };

        let err = diagnostics.validate().unwrap_err();
        assert_eq!(err.issues.len(), 2);
    }
}
