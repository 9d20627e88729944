use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoiError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unknown module: {id}")]
    UnknownModule { id: String },

    #[error("Scenario could not be decoded: {reason}")]
    ScenarioDecodeError { reason: String },

    #[error("Calculation fault in module '{module}': {message}")]
    CalculationFault { module: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Scenario,
    Calculation,
    Io,
    Serialization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RoiError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RoiError::IoError(_) | RoiError::ZipError(_) => ErrorCategory::Io,
            RoiError::CsvError(_) | RoiError::SerializationError(_) => {
                ErrorCategory::Serialization
            }
            RoiError::ConfigValidationError { .. }
            | RoiError::InvalidConfigValueError { .. }
            | RoiError::UnknownModule { .. } => ErrorCategory::Configuration,
            RoiError::ScenarioDecodeError { .. } => ErrorCategory::Scenario,
            RoiError::CalculationFault { .. } => ErrorCategory::Calculation,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 載入失敗時保留現有配置，只是警告
            RoiError::ScenarioDecodeError { .. } => ErrorSeverity::Low,
            RoiError::IoError(_) | RoiError::ZipError(_) => ErrorSeverity::Medium,
            RoiError::ConfigValidationError { .. }
            | RoiError::InvalidConfigValueError { .. }
            | RoiError::UnknownModule { .. }
            | RoiError::CsvError(_)
            | RoiError::SerializationError(_) => ErrorSeverity::High,
            RoiError::CalculationFault { .. } => ErrorSeverity::Critical,
        }
    }

    /// 只有情境解碼錯誤可以在不中斷流程的情況下恢復
    pub fn is_recoverable(&self) -> bool {
        self.severity() == ErrorSeverity::Low
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            RoiError::IoError(_) => "Check that the output directory exists and is writable",
            RoiError::ZipError(_) => "Retry the export or choose a different output format",
            RoiError::CsvError(_) | RoiError::SerializationError(_) => {
                "Report this scenario; the results could not be serialized"
            }
            RoiError::ConfigValidationError { .. } | RoiError::InvalidConfigValueError { .. } => {
                "Fix the highlighted field in the scenario file or command line"
            }
            RoiError::UnknownModule { .. } => {
                "Use one of the catalog module ids (lcs, pulm, renal, ...)"
            }
            RoiError::ScenarioDecodeError { .. } => {
                "The shared scenario link is damaged; the current configuration was kept"
            }
            RoiError::CalculationFault { .. } => {
                "Verify the module inputs are finite numbers; previous results were kept"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RoiError::CalculationFault { module, .. } => format!(
                "A calculation error occurred in '{}'. Please verify your inputs are correct.",
                module
            ),
            RoiError::ScenarioDecodeError { .. } => {
                "Failed to load the shared scenario; keeping the current settings.".to_string()
            }
            RoiError::UnknownModule { id } => format!("There is no module named '{}'.", id),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RoiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_errors_are_recoverable() {
        let err = RoiError::ScenarioDecodeError {
            reason: "bad base64".to_string(),
        };
        assert!(err.is_recoverable());
        assert_eq!(err.category(), ErrorCategory::Scenario);
    }

    #[test]
    fn test_calculation_fault_is_critical() {
        let err = RoiError::CalculationFault {
            module: "renal".to_string(),
            message: "non-finite exposure".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(!err.is_recoverable());
        assert!(err.user_friendly_message().contains("renal"));
    }
}
