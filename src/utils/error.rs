use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP client error: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Parse error{}: {message}", .line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError { line: Option<u64>, message: String },

    #[error("Row/result misalignment: {rows} rows but {results} lookup results")]
    AlignmentError { rows: usize, results: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    Storage,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 依嚴重程度決定 CLI 退出碼
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            EtlError::ValidationError { .. } | EtlError::ParseError { .. } => ErrorCategory::Input,
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::IoError(_) | EtlError::CsvError(_) => ErrorCategory::Storage,
            EtlError::AlignmentError { .. } => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    /// 輸入或設定錯誤，呼叫端可以修正後重試
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Input | ErrorCategory::Configuration
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::MissingConfigError { field } => {
                format!("Required setting '{}' is not set", field)
            }
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            EtlError::ValidationError { message } => message.clone(),
            EtlError::ParseError { .. } => format!("The uploaded table could not be read. {}", self),
            EtlError::IoError(e) => format!("File access failed: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::MissingConfigError { .. } => {
                "Set GOOGLE_MAPS_API_KEY in the environment or in a .env file"
            }
            EtlError::InvalidConfigValueError { .. } | EtlError::ConfigValidationError { .. } => {
                "Check the command line flags or the TOML configuration values"
            }
            EtlError::ValidationError { .. } => {
                "Make sure the CSV header includes both `origin` and `destination` columns"
            }
            EtlError::ParseError { .. } | EtlError::CsvError(_) => {
                "Check that the file is UTF-8 delimited text with the same number of fields on every line"
            }
            EtlError::IoError(_) => "Check that the input file exists and the output directory is writable",
            EtlError::ApiError(_) => "Check network access and TLS configuration",
            EtlError::AlignmentError { .. } => {
                "This is a bug; please report it with the input file"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
