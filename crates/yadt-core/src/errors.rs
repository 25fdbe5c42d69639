use thiserror::Error;
use yadt_core_types::EventId;

/// Result type alias using YadtError
pub type Result<T> = std::result::Result<T, YadtError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code used in log lines, tests and the
/// CLI's error output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input / normalization
    InvalidInput,
    /// A delivered object cannot be normalized into a snapshot
    MalformedSnapshot,
    /// An identity-bearing field is absent or has the wrong type
    MissingField,

    // Output
    Io,
    Serialization,

    // Configuration
    InvalidConfig,

    // Stream plumbing
    /// The delivery channel closed while a producer was still sending
    ChannelClosed,
    /// A change source terminated with an error
    SourceFailed,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::MalformedSnapshot => "ERR_MALFORMED_SNAPSHOT",
            ExErrorKind::MissingField => "ERR_MISSING_FIELD",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::ChannelClosed => "ERR_CHANNEL_CLOSED",
            ExErrorKind::SourceFailed => "ERR_SOURCE_FAILED",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether the failure concerns a single event's input rather than the
    /// output sink or the plumbing around it.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ExErrorKind::InvalidInput | ExErrorKind::MalformedSnapshot | ExErrorKind::MissingField
        )
    }
}

/// Canonical structured error type
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    resource: Option<String>,
    event_id: Option<EventId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            resource: None,
            event_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add resource identity context
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Add the id of the event being processed
    pub fn with_event_id(mut self, event_id: EventId) -> Self {
        self.event_id = Some(event_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the resource identity context, if any
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// Get the event id context, if any
    pub fn event_id(&self) -> Option<&EventId> {
        self.event_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(resource) = &self.resource {
            write!(f, " (resource: {})", resource)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Create an IO error for a failed write or read
pub fn io_error(op: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(op.to_string())
        .with_message(err.to_string())
}

// ========== End Error Facility ==========

/// Domain error taxonomy for the diff core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum YadtError {
    /// Object root is not a mapping, or otherwise unusable as a snapshot
    #[error("Malformed snapshot: {reason}")]
    MalformedSnapshot { reason: String },

    /// Identity-bearing field is missing or not a string
    #[error("Snapshot is missing required field `{field}`")]
    MissingField { field: String },

    /// Bytes are not valid JSON
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },

    /// Writing rendered output failed
    #[error("Output error: {message}")]
    Output { message: String },

    /// Configuration value rejected
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<YadtError> for ExError {
    fn from(err: YadtError) -> Self {
        match err {
            YadtError::MalformedSnapshot { reason } => {
                ExError::new(ExErrorKind::MalformedSnapshot)
                    .with_op("normalize_snapshot")
                    .with_message(reason)
            }

            YadtError::MissingField { field } => ExError::new(ExErrorKind::MissingField)
                .with_op("derive_identity")
                .with_message(format!("required field `{}` is absent or not a string", field)),

            YadtError::InvalidJson { message } => ExError::new(ExErrorKind::InvalidInput)
                .with_op("parse_snapshot")
                .with_message(message),

            YadtError::Output { message } => ExError::new(ExErrorKind::Io)
                .with_op("render")
                .with_message(message),

            YadtError::InvalidConfig { reason } => ExError::new(ExErrorKind::InvalidConfig)
                .with_op("load_config")
                .with_message(reason),

            YadtError::Serialization { message } => ExError::new(ExErrorKind::Serialization)
                .with_message(message),
        }
    }
}

impl From<serde_json::Error> for YadtError {
    fn from(err: serde_json::Error) -> Self {
        YadtError::InvalidJson {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for YadtError {
    fn from(err: std::io::Error) -> Self {
        YadtError::Output {
            message: err.to_string(),
        }
    }
}
