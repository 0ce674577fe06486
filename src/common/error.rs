use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Agent not found: {agent_id}")]
    AgentNotFound { agent_id: i64 },

    #[error("No recorded location for agent: {agent_id}")]
    LocationUnknown { agent_id: i64 },

    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    #[error("Dependency failure: {0}")]
    Dependency(String),

    #[error("Transmission failure: {0}")]
    Transmission(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Event sink error: {0}")]
    EventSink(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
