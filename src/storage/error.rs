use libsql::errors::Error as TursoError;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Turso error: {0}")]
    Turso(#[from] TursoError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
