use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplError {
    #[error("No se pudo leer el archivo '{}': {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error al generar JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Opción desconocida: {0}")]
    UnknownSetting(String),

    #[error("Valor '{value}' no válido para '{key}'")]
    InvalidSetting { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, ReplError>;
