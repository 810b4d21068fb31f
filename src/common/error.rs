use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Entrada inválida: {0}")]
    InvalidInput(String),

    #[error("Token ausente")]
    NoToken,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("Cadastro do restaurante pendente")]
    RestaurantPending,

    #[error("Cadastro do restaurante rejeitado")]
    RestaurantRejected,

    #[error("{0} não encontrado")]
    NotFound(String),

    #[error("Saldo insuficiente: disponível {available}, solicitado {requested}")]
    InsufficientBalance { available: i64, requested: i64 },

    #[error("Registro já existe: {0}")]
    AlreadyExists(String),

    // Falha de concorrência (lock/serialização). Seguro repetir do início.
    #[error("Conflito de concorrência: {0}")]
    Conflict(String),

    #[error("Tempo limite da transação excedido")]
    Timeout,

    #[error("Erro de banco de dados")]
    StorageError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientBalance { .. } => StatusCode::BAD_REQUEST,
            AppError::NoToken | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::InvalidToken | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::RestaurantPending | AppError::RestaurantRejected => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            AppError::StorageError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                })
            }
            AppError::InsufficientBalance { available, requested } => json!({
                "error": "Pontos insuficientes para o resgate.",
                "code": "INSUFFICIENT_BALANCE",
                "available": available,
                "requested": requested,
            }),
            AppError::Conflict(_) => json!({
                "error": "Operação concorrente detectada. Tente novamente.",
                "code": "CONFLICT",
            }),
            AppError::NoToken => json!({ "error": "Nenhum token encontrado." }),
            AppError::InvalidToken => json!({ "error": "Falha ao autenticar o token." }),
            AppError::InvalidCredentials => json!({ "error": "E-mail ou senha inválidos." }),
            AppError::RestaurantPending => json!({ "error": "Cadastro pendente de aprovação." }),
            AppError::RestaurantRejected => json!({ "error": "Cadastro rejeitado." }),
            AppError::Timeout => json!({ "error": "A operação excedeu o tempo limite." }),
            ref e @ (AppError::InvalidInput(_)
            | AppError::Forbidden(_)
            | AppError::NotFound(_)
            | AppError::AlreadyExists(_)) => json!({ "error": e.to_string() }),

            // Todos os outros erros viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                json!({ "error": "Ocorreu um erro inesperado." })
            }
        };

        (status, Json(body)).into_response()
    }
}
