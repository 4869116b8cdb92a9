use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Неверный индекс: {0}")]
    InvalidIndex(usize),

    #[error("{entity} с {field}={value} не найден")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Нет тарифов")]
    Empty,

    #[error("Ошибка работы с БД: {0}")]
    Storage(String),

    #[error("Строка {line}: {message}")]
    Csv { line: usize, message: String },

    #[error("Ошибка ввода-вывода: {0}")]
    Io(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn duplicate() -> Self {
        Self::Conflict("Такой тариф уже существует".to_string())
    }

    pub fn tariff_not_found(id: i32) -> Self {
        Self::NotFound {
            entity: "Тариф",
            field: "id",
            value: id.to_string(),
        }
    }

    pub fn csv(line: usize, msg: impl Into<String>) -> Self {
        Self::Csv {
            line,
            message: msg.into(),
        }
    }

    /// Whether this error was raised by the field checks rather than by storage.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
