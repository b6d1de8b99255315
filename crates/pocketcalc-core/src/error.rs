use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("operand is not a finite number")]
    NonFinite,

    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    #[error("square root of negative number: {0}")]
    NegativeRoot(f64),

    #[error("result does not fit the display: {0}")]
    Overflow(f64),

    #[error("display is not a number: {0}")]
    NotANumber(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),
}

pub type CalcResult<T> = Result<T, CalcError>;
