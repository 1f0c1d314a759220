use thiserror::Error;

pub type IcaResult<T> = Result<T, IcaError>;

#[derive(Error, Debug)]
pub enum IcaError {
    #[error("Non-finite numeric value for {what}: {text}")]
    NonFinite { what: &'static str, text: String },
}
