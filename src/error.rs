use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not find mapping from issuer code '{code}' to a scheme code for {fund}")]
    Mapping { code: String, fund: String },

    #[error("unable to parse date '{value}' from {origin}, required format dd-mmm-yyyy")]
    DateParse { value: String, origin: String },

    #[error("invalid date range '{value}': {reason}")]
    Range { value: String, reason: &'static str },

    #[error("did not find any .csv file in {}", .0.display())]
    Discovery(PathBuf),

    #[error("sold more units than were held in scheme {scheme} ({excess} units unmatched)")]
    Consistency { scheme: String, excess: f64 },

    #[error("unable to parse {field} '{value}' from {origin}")]
    NumberParse {
        field: &'static str,
        value: String,
        origin: String,
    },

    #[error("missing {field} column in {origin}")]
    MissingField { field: &'static str, origin: String },

    #[error("cannot load scheme map {}: {message}", .path.display())]
    SchemeMap { path: PathBuf, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
