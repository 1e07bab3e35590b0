use std::error::Error;
use std::fmt;

pub type CamposeResult<T> = Result<T, CamposeError>;

#[derive(Debug, PartialEq)]
pub enum CamposeError {
    /// A direction that had to be normalized was too short.
    DegenerateVector(&'static str),
    /// Flag and the text that failed to parse as a number.
    InvalidNumber(String, String),
    MissingValue(String),
    UnknownFlag(String),
    InvalidSteps(String),
}
impl fmt::Display for CamposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CamposeError::DegenerateVector(what) => {
                write!(f, "
                    \rDegenerate {what}: length is too close to zero",
                )
            }
            CamposeError::InvalidNumber(flag, arg) => {
                write!(f, "
                    \rInvalid value for {flag}: {arg}",
                )
            }
            CamposeError::MissingValue(flag) => {
                write!(f, "
                    \rMissing value for {flag}",
                )
            }
            CamposeError::UnknownFlag(arg) => {
                write!(f, "
                    \rUnknown argument {arg}",
                )
            }
            CamposeError::InvalidSteps(arg) => {
                write!(f, "
                    \rInvalid step count {arg}: at least 2 steps are needed",
                )
            }
        }
    }
}
impl Error for CamposeError {}
