use std::{error::Error, fmt::Display};

/// Just an error message from Raincli
#[derive(Debug)]
pub struct RaincliError {
    msg: String,
}

impl Display for RaincliError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.msg)
    }
}

impl Error for RaincliError {}

impl RaincliError {
    pub fn new<S: Into<String>>(msg: S) -> Self {
        RaincliError { msg: msg.into() }
    }
}
