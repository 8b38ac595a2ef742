use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid design reference: {0}")]
    InvalidDesignRef(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CoreError::InvalidDesignRef("not a url".to_string());
        assert!(error.to_string().contains("not a url"));
    }
}
