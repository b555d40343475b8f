use shared_types::AppError;

/// Convert an I/O failure on the snapshot store into an AppError.
pub fn io_to_app_error(err: std::io::Error) -> AppError {
    AppError::storage(err.to_string())
}

/// Convert a JSON (de)serialization failure into an AppError.
pub fn json_to_app_error(err: serde_json::Error) -> AppError {
    AppError::storage(format!("Invalid snapshot data: {err}"))
}

/// Extension trait providing `.into_app_error()` on I/O errors.
pub trait IoErrorExt {
    fn into_app_error(self) -> AppError;
}

impl IoErrorExt for std::io::Error {
    fn into_app_error(self) -> AppError {
        io_to_app_error(self)
    }
}

/// Extension trait providing `.into_app_error()` on serde_json errors.
pub trait JsonErrorExt {
    fn into_app_error(self) -> AppError;
}

impl JsonErrorExt for serde_json::Error {
    fn into_app_error(self) -> AppError {
        json_to_app_error(self)
    }
}

/// Trait for validating request DTOs before processing.
pub trait ValidateRequest {
    fn validate_request(&self) -> Result<(), AppError>;
}

impl<T: validator::Validate> ValidateRequest for T {
    fn validate_request(&self) -> Result<(), AppError> {
        self.validate().map_err(AppError::from)
    }
}
