use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct SendOtpDto {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct VerifyOtpDto {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(length(min = 6, max = 6, message = "OTP must be 6 digits"))]
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_code_must_be_six_characters() {
        let dto = VerifyOtpDto {
            email: "ada@example.com".to_string(),
            code: "12345".to_string(),
        };
        assert!(dto.validate().is_err());

        let dto = VerifyOtpDto {
            email: "ada@example.com".to_string(),
            code: "123456".to_string(),
        };
        assert!(dto.validate().is_ok());
    }
}
