pub mod alertmodel;
pub mod chatmodels;
pub mod otpmodel;
pub mod usermodel;
