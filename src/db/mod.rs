pub mod adminchatdb;
pub mod alertdb;
pub mod chatdb;
pub mod db;
pub mod otpdb;
pub mod reportdb;
pub mod userdb;
