use super::sendmail::Mailer;

pub fn send_otp_email(
    mailer: &Mailer,
    to_email: &str,
    otp_code: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let subject = "Your verification code";
    let body = format!(
        "Your Boretrack verification code is {}.\n\n\
         It expires in 10 minutes. If you did not request it you can ignore this email.",
        otp_code
    );

    mailer.send(to_email, subject, &body)
}

pub fn send_reset_password_email(
    mailer: &Mailer,
    to_email: &str,
    name: &str,
    reset_token: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let subject = "Reset your password";
    let body = format!(
        "Hi {},\n\n\
         A password reset was requested for your Boretrack account.\n\
         Use this token in the app to set a new password: {}\n\n\
         The token expires in 1 hour. If you did not request a reset you can ignore this email.",
        name, reset_token
    );

    mailer.send(to_email, subject, &body)
}
