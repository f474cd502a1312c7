pub fn validate_email<E: AsRef<str>>(email: E) -> bool {
    validator::validate_email(email.as_ref())
}
