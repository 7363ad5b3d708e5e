/// Remove the plus sign from a phone number if present, keeping the country
/// code. Provider webhooks deliver numbers as `+91XXXXXXXXXX`; call logs
/// store them without the plus.
pub fn format_phone_number(phone_number: &str) -> String {
    phone_number
        .strip_prefix('+')
        .unwrap_or(phone_number)
        .to_string()
}

/// Format an agent phone number by removing the `+91` prefix.
pub fn format_agent_number(phone_number: &str) -> String {
    let phone_number = phone_number.trim();
    phone_number
        .strip_prefix("+91")
        .unwrap_or(phone_number)
        .to_string()
}

/// Clean a phone number down to the 10-digit subscriber form: drop anything
/// that is not a digit, then a leading `91` country code, then keep the last
/// 10 digits.
pub fn clean_phone_number(phone: &str) -> Option<String> {
    if phone.is_empty() {
        return None;
    }
    let mut cleaned: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if cleaned.starts_with("91") && cleaned.len() > 10 {
        cleaned = cleaned[2..].to_string();
    }
    if cleaned.len() >= 10 {
        Some(cleaned[cleaned.len() - 10..].to_string())
    } else {
        Some(cleaned)
    }
}
