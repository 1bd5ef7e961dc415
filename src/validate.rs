use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::SERVICE_CATEGORIES;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").unwrap());

/// Collects every failed rule instead of stopping at the first one, so the
/// caller can return the complete list in a single 400.
pub fn check_name(errors: &mut Vec<String>, name: &str, field: &str) {
    if name.trim().chars().count() < 2 {
        errors.push(format!("{field} must be at least 2 characters long"));
    }
}

pub fn check_email(errors: &mut Vec<String>, email: &str) {
    if !EMAIL_RE.is_match(email.trim()) {
        errors.push("A valid email address is required".to_string());
    }
}

pub fn check_phone(errors: &mut Vec<String>, phone: &str) {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 10 || digits.len() > 15 {
        errors.push("Phone number must contain 10 to 15 digits".to_string());
    }
}

pub fn check_id(errors: &mut Vec<String>, id: i64, field: &str) {
    if id <= 0 {
        errors.push(format!("{field} must be a positive integer"));
    }
}

pub fn check_date(errors: &mut Vec<String>, date: &str) {
    if !DATE_RE.is_match(date) {
        errors.push("Date must be in YYYY-MM-DD format".to_string());
        return;
    }
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => {
            if parsed < Local::now().date_naive() {
                errors.push("Date must not be in the past".to_string());
            }
        }
        Err(_) => errors.push("Date must be a valid calendar date".to_string()),
    }
}

pub fn check_time(errors: &mut Vec<String>, time: &str) {
    if !TIME_RE.is_match(time) {
        errors.push("Time must be in 24-hour HH:MM format".to_string());
    }
}

pub fn check_category(errors: &mut Vec<String>, category: &str) {
    if !SERVICE_CATEGORIES.contains(&category) {
        errors.push(format!(
            "Category must be one of: {}",
            SERVICE_CATEGORIES.join(", ")
        ));
    }
}

pub fn check_service_ids(errors: &mut Vec<String>, service_ids: &[i64]) {
    if service_ids.is_empty() {
        errors.push("At least one service must be selected".to_string());
    } else if service_ids.iter().any(|id| *id <= 0) {
        errors.push("Service ids must be positive integers".to_string());
    }
}

pub fn check_quantity(errors: &mut Vec<String>, quantity: i64) {
    if quantity <= 0 {
        errors.push("Quantity must be a positive integer".to_string());
    }
}

pub fn check_price(errors: &mut Vec<String>, price: f64, field: &str) {
    if !price.is_finite() || price < 0.0 {
        errors.push(format!("{field} must be a non-negative number"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn run(f: impl FnOnce(&mut Vec<String>)) -> Vec<String> {
        let mut errors = Vec::new();
        f(&mut errors);
        errors
    }

    #[test]
    fn name_shorter_than_two_chars_is_rejected() {
        assert!(!run(|e| check_name(e, "J", "Name")).is_empty());
        assert!(run(|e| check_name(e, "Jo", "Name")).is_empty());
        assert!(!run(|e| check_name(e, "  ", "Name")).is_empty());
    }

    #[test]
    fn email_shapes() {
        assert!(run(|e| check_email(e, "sam@example.com")).is_empty());
        assert!(!run(|e| check_email(e, "not-an-email")).is_empty());
        assert!(!run(|e| check_email(e, "a@b")).is_empty());
        assert!(!run(|e| check_email(e, "a b@c.com")).is_empty());
    }

    #[test]
    fn phone_counts_digits_after_stripping_separators() {
        assert!(run(|e| check_phone(e, "(555) 123-4567")).is_empty());
        assert!(run(|e| check_phone(e, "+1 555 123 4567")).is_empty());
        assert!(!run(|e| check_phone(e, "123-456")).is_empty());
        assert!(!run(|e| check_phone(e, "1234567890123456")).is_empty());
    }

    #[test]
    fn past_dates_are_rejected() {
        let yesterday = (Local::now().date_naive() - Duration::days(1))
            .format("%Y-%m-%d")
            .to_string();
        let tomorrow = (Local::now().date_naive() + Duration::days(1))
            .format("%Y-%m-%d")
            .to_string();
        assert!(!run(|e| check_date(e, &yesterday)).is_empty());
        assert!(run(|e| check_date(e, &tomorrow)).is_empty());
        assert!(!run(|e| check_date(e, "2026-13-40")).is_empty());
        assert!(!run(|e| check_date(e, "26-01-01")).is_empty());
    }

    #[test]
    fn time_must_be_24_hour() {
        assert!(run(|e| check_time(e, "09:30")).is_empty());
        assert!(run(|e| check_time(e, "23:59")).is_empty());
        assert!(!run(|e| check_time(e, "24:00")).is_empty());
        assert!(!run(|e| check_time(e, "9:30")).is_empty());
        assert!(!run(|e| check_time(e, "09:65")).is_empty());
    }

    #[test]
    fn category_is_a_closed_set() {
        assert!(run(|e| check_category(e, "haircut")).is_empty());
        assert!(!run(|e| check_category(e, "massage")).is_empty());
    }

    #[test]
    fn service_ids_non_empty_and_positive() {
        assert!(!run(|e| check_service_ids(e, &[])).is_empty());
        assert!(!run(|e| check_service_ids(e, &[1, 0])).is_empty());
        assert!(run(|e| check_service_ids(e, &[1, 2, 3])).is_empty());
    }

    #[test]
    fn errors_accumulate_instead_of_short_circuiting() {
        let mut errors = Vec::new();
        check_name(&mut errors, "", "Name");
        check_email(&mut errors, "bad");
        check_phone(&mut errors, "1");
        assert_eq!(errors.len(), 3);
    }
}
