//! Client-side checks run before a request body leaves the process.
//!
//! A failed check surfaces as [`ApiError::Validation`] and no request is sent.

use crate::error::{ApiError, Result};
use crate::models::{
    DirectOrderCreate, LoginRequest, ProjectCreate, ProjectUpdate, QuoteCreate, RegisterRequest,
    ReviewCreate, UserRole,
};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Registration input including the password confirmation field.
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub role: UserRole,
}

impl RegisterForm {
    pub fn into_request(self) -> RegisterRequest {
        RegisterRequest {
            email: self.email,
            password: self.password,
            role: self.role,
        }
    }
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<()> {
        check_email(&self.email)?;
        if self.password.is_empty() {
            return Err(ApiError::validation("password is required"));
        }
        Ok(())
    }
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<()> {
        check_email(&self.email)?;
        check_password(&self.password)
    }
}

impl Validate for RegisterForm {
    fn validate(&self) -> Result<()> {
        check_email(&self.email)?;
        check_password(&self.password)?;
        if self.password != self.password_confirm {
            return Err(ApiError::validation("passwords do not match"));
        }
        Ok(())
    }
}

impl Validate for ProjectCreate {
    fn validate(&self) -> Result<()> {
        check_title(&self.title)?;
        check_budget(self.budget_min, self.budget_max)
    }
}

impl Validate for ProjectUpdate {
    fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            check_title(title)?;
        }
        check_budget(self.budget_min, self.budget_max)
    }
}

impl Validate for QuoteCreate {
    fn validate(&self) -> Result<()> {
        if self.amount <= 0 {
            return Err(ApiError::validation("amount must be positive"));
        }
        if matches!(self.estimated_days, Some(days) if days <= 0) {
            return Err(ApiError::validation("estimated days must be positive"));
        }
        Ok(())
    }
}

impl Validate for ReviewCreate {
    fn validate(&self) -> Result<()> {
        if !(1..=5).contains(&self.rating) {
            return Err(ApiError::validation("rating must be between 1 and 5"));
        }
        Ok(())
    }
}

impl Validate for DirectOrderCreate {
    fn validate(&self) -> Result<()> {
        check_title(&self.title)?;
        if self.amount <= 0 {
            return Err(ApiError::validation("amount must be positive"));
        }
        Ok(())
    }
}

fn check_email(email: &str) -> Result<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ApiError::validation("invalid email address"))
    }
}

fn check_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn check_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(ApiError::validation("title is required"));
    }
    Ok(())
}

fn check_budget(min: Option<i64>, max: Option<i64>) -> Result<()> {
    if min.is_some_and(|v| v <= 0) || max.is_some_and(|v| v <= 0) {
        return Err(ApiError::validation("budget must be positive"));
    }
    if let (Some(min), Some(max)) = (min, max)
        && min > max
    {
        return Err(ApiError::validation(
            "minimum budget must not exceed maximum budget",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[rstest]
    #[case("user@example.com", true)]
    #[case("first.last@sub.example.co.jp", true)]
    #[case("", false)]
    #[case("no-at-sign", false)]
    #[case("@example.com", false)]
    #[case("user@", false)]
    #[case("user@localhost", false)]
    #[case("user@example.", false)]
    #[case("us er@example.com", false)]
    #[case("a@b@example.com", false)]
    fn test_email_format(#[case] email: &str, #[case] valid: bool) {
        assert_eq!(login(email, "secret").validate().is_ok(), valid, "{email}");
    }

    #[test]
    fn test_login_requires_password() {
        let err = login("user@example.com", "").validate().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[rstest]
    #[case("short", "short", false)]
    #[case("longenough", "longenough", true)]
    #[case("longenough", "different!", false)]
    fn test_register_form(#[case] password: &str, #[case] confirm: &str, #[case] valid: bool) {
        let form = RegisterForm {
            email: "user@example.com".into(),
            password: password.into(),
            password_confirm: confirm.into(),
            role: UserRole::Contractor,
        };
        assert_eq!(form.validate().is_ok(), valid);
    }

    #[test]
    fn test_register_form_into_request() {
        let form = RegisterForm {
            email: "sub@example.com".into(),
            password: "password1".into(),
            password_confirm: "password1".into(),
            role: UserRole::Subcontractor,
        };
        let request = form.into_request();
        assert_eq!(request.role, UserRole::Subcontractor);
        assert!(request.validate().is_ok());
    }

    #[rstest]
    #[case("Roof repair", None, None, true)]
    #[case("  ", None, None, false)]
    #[case("Roof repair", Some(0), None, false)]
    #[case("Roof repair", None, Some(-5), false)]
    #[case("Roof repair", Some(100), Some(50), false)]
    #[case("Roof repair", Some(50), Some(100), true)]
    fn test_project_create(
        #[case] title: &str,
        #[case] budget_min: Option<i64>,
        #[case] budget_max: Option<i64>,
        #[case] valid: bool,
    ) {
        let project = ProjectCreate {
            title: title.into(),
            budget_min,
            budget_max,
            ..Default::default()
        };
        assert_eq!(project.validate().is_ok(), valid);
    }

    #[test]
    fn test_project_update_allows_partial() {
        assert!(ProjectUpdate::default().validate().is_ok());
        let blank = ProjectUpdate {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(blank.validate().is_err());
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(5, true)]
    #[case(6, false)]
    fn test_review_rating_range(#[case] rating: u8, #[case] valid: bool) {
        let review = ReviewCreate {
            rating,
            comment: None,
        };
        assert_eq!(review.validate().is_ok(), valid);
    }

    #[rstest]
    #[case(0, None, false)]
    #[case(10_000, None, true)]
    #[case(10_000, Some(0), false)]
    #[case(10_000, Some(14), true)]
    fn test_quote_create(#[case] amount: i64, #[case] days: Option<i32>, #[case] valid: bool) {
        let quote = QuoteCreate {
            amount,
            message: None,
            estimated_days: days,
        };
        assert_eq!(quote.validate().is_ok(), valid);
    }

    #[test]
    fn test_direct_order_requires_title_and_amount() {
        let mut order = DirectOrderCreate {
            title: "Interior finish".into(),
            description: None,
            location: None,
            amount: 500_000,
            deadline: None,
            specialty_id: None,
            subcontractor_company_id: uuid::Uuid::nil(),
        };
        assert!(order.validate().is_ok());

        order.amount = 0;
        assert!(order.validate().is_err());

        order.amount = 1;
        order.title = String::new();
        assert!(order.validate().is_err());
    }
}
