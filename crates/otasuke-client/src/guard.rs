//! Page access decisions for a signed-in (or anonymous) user.

use crate::models::{UserResponse, UserRole};
use crate::navigation::DEFAULT_LOGIN_PATH;

/// Where a contractor without a company is sent to register one.
pub const COMPANY_SETUP_PATH: &str = "/companies/me";

/// Snapshot of the session state a guard decision is based on.
#[derive(Debug, Clone, Copy)]
pub struct GuardContext<'a> {
    /// Session bootstrap has not finished yet.
    pub loading: bool,
    pub user: Option<&'a UserResponse>,
    pub has_company: bool,
    /// Path of the page being guarded.
    pub current_path: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Nothing can be decided until the session is loaded.
    Pending,
    /// Send the user elsewhere.
    Redirect(String),
    Allow,
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    fn redirect(path: &str) -> Self {
        Self::Redirect(path.to_string())
    }
}

/// Decide whether the page at `ctx.current_path` may be shown.
///
/// Contractors must register a company before anything else; a user whose
/// role does not match `required_role` is sent to their own landing page.
pub fn evaluate(ctx: &GuardContext<'_>, required_role: Option<UserRole>) -> GuardDecision {
    if ctx.loading {
        return GuardDecision::Pending;
    }

    let Some(user) = ctx.user else {
        return GuardDecision::redirect(DEFAULT_LOGIN_PATH);
    };

    if user.role == UserRole::Contractor
        && !ctx.has_company
        && ctx.current_path != COMPANY_SETUP_PATH
    {
        return GuardDecision::redirect(COMPANY_SETUP_PATH);
    }

    match required_role {
        Some(role) if role != user.role => GuardDecision::redirect(user.role.home_path()),
        _ => GuardDecision::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    fn user(role: UserRole) -> UserResponse {
        UserResponse {
            id: Uuid::nil(),
            email: "user@example.com".into(),
            role,
            is_active: true,
        }
    }

    fn ctx<'a>(user: Option<&'a UserResponse>, has_company: bool, path: &'a str) -> GuardContext<'a> {
        GuardContext {
            loading: false,
            user,
            has_company,
            current_path: path,
        }
    }

    #[test]
    fn test_loading_is_pending() {
        let context = GuardContext {
            loading: true,
            ..ctx(None, false, "/projects")
        };
        assert_eq!(evaluate(&context, None), GuardDecision::Pending);
    }

    #[test]
    fn test_anonymous_goes_to_login() {
        assert_eq!(
            evaluate(&ctx(None, false, "/projects"), None),
            GuardDecision::Redirect("/login".into())
        );
    }

    #[rstest]
    #[case("/projects", GuardDecision::Redirect("/companies/me".into()))]
    #[case("/companies/me", GuardDecision::Allow)]
    fn test_contractor_without_company(#[case] path: &str, #[case] expected: GuardDecision) {
        let contractor = user(UserRole::Contractor);
        assert_eq!(evaluate(&ctx(Some(&contractor), false, path), None), expected);
    }

    #[test]
    fn test_subcontractor_needs_no_company() {
        let sub = user(UserRole::Subcontractor);
        assert!(evaluate(&ctx(Some(&sub), false, "/browse"), None).is_allowed());
    }

    #[rstest]
    #[case(UserRole::Subcontractor, UserRole::Contractor, "/browse")]
    #[case(UserRole::Contractor, UserRole::Subcontractor, "/projects")]
    fn test_role_mismatch_redirects_home(
        #[case] actual: UserRole,
        #[case] required: UserRole,
        #[case] home: &str,
    ) {
        let account = user(actual);
        assert_eq!(
            evaluate(&ctx(Some(&account), true, "/dashboard"), Some(required)),
            GuardDecision::Redirect(home.into())
        );
    }

    #[test]
    fn test_matching_role_allowed() {
        let contractor = user(UserRole::Contractor);
        assert!(
            evaluate(&ctx(Some(&contractor), true, "/projects/new"), Some(UserRole::Contractor))
                .is_allowed()
        );
    }
}
