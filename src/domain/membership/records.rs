//! Durable membership records.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::email::EmailAddress;

/// A purchasable plan from the membership catalog.
///
/// Read-only within the webhook flow; the catalog is owned elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipPlan {
    pub id: Uuid,
    /// The payment provider's product identifier this plan is sold under.
    pub provider_product_id: String,
    pub name: String,
    /// Tutoring hours included per week.
    pub weekly_hours: i32,
}

/// Role assigned to users created by the reconciliation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Tutor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Tutor => "tutor",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Role::Student),
            "tutor" => Some(Role::Tutor),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// A platform user, keyed by normalized email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: EmailAddress,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with the default role for purchasers.
    pub fn new(email: EmailAddress) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            role: Role::Student,
            created_at: Utc::now(),
        }
    }
}

/// Links a user to a purchased plan.
///
/// `available_hours` is a snapshot of the plan's weekly allotment taken at
/// grant time, never re-derived from the catalog later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipGrant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub available_hours: i32,
    pub created_at: DateTime<Utc>,
}

impl MembershipGrant {
    /// Creates a grant for the given user and plan, snapshotting the plan's
    /// weekly hours.
    pub fn new(user: &User, plan: &MembershipPlan) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user.id,
            plan_id: plan.id,
            available_hours: plan.weekly_hours,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(weekly_hours: i32) -> MembershipPlan {
        MembershipPlan {
            id: Uuid::new_v4(),
            provider_product_id: "prod_123".to_string(),
            name: "Weekly Tutoring".to_string(),
            weekly_hours,
        }
    }

    #[test]
    fn new_user_gets_student_role() {
        let user = User::new(EmailAddress::parse("a@example.com").unwrap());
        assert_eq!(user.role, Role::Student);
    }

    #[test]
    fn role_roundtrips_through_strings() {
        for role in [Role::Student, Role::Tutor, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("estudiante"), None);
    }

    #[test]
    fn grant_snapshots_weekly_hours() {
        let user = User::new(EmailAddress::parse("a@example.com").unwrap());
        let plan = plan(10);

        let grant = MembershipGrant::new(&user, &plan);

        assert_eq!(grant.user_id, user.id);
        assert_eq!(grant.plan_id, plan.id);
        assert_eq!(grant.available_hours, 10);
    }
}
