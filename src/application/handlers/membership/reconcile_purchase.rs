//! ReconcilePurchaseHandler - command handler for completed purchases.
//!
//! Given a customer email and a product reference, ensures the user and the
//! membership grant exist. The idempotent webhook processor guarantees this
//! handler runs at most once per provider event, so no deduplication happens
//! here.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::membership::{CheckoutDetails, EmailAddress, MembershipGrant};
use crate::domain::webhook::{StripeEvent, StripeEventType, WebhookError, WebhookEventHandler};
use crate::ports::{GrantRepository, IdentityProvider, PlanCatalog, UserRepository};

/// Command to reconcile a completed purchase into membership records.
#[derive(Debug, Clone)]
pub struct ReconcilePurchaseCommand {
    pub customer_email: EmailAddress,
    pub product_reference: String,
}

/// Result of a successful reconciliation.
#[derive(Debug, Clone)]
pub struct GrantOutcome {
    pub user_id: uuid::Uuid,
    pub plan_id: uuid::Uuid,
    pub grant_id: uuid::Uuid,
    pub available_hours: i32,
}

/// Handler that synchronizes a purchase into user + grant records.
pub struct ReconcilePurchaseHandler {
    plan_catalog: Arc<dyn PlanCatalog>,
    user_repository: Arc<dyn UserRepository>,
    grant_repository: Arc<dyn GrantRepository>,
    identity_provider: Arc<dyn IdentityProvider>,
}

impl ReconcilePurchaseHandler {
    pub fn new(
        plan_catalog: Arc<dyn PlanCatalog>,
        user_repository: Arc<dyn UserRepository>,
        grant_repository: Arc<dyn GrantRepository>,
        identity_provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            plan_catalog,
            user_repository,
            grant_repository,
            identity_provider,
        }
    }

    /// Reconcile a purchase.
    ///
    /// # Steps
    ///
    /// 1. Plan lookup - missing plan is a permanent `PlanNotFound` (404);
    ///    nothing has been written yet, so the failure leaves no partial
    ///    state.
    /// 2. User lookup-or-create - a single logical unit backed by the
    ///    storage-layer uniqueness constraint on email.
    /// 3. Identity-provider enrichment - best effort, logged and never
    ///    propagated.
    /// 4. Grant insert - snapshots the plan's weekly hours; storage failures
    ///    here are retryable (5xx) so the provider redelivers.
    pub async fn handle(
        &self,
        cmd: ReconcilePurchaseCommand,
    ) -> Result<GrantOutcome, WebhookError> {
        let plan = self
            .plan_catalog
            .find_by_product_reference(&cmd.product_reference)
            .await?
            .ok_or_else(|| WebhookError::PlanNotFound(cmd.product_reference.clone()))?;

        let user = self.user_repository.find_or_create(&cmd.customer_email).await?;

        // The auth account and the membership record are independent:
        // losing one must not block the other.
        if let Err(e) = self.identity_provider.ensure_account(&cmd.customer_email).await {
            warn!(
                email = %cmd.customer_email,
                error = %e,
                "identity provider enrichment failed, continuing"
            );
        }

        let grant = MembershipGrant::new(&user, &plan);
        self.grant_repository.insert(&grant).await?;

        info!(
            user_id = %user.id,
            plan_id = %plan.id,
            grant_id = %grant.id,
            available_hours = grant.available_hours,
            "membership granted"
        );

        Ok(GrantOutcome {
            user_id: user.id,
            plan_id: plan.id,
            grant_id: grant.id,
            available_hours: grant.available_hours,
        })
    }
}

/// Webhook event handler for `checkout.session.completed`.
///
/// Extracts the purchase details and delegates to the reconciliation
/// handler.
pub struct CheckoutCompletedHandler {
    reconciler: Arc<ReconcilePurchaseHandler>,
}

impl CheckoutCompletedHandler {
    pub fn new(reconciler: Arc<ReconcilePurchaseHandler>) -> Self {
        Self { reconciler }
    }
}

#[async_trait]
impl WebhookEventHandler for CheckoutCompletedHandler {
    fn handles(&self) -> Vec<StripeEventType> {
        vec![StripeEventType::CheckoutSessionCompleted]
    }

    async fn handle(&self, event: &StripeEvent) -> Result<(), WebhookError> {
        let details = CheckoutDetails::from_event(event)?;
        let cmd = ReconcilePurchaseCommand {
            customer_email: details.customer_email,
            product_reference: details.product_reference,
        };
        self.reconciler.handle(cmd).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, ErrorCode};
    use crate::domain::membership::{MembershipPlan, User};
    use crate::domain::webhook::StripeEventBuilder;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use uuid::Uuid;

    // ══════════════════════════════════════════════════════════════
    // Mock Ports
    // ══════════════════════════════════════════════════════════════

    struct MockPlanCatalog {
        plans: Vec<MembershipPlan>,
    }

    impl MockPlanCatalog {
        fn with_plan(plan: MembershipPlan) -> Arc<Self> {
            Arc::new(Self { plans: vec![plan] })
        }

        fn empty() -> Arc<Self> {
            Arc::new(Self { plans: vec![] })
        }
    }

    #[async_trait]
    impl PlanCatalog for MockPlanCatalog {
        async fn find_by_product_reference(
            &self,
            product_reference: &str,
        ) -> Result<Option<MembershipPlan>, DomainError> {
            Ok(self
                .plans
                .iter()
                .find(|p| p.provider_product_id == product_reference)
                .cloned())
        }
    }

    struct MockUserRepository {
        users: Mutex<Vec<User>>,
        creations: AtomicU32,
    }

    impl MockUserRepository {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                users: Mutex::new(Vec::new()),
                creations: AtomicU32::new(0),
            })
        }

        fn with_user(user: User) -> Arc<Self> {
            Arc::new(Self {
                users: Mutex::new(vec![user]),
                creations: AtomicU32::new(0),
            })
        }

        fn creation_count(&self) -> u32 {
            self.creations.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn find_or_create(&self, email: &EmailAddress) -> Result<User, DomainError> {
            let mut users = self.users.lock().unwrap();
            if let Some(user) = users.iter().find(|u| &u.email == email) {
                return Ok(user.clone());
            }
            let user = User::new(email.clone());
            users.push(user.clone());
            self.creations.fetch_add(1, Ordering::SeqCst);
            Ok(user)
        }
    }

    struct MockGrantRepository {
        grants: Mutex<Vec<MembershipGrant>>,
        fail: bool,
    }

    impl MockGrantRepository {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                grants: Mutex::new(Vec::new()),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                grants: Mutex::new(Vec::new()),
                fail: true,
            })
        }

        fn grant_count(&self) -> usize {
            self.grants.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl GrantRepository for MockGrantRepository {
        async fn insert(&self, grant: &MembershipGrant) -> Result<(), DomainError> {
            if self.fail {
                return Err(DomainError::new(ErrorCode::DatabaseError, "insert failed"));
            }
            self.grants.lock().unwrap().push(grant.clone());
            Ok(())
        }
    }

    struct MockIdentityProvider {
        fail: bool,
        calls: AtomicU32,
    }

    impl MockIdentityProvider {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                fail: false,
                calls: AtomicU32::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                fail: true,
                calls: AtomicU32::new(0),
            })
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl IdentityProvider for MockIdentityProvider {
        async fn ensure_account(&self, _email: &EmailAddress) -> Result<(), DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DomainError::new(
                    ErrorCode::DependencyError,
                    "identity provider unavailable",
                ));
            }
            Ok(())
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Test Helpers
    // ══════════════════════════════════════════════════════════════

    fn test_plan() -> MembershipPlan {
        MembershipPlan {
            id: Uuid::new_v4(),
            provider_product_id: "prod_123".to_string(),
            name: "Weekly Tutoring".to_string(),
            weekly_hours: 10,
        }
    }

    fn test_email() -> EmailAddress {
        EmailAddress::parse("a@example.com").unwrap()
    }

    fn handler(
        plans: Arc<MockPlanCatalog>,
        users: Arc<MockUserRepository>,
        grants: Arc<MockGrantRepository>,
        identity: Arc<MockIdentityProvider>,
    ) -> ReconcilePurchaseHandler {
        ReconcilePurchaseHandler::new(plans, users, grants, identity)
    }

    fn command() -> ReconcilePurchaseCommand {
        ReconcilePurchaseCommand {
            customer_email: test_email(),
            product_reference: "prod_123".to_string(),
        }
    }

    // ══════════════════════════════════════════════════════════════
    // ReconcilePurchaseHandler Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn creates_user_and_grant_for_new_customer() {
        let plans = MockPlanCatalog::with_plan(test_plan());
        let users = MockUserRepository::new();
        let grants = MockGrantRepository::new();
        let identity = MockIdentityProvider::new();
        let handler = handler(plans, users.clone(), grants.clone(), identity);

        let outcome = handler.handle(command()).await.unwrap();

        assert_eq!(users.creation_count(), 1);
        assert_eq!(grants.grant_count(), 1);
        assert_eq!(outcome.available_hours, 10);
    }

    #[tokio::test]
    async fn reuses_existing_user() {
        let existing = User::new(test_email());
        let plans = MockPlanCatalog::with_plan(test_plan());
        let users = MockUserRepository::with_user(existing.clone());
        let grants = MockGrantRepository::new();
        let identity = MockIdentityProvider::new();
        let handler = handler(plans, users.clone(), grants, identity);

        let outcome = handler.handle(command()).await.unwrap();

        assert_eq!(users.creation_count(), 0);
        assert_eq!(outcome.user_id, existing.id);
    }

    #[tokio::test]
    async fn unknown_plan_fails_without_writes() {
        let plans = MockPlanCatalog::empty();
        let users = MockUserRepository::new();
        let grants = MockGrantRepository::new();
        let identity = MockIdentityProvider::new();
        let handler = handler(plans, users.clone(), grants.clone(), identity.clone());

        let result = handler.handle(command()).await;

        assert!(matches!(result, Err(WebhookError::PlanNotFound(_))));
        assert_eq!(users.creation_count(), 0);
        assert_eq!(grants.grant_count(), 0);
        assert_eq!(identity.call_count(), 0);
    }

    #[tokio::test]
    async fn identity_failure_does_not_block_grant() {
        let plans = MockPlanCatalog::with_plan(test_plan());
        let users = MockUserRepository::new();
        let grants = MockGrantRepository::new();
        let identity = MockIdentityProvider::failing();
        let handler = handler(plans, users, grants.clone(), identity.clone());

        let result = handler.handle(command()).await;

        assert!(result.is_ok());
        assert_eq!(identity.call_count(), 1);
        assert_eq!(grants.grant_count(), 1);
    }

    #[tokio::test]
    async fn grant_insert_failure_is_retryable() {
        let plans = MockPlanCatalog::with_plan(test_plan());
        let users = MockUserRepository::new();
        let grants = MockGrantRepository::failing();
        let identity = MockIdentityProvider::new();
        let handler = handler(plans, users, grants, identity);

        let result = handler.handle(command()).await;

        match result {
            Err(e) => assert!(e.is_retryable()),
            Ok(_) => panic!("expected grant insert to fail"),
        }
    }

    #[tokio::test]
    async fn grant_snapshots_plan_hours() {
        let mut plan = test_plan();
        plan.weekly_hours = 4;
        let plans = MockPlanCatalog::with_plan(plan);
        let users = MockUserRepository::new();
        let grants = MockGrantRepository::new();
        let identity = MockIdentityProvider::new();
        let handler = handler(plans, users, grants.clone(), identity);

        let outcome = handler.handle(command()).await.unwrap();

        assert_eq!(outcome.available_hours, 4);
        assert_eq!(grants.grants.lock().unwrap()[0].available_hours, 4);
    }

    // ══════════════════════════════════════════════════════════════
    // CheckoutCompletedHandler Tests
    // ══════════════════════════════════════════════════════════════

    fn checkout_handler(
        plans: Arc<MockPlanCatalog>,
        users: Arc<MockUserRepository>,
        grants: Arc<MockGrantRepository>,
        identity: Arc<MockIdentityProvider>,
    ) -> CheckoutCompletedHandler {
        CheckoutCompletedHandler::new(Arc::new(ReconcilePurchaseHandler::new(
            plans, users, grants, identity,
        )))
    }

    #[tokio::test]
    async fn declares_checkout_completed() {
        let handler = checkout_handler(
            MockPlanCatalog::empty(),
            MockUserRepository::new(),
            MockGrantRepository::new(),
            MockIdentityProvider::new(),
        );

        assert_eq!(
            handler.handles(),
            vec![StripeEventType::CheckoutSessionCompleted]
        );
    }

    #[tokio::test]
    async fn extracts_and_reconciles_from_event() {
        let grants = MockGrantRepository::new();
        let handler = checkout_handler(
            MockPlanCatalog::with_plan(test_plan()),
            MockUserRepository::new(),
            grants.clone(),
            MockIdentityProvider::new(),
        );
        let event = StripeEventBuilder::new()
            .object(json!({
                "customer_details": {"email": "a@example.com"},
                "metadata": {"product_id": "prod_123"}
            }))
            .build();

        let result = handler.handle(&event).await;

        assert!(result.is_ok());
        assert_eq!(grants.grant_count(), 1);
    }

    #[tokio::test]
    async fn missing_email_surfaces_as_missing_field() {
        let grants = MockGrantRepository::new();
        let handler = checkout_handler(
            MockPlanCatalog::with_plan(test_plan()),
            MockUserRepository::new(),
            grants.clone(),
            MockIdentityProvider::new(),
        );
        let event = StripeEventBuilder::new()
            .object(json!({"metadata": {"product_id": "prod_123"}}))
            .build();

        let result = handler.handle(&event).await;

        assert!(matches!(result, Err(WebhookError::MissingField(_))));
        assert_eq!(grants.grant_count(), 0);
    }
}
