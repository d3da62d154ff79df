//! Submission orchestrator: intake, then estimation, with observable state.
//!
//! ```text
//! idle --submit--> submitting --intake ok--> submitting --estimate ok--> succeeded
//!                       |                         |
//!                       +--intake err--> failed   +--estimate err--> failed
//! ```
//!
//! Estimation needs the server-normalized order id and text, so the two calls
//! are chained and never overlap. A new submit always restarts at `submitting`.

use std::sync::Arc;

use estimator_core::{
    DraftOrder, EstimateResult, EstimatorError, IntakeResult, OrderId, Result, SubmissionState,
};
use estimator_state::{ObservableState, StateSubscription};
use tokio::sync::{watch, RwLock};
use tracing::{error, info, warn};

use crate::api::{EstimateApi, IntakeApi};
use crate::client::EstimatorClient;

/// Message used when a submission is abandoned mid-flight.
pub const ABORTED_MESSAGE: &str = "Submission aborted before completion";

/// The parts of an intake result that outlive the estimation call.
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeReceipt {
    pub order_id: OrderId,
    pub issues: Vec<String>,
    pub email: Option<String>,
}

impl From<&IntakeResult> for IntakeReceipt {
    fn from(intake: &IntakeResult) -> Self {
        Self {
            order_id: intake.order_id.clone(),
            issues: intake.issues.clone(),
            email: intake.email.clone(),
        }
    }
}

/// Runs one submission attempt at a time and owns [`SubmissionState`].
pub struct SubmissionOrchestrator {
    intake: Arc<dyn IntakeApi>,
    estimate: Arc<dyn EstimateApi>,
    state: ObservableState<SubmissionState>,
    last_intake: RwLock<Option<IntakeReceipt>>,
}

impl SubmissionOrchestrator {
    /// Create an orchestrator over arbitrary requesters. Starts `idle`.
    pub fn new(intake: Arc<dyn IntakeApi>, estimate: Arc<dyn EstimateApi>) -> Self {
        Self {
            intake,
            estimate,
            state: ObservableState::new(SubmissionState::Idle),
            last_intake: RwLock::new(None),
        }
    }

    /// Create an orchestrator backed by one HTTP client.
    pub fn with_client(client: Arc<EstimatorClient>) -> Self {
        Self::new(client.clone(), client)
    }

    /// Current state.
    pub fn state(&self) -> SubmissionState {
        self.state.get()
    }

    /// True while a submission is in flight.
    pub fn is_busy(&self) -> bool {
        self.state.with(SubmissionState::is_busy)
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> StateSubscription<SubmissionState> {
        self.state.subscribe()
    }

    /// Latest-state receiver.
    pub fn watch(&self) -> watch::Receiver<SubmissionState> {
        self.state.watch()
    }

    /// Intake details of the current attempt, once intake has succeeded.
    pub async fn last_intake(&self) -> Option<IntakeReceipt> {
        self.last_intake.read().await.clone()
    }

    /// Submit a draft: intake, then estimation.
    ///
    /// A draft with nothing to submit is rejected with
    /// [`EstimatorError::EmptyDraft`] before any network activity and without
    /// touching the state. Otherwise the attempt always ends in `succeeded` or
    /// `failed`, also when this future is dropped or panics midway.
    pub async fn submit(&self, draft: &DraftOrder) -> Result<EstimateResult> {
        if !draft.can_submit() {
            warn!("Submit rejected: draft has no text and no file");
            return Err(EstimatorError::EmptyDraft);
        }

        *self.last_intake.write().await = None;
        self.state.set(SubmissionState::Submitting);
        info!("Submission started");

        let busy = BusyGuard::new(&self.state);
        let outcome = self.run(draft).await;

        match &outcome {
            Ok(estimate) => {
                info!(decision = %estimate.validation.decision, "Submission succeeded");
                busy.release(SubmissionState::Succeeded(estimate.clone()));
            }
            Err(err) => {
                let message = err.user_message();
                warn!(error = %err, transient = err.is_transient(), "Submission failed");
                busy.release(SubmissionState::Failed(message));
            }
        }

        outcome
    }

    async fn run(&self, draft: &DraftOrder) -> Result<EstimateResult> {
        let intake = self.intake.submit_intake(draft).await?;

        if !intake.issues.is_empty() {
            info!(order_id = %intake.order_id, issues = ?intake.issues, "Intake reported issues");
        }
        *self.last_intake.write().await = Some(IntakeReceipt::from(&intake));

        let customer_email = draft.customer_email().map(str::to_string);
        self.estimate.submit_estimate(intake, customer_email).await
    }
}

/// Moves the state out of `submitting` no matter how the attempt ends.
struct BusyGuard<'a> {
    state: &'a ObservableState<SubmissionState>,
    released: bool,
}

impl<'a> BusyGuard<'a> {
    fn new(state: &'a ObservableState<SubmissionState>) -> Self {
        Self {
            state,
            released: false,
        }
    }

    fn release(mut self, terminal: SubmissionState) {
        self.state.set(terminal);
        self.released = true;
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let aborted = SubmissionState::Failed(ABORTED_MESSAGE.to_string());
        if self.state.replace_if(SubmissionState::is_busy, aborted).is_some() {
            error!("Submission abandoned while in flight");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use estimator_core::{
        DecisionKind, OrderSpec, PricingBreakdown, SpecValue, ValidationOutcome,
    };

    use super::*;

    #[derive(Clone, Copy)]
    enum Behaviour {
        Succeed,
        Fail,
        Panic,
        Hang,
    }

    struct FakeBackend {
        intake_behaviour: Behaviour,
        estimate_behaviour: Behaviour,
        intake_calls: AtomicUsize,
        estimate_calls: AtomicUsize,
        log: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn new(intake_behaviour: Behaviour, estimate_behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                intake_behaviour,
                estimate_behaviour,
                intake_calls: AtomicUsize::new(0),
                estimate_calls: AtomicUsize::new(0),
                log: Mutex::new(Vec::new()),
            })
        }

        fn record(&self, entry: impl Into<String>) {
            self.log.lock().unwrap().push(entry.into());
        }
    }

    fn sample_estimate() -> EstimateResult {
        EstimateResult {
            order_id: Some(OrderId::from("o1")),
            spec: OrderSpec {
                product_type: Some("flyer".to_string()),
                quantity: Some(SpecValue::from(250)),
                ..Default::default()
            },
            pricing: PricingBreakdown {
                process: "digital".to_string(),
                material_cost: 40.0,
                setup_cost: 30.0,
                finishing_cost: 10.0,
                final_price: 120.5,
                ..Default::default()
            },
            validation: ValidationOutcome {
                decision: DecisionKind::AutoApproved,
                issues: vec![],
            },
        }
    }

    async fn act(behaviour: Behaviour) {
        match behaviour {
            Behaviour::Panic => panic!("backend exploded"),
            Behaviour::Hang => futures::future::pending::<()>().await,
            _ => {}
        }
    }

    #[async_trait]
    impl IntakeApi for FakeBackend {
        async fn submit_intake(&self, draft: &DraftOrder) -> Result<IntakeResult> {
            self.intake_calls.fetch_add(1, Ordering::SeqCst);
            self.record("intake:start");
            tokio::task::yield_now().await;
            act(self.intake_behaviour).await;
            self.record("intake:end");
            match self.intake_behaviour {
                Behaviour::Fail => Err(EstimatorError::from_response_body(
                    400,
                    r#"{"detail":"file too large"}"#,
                )),
                _ => Ok(IntakeResult {
                    order_id: OrderId::from("o1"),
                    raw_text: format!("normalized: {}", draft.text.trim()),
                    issues: vec!["low_resolution".to_string()],
                    email: draft.email.clone(),
                }),
            }
        }
    }

    #[async_trait]
    impl EstimateApi for FakeBackend {
        async fn submit_estimate(
            &self,
            intake: IntakeResult,
            customer_email: Option<String>,
        ) -> Result<EstimateResult> {
            self.estimate_calls.fetch_add(1, Ordering::SeqCst);
            self.record(format!(
                "estimate:{}:{}:{}",
                intake.order_id,
                intake.raw_text,
                customer_email.unwrap_or_default()
            ));
            act(self.estimate_behaviour).await;
            match self.estimate_behaviour {
                Behaviour::Fail => Err(EstimatorError::Transport {
                    message: "connection reset".to_string(),
                }),
                _ => Ok(sample_estimate()),
            }
        }
    }

    fn orchestrator(backend: &Arc<FakeBackend>) -> SubmissionOrchestrator {
        SubmissionOrchestrator::new(backend.clone(), backend.clone())
    }

    fn draft() -> DraftOrder {
        DraftOrder::from_text("Print 250 flyers").with_email("a@b.com")
    }

    #[tokio::test]
    async fn test_success_runs_intake_then_estimate() {
        let backend = FakeBackend::new(Behaviour::Succeed, Behaviour::Succeed);
        let orchestrator = orchestrator(&backend);

        let result = orchestrator.submit(&draft()).await.unwrap();

        assert_eq!(result, sample_estimate());
        assert_eq!(
            orchestrator.state(),
            SubmissionState::Succeeded(sample_estimate())
        );
        assert_eq!(
            *backend.log.lock().unwrap(),
            vec![
                "intake:start".to_string(),
                "intake:end".to_string(),
                "estimate:o1:normalized: Print 250 flyers:a@b.com".to_string(),
            ]
        );
        let receipt = orchestrator.last_intake().await.unwrap();
        assert_eq!(receipt.issues, vec!["low_resolution".to_string()]);
    }

    #[tokio::test]
    async fn test_intake_failure_skips_estimate() {
        let backend = FakeBackend::new(Behaviour::Fail, Behaviour::Succeed);
        let orchestrator = orchestrator(&backend);

        let err = orchestrator.submit(&draft()).await.unwrap_err();

        assert_eq!(err.user_message(), "file too large");
        assert_eq!(
            orchestrator.state(),
            SubmissionState::Failed("file too large".to_string())
        );
        assert_eq!(backend.intake_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.estimate_calls.load(Ordering::SeqCst), 0);
        assert!(orchestrator.last_intake().await.is_none());
    }

    #[tokio::test]
    async fn test_estimate_failure_uses_transport_message() {
        let backend = FakeBackend::new(Behaviour::Succeed, Behaviour::Fail);
        let orchestrator = orchestrator(&backend);

        assert!(orchestrator.submit(&draft()).await.is_err());
        assert_eq!(
            orchestrator.state(),
            SubmissionState::Failed("connection reset".to_string())
        );
        assert!(!orchestrator.is_busy());
    }

    #[tokio::test]
    async fn test_empty_draft_never_reaches_network() {
        let backend = FakeBackend::new(Behaviour::Succeed, Behaviour::Succeed);
        let orchestrator = orchestrator(&backend);

        let err = orchestrator
            .submit(&DraftOrder::from_text("   "))
            .await
            .unwrap_err();

        assert_eq!(err, EstimatorError::EmptyDraft);
        assert_eq!(orchestrator.state(), SubmissionState::Idle);
        assert_eq!(backend.intake_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transitions_are_published() {
        let backend = FakeBackend::new(Behaviour::Succeed, Behaviour::Fail);
        let orchestrator = orchestrator(&backend);
        let mut sub = orchestrator.subscribe();

        let _ = orchestrator.submit(&draft()).await;

        let first = sub.next().await.unwrap();
        assert_eq!(first.previous, SubmissionState::Idle);
        assert_eq!(first.current, SubmissionState::Submitting);
        let second = sub.next().await.unwrap();
        assert_eq!(
            second.current,
            SubmissionState::Failed("connection reset".to_string())
        );
        assert!(sub.try_next().is_none());
    }

    #[tokio::test]
    async fn test_resubmit_discards_previous_result() {
        let good = FakeBackend::new(Behaviour::Succeed, Behaviour::Succeed);
        let orchestrator = orchestrator(&good);
        orchestrator.submit(&draft()).await.unwrap();

        let mut sub = orchestrator.subscribe();
        orchestrator.submit(&draft()).await.unwrap();

        let restart = sub.next().await.unwrap();
        assert!(matches!(restart.previous, SubmissionState::Succeeded(_)));
        assert_eq!(restart.current, SubmissionState::Submitting);
        assert_eq!(good.intake_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_panic_releases_busy_state() {
        let backend = FakeBackend::new(Behaviour::Succeed, Behaviour::Panic);
        let orchestrator = Arc::new(orchestrator(&backend));

        let task = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.submit(&draft()).await })
        };

        assert!(task.await.is_err());
        assert_eq!(
            orchestrator.state(),
            SubmissionState::Failed(ABORTED_MESSAGE.to_string())
        );
    }

    #[tokio::test]
    async fn test_dropped_submission_releases_busy_state() {
        let backend = FakeBackend::new(Behaviour::Hang, Behaviour::Succeed);
        let orchestrator = orchestrator(&backend);

        let timed_out =
            tokio::time::timeout(Duration::from_millis(50), orchestrator.submit(&draft())).await;

        assert!(timed_out.is_err());
        assert!(!orchestrator.is_busy());
        assert_eq!(orchestrator.state().error(), Some(ABORTED_MESSAGE));
        assert_eq!(backend.estimate_calls.load(Ordering::SeqCst), 0);
    }
}
