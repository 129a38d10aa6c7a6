mod common;

use common::{ONBOARDING_URL, ScriptedPaymentService};
use provider_onboarding::application::StepOutcome;
use provider_onboarding::application::reauth::{MISSING_ACCOUNT, ReauthAction, ReauthEntry};
use provider_onboarding::application::registration::LINK_FAILED;
use provider_onboarding::domain::identity::AccountId;
use provider_onboarding::domain::route::Route;
use provider_onboarding::infrastructure::in_memory::{Navigation, RecordingNavigator};
use std::sync::Arc;

fn entry(
    account_id: Option<&str>,
    service: &ScriptedPaymentService,
    navigator: &RecordingNavigator,
) -> ReauthEntry {
    ReauthEntry::resolve(
        account_id.map(|id| AccountId::new(id).unwrap()),
        Arc::new(service.clone()),
        Arc::new(navigator.clone()),
    )
}

#[tokio::test]
async fn test_reauthorize_uses_url_account_id() {
    let service = ScriptedPaymentService::new();
    let navigator = RecordingNavigator::new();

    let ReauthEntry::Ready(workflow) = entry(Some("acct_77"), &service, &navigator) else {
        panic!("account id present, expected a ready entry");
    };
    assert!(matches!(
        workflow.reauthorize().await,
        StepOutcome::Redirected(_)
    ));

    assert_eq!(service.create_calls(), 0);
    assert_eq!(service.seen_ids(), vec!["acct_77".to_string()]);
    assert_eq!(
        navigator.history(),
        vec![Navigation::Redirect(ONBOARDING_URL.to_string())]
    );
}

#[tokio::test]
async fn test_reauthorize_failure_sets_session_error() {
    let service = ScriptedPaymentService::new();
    service.fail_link(true);
    let navigator = RecordingNavigator::new();

    let ReauthEntry::Ready(workflow) = entry(Some("acct_77"), &service, &navigator) else {
        panic!("expected a ready entry");
    };
    assert_eq!(
        workflow.reauthorize().await,
        StepOutcome::Failed(LINK_FAILED.to_string())
    );

    let view = workflow.view().await;
    assert_eq!(view.account_id, "acct_77");
    assert_eq!(view.session_error.as_deref(), Some(LINK_FAILED));
    assert!(view.can_reauthorize);
    assert!(navigator.history().is_empty());

    service.fail_link(false);
    assert!(matches!(
        workflow.reauthorize().await,
        StepOutcome::Redirected(_)
    ));
    assert_eq!(workflow.view().await.session_error, None);
}

#[tokio::test]
async fn test_missing_account_only_offers_start_over() {
    let service = ScriptedPaymentService::new();
    let navigator = RecordingNavigator::new();

    let entry = entry(None, &service, &navigator);
    assert_eq!(entry.actions(), &[ReauthAction::StartOver]);
    let ReauthEntry::MissingAccount(missing) = entry else {
        panic!("no account id, expected the missing-account entry");
    };
    assert_eq!(missing.message(), MISSING_ACCOUNT);

    assert_eq!(
        missing.start_over(),
        StepOutcome::Navigated(Route::Registration)
    );
    assert_eq!(service.total_calls(), 0);
    assert_eq!(
        navigator.history(),
        vec![Navigation::Route(Route::Registration)]
    );
}

#[tokio::test]
async fn test_start_over_from_ready_entry() {
    let service = ScriptedPaymentService::new();
    let navigator = RecordingNavigator::new();

    let entry = entry(Some("acct_77"), &service, &navigator);
    assert_eq!(
        entry.actions(),
        &[ReauthAction::Reauthorize, ReauthAction::StartOver]
    );
    assert_eq!(entry.start_over(), StepOutcome::Navigated(Route::Registration));
    assert_eq!(service.total_calls(), 0);
}

#[tokio::test]
async fn test_reauthorize_while_in_flight_is_rejected() {
    let service = ScriptedPaymentService::new();
    service.hold();
    let navigator = RecordingNavigator::new();

    let ReauthEntry::Ready(workflow) = entry(Some("acct_77"), &service, &navigator) else {
        panic!("expected a ready entry");
    };
    let workflow = Arc::new(workflow);

    let first = tokio::spawn({
        let workflow = workflow.clone();
        async move { workflow.reauthorize().await }
    });
    while service.link_calls() == 0 {
        tokio::task::yield_now().await;
    }

    let view = workflow.view().await;
    assert!(view.loading);
    assert!(!view.can_reauthorize);
    assert_eq!(workflow.reauthorize().await, StepOutcome::Busy);

    service.release();
    assert!(matches!(first.await.unwrap(), StepOutcome::Redirected(_)));
    assert_eq!(service.link_calls(), 1);
}
