mod common;

use common::{accounts, FestLedger, RecordingPresenter};
use festchain_connector::{
    dispatcher::ActionDispatcher,
    presenter::{Binding, Trigger},
    ConnectorError,
};
use std::sync::{atomic::Ordering, Arc};

fn setup(n_accounts: usize) -> (Arc<FestLedger>, ActionDispatcher<FestLedger, RecordingPresenter>) {
    let accounts = accounts(n_accounts);
    let admin = accounts.list_identities()[0].pubkey();
    let ledger = Arc::new(FestLedger::new(admin));
    let dispatcher = ActionDispatcher::new(ledger.clone(), accounts, RecordingPresenter::default());
    (ledger, dispatcher)
}

#[tokio::test]
async fn create_event_is_visible_after_the_automatic_refresh() -> anyhow::Result<()> {
    let (ledger, mut dispatcher) = setup(2);

    dispatcher.create_event("Rock Night", "Nov 25 6pm", 50).await?;

    assert_eq!(ledger.refreshes(), 1);
    let renders = &dispatcher.presenter().renders;
    assert_eq!(renders.len(), 1);
    let record = &renders[0][0];
    assert_eq!(record.id, 0);
    assert_eq!(record.title, "Rock Night");
    assert_eq!(record.date, "Nov 25 6pm");
    assert_eq!(record.capacity, 50);
    assert_eq!(record.registered_count, 0);
    assert_eq!(record.vote_count, 0);
    assert!(record.active);
    Ok(())
}

#[tokio::test]
async fn each_success_triggers_exactly_one_refresh_and_render() -> anyhow::Result<()> {
    let (ledger, mut dispatcher) = setup(2);
    let attendee = dispatcher.accounts().list_identities()[1].pubkey();

    dispatcher.create_event("Rock Night", "Nov 25 6pm", 50).await?;
    dispatcher.accounts_mut().set_active(1)?;
    dispatcher.register_for_event(0).await?;
    dispatcher.vote_for(0).await?;
    dispatcher.accounts_mut().set_active(0)?;
    dispatcher.mark_present(0, attendee).await?;

    assert_eq!(ledger.sends.load(Ordering::SeqCst), 4);
    assert_eq!(ledger.refreshes(), 4);
    assert_eq!(dispatcher.presenter().renders.len(), 4);

    let last = &dispatcher.presenter().renders[3][0];
    assert_eq!(last.registered_count, 1);
    assert_eq!(last.vote_count, 1);
    assert!(ledger.is_present(0, &attendee));
    Ok(())
}

#[tokio::test]
async fn remote_failure_triggers_neither_refresh_nor_render() -> anyhow::Result<()> {
    let (ledger, mut dispatcher) = setup(2);

    // Account 1 is not the admin.
    dispatcher.accounts_mut().set_active(1)?;
    let err = dispatcher
        .create_event("Rock Night", "Nov 25 6pm", 50)
        .await
        .unwrap_err();

    assert!(matches!(err, ConnectorError::RemoteRejection(_)));
    assert_eq!(ledger.refreshes(), 0);
    assert!(dispatcher.presenter().renders.is_empty());
    Ok(())
}

#[tokio::test]
async fn registering_for_a_full_event_is_rejected_and_leaves_it_unchanged() -> anyhow::Result<()> {
    let (ledger, mut dispatcher) = setup(2);
    ledger.seed("Sold Out", 3, 3);

    let before = dispatcher.load_events().await?;
    dispatcher.accounts_mut().set_active(1)?;
    let err = dispatcher.register_for_event(0).await.unwrap_err();
    assert!(matches!(err, ConnectorError::RemoteRejection(_)));

    let after = dispatcher.load_events().await?;
    assert_eq!(before, after);
    assert_eq!(after[0].registered_count, after[0].capacity);
    Ok(())
}

#[tokio::test]
async fn connectivity_failure_is_surfaced_without_render() {
    let (ledger, mut dispatcher) = setup(1);
    ledger.set_offline(true);

    let err = dispatcher.vote_for(0).await.unwrap_err();
    assert!(matches!(err, ConnectorError::Connectivity(_)));
    assert!(dispatcher.presenter().renders.is_empty());
}

#[tokio::test]
async fn operations_are_not_idempotent_at_this_layer() -> anyhow::Result<()> {
    let (ledger, mut dispatcher) = setup(1);

    dispatcher.create_event("Twice", "now", 5).await?;
    dispatcher.create_event("Twice", "now", 5).await?;

    assert_eq!(ledger.sends.load(Ordering::SeqCst), 2);
    assert_eq!(dispatcher.presenter().renders[1].len(), 2);
    Ok(())
}

#[tokio::test]
async fn load_events_on_empty_ledger_renders_an_empty_presentation() -> anyhow::Result<()> {
    let (_, mut dispatcher) = setup(1);
    let records = dispatcher.load_events().await?;
    assert!(records.is_empty());
    assert_eq!(dispatcher.presenter().renders, vec![Vec::new()]);
    Ok(())
}

#[tokio::test]
async fn bindings_dispatch_to_register_and_vote() -> anyhow::Result<()> {
    let (ledger, mut dispatcher) = setup(2);
    dispatcher.create_event("Jazz", "Dec 1", 10).await?;
    dispatcher.accounts_mut().set_active(1)?;

    dispatcher
        .trigger(Binding {
            trigger: Trigger::Register,
            event_id: 0,
        })
        .await?;
    dispatcher.trigger("vote:0".parse().unwrap()).await?;

    let last = dispatcher.presenter().renders.last().unwrap();
    assert_eq!(last[0].registered_count, 1);
    assert_eq!(last[0].vote_count, 1);
    assert_eq!(ledger.sends.load(Ordering::SeqCst), 3);
    Ok(())
}

#[tokio::test]
async fn failed_refresh_after_successful_send_is_reported_as_sync_error() -> anyhow::Result<()> {
    let (ledger, mut dispatcher) = setup(1);
    ledger.fail_fetch_at(Some(0));

    let err = dispatcher.create_event("Flaky", "soon", 1).await.unwrap_err();

    assert!(matches!(err, ConnectorError::Sync(_)));
    assert_eq!(ledger.sends.load(Ordering::SeqCst), 1);
    assert!(dispatcher.presenter().renders.is_empty());
    Ok(())
}
