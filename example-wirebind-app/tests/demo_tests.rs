use example_wirebind_app::demo_dispatcher;
use example_wirebind_service_definition::account::names as account_names;
use example_wirebind_service_definition::user::{
    ListTrackingForUidJsonArg, ListTrackingJsonArg, Uid,
};
use example_wirebind_service_definition::{AccountClient, UserClient};
use std::sync::Arc;
use wirebind::{CallContext, MethodType, RpcError, SessionId};
use wirebind_tokio_loopback::{LoopbackConfig, connect};

#[test]
fn demo_dispatcher_serves_all_three_protocols() {
    let dispatcher = demo_dispatcher().unwrap();

    assert_eq!(
        dispatcher.protocol_names().collect::<Vec<_>>(),
        vec!["keybase.1.NotifySession", "keybase.1.account", "keybase.1.user"]
    );
    assert_eq!(dispatcher.len(), 5 + 6 + 2);
    assert_eq!(
        dispatcher.method_type(account_names::qualified::RESET_ACCOUNT),
        Some(MethodType::Call)
    );
}

#[tokio::test]
async fn json_listing_renders_usernames() {
    let dispatcher = Arc::new(demo_dispatcher().unwrap());
    let (client, _server) = connect(dispatcher, LoopbackConfig::default());
    let users = UserClient::new(client);
    let ctx = CallContext::new();

    let json = users
        .list_tracking_json(&ctx, ListTrackingJsonArg::default())
        .await
        .unwrap();
    let usernames: Vec<String> = serde_json::from_str(&json).unwrap();
    assert_eq!(usernames, vec!["chris", "patrick"]);

    let missing = users
        .list_tracking_for_uid_json(
            &ctx,
            ListTrackingForUidJsonArg {
                session_id: SessionId(1),
                filter: String::new(),
                uid: Uid("ffff".into()),
                verbose: true,
            },
        )
        .await;
    assert!(matches!(missing, Err(RpcError::Handler(err)) if err.code == 205));
}

#[tokio::test]
async fn reset_account_clears_server_keys() {
    let dispatcher = Arc::new(demo_dispatcher().unwrap());
    let (client, _server) = connect(dispatcher, LoopbackConfig::default());
    let account = AccountClient::new(client);
    let ctx = CallContext::new();

    assert!(account.has_server_keys(&ctx, SessionId(9)).await.unwrap().has_server_keys);
    account.reset_account(&ctx, SessionId(9)).await.unwrap();
    assert!(!account.has_server_keys(&ctx, SessionId(9)).await.unwrap().has_server_keys);
}
