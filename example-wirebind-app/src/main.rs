use example_wirebind_app::demo_dispatcher;
use example_wirebind_service_definition::account::EmailChangeArg;
use example_wirebind_service_definition::user::{ListTrackingArg, ListTrackingForUsernameArg};
use example_wirebind_service_definition::{AccountClient, NotifySessionClient, UserClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::join;
use tracing_subscriber::EnvFilter;
use wirebind::{CallContext, SessionId};
use wirebind_tokio_loopback::{LoopbackConfig, connect};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let dispatcher = Arc::new(demo_dispatcher()?);
    tracing::info!(methods = ?dispatcher.method_names(), "dispatcher ready");

    let (client, server) = connect(
        dispatcher,
        LoopbackConfig::default().with_default_call_timeout(Duration::from_secs(5)),
    );

    let account = AccountClient::new(client.clone());
    let users = UserClient::new(client.clone());
    let notify = NotifySessionClient::new(client.clone());

    let ctx = CallContext::new();
    let session_id = SessionId(1);

    notify.logged_in(&ctx, "max").await?;

    // `join!` will await all responses before proceeding
    let (keys, tracking, tracking_of_chris) = join!(
        account.has_server_keys(&ctx, session_id),
        users.list_tracking(
            &ctx,
            ListTrackingArg {
                session_id,
                filter: String::new(),
            }
        ),
        users.list_tracking_for_username(
            &ctx,
            ListTrackingForUsernameArg {
                session_id,
                filter: String::new(),
                username: "chris".into(),
            }
        ),
    );

    println!("hasServerKeys: {:?}", keys?);
    for entry in tracking? {
        println!(
            "max tracks {} (sig {}, {} proof(s))",
            entry.username,
            entry.sig_id_display,
            entry.proofs.social.len()
        );
    }
    println!("chris tracks: {:?}", tracking_of_chris?);

    // Handler errors come back as values; the connection keeps serving.
    match account
        .email_change(
            &ctx,
            EmailChangeArg {
                session_id,
                new_email: "not-an-email".into(),
            },
        )
        .await
    {
        Ok(()) => println!("emailChange unexpectedly accepted"),
        Err(err) => println!("emailChange rejected: {err}"),
    }

    notify.logged_out(&ctx).await?;

    server.shutdown();
    Ok(())
}
