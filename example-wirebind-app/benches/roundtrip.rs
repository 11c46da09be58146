use criterion::{Criterion, criterion_group, criterion_main};
use example_wirebind_app::demo_dispatcher;
use example_wirebind_service_definition::user::ListTrackingArg;
use example_wirebind_service_definition::{AccountClient, UserClient};
use futures::{StreamExt, stream::FuturesUnordered};
use std::{hint::black_box, sync::Arc};
use tokio::runtime::Runtime;
use wirebind::{CallContext, SessionId};
use wirebind_tokio_loopback::{LoopbackConfig, connect};

fn bench_roundtrip(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    // Set up server + client once
    let (client, _server) = rt.block_on(async {
        let dispatcher = Arc::new(demo_dispatcher().unwrap());
        connect(dispatcher, LoopbackConfig::default())
    });

    let account = AccountClient::new(client.clone());
    let users = UserClient::new(client);
    let ctx = CallContext::new();

    c.bench_function("has_server_keys_roundtrip_batch_10", |b| {
        b.to_async(&rt).iter(|| async {
            let mut tasks = FuturesUnordered::new();

            for i in 0..10 {
                tasks.push(account.has_server_keys(&ctx, SessionId(i)));
            }

            let mut results = Vec::with_capacity(10);
            while let Some(res) = tasks.next().await {
                results.push(res.unwrap());
            }

            black_box(results);
        });
    });

    c.bench_function("has_server_keys_roundtrip_single", |b| {
        b.to_async(&rt).iter(|| async {
            let res = account.has_server_keys(&ctx, SessionId(1)).await;
            black_box(res.unwrap());
        });
    });

    c.bench_function("list_tracking_roundtrip_single", |b| {
        b.to_async(&rt).iter(|| async {
            let res = users
                .list_tracking(&ctx, ListTrackingArg::default())
                .await;
            black_box(res.unwrap());
        });
    });
}

criterion_group!(benches, bench_roundtrip);
criterion_main!(benches);
