mod common;

use common::*;
use std::sync::Arc;
use wirebind::protocol::{
    ArgDecoder, ContainerError, DecodedArgs, ErasedHandler, decode_result, encode_arg_container,
};
use wirebind::{
    CallContext, Dispatcher, HandlerError, MethodDescriptor, MethodRegistrar, MethodTable,
    MethodType, Protocol, RegistrationError, RpcError,
};

fn acct_dispatcher() -> (Arc<Recorder>, Dispatcher) {
    let recorder = Arc::new(Recorder::default());
    let dispatcher = Dispatcher::new()
        .with_protocol(acct_protocol(recorder.clone()).unwrap())
        .unwrap();
    (recorder, dispatcher)
}

async fn has_server_keys(
    dispatcher: &Dispatcher,
    session_id: i32,
) -> Result<HasServerKeysRes, RpcError> {
    let args = encode_arg_container(&HasServerKeysArg { session_id }).unwrap();
    let bytes = dispatcher
        .dispatch(CallContext::new(), HAS_SERVER_KEYS, &args)
        .await?
        .expect("call methods always produce a result");
    Ok(decode_result(&bytes).unwrap())
}

#[tokio::test]
async fn dispatches_has_server_keys_once_with_decoded_session_id() {
    let (recorder, dispatcher) = acct_dispatcher();

    let res = has_server_keys(&dispatcher, 42).await.unwrap();

    assert_eq!(res, HasServerKeysRes { has_server_keys: true });
    assert_eq!(recorder.session_ids(), vec![42]);
}

#[tokio::test]
async fn bare_record_fails_decode_and_server_keeps_serving() {
    let (recorder, dispatcher) = acct_dispatcher();

    let bare = rmp_serde::to_vec_named(&HasServerKeysArg { session_id: 42 }).unwrap();
    let result = dispatcher
        .dispatch(CallContext::new(), HAS_SERVER_KEYS, &bare)
        .await;

    assert!(matches!(
        result,
        Err(RpcError::ArgumentDecode { ref method, .. }) if method == HAS_SERVER_KEYS
    ));
    assert!(recorder.session_ids().is_empty());

    assert!(has_server_keys(&dispatcher, 7).await.is_ok());
    assert_eq!(recorder.session_ids(), vec![7]);
}

#[tokio::test]
async fn trailing_bytes_after_the_container_fail_decode() {
    let (recorder, dispatcher) = acct_dispatcher();

    let mut args = encode_arg_container(&HasServerKeysArg { session_id: 42 }).unwrap();
    args.extend_from_slice(&[0xc3, 0xc3, 0xc3, 0xff]);

    let result = dispatcher
        .dispatch(CallContext::new(), HAS_SERVER_KEYS, &args)
        .await;

    assert!(matches!(result, Err(RpcError::ArgumentDecode { .. })));
    assert!(recorder.session_ids().is_empty());
}

#[tokio::test]
async fn unknown_method_leaves_dispatcher_serving() {
    let (_recorder, dispatcher) = acct_dispatcher();

    let args = encode_arg_container(&HasServerKeysArg { session_id: 1 }).unwrap();
    let result = dispatcher
        .dispatch(CallContext::new(), "acct.1.nope", &args)
        .await;

    assert_eq!(
        result,
        Err(RpcError::UnknownMethod {
            method: "acct.1.nope".into()
        })
    );
    assert!(has_server_keys(&dispatcher, 1).await.is_ok());
}

#[tokio::test]
async fn extra_fields_are_rejected() {
    #[derive(serde::Serialize)]
    struct Padded {
        #[serde(rename = "sessionID")]
        session_id: i32,
        admin: bool,
    }

    let (_recorder, dispatcher) = acct_dispatcher();
    let args = encode_arg_container(&Padded {
        session_id: 1,
        admin: true,
    })
    .unwrap();

    let result = dispatcher
        .dispatch(CallContext::new(), HAS_SERVER_KEYS, &args)
        .await;

    assert!(matches!(result, Err(RpcError::ArgumentDecode { .. })));
}

#[tokio::test]
async fn notify_produces_no_result() {
    let (recorder, dispatcher) = acct_dispatcher();

    let args = encode_arg_container(&LoggedOutArg {}).unwrap();
    let result = dispatcher
        .dispatch(CallContext::new(), LOGGED_OUT, &args)
        .await;

    assert_eq!(result, Ok(None));
    assert_eq!(recorder.logouts(), 1);
}

#[tokio::test]
async fn handler_errors_propagate_verbatim() {
    let (_recorder, dispatcher) = acct_dispatcher();

    let args = encode_arg_container(&HasServerKeysArg { session_id: 9 }).unwrap();
    let result = dispatcher.dispatch(CallContext::new(), FAIL, &args).await;

    assert_eq!(
        result,
        Err(RpcError::Handler(HandlerError::with_code(
            218,
            "session 9 is not logged in"
        )))
    );
}

#[tokio::test]
async fn cancelled_context_skips_the_handler() {
    let (recorder, dispatcher) = acct_dispatcher();
    let ctx = CallContext::new();
    ctx.cancel();

    let args = encode_arg_container(&HasServerKeysArg { session_id: 3 }).unwrap();
    let result = dispatcher.dispatch(ctx, HAS_SERVER_KEYS, &args).await;

    assert_eq!(result, Err(RpcError::Cancelled));
    assert!(recorder.session_ids().is_empty());
}

fn decode_wrong_type(_bytes: &[u8]) -> Result<DecodedArgs, ContainerError> {
    Ok(DecodedArgs::new(String::from("not an argument record")))
}

#[tokio::test]
async fn mismatched_decoded_type_becomes_type_assertion() {
    let protocol = Protocol::builder("broken.1")
        .method(
            "lie",
            MethodDescriptor::from_parts(
                MethodType::Call,
                ArgDecoder::from_fn::<HasServerKeysArg>(decode_wrong_type),
                ErasedHandler::new(|_ctx, arg: HasServerKeysArg| async move {
                    Ok(arg.session_id)
                }),
            ),
        )
        .build()
        .unwrap();

    let recorder = Arc::new(Recorder::default());
    let dispatcher = Dispatcher::new()
        .with_protocol(protocol)
        .unwrap()
        .with_protocol(acct_protocol(recorder).unwrap())
        .unwrap();

    let args = encode_arg_container(&HasServerKeysArg { session_id: 5 }).unwrap();
    let result = dispatcher
        .dispatch(CallContext::new(), "broken.1.lie", &args)
        .await;

    match result {
        Err(RpcError::TypeAssertion {
            method,
            expected,
            actual,
        }) => {
            assert_eq!(method, "broken.1.lie");
            assert!(expected.ends_with("HasServerKeysArg"));
            assert_eq!(actual, std::any::type_name::<String>());
        }
        other => panic!("expected a type assertion error, got {other:?}"),
    }

    // Other protocols on the same dispatcher are unaffected.
    assert!(has_server_keys(&dispatcher, 5).await.is_ok());
}

async fn explode(
    _ctx: CallContext,
    arg: HasServerKeysArg,
) -> Result<HasServerKeysRes, HandlerError> {
    if arg.session_id >= 0 {
        panic!("session table corrupted");
    }
    Ok(HasServerKeysRes {
        has_server_keys: false,
    })
}

type ReadyResult<T> = futures::future::Ready<Result<T, HandlerError>>;

#[tokio::test]
async fn handler_panics_become_internal_errors() {
    let protocol = Protocol::builder("panicky.1")
        .call("explode", explode)
        .call(
            "explodeEarly",
            |_ctx, _arg: HasServerKeysArg| -> ReadyResult<HasServerKeysRes> {
                panic!("refused to start")
            },
        )
        .build()
        .unwrap();
    let dispatcher = Dispatcher::new().with_protocol(protocol).unwrap();
    let args = encode_arg_container(&HasServerKeysArg { session_id: 1 }).unwrap();

    for method in ["panicky.1.explode", "panicky.1.explodeEarly"] {
        let result = dispatcher.dispatch(CallContext::new(), method, &args).await;

        match result {
            Err(RpcError::Handler(err)) => {
                assert!(err.is_internal());
                assert!(!err.message.contains("corrupted"));
            }
            other => panic!("expected an internal handler error, got {other:?}"),
        }
    }

    // The dispatcher keeps serving after a panic.
    let args = encode_arg_container(&HasServerKeysArg { session_id: -1 }).unwrap();
    let bytes = dispatcher
        .dispatch(CallContext::new(), "panicky.1.explode", &args)
        .await
        .unwrap()
        .unwrap();
    let res: HasServerKeysRes = decode_result(&bytes).unwrap();
    assert!(!res.has_server_keys);
}

#[tokio::test]
async fn registering_a_protocol_twice_fails() {
    let recorder = Arc::new(Recorder::default());
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .register_protocol(acct_protocol(recorder.clone()).unwrap())
        .unwrap();

    let err = dispatcher
        .register_protocol(acct_protocol(recorder).unwrap())
        .unwrap_err();

    assert_eq!(
        err,
        RegistrationError::DuplicateProtocol {
            protocol: ACCT_PROTOCOL.into()
        }
    );
    assert_eq!(dispatcher.len(), 3);
}

#[tokio::test]
async fn add_methods_is_all_or_nothing() {
    let (_recorder, mut dispatcher) = acct_dispatcher();

    let mut table = MethodTable::new();
    table.insert(
        "other.1.ping".to_string(),
        MethodDescriptor::call(|_ctx, n: u32| async move { Ok(n) }),
    );
    table.insert(
        HAS_SERVER_KEYS.to_string(),
        MethodDescriptor::call(|_ctx, n: u32| async move { Ok(n) }),
    );

    let err = dispatcher.add_methods(table).unwrap_err();

    assert_eq!(
        err,
        RegistrationError::DuplicateQualifiedMethod {
            method: HAS_SERVER_KEYS.into()
        }
    );
    assert!(!dispatcher.contains_method("other.1.ping"));
    assert_eq!(dispatcher.len(), 3);
}

#[tokio::test]
async fn add_methods_checks_signatures() {
    let mut dispatcher = Dispatcher::new();

    let mut table = MethodTable::new();
    table.insert(
        "other.1.ping".to_string(),
        MethodDescriptor::from_parts(
            MethodType::Call,
            ArgDecoder::of::<String>(),
            ErasedHandler::new(|_ctx, n: u32| async move { Ok(n) }),
        ),
    );

    assert!(matches!(
        dispatcher.add_methods(table),
        Err(RegistrationError::SignatureMismatch { .. })
    ));
    assert!(dispatcher.is_empty());
}

#[tokio::test]
async fn introspection_reports_registered_methods() {
    let (_recorder, dispatcher) = acct_dispatcher();

    assert_eq!(
        dispatcher.method_names(),
        vec![FAIL, HAS_SERVER_KEYS, LOGGED_OUT]
    );
    assert_eq!(dispatcher.method_type(HAS_SERVER_KEYS), Some(MethodType::Call));
    assert_eq!(dispatcher.method_type(LOGGED_OUT), Some(MethodType::Notify));
    assert_eq!(dispatcher.method_type("acct.1.nope"), None);
    assert_eq!(dispatcher.protocol_names().collect::<Vec<_>>(), vec![ACCT_PROTOCOL]);
}
