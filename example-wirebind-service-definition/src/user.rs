use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use wirebind::{
    CallContext, GenericClient, HandlerError, Protocol, RegistrationError, RpcError, SessionId,
    call_method,
};

wirebind::protocol_methods! {
    pub mod names = "keybase.1.user" {
        LIST_TRACKING => "listTracking",
        LIST_TRACKING_FOR_UID => "listTrackingForUID",
        LIST_TRACKING_FOR_USERNAME => "listTrackingForUsername",
        LIST_TRACKING_JSON => "listTrackingJSON",
        LIST_TRACKING_FOR_UID_JSON => "listTrackingForUIDJSON",
        LIST_TRACKING_FOR_USERNAME_JSON => "listTrackingForUsernameJSON",
    }
}

/// Hex-encoded user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(pub String);

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Milliseconds since the Unix epoch.
pub type Time = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    #[serde(rename = "KID")]
    pub kid: String,
    /// Empty for keys that are not PGP keys.
    #[serde(rename = "PGPFingerprint")]
    pub pgp_fingerprint: String,
    #[serde(rename = "isSibkey")]
    pub is_sibkey: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackProof {
    #[serde(rename = "proofType")]
    pub proof_type: String,
    #[serde(rename = "proofName")]
    pub proof_name: String,
    #[serde(rename = "idString")]
    pub id_string: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Proofs {
    pub social: Vec<TrackProof>,
    #[serde(rename = "publicKeys")]
    pub public_keys: Vec<PublicKey>,
}

/// One tracked user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub uid: Uid,
    pub username: String,
    #[serde(rename = "sigIDDisplay")]
    pub sig_id_display: String,
    #[serde(rename = "trackTime")]
    pub track_time: Time,
    pub proofs: Proofs,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListTrackingArg {
    #[serde(rename = "sessionID")]
    pub session_id: SessionId,
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListTrackingForUidArg {
    #[serde(rename = "sessionID")]
    pub session_id: SessionId,
    pub filter: String,
    pub uid: Uid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListTrackingForUsernameArg {
    #[serde(rename = "sessionID")]
    pub session_id: SessionId,
    pub filter: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListTrackingJsonArg {
    #[serde(rename = "sessionID")]
    pub session_id: SessionId,
    pub filter: String,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListTrackingForUidJsonArg {
    #[serde(rename = "sessionID")]
    pub session_id: SessionId,
    pub filter: String,
    pub uid: Uid,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListTrackingForUsernameJsonArg {
    #[serde(rename = "sessionID")]
    pub session_id: SessionId,
    pub filter: String,
    pub username: String,
    pub verbose: bool,
}

/// Queries over the tracking graph. The `*_json` variants return a
/// pre-rendered JSON document instead of structured summaries.
#[async_trait::async_trait]
pub trait UserInterface: Send + Sync + 'static {
    async fn list_tracking(
        &self,
        ctx: CallContext,
        arg: ListTrackingArg,
    ) -> Result<Vec<UserSummary>, HandlerError>;

    async fn list_tracking_for_uid(
        &self,
        ctx: CallContext,
        arg: ListTrackingForUidArg,
    ) -> Result<Vec<UserSummary>, HandlerError>;

    async fn list_tracking_for_username(
        &self,
        ctx: CallContext,
        arg: ListTrackingForUsernameArg,
    ) -> Result<Vec<UserSummary>, HandlerError>;

    async fn list_tracking_json(
        &self,
        ctx: CallContext,
        arg: ListTrackingJsonArg,
    ) -> Result<String, HandlerError>;

    async fn list_tracking_for_uid_json(
        &self,
        ctx: CallContext,
        arg: ListTrackingForUidJsonArg,
    ) -> Result<String, HandlerError>;

    async fn list_tracking_for_username_json(
        &self,
        ctx: CallContext,
        arg: ListTrackingForUsernameJsonArg,
    ) -> Result<String, HandlerError>;
}

pub fn user_protocol<I>(service: Arc<I>) -> Result<Protocol, RegistrationError>
where
    I: UserInterface + ?Sized,
{
    let list_tracking = service.clone();
    let for_uid = service.clone();
    let for_username = service.clone();
    let json = service.clone();
    let for_uid_json = service.clone();
    let for_username_json = service;

    Protocol::builder(names::PROTOCOL)
        .call(names::LIST_TRACKING, move |ctx, arg: ListTrackingArg| {
            let service = list_tracking.clone();
            async move { service.list_tracking(ctx, arg).await }
        })
        .call(names::LIST_TRACKING_FOR_UID, move |ctx, arg: ListTrackingForUidArg| {
            let service = for_uid.clone();
            async move { service.list_tracking_for_uid(ctx, arg).await }
        })
        .call(
            names::LIST_TRACKING_FOR_USERNAME,
            move |ctx, arg: ListTrackingForUsernameArg| {
                let service = for_username.clone();
                async move { service.list_tracking_for_username(ctx, arg).await }
            },
        )
        .call(names::LIST_TRACKING_JSON, move |ctx, arg: ListTrackingJsonArg| {
            let service = json.clone();
            async move { service.list_tracking_json(ctx, arg).await }
        })
        .call(
            names::LIST_TRACKING_FOR_UID_JSON,
            move |ctx, arg: ListTrackingForUidJsonArg| {
                let service = for_uid_json.clone();
                async move { service.list_tracking_for_uid_json(ctx, arg).await }
            },
        )
        .call(
            names::LIST_TRACKING_FOR_USERNAME_JSON,
            move |ctx, arg: ListTrackingForUsernameJsonArg| {
                let service = for_username_json.clone();
                async move { service.list_tracking_for_username_json(ctx, arg).await }
            },
        )
        .build()
}

/// Typed stubs for `keybase.1.user`.
#[derive(Debug, Clone)]
pub struct UserClient<C> {
    cli: C,
}

impl<C> UserClient<C>
where
    C: GenericClient,
{
    pub fn new(cli: C) -> Self {
        Self { cli }
    }

    pub async fn list_tracking(
        &self,
        ctx: &CallContext,
        arg: ListTrackingArg,
    ) -> Result<Vec<UserSummary>, RpcError> {
        call_method(&self.cli, ctx, names::qualified::LIST_TRACKING, &arg).await
    }

    pub async fn list_tracking_for_uid(
        &self,
        ctx: &CallContext,
        arg: ListTrackingForUidArg,
    ) -> Result<Vec<UserSummary>, RpcError> {
        call_method(&self.cli, ctx, names::qualified::LIST_TRACKING_FOR_UID, &arg).await
    }

    pub async fn list_tracking_for_username(
        &self,
        ctx: &CallContext,
        arg: ListTrackingForUsernameArg,
    ) -> Result<Vec<UserSummary>, RpcError> {
        call_method(&self.cli, ctx, names::qualified::LIST_TRACKING_FOR_USERNAME, &arg).await
    }

    pub async fn list_tracking_json(
        &self,
        ctx: &CallContext,
        arg: ListTrackingJsonArg,
    ) -> Result<String, RpcError> {
        call_method(&self.cli, ctx, names::qualified::LIST_TRACKING_JSON, &arg).await
    }

    pub async fn list_tracking_for_uid_json(
        &self,
        ctx: &CallContext,
        arg: ListTrackingForUidJsonArg,
    ) -> Result<String, RpcError> {
        call_method(&self.cli, ctx, names::qualified::LIST_TRACKING_FOR_UID_JSON, &arg).await
    }

    pub async fn list_tracking_for_username_json(
        &self,
        ctx: &CallContext,
        arg: ListTrackingForUsernameJsonArg,
    ) -> Result<String, RpcError> {
        call_method(
            &self.cli,
            ctx,
            names::qualified::LIST_TRACKING_FOR_USERNAME_JSON,
            &arg,
        )
        .await
    }
}
