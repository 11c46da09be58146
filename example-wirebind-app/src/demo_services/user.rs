use example_wirebind_service_definition::UserInterface;
use example_wirebind_service_definition::user::{
    ListTrackingArg, ListTrackingForUidArg, ListTrackingForUidJsonArg, ListTrackingForUsernameArg,
    ListTrackingForUsernameJsonArg, ListTrackingJsonArg, Proofs, PublicKey, TrackProof, Uid,
    UserSummary,
};
use wirebind::{CallContext, HandlerError};

const NOT_FOUND: i32 = 205;

#[derive(Debug, Clone)]
struct Account {
    uid: Uid,
    username: String,
    tracking: Vec<UserSummary>,
}

/// A fixed tracking graph.
#[derive(Debug, Clone)]
pub struct DemoUsers {
    me: Uid,
    accounts: Vec<Account>,
}

fn summary(uid: &str, username: &str, fingerprint: &str, twitter: Option<&str>) -> UserSummary {
    UserSummary {
        uid: Uid(uid.into()),
        username: username.into(),
        sig_id_display: format!("{}0f", &uid[..4.min(uid.len())]),
        track_time: 1_700_000_000_000,
        proofs: Proofs {
            social: twitter
                .map(|handle| TrackProof {
                    proof_type: "twitter".into(),
                    proof_name: "twitter".into(),
                    id_string: format!("{handle}@twitter"),
                })
                .into_iter()
                .collect(),
            public_keys: vec![PublicKey {
                kid: format!("0120{uid}"),
                pgp_fingerprint: fingerprint.into(),
                is_sibkey: true,
            }],
        },
    }
}

impl DemoUsers {
    pub fn sample() -> Self {
        let max = Account {
            uid: Uid("dbb165b7879fe7b1174df73bed0b9500".into()),
            username: "max".into(),
            tracking: vec![
                summary(
                    "359c7644857203be38bfd3bf79bf1d19",
                    "chris",
                    "94aa3a5bdbd40ea549cabaf9fbc07d6a97016cb3",
                    Some("malgorithms"),
                ),
                summary("41b1f75fb55046d370608425a3208100", "patrick", "", None),
            ],
        };
        let chris = Account {
            uid: Uid("359c7644857203be38bfd3bf79bf1d19".into()),
            username: "chris".into(),
            tracking: vec![summary(
                "dbb165b7879fe7b1174df73bed0b9500",
                "max",
                "8efbe2e4dd56b35273634e8f6052b2ad31a6631c",
                Some("maxtaco"),
            )],
        };

        Self {
            me: max.uid.clone(),
            accounts: vec![max, chris],
        }
    }

    fn find(
        &self,
        matches: impl Fn(&Account) -> bool,
        who: &str,
    ) -> Result<&Account, HandlerError> {
        self.accounts
            .iter()
            .find(|account| matches(account))
            .ok_or_else(|| HandlerError::with_code(NOT_FOUND, format!("user not found: {who}")))
    }

    fn tracking_of_uid(&self, uid: &Uid, filter: &str) -> Result<Vec<UserSummary>, HandlerError> {
        let account = self.find(|account| &account.uid == uid, &uid.0)?;
        Ok(filtered(&account.tracking, filter))
    }

    fn tracking_of_username(
        &self,
        username: &str,
        filter: &str,
    ) -> Result<Vec<UserSummary>, HandlerError> {
        let account = self.find(|account| account.username == username, username)?;
        Ok(filtered(&account.tracking, filter))
    }
}

fn filtered(tracking: &[UserSummary], filter: &str) -> Vec<UserSummary> {
    tracking
        .iter()
        .filter(|entry| filter.is_empty() || entry.username.contains(filter))
        .cloned()
        .collect()
}

fn to_json(tracking: &[UserSummary], verbose: bool) -> Result<String, HandlerError> {
    let rendered = if verbose {
        serde_json::to_string_pretty(tracking)
    } else {
        let usernames: Vec<&str> = tracking.iter().map(|entry| entry.username.as_str()).collect();
        serde_json::to_string(&usernames)
    };

    rendered.map_err(|err| {
        tracing::error!(%err, "failed to render tracking list");
        HandlerError::internal()
    })
}

#[async_trait::async_trait]
impl UserInterface for DemoUsers {
    async fn list_tracking(
        &self,
        _ctx: CallContext,
        arg: ListTrackingArg,
    ) -> Result<Vec<UserSummary>, HandlerError> {
        self.tracking_of_uid(&self.me, &arg.filter)
    }

    async fn list_tracking_for_uid(
        &self,
        _ctx: CallContext,
        arg: ListTrackingForUidArg,
    ) -> Result<Vec<UserSummary>, HandlerError> {
        self.tracking_of_uid(&arg.uid, &arg.filter)
    }

    async fn list_tracking_for_username(
        &self,
        _ctx: CallContext,
        arg: ListTrackingForUsernameArg,
    ) -> Result<Vec<UserSummary>, HandlerError> {
        self.tracking_of_username(&arg.username, &arg.filter)
    }

    async fn list_tracking_json(
        &self,
        _ctx: CallContext,
        arg: ListTrackingJsonArg,
    ) -> Result<String, HandlerError> {
        to_json(&self.tracking_of_uid(&self.me, &arg.filter)?, arg.verbose)
    }

    async fn list_tracking_for_uid_json(
        &self,
        _ctx: CallContext,
        arg: ListTrackingForUidJsonArg,
    ) -> Result<String, HandlerError> {
        to_json(&self.tracking_of_uid(&arg.uid, &arg.filter)?, arg.verbose)
    }

    async fn list_tracking_for_username_json(
        &self,
        _ctx: CallContext,
        arg: ListTrackingForUsernameJsonArg,
    ) -> Result<String, HandlerError> {
        to_json(
            &self.tracking_of_username(&arg.username, &arg.filter)?,
            arg.verbose,
        )
    }
}
