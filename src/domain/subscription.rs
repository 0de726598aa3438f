use super::{SubscriberEmail, SubscriptionId};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A persisted subscription, as stored and as returned over HTTP.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub name: Option<String>,
    pub email: SubscriberEmail,
    #[serde(rename = "signup", with = "time::serde::rfc3339")]
    pub signup_date: OffsetDateTime,
    pub validated: bool,
}

impl Subscription {
    pub fn confirm(&mut self) {
        self.validated = true;
    }
}
