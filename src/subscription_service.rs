use crate::{
    domain::{NewSubscriber, Subscription, SubscriptionId},
    mail_exchange::{DomainValidator, MailExchangeError},
    store::{Store, StoreError},
};
use anyhow::Context;
use std::sync::Arc;
use time::OffsetDateTime;

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error("{0}")]
    InvalidFormat(String),
    #[error("The email domain does not accept mail")]
    UnreachableDomain(#[source] MailExchangeError),
    #[error("Subscription {0} does not exist")]
    NotFound(SubscriptionId),
    #[error("Failed to access the subscription store")]
    StorageFailure(#[source] anyhow::Error),
}

impl From<StoreError> for SubscriptionError {
    fn from(e: StoreError) -> Self {
        Self::StorageFailure(e.into())
    }
}

/// Subscription lifecycle on top of the [`Store`].
///
/// Store calls block, so each one runs on tokio's blocking pool.
#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<Store>,
    domain_validator: DomainValidator,
}

impl SubscriptionService {
    pub fn new(store: Arc<Store>, domain_validator: DomainValidator) -> Self {
        Self {
            store,
            domain_validator,
        }
    }

    #[tracing::instrument(
        name = "Adding a new subscriber",
        skip(self, name, email),
        fields(subscriber_email = %email)
    )]
    pub async fn subscribe(
        &self,
        name: Option<String>,
        email: String,
    ) -> Result<Subscription, SubscriptionError> {
        let new_subscriber =
            NewSubscriber::parse(name, email).map_err(SubscriptionError::InvalidFormat)?;

        self.domain_validator
            .validate(&new_subscriber.email)
            .await
            .map_err(SubscriptionError::UnreachableDomain)?;

        let subscription = self
            .with_store(move |store| {
                store.update(|writer| {
                    let subscription = Subscription {
                        id: writer.next_id()?,
                        name: new_subscriber.name,
                        email: new_subscriber.email,
                        signup_date: OffsetDateTime::now_utc(),
                        validated: false,
                    };
                    writer.put(&subscription)?;
                    Ok(subscription)
                })
            })
            .await?;

        tracing::info!(subscription_id = %subscription.id, "New subscriber has been saved");

        Ok(subscription)
    }

    /// All subscriptions in ascending id order.
    #[tracing::instrument(name = "Listing subscriptions", skip(self))]
    pub async fn list(&self) -> Result<Vec<Subscription>, SubscriptionError> {
        self.with_store(|store| {
            store
                .scan()?
                .collect::<Result<Vec<_>, _>>()
                .map_err(SubscriptionError::from)
        })
        .await
    }

    #[tracing::instrument(name = "Fetching a subscription", skip(self))]
    pub async fn get(&self, id: SubscriptionId) -> Result<Subscription, SubscriptionError> {
        self.with_store(move |store| store.get(id)?.ok_or(SubscriptionError::NotFound(id)))
            .await
    }

    /// Marks the subscription as validated. Confirming twice is not an error.
    ///
    /// The read and the write happen in one write transaction, so concurrent
    /// confirmations cannot overwrite each other with stale records.
    #[tracing::instrument(name = "Confirming a subscription", skip(self))]
    pub async fn confirm(&self, id: SubscriptionId) -> Result<Subscription, SubscriptionError> {
        self.with_store(move |store| {
            store.update(|writer| {
                let mut subscription = writer.get(id)?.ok_or(SubscriptionError::NotFound(id))?;
                if !subscription.validated {
                    subscription.confirm();
                    writer.put(&subscription)?;
                }
                Ok(subscription)
            })
        })
        .await
    }

    /// Deletes the subscription.
    ///
    /// Removing an id that was issued but has already been removed succeeds;
    /// an id the store never issued is `NotFound`.
    #[tracing::instrument(name = "Removing a subscription", skip(self))]
    pub async fn remove(&self, id: SubscriptionId) -> Result<(), SubscriptionError> {
        self.with_store(move |store| {
            store.update(|writer| {
                let issued = writer.last_id()?.is_some_and(|last| id <= last);
                if id.get() == 0 || !issued {
                    return Err(SubscriptionError::NotFound(id));
                }
                if !writer.delete(id)? {
                    tracing::info!("Subscription was already removed");
                }
                Ok(())
            })
        })
        .await
    }

    async fn with_store<T, F>(&self, f: F) -> Result<T, SubscriptionError>
    where
        F: FnOnce(&Store) -> Result<T, SubscriptionError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .context("Store task failed to complete")
            .map_err(SubscriptionError::StorageFailure)?
    }
}
