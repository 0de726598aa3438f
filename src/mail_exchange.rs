use crate::domain::SubscriberEmail;
use hickory_resolver::{
    config::ResolverConfig,
    error::ResolveError,
    system_conf::read_system_conf,
    TokioAsyncResolver,
};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum MailExchangeError {
    #[error("Mail exchange lookup for `{domain}` failed")]
    Lookup {
        domain: String,
        #[source]
        source: ResolveError,
    },
    #[error("`{domain}` has no mail exchange")]
    NoMailExchange { domain: String },
    #[error("Mail exchange lookup for `{domain}` timed out after {timeout:?}")]
    Timeout { domain: String, timeout: Duration },
}

/// Checks that the domain of an address accepts mail before it is stored.
#[derive(Clone)]
pub enum DomainValidator {
    /// For environments without network egress.
    Disabled,
    MailExchange {
        resolver: TokioAsyncResolver,
        timeout: Duration,
    },
}

impl DomainValidator {
    /// Resolves through the host's DNS configuration, falling back to the
    /// resolver defaults when it cannot be read.
    pub fn mail_exchange(timeout: Duration) -> Self {
        let (config, mut options) = read_system_conf().unwrap_or_else(|e| {
            tracing::warn!(
                error.cause_chain = ?e,
                "Failed to read system DNS configuration, using defaults"
            );
            (ResolverConfig::default(), Default::default())
        });
        options.timeout = timeout;
        options.attempts = 1;

        Self::MailExchange {
            resolver: TokioAsyncResolver::tokio(config, options),
            timeout,
        }
    }

    #[tracing::instrument(name = "Validating email domain", skip_all, fields(domain = %email.domain()))]
    pub async fn validate(&self, email: &SubscriberEmail) -> Result<(), MailExchangeError> {
        let (resolver, timeout) = match self {
            Self::Disabled => return Ok(()),
            Self::MailExchange { resolver, timeout } => (resolver, *timeout),
        };

        // Trailing dot keeps the system search domains out of the lookup.
        let domain = email.domain();
        let fqdn = format!("{}.", domain.trim_end_matches('.'));

        let lookup = tokio::time::timeout(timeout, resolver.mx_lookup(fqdn))
            .await
            .map_err(|_| MailExchangeError::Timeout {
                domain: domain.to_owned(),
                timeout,
            })?
            .map_err(|source| MailExchangeError::Lookup {
                domain: domain.to_owned(),
                source,
            })?;

        if lookup.iter().next().is_none() {
            return Err(MailExchangeError::NoMailExchange {
                domain: domain.to_owned(),
            });
        }

        Ok(())
    }
}
