use std::{future::Future, time::Duration};

use crate::Error;

/// Classifies errors that are worth retrying because the request never reached a decision
pub trait IsNetworkFailure {
    fn is_network_failure(&self) -> bool;
}

impl IsNetworkFailure for web3::error::Error {
    fn is_network_failure(&self) -> bool {
        matches!(self, web3::error::Error::Transport(_))
    }
}

impl IsNetworkFailure for web3::contract::Error {
    fn is_network_failure(&self) -> bool {
        matches!(
            self,
            web3::contract::Error::Api(web3::error::Error::Transport(_))
        )
    }
}

impl IsNetworkFailure for Error {
    fn is_network_failure(&self) -> bool {
        match self {
            Error::Unavailable(_) => true,
            Error::Web3(err) => err.is_network_failure(),
            Error::Web3Contract(err) => err.is_network_failure(),
            _ => false,
        }
    }
}

/// Delays between attempts of a request that keeps failing with a network error
///
/// A policy with `n` delays makes at most `n + 1` attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    delays: Vec<Duration>,
}

impl Default for RetryPolicy {
    /// Retries 3 times for a maximum of 16s
    fn default() -> Self {
        Self::new(vec![
            Duration::from_secs(1),
            Duration::from_secs(5),
            Duration::from_secs(10),
        ])
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    #[must_use]
    pub fn from_millis(delays: &[u64]) -> Self {
        Self::new(delays.iter().copied().map(Duration::from_millis).collect())
    }

    /// Make a single attempt
    #[must_use]
    pub fn never() -> Self {
        Self::new(Vec::new())
    }

    #[must_use]
    pub fn max_attempts(&self) -> usize {
        self.delays.len() + 1
    }

    /// Run `f` until it succeeds, fails with an error that isn't a network failure, or the
    /// delays run out
    pub async fn run<T, E, Fut>(&self, f: impl FnOnce() -> Fut + Clone) -> Result<T, E>
    where
        E: IsNetworkFailure + std::fmt::Display,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut delays = self.delays.iter();

        loop {
            let res = (f.clone())().await;

            match (res, delays.next()) {
                (Err(err), Some(delay)) if err.is_network_failure() => {
                    tracing::warn!(%err, ?delay, "network failure, retrying");
                    tokio::time::sleep(*delay).await;
                }
                (res, _) => return res,
            }
        }
    }
}
