//! Fallback-chain probe machinery.
//!
//! A [`Probe`] owns an ordered list of [`Strategy`] values. Resolution
//! walks the chain and returns the first successful value; every failure
//! is logged and recovered, so a probe can degrade but never abort a
//! collection run.

use std::future::Future;
use std::time::Duration;

use futures_util::future::BoxFuture;

/// Default per-strategy budget.
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Facts the collector reports about the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactKind {
    Serial,
    Processor,
    Memory,
    Storage,
    OperatingSystem,
    LastUser,
    Uptime,
}

impl FactKind {
    /// Short identifier used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            FactKind::Serial => "serial",
            FactKind::Processor => "processor",
            FactKind::Memory => "memory",
            FactKind::Storage => "storage",
            FactKind::OperatingSystem => "operating_system",
            FactKind::LastUser => "last_user",
            FactKind::Uptime => "uptime",
        }
    }
}

/// Why a single strategy failed.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to launch {command}: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}")]
    Exit {
        command: String,
        status: std::process::ExitStatus,
    },

    #[error("no usable output")]
    Empty,

    #[error("unparsable output: {0}")]
    Parse(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("environment variable {0} not set")]
    MissingEnv(&'static str),
}

type StrategyFn = Box<dyn Fn() -> BoxFuture<'static, Result<String, ProbeError>> + Send + Sync>;

/// One attempt at resolving a fact.
pub struct Strategy {
    name: &'static str,
    timeout: Duration,
    run: StrategyFn,
}

impl Strategy {
    /// Creates a strategy with the default budget.
    pub fn new<F, Fut>(name: &'static str, run: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, ProbeError>> + Send + 'static,
    {
        Self::with_timeout(name, DEFAULT_TIMEOUT, run)
    }

    /// Creates a strategy with a custom budget (slow system queries).
    pub fn with_timeout<F, Fut>(name: &'static str, timeout: Duration, run: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, ProbeError>> + Send + 'static,
    {
        Self {
            name,
            timeout,
            run: Box::new(move || Box::pin(run())),
        }
    }

    /// Runs the strategy under its budget. A timeout is an ordinary
    /// strategy failure.
    async fn attempt(&self) -> Result<String, ProbeError> {
        match tokio::time::timeout(self.timeout, (self.run)()).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout(self.timeout)),
        }
    }
}

/// A fact with its ordered fallback chain.
pub struct Probe {
    fact: FactKind,
    strategies: Vec<Strategy>,
    fallback: String,
}

impl Probe {
    pub fn new(fact: FactKind, strategies: Vec<Strategy>, fallback: impl Into<String>) -> Self {
        Self {
            fact,
            strategies,
            fallback: fallback.into(),
        }
    }

    /// Resolves the fact. The first strategy to succeed wins and later
    /// ones never run; exhausting the chain yields the fallback value.
    pub async fn resolve(&self) -> String {
        for strategy in &self.strategies {
            match strategy.attempt().await {
                Ok(value) => {
                    tracing::debug!(
                        fact = self.fact.as_str(),
                        strategy = strategy.name,
                        "strategy succeeded"
                    );
                    return value;
                }
                Err(e) => {
                    tracing::debug!(
                        fact = self.fact.as_str(),
                        strategy = strategy.name,
                        error = %e,
                        "strategy failed"
                    );
                }
            }
        }

        tracing::warn!(
            fact = self.fact.as_str(),
            fallback = %self.fallback,
            "all strategies failed, using fallback"
        );
        self.fallback.clone()
    }
}
