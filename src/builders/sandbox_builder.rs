//! Builder assembling the sandbox API from configuration.

use std::sync::Arc;

use tracing::info;

use crate::config::SandboxConfig;
use crate::core::{
    Accountant, AuditSink, BlockingWait, DiagnosticReporter, IdProvider, InMemoryAccountant,
    ProcessTerminator, SandboxError, Spawn, Supervisor, Terminator, ThreadLauncher, ThreadSleeper,
    TimingProvider, TracingReporter, UuidIdProvider,
};
use crate::runtime::{NativeSpawner, SandboxApi};

/// Builds a [`SandboxApi`] from a [`SandboxConfig`].
///
/// Every collaborator has a production default and can be replaced, which is
/// how tests inject recording terminators or a pre-exhausted accountant.
pub struct SandboxBuilder {
    config: SandboxConfig,
    accountant: Option<Arc<dyn Accountant>>,
    ids: Option<Arc<dyn IdProvider>>,
    timing: Option<Arc<dyn TimingProvider>>,
    reporter: Option<Arc<dyn DiagnosticReporter>>,
    terminator: Option<Arc<dyn Terminator>>,
    audit: Option<Box<dyn AuditSink>>,
}

impl SandboxBuilder {
    /// Start a builder from `config`.
    #[must_use]
    pub fn new(config: SandboxConfig) -> Self {
        Self {
            config,
            accountant: None,
            ids: None,
            timing: None,
            reporter: None,
            terminator: None,
            audit: None,
        }
    }

    /// Configuration this builder was created with.
    #[must_use]
    pub const fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Use `accountant` instead of an in-memory ledger sized from the config.
    #[must_use]
    pub fn with_accountant(mut self, accountant: Arc<dyn Accountant>) -> Self {
        self.accountant = Some(accountant);
        self
    }

    /// Use `ids` for handle suffixes and thread names.
    #[must_use]
    pub fn with_id_provider(mut self, ids: Arc<dyn IdProvider>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Use `timing` for `sleep`.
    #[must_use]
    pub fn with_timing(mut self, timing: Arc<dyn TimingProvider>) -> Self {
        self.timing = Some(timing);
        self
    }

    /// Use `reporter` for escaped errors.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn DiagnosticReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Use `terminator` for fatal outcomes.
    #[must_use]
    pub fn with_terminator(mut self, terminator: Arc<dyn Terminator>) -> Self {
        self.terminator = Some(terminator);
        self
    }

    /// Mirror lifecycle transitions to `audit`.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Build with native OS threads.
    ///
    /// # Errors
    ///
    /// Returns `SandboxError::InvalidConfig` if the configuration is invalid.
    pub fn build(self) -> Result<SandboxApi<NativeSpawner>, SandboxError> {
        let spawner = self
            .config
            .thread_stack_size
            .map_or_else(NativeSpawner::new, NativeSpawner::with_stack_size);
        self.build_with_spawner(spawner)
    }

    /// Build with a custom spawner.
    ///
    /// # Errors
    ///
    /// Returns `SandboxError::InvalidConfig` if the configuration is invalid.
    pub fn build_with_spawner<S: Spawn>(self, spawner: S) -> Result<SandboxApi<S>, SandboxError> {
        self.config.validate().map_err(SandboxError::InvalidConfig)?;

        let events_limit = self.config.events_limit;
        let accountant = self
            .accountant
            .unwrap_or_else(|| Arc::new(InMemoryAccountant::with_events_limit(events_limit)));
        let ids = self.ids.unwrap_or_else(|| Arc::new(UuidIdProvider::new()));
        let timing = self.timing.unwrap_or_else(|| Arc::new(ThreadSleeper));
        let supervisor = Supervisor::new(
            self.reporter.unwrap_or_else(|| Arc::new(TracingReporter)),
            self.terminator.unwrap_or_else(|| Arc::new(ProcessTerminator)),
        );

        let mut launcher = ThreadLauncher::new(accountant, ids, supervisor, spawner);
        if let Some(audit) = self.audit {
            launcher = launcher.with_audit(audit);
        }

        info!(
            events_limit,
            thread_stack_size = ?self.config.thread_stack_size,
            "Sandbox thread API initialized"
        );

        Ok(SandboxApi::new(BlockingWait::new(timing), launcher))
    }
}
