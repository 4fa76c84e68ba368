//! Login orchestration.
//!
//! Walks the targets of a resolved group in declaration order, one at a time:
//!
//! 1. look up the retriever for the target's provider
//! 2. retrieve credentials
//! 3. hand successes to the sink
//!
//! Failures are classified as they happen. A missing provider or a rejected
//! identity stops the run on the spot, and no later target is attempted. Any
//! other retrieval failure is recorded and the run moves on. A sink failure is
//! reported but the target still counts as logged in; the credential itself
//! was valid.

use std::ops::ControlFlow;
use tracing::{debug, error, info, warn};

use crate::core::domain::{Group, Target};
use crate::core::retriever::RetrieverFactory;
use crate::core::sink::Sink;
use crate::error::{LoginError, RetrieveError, SinkError};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Every target logged in.
    Success,
    /// Some targets failed; the rest were still attempted.
    PartialFailure,
    /// The run stopped early.
    FatalAbort,
}

/// A target whose retrieval failed without aborting the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub target: String,
    pub error: RetrieveError,
}

/// Per-run accumulator, owned by [`Login`] until the run finishes.
#[derive(Debug, Default)]
pub struct Outcome {
    succeeded: Vec<String>,
    failed: Vec<Failure>,
    abort: Option<LoginError>,
}

impl Outcome {
    /// Targets that logged in, in the order they were processed.
    pub fn succeeded(&self) -> &[String] {
        &self.succeeded
    }

    pub fn failed(&self) -> &[Failure] {
        &self.failed
    }

    /// The error that stopped the run, if any.
    pub fn abort(&self) -> Option<&LoginError> {
        self.abort.as_ref()
    }

    pub fn is_fatal(&self) -> bool {
        self.abort.is_some()
    }

    pub fn status(&self) -> Status {
        if self.abort.is_some() {
            Status::FatalAbort
        } else if !self.failed.is_empty() {
            Status::PartialFailure
        } else {
            Status::Success
        }
    }

    /// Collapse into the run's overall result.
    pub fn into_result(self) -> Result<(), LoginError> {
        if let Some(abort) = self.abort {
            return Err(abort);
        }
        if !self.failed.is_empty() {
            return Err(LoginError::PartialFailure {
                failed: self.failed.into_iter().map(|f| f.target).collect(),
            });
        }
        Ok(())
    }
}

/// What happened to one target. Exactly one event is emitted per attempted target.
#[derive(Debug)]
pub enum Event<'a> {
    /// Credentials retrieved; `sink_error` is set if persisting them failed.
    LoggedIn {
        target: &'a Target,
        sink_error: Option<&'a SinkError>,
    },
    /// Retrieval failed; the run continues.
    Failed {
        target: &'a Target,
        error: &'a RetrieveError,
    },
    /// The run stops at this target.
    Aborted {
        target: &'a Target,
        error: &'a LoginError,
    },
}

/// One login run.
pub struct Login<'a, S: Sink + ?Sized> {
    factory: &'a RetrieverFactory,
    sink: &'a mut S,
    outcome: Outcome,
}

impl<'a, S: Sink + ?Sized> Login<'a, S> {
    pub fn new(factory: &'a RetrieverFactory, sink: &'a mut S) -> Self {
        Self {
            factory,
            sink,
            outcome: Outcome::default(),
        }
    }

    /// Process every target of `group` until done or aborted.
    pub fn run(mut self, group: &Group, mut report: impl FnMut(Event<'_>)) -> Outcome {
        info!(group = %group.name(), targets = group.targets().len(), "starting login");

        for target in group.targets() {
            if self.step(target, &mut report).is_break() {
                break;
            }
        }

        let outcome = self.finish();
        debug!(
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            fatal = outcome.is_fatal(),
            "login finished"
        );
        outcome
    }

    /// Process a single target. `Break` means no further target may be attempted.
    pub fn step(&mut self, target: &Target, report: &mut dyn FnMut(Event<'_>)) -> ControlFlow<()> {
        let retriever = match self.factory.get(target.provider) {
            Ok(retriever) => retriever,
            Err(err) => {
                error!(name = %target.name, provider = %target.provider, "no retriever for provider");
                return self.abort(target, err, report);
            }
        };

        debug!(name = %target.name, provider = retriever.name(), "retrieving credentials");

        match retriever.retrieve(target) {
            Ok(credential) => {
                let stored = self
                    .sink
                    .update(&target.name, &target.aliases, &credential);
                if let Err(e) = &stored {
                    error!(name = %target.name, error = %e, "failed to update kubeconfig");
                }
                report(Event::LoggedIn {
                    target,
                    sink_error: stored.as_ref().err(),
                });
                self.outcome.succeeded.push(target.name.clone());
                ControlFlow::Continue(())
            }
            Err(err) if err.is_fatal() => {
                let reason = match err {
                    RetrieveError::Unauthenticated(reason) => reason,
                    other => other.to_string(),
                };
                error!(name = %target.name, reason = %reason, "authentication rejected, aborting");
                let abort = LoginError::Unauthenticated {
                    target: target.name.clone(),
                    reason,
                };
                self.abort(target, abort, report)
            }
            Err(err) => {
                warn!(name = %target.name, error = %err, "failed to log in");
                report(Event::Failed {
                    target,
                    error: &err,
                });
                self.outcome.failed.push(Failure {
                    target: target.name.clone(),
                    error: err,
                });
                ControlFlow::Continue(())
            }
        }
    }

    fn abort(
        &mut self,
        target: &Target,
        error: LoginError,
        report: &mut dyn FnMut(Event<'_>),
    ) -> ControlFlow<()> {
        report(Event::Aborted {
            target,
            error: &error,
        });
        self.outcome.abort = Some(error);
        ControlFlow::Break(())
    }

    /// End the run and hand back the accumulated outcome.
    pub fn finish(self) -> Outcome {
        self.outcome
    }
}

/// Run a login over `group`, reporting each target through `report`.
pub fn login<S: Sink + ?Sized>(
    group: &Group,
    factory: &RetrieverFactory,
    sink: &mut S,
    report: impl FnMut(Event<'_>),
) -> Outcome {
    Login::new(factory, sink).run(group, report)
}
