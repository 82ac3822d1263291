use shared::{
    domain::{Dataset, EmptyBlockPolicy, SessionState},
    error::{EntryError, ErrorCode, PersistenceUnavailable, ReportError},
    protocol::{EntryCommand, Notice},
};
use tracing::{info, warn};

pub mod machine;
pub mod report;
pub mod store;

pub use machine::{Clock, EntryMachine, Transition};
pub use report::Report;
pub use store::{DatasetStore, MemoryDatasetStore, UnavailableDatasetStore};

/// Result of one front-end command.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outcome {
    pub transition: Option<Transition>,
    pub report: Option<Report>,
    pub notices: Vec<Notice>,
}

/// Entry session bound to a durable store.
///
/// Every dataset change is followed by a snapshot save. Store failures are
/// logged and reported as warnings; they never roll back the session.
pub struct CadastroClient<S: DatasetStore> {
    machine: EntryMachine,
    store: S,
}

impl<S: DatasetStore> CadastroClient<S> {
    pub async fn open(store: S, policy: EmptyBlockPolicy) -> Self {
        let dataset = match store.load().await {
            Ok(Some(dataset)) => {
                info!(blocks = dataset.len(), "restored dataset snapshot");
                dataset
            }
            Ok(None) => Dataset::new(),
            Err(err) => {
                let failure = PersistenceUnavailable::new("load dataset", format!("{err:#}"));
                warn!(error = %failure, "starting with an empty dataset");
                Dataset::new()
            }
        };

        Self {
            machine: EntryMachine::new(dataset, policy),
            store,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.machine = self.machine.with_clock(clock);
        self
    }

    pub fn session(&self) -> &SessionState {
        self.machine.session()
    }

    pub fn dataset(&self) -> &Dataset {
        self.machine.dataset()
    }

    pub async fn submit_line(&mut self, text: &str) -> Result<Transition, EntryError> {
        let transition = self.machine.submit_line(text)?;
        self.persist(&transition).await;
        Ok(transition)
    }

    pub async fn submit_block_name(&mut self, text: &str) -> Result<Transition, EntryError> {
        let transition = self.machine.submit_block_name(text)?;
        self.persist(&transition).await;
        Ok(transition)
    }

    pub async fn submit_item(&mut self, text: &str) -> Result<Transition, EntryError> {
        let transition = self.machine.submit_item(text)?;
        self.persist(&transition).await;
        Ok(transition)
    }

    pub async fn erase_all(&mut self) -> Transition {
        let transition = self.machine.erase_all();
        self.persist(&transition).await;
        transition
    }

    pub fn restart(&mut self) -> Transition {
        self.machine.restart()
    }

    /// Report over the stored blocks, independent of the finalize-all flow.
    pub fn export_report(&self) -> Result<Report, ReportError> {
        self.machine.report()
    }

    pub async fn handle(&mut self, command: EntryCommand) -> Outcome {
        match command {
            EntryCommand::SubmitLine { text } => {
                let transition = match self.machine.submit_line(&text) {
                    Ok(transition) => transition,
                    Err(err) => {
                        return Outcome {
                            notices: vec![self.rejection_notice(&err)],
                            ..Outcome::default()
                        };
                    }
                };
                let failure = self.persist(&transition).await;
                self.outcome_for(transition, failure)
            }
            EntryCommand::RequestReport => match self.export_report() {
                Ok(report) => Outcome {
                    report: Some(report),
                    ..Outcome::default()
                },
                Err(err) => Outcome {
                    notices: vec![Notice::warning(err.code(), machine::MSG_NOTHING_TO_REPORT)],
                    ..Outcome::default()
                },
            },
            EntryCommand::EraseAll => {
                let transition = self.machine.erase_all();
                let failure = self.persist(&transition).await;
                self.outcome_for(transition, failure)
            }
            EntryCommand::Restart => {
                let transition = self.machine.restart();
                self.outcome_for(transition, None)
            }
        }
    }

    fn rejection_notice(&self, err: &EntryError) -> Notice {
        let text = match err {
            EntryError::EmptyInput { .. } => self.machine.session().message.clone(),
            EntryError::SessionFinished => machine::MSG_SESSION_CLOSED.to_string(),
            EntryError::UnexpectedStep { .. } => err.to_string(),
        };
        Notice::error(err.code(), text)
    }

    fn outcome_for(
        &self,
        transition: Transition,
        failure: Option<PersistenceUnavailable>,
    ) -> Outcome {
        let mut notices = Vec::new();
        let message = &self.machine.session().message;

        let report = match &transition {
            Transition::Finished {
                report: Err(err), ..
            } => {
                notices.push(Notice::warning(err.code(), message.clone()));
                None
            }
            Transition::Finished {
                report: Ok(report),
                ..
            } => {
                notices.push(Notice::info(message.clone()));
                Some(report.clone())
            }
            _ => {
                if !message.is_empty() {
                    notices.push(Notice::info(message.clone()));
                }
                None
            }
        };

        if let Some(failure) = failure {
            notices.push(Notice::warning(
                ErrorCode::Persistence,
                format!("Não foi possível salvar os dados: {}", failure.reason),
            ));
        }

        Outcome {
            transition: Some(transition),
            report,
            notices,
        }
    }

    async fn persist(&self, transition: &Transition) -> Option<PersistenceUnavailable> {
        if !transition.touches_dataset() {
            return None;
        }

        let (operation, result) = match transition {
            Transition::Erased => ("clear dataset", self.store.clear().await),
            _ => ("save dataset", self.store.save(self.machine.dataset()).await),
        };

        match result {
            Ok(()) => None,
            Err(err) => {
                let failure = PersistenceUnavailable::new(operation, format!("{err:#}"));
                warn!(error = %failure, "continuing without durable snapshot");
                Some(failure)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
