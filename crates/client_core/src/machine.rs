//! Guided entry state machine.
//!
//! One prompt, two steps: the first line names a block, following lines
//! are items for that block until `"0"` closes the block or `"1"` closes
//! the whole session and produces the consolidated report.

use chrono::{DateTime, Local};
use shared::{
    domain::{Block, Dataset, EmptyBlockPolicy, SessionState, Step},
    error::{EntryError, ReportError},
};
use tracing::{debug, info};

use crate::report::{self, Report};

pub const FINISH_BLOCK_COMMAND: &str = "0";
pub const FINISH_ALL_COMMAND: &str = "1";

pub const MSG_BLOCK_REQUIRED: &str = "Por favor, digite o Bloco.";
pub const MSG_ITEM_REQUIRED: &str = "Por favor, digite o Tombamento, \"0\" para finalizar o bloco, ou \"1\" para fechar e gerar o arquivo.";
pub const MSG_BLOCK_SAVED: &str = "Bloco finalizado e salvo no histórico. Digite o próximo Bloco.";
pub const MSG_BLOCK_SAVED_EMPTY: &str =
    "Bloco registrado sem tombamentos. Digite o próximo Bloco.";
pub const MSG_BLOCK_DISCARDED: &str = "Bloco sem tombamentos adicionados. Digite o próximo Bloco.";
pub const MSG_FINISHED: &str =
    "Aplicação encerrada. O arquivo TXT consolidado com todos os dados salvos foi gerado.";
pub const MSG_NOTHING_TO_REPORT: &str =
    "Nenhum dado de bloco/tombamento foi coletado ou salvo para gerar o arquivo.";
pub const MSG_SESSION_CLOSED: &str =
    "Cadastro encerrado. Reinicie ou apague os dados para continuar.";
pub const MSG_ERASED: &str = "Todos os dados foram apagados. Recomece o cadastro.";

pub type Clock = fn() -> DateTime<Local>;

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    BlockOpened {
        name: String,
    },
    ItemAdded {
        item: String,
        count: usize,
    },
    BlockRecorded {
        block: Block,
    },
    BlockDiscarded {
        name: String,
    },
    Finished {
        recorded: Option<Block>,
        report: Result<Report, ReportError>,
    },
    Erased,
    Restarted,
}

impl Transition {
    /// Whether the dataset snapshot must be written after this transition.
    pub fn touches_dataset(&self) -> bool {
        matches!(
            self,
            Transition::BlockRecorded { .. } | Transition::Finished { .. } | Transition::Erased
        )
    }
}

pub struct EntryMachine {
    session: SessionState,
    dataset: Dataset,
    policy: EmptyBlockPolicy,
    clock: Clock,
}

impl EntryMachine {
    pub fn new(dataset: Dataset, policy: EmptyBlockPolicy) -> Self {
        Self {
            session: SessionState::default(),
            dataset,
            policy,
            clock: Local::now,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn now(&self) -> DateTime<Local> {
        (self.clock)()
    }

    /// Feeds one line from the single-field prompt to whichever step is active.
    pub fn submit_line(&mut self, text: &str) -> Result<Transition, EntryError> {
        match self.session.step {
            Step::AwaitingBlock => self.submit_block_name(text),
            Step::AwaitingItem => self.submit_item(text),
        }
    }

    pub fn submit_block_name(&mut self, text: &str) -> Result<Transition, EntryError> {
        self.ensure_step(Step::AwaitingBlock)?;

        if text.trim().is_empty() {
            self.session.message = MSG_BLOCK_REQUIRED.to_string();
            return Err(EntryError::EmptyInput {
                step: Step::AwaitingBlock,
            });
        }

        self.session.current_block_name = text.to_string();
        self.session.current_items.clear();
        self.session.step = Step::AwaitingItem;
        self.session.message.clear();
        debug!(block = text, "block opened");
        Ok(Transition::BlockOpened {
            name: text.to_string(),
        })
    }

    pub fn submit_item(&mut self, text: &str) -> Result<Transition, EntryError> {
        self.ensure_step(Step::AwaitingItem)?;

        if text.trim().is_empty() {
            self.session.message = MSG_ITEM_REQUIRED.to_string();
            return Err(EntryError::EmptyInput {
                step: Step::AwaitingItem,
            });
        }

        match text {
            FINISH_BLOCK_COMMAND => Ok(self.finish_block()),
            FINISH_ALL_COMMAND => Ok(self.finish_all()),
            item => {
                self.session.current_items.push(item.to_string());
                self.session.message.clear();
                Ok(Transition::ItemAdded {
                    item: item.to_string(),
                    count: self.session.current_items.len(),
                })
            }
        }
    }

    /// Report over the finalized blocks only; the open block is not included.
    pub fn report(&self) -> Result<Report, ReportError> {
        report::generate(self.dataset.blocks(), self.now())
    }

    pub fn erase_all(&mut self) -> Transition {
        self.dataset.clear();
        self.session = SessionState {
            message: MSG_ERASED.to_string(),
            ..SessionState::default()
        };
        info!("dataset and session erased");
        Transition::Erased
    }

    pub fn restart(&mut self) -> Transition {
        self.session = SessionState::default();
        Transition::Restarted
    }

    fn ensure_step(&self, expected: Step) -> Result<(), EntryError> {
        if self.session.finished {
            return Err(EntryError::SessionFinished);
        }
        if self.session.step != expected {
            return Err(EntryError::UnexpectedStep {
                expected,
                actual: self.session.step,
            });
        }
        Ok(())
    }

    fn finish_block(&mut self) -> Transition {
        let name = self.session.current_block_name.clone();
        let recorded = self.close_current_block();
        self.session.step = Step::AwaitingBlock;

        match recorded {
            Some(block) => {
                self.session.message = if block.items.is_empty() {
                    MSG_BLOCK_SAVED_EMPTY.to_string()
                } else {
                    MSG_BLOCK_SAVED.to_string()
                };
                info!(block = %block.name, items = block.items.len(), "block recorded");
                Transition::BlockRecorded { block }
            }
            None => {
                self.session.message = MSG_BLOCK_DISCARDED.to_string();
                debug!(block = %name, "block discarded");
                Transition::BlockDiscarded { name }
            }
        }
    }

    fn finish_all(&mut self) -> Transition {
        let recorded = self.close_current_block();
        let report = self.report();

        self.session.step = Step::AwaitingBlock;
        self.session.finished = true;
        self.session.message = match &report {
            Ok(_) => MSG_FINISHED.to_string(),
            Err(ReportError::EmptyDataset) => MSG_NOTHING_TO_REPORT.to_string(),
        };
        info!(
            blocks = self.dataset.len(),
            items = self.dataset.item_count(),
            "session finished"
        );
        Transition::Finished { recorded, report }
    }

    /// Takes the open block out of the session and appends it when it
    /// has a non-blank name and either has items or the policy records
    /// empty blocks.
    fn close_current_block(&mut self) -> Option<Block> {
        let name = std::mem::take(&mut self.session.current_block_name);
        let items = std::mem::take(&mut self.session.current_items);

        if name.trim().is_empty() {
            return None;
        }
        if items.is_empty() && self.policy == EmptyBlockPolicy::Discard {
            return None;
        }

        let block = Block::new(name, items);
        self.dataset.push(block.clone());
        Some(block)
    }
}

#[cfg(test)]
#[path = "tests/machine_tests.rs"]
mod tests;
