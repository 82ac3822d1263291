use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Storage key under which the browser front end keeps the dataset snapshot.
pub const DATASET_KEY: &str = "cadastroBensData";

/// A named group of asset identifiers ("tombamentos").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "bloco")]
    pub name: String,
    #[serde(rename = "tombamentos", default)]
    pub items: Vec<String>,
}

impl Block {
    pub fn new(name: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }
}

/// Ordered, append-only collection of finalized blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset(Vec<Block>);

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: Block) {
        self.0.push(block);
    }

    pub fn blocks(&self) -> &[Block] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn item_count(&self) -> usize {
        self.0.iter().map(|block| block.items.len()).sum()
    }
}

impl From<Vec<Block>> for Dataset {
    fn from(blocks: Vec<Block>) -> Self {
        Self(blocks)
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    AwaitingBlock,
    AwaitingItem,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::AwaitingBlock => f.write_str("awaiting_block"),
            Step::AwaitingItem => f.write_str("awaiting_item"),
        }
    }
}

/// What happens to a block closed with no items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyBlockPolicy {
    #[default]
    Discard,
    Record,
}

impl FromStr for EmptyBlockPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "discard" => Ok(Self::Discard),
            "record" => Ok(Self::Record),
            other => Err(format!(
                "unknown empty block policy '{other}' (expected 'discard' or 'record')"
            )),
        }
    }
}

/// Transient state of the guided prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub current_block_name: String,
    pub current_items: Vec<String>,
    pub step: Step,
    pub message: String,
    pub finished: bool,
}

impl SessionState {
    pub fn has_open_items(&self) -> bool {
        !self.current_items.is_empty()
    }
}
