//! Remote question catalog port and a file backed adapter
//!
//! The round controller talks to the catalog through [`RemoteCatalog`]: one
//! call to sign the player in, a second to fetch every question. Catalog
//! entries arrive in a raw form ([`CatalogItem`]) where the prompt is the
//! display name, the tier is the item class, and the answers are a JSON
//! document stored as custom data.

use std::{collections::HashMap, path::Path, sync::Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::question::{Question, Tier};

/// Errors that can occur while signing in
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The catalog service could not be reached
    #[error("transport error: {0}")]
    Transport(String),
    /// The service refused the credentials
    #[error("credentials rejected: {0}")]
    Rejected(String),
}

/// Errors that can occur while fetching questions
#[derive(Error, Debug)]
pub enum FetchError {
    /// The catalog service could not be reached
    #[error("transport error: {0}")]
    Transport(String),
    /// The identity is not known to the catalog
    #[error("unknown player {0}")]
    Unauthorized(String),
    /// An entry carried a payload that does not decode into answers
    #[error("malformed payload in catalog item {item}: {source}")]
    MalformedPayload {
        /// Identifier or display name of the offending item
        item: String,
        /// Decoder error
        source: serde_json::Error,
    },
    /// The catalog document itself could not be decoded
    #[error("malformed catalog: {0}")]
    MalformedCatalog(#[from] serde_json::Error),
    /// The catalog file could not be read
    #[error("cannot read catalog: {0}")]
    Io(#[from] std::io::Error),
    /// The catalog has no question that can be shown
    #[error("catalog has no presentable question")]
    NoQuestions,
}

/// The signed-in player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Account identifier assigned by the catalog
    pub player_id: String,
    /// Whether this login created the account
    pub newly_created: bool,
}

/// Source of the player identity and the question catalog
///
/// Implementations must make [`RemoteCatalog::login`] idempotent for a given
/// device; the controller always awaits it before fetching.
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    /// Signs the player in, creating an account on first use
    async fn login(&self) -> Result<Identity, AuthError>;

    /// Fetches every question in the catalog
    async fn fetch_questions(&self, identity: &Identity) -> Result<Vec<Question>, FetchError>;
}

/// Answers stored in the custom data of a catalog item
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AnswerPayload {
    #[serde(rename = "Correct")]
    correct: String,
    #[serde(rename = "Incorrect_01")]
    incorrect_01: String,
    #[serde(rename = "Incorrect_02")]
    incorrect_02: String,
}

/// A raw catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogItem {
    /// Catalog identifier of the item
    #[serde(default)]
    pub item_id: String,
    /// Question prompt
    #[serde(default)]
    pub display_name: String,
    /// Tier label, one of `EASY`, `MODERATE`, `HARD`
    #[serde(default)]
    pub item_class: String,
    /// JSON document holding the answers
    pub custom_data: String,
}

impl CatalogItem {
    /// Decodes the entry into a [`Question`]
    ///
    /// Unknown tier labels are treated as [`Tier::Easy`].
    ///
    /// # Errors
    ///
    /// [`FetchError::MalformedPayload`] if the custom data is not a valid
    /// answer document.
    pub fn decode(&self) -> Result<Question, FetchError> {
        let payload: AnswerPayload =
            serde_json::from_str(&self.custom_data).map_err(|source| {
                FetchError::MalformedPayload {
                    item: if self.item_id.is_empty() {
                        self.display_name.clone()
                    } else {
                        self.item_id.clone()
                    },
                    source,
                }
            })?;

        Ok(Question::new(
            self.display_name.clone(),
            payload.correct,
            [payload.incorrect_01, payload.incorrect_02],
            Tier::from_label(&self.item_class),
        ))
    }
}

/// Catalog document layout
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CatalogDocument {
    catalog: Vec<CatalogItem>,
}

/// A [`RemoteCatalog`] serving a fixed set of items
///
/// Accounts are keyed by device identifier and live as long as the catalog.
#[derive(Debug)]
pub struct StaticCatalog {
    device_id: String,
    items: Vec<CatalogItem>,
    accounts: Mutex<HashMap<String, String>>,
}

impl StaticCatalog {
    /// Creates a catalog serving `items` to the device `device_id`
    pub fn new(device_id: impl Into<String>, items: Vec<CatalogItem>) -> Self {
        Self {
            device_id: device_id.into(),
            items,
            accounts: Mutex::new(HashMap::new()),
        }
    }

    /// Parses a catalog document of the form `{"Catalog": [...]}`
    ///
    /// # Errors
    ///
    /// [`FetchError::MalformedCatalog`] if the document does not parse.
    pub fn from_json(device_id: impl Into<String>, json: &str) -> Result<Self, FetchError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Ok(Self::new(device_id, document.catalog))
    }

    /// Reads and parses a catalog document from disk
    ///
    /// # Errors
    ///
    /// [`FetchError::Io`] if the file cannot be read, otherwise as
    /// [`StaticCatalog::from_json`].
    pub fn from_file(device_id: impl Into<String>, path: &Path) -> Result<Self, FetchError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(device_id, &json)
    }

    /// Number of raw items in the catalog
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog has no items at all
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl RemoteCatalog for StaticCatalog {
    async fn login(&self) -> Result<Identity, AuthError> {
        if self.device_id.is_empty() {
            return Err(AuthError::Rejected("empty device identifier".to_owned()));
        }

        let mut accounts = self
            .accounts
            .lock()
            .map_err(|_| AuthError::Transport("account registry unavailable".to_owned()))?;

        let newly_created = !accounts.contains_key(&self.device_id);
        let player_id = accounts
            .entry(self.device_id.clone())
            .or_insert_with(|| Uuid::new_v4().to_string())
            .clone();

        info!(
            %player_id,
            "logged in ({} account)",
            if newly_created { "new" } else { "existing" }
        );

        Ok(Identity {
            player_id,
            newly_created,
        })
    }

    async fn fetch_questions(&self, identity: &Identity) -> Result<Vec<Question>, FetchError> {
        let known = self
            .accounts
            .lock()
            .map_err(|_| FetchError::Transport("account registry unavailable".to_owned()))?
            .values()
            .any(|player_id| *player_id == identity.player_id);
        if !known {
            return Err(FetchError::Unauthorized(identity.player_id.clone()));
        }

        let questions = self
            .items
            .iter()
            .map(CatalogItem::decode)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = questions.len(), "decoded catalog");
        Ok(questions)
    }
}
