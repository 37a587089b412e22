//! Document upload adapter
//!
//! Tracks one record per document type of the catalogue. A file is checked
//! against its type's size and extension limits before anything goes over
//! the network; only then is a [`PendingUpload`] handed out. Pending uploads
//! for different types own their own progress channel and can be sent
//! concurrently, after which [`DocumentUploader::finish`] applies each
//! outcome.
//!
//! Replacing a file is upload-then-delete: the previous remote document is
//! removed only after the new one has been stored. Until then the record
//! keeps describing the stored file.
//!
//! A pending upload that is dropped before being applied is abandoned: the
//! record goes back to the status it had and a new upload can start.

use crate::api::RemoteDocument;
use crate::error::{CliError, Result};
use crate::progress::format_bytes;
use async_trait::async_trait;
use scholar_common::types::{ApplicationId, DocumentId, DocumentKind, DocumentRequirement};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Weak};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// File checks that fail before any upload starts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("'{file}' is empty")]
    Empty { file: String },

    #[error(
        "'{file}' is {} but {kind} uploads are limited to {}",
        format_bytes(*.size),
        format_bytes(*.max)
    )]
    TooLarge {
        file: String,
        kind: DocumentKind,
        size: u64,
        max: u64,
    },

    #[error("'{file}' has an unsupported file type; {kind} accepts {allowed}")]
    DisallowedExtension {
        file: String,
        kind: DocumentKind,
        allowed: String,
    },

    #[error("An upload for {0} is already in progress")]
    InProgress(DocumentKind),
}

/// A file picked for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { file_name, bytes })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.file_name).extension().and_then(|ext| ext.to_str())
    }
}

/// Check a file against the rules of its document type
pub fn validate_file(
    requirement: &DocumentRequirement,
    file: &UploadFile,
) -> std::result::Result<(), DocumentError> {
    if file.bytes.is_empty() {
        return Err(DocumentError::Empty {
            file: file.file_name.clone(),
        });
    }

    if file.size() > requirement.max_size_bytes {
        return Err(DocumentError::TooLarge {
            file: file.file_name.clone(),
            kind: requirement.kind,
            size: file.size(),
            max: requirement.max_size_bytes,
        });
    }

    let allowed = file
        .extension()
        .map(|ext| requirement.allows_extension(ext))
        .unwrap_or(false);
    if !allowed {
        return Err(DocumentError::DisallowedExtension {
            file: file.file_name.clone(),
            kind: requirement.kind,
            allowed: requirement.allowed_extensions.join(", "),
        });
    }

    Ok(())
}

/// Backend operations the adapter needs
#[async_trait]
pub trait DocumentTransport: Send + Sync {
    /// Store `file`, reporting 0..=100 percent on `progress`
    async fn upload(
        &self,
        application_id: &ApplicationId,
        kind: DocumentKind,
        file: UploadFile,
        progress: watch::Sender<u8>,
    ) -> Result<RemoteDocument>;

    async fn delete(&self, id: &DocumentId) -> Result<()>;

    async fn list(&self, application_id: &ApplicationId) -> Result<Vec<RemoteDocument>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Missing,
    Uploading { progress: u8 },
    Success,
    Error { message: String },
}

/// Upload state of one document type
///
/// `file_name` and `size_bytes` describe the stored document; a file being
/// uploaded shows up only once the backend accepts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub kind: DocumentKind,
    pub required: bool,
    pub file_name: Option<String>,
    pub size_bytes: u64,
    /// The document currently stored on the backend, if any
    pub remote_id: Option<DocumentId>,
    pub status: UploadStatus,
}

impl DocumentRecord {
    fn empty(requirement: &DocumentRequirement) -> Self {
        Self {
            kind: requirement.kind,
            required: requirement.required,
            file_name: None,
            size_bytes: 0,
            remote_id: None,
            status: UploadStatus::Missing,
        }
    }

    /// Whether the backend holds a document of this type
    pub fn is_uploaded(&self) -> bool {
        self.remote_id.is_some()
    }
}

/// An upload that passed validation and is ready to send
#[derive(Debug)]
pub struct PendingUpload {
    application_id: ApplicationId,
    kind: DocumentKind,
    file: UploadFile,
    progress_tx: watch::Sender<u8>,
    progress_rx: watch::Receiver<u8>,
    ticket: Arc<()>,
}

impl PendingUpload {
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn file_name(&self) -> &str {
        &self.file.file_name
    }

    /// Percentage sent so far
    pub fn progress(&self) -> watch::Receiver<u8> {
        self.progress_rx.clone()
    }

    /// Perform the network call
    pub async fn send<T>(self, transport: &T) -> UploadOutcome
    where
        T: DocumentTransport + ?Sized,
    {
        let kind = self.kind;
        let file_name = self.file.file_name.clone();
        let size_bytes = self.file.size();
        debug!(kind = %kind, file = %file_name, "Uploading document");

        let result = transport
            .upload(&self.application_id, kind, self.file, self.progress_tx)
            .await;

        UploadOutcome {
            kind,
            file_name,
            size_bytes,
            result,
            ticket: self.ticket,
        }
    }
}

/// Result of [`PendingUpload::send`], applied with [`DocumentUploader::finish`]
#[derive(Debug)]
pub struct UploadOutcome {
    pub kind: DocumentKind,
    pub file_name: String,
    pub size_bytes: u64,
    pub result: Result<RemoteDocument>,
    ticket: Arc<()>,
}

/// An upload handed out by `begin_upload` and not applied yet
struct InFlight {
    ticket: Weak<()>,
    previous: UploadStatus,
}

pub struct DocumentUploader {
    application_id: ApplicationId,
    catalogue: Vec<DocumentRequirement>,
    records: BTreeMap<DocumentKind, DocumentRecord>,
    in_flight: BTreeMap<DocumentKind, InFlight>,
    locked: bool,
}

impl DocumentUploader {
    /// Uploader using the default catalogue
    pub fn new(application_id: ApplicationId) -> Self {
        Self::with_catalogue(application_id, DocumentKind::catalogue())
    }

    pub fn with_catalogue(application_id: ApplicationId, catalogue: Vec<DocumentRequirement>) -> Self {
        let records = catalogue
            .iter()
            .map(|requirement| (requirement.kind, DocumentRecord::empty(requirement)))
            .collect();

        Self {
            application_id,
            catalogue,
            records,
            in_flight: BTreeMap::new(),
            locked: false,
        }
    }

    pub fn application_id(&self) -> &ApplicationId {
        &self.application_id
    }

    /// Refuse further uploads once the application is submitted
    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn requirement(&self, kind: DocumentKind) -> Option<&DocumentRequirement> {
        self.catalogue.iter().find(|requirement| requirement.kind == kind)
    }

    pub fn record(&self, kind: DocumentKind) -> Option<&DocumentRecord> {
        self.records.get(&kind)
    }

    /// Records in catalogue order
    pub fn records(&self) -> impl Iterator<Item = &DocumentRecord> {
        self.catalogue
            .iter()
            .filter_map(|requirement| self.records.get(&requirement.kind))
    }

    /// Validate `file` and mark its type as uploading
    ///
    /// Nothing is sent and no record changes when validation fails.
    pub fn begin_upload(&mut self, kind: DocumentKind, file: UploadFile) -> Result<PendingUpload> {
        if self.locked {
            return Err(CliError::Locked);
        }

        let requirement = self
            .requirement(kind)
            .cloned()
            .unwrap_or_else(|| kind.requirement());
        validate_file(&requirement, &file)?;

        if self.in_flight.get(&kind).is_some_and(|upload| upload.ticket.strong_count() > 0) {
            return Err(DocumentError::InProgress(kind).into());
        }
        self.abandon(kind);

        let record = self
            .records
            .entry(kind)
            .or_insert_with(|| DocumentRecord::empty(&requirement));
        let previous = std::mem::replace(&mut record.status, UploadStatus::Uploading { progress: 0 });

        let ticket = Arc::new(());
        self.in_flight.insert(
            kind,
            InFlight {
                ticket: Arc::downgrade(&ticket),
                previous,
            },
        );

        let (progress_tx, progress_rx) = watch::channel(0u8);
        Ok(PendingUpload {
            application_id: self.application_id.clone(),
            kind,
            file,
            progress_tx,
            progress_rx,
            ticket,
        })
    }

    /// Give up on the pending upload of `kind`
    ///
    /// The record returns to the status it had before the upload started.
    /// Returns `false` when nothing was pending.
    pub fn abandon(&mut self, kind: DocumentKind) -> bool {
        let Some(upload) = self.in_flight.remove(&kind) else {
            return false;
        };
        if let Some(record) = self.records.get_mut(&kind) {
            if matches!(record.status, UploadStatus::Uploading { .. }) {
                debug!(kind = %kind, "Upload abandoned");
                record.status = upload.previous;
            }
        }
        true
    }

    /// Apply the outcome of a sent upload
    ///
    /// On success the previously stored document of the same type, if any,
    /// is deleted; a failed delete is logged and otherwise ignored. On
    /// failure the record keeps the reference to the previous remote
    /// document and the error is returned.
    pub async fn finish<T>(&mut self, outcome: UploadOutcome, transport: &T) -> Result<()>
    where
        T: DocumentTransport + ?Sized,
    {
        let UploadOutcome {
            kind,
            file_name,
            size_bytes,
            result,
            ticket,
        } = outcome;
        if self
            .in_flight
            .get(&kind)
            .is_some_and(|upload| upload.ticket.ptr_eq(&Arc::downgrade(&ticket)))
        {
            self.in_flight.remove(&kind);
        }
        let Some(record) = self.records.get_mut(&kind) else {
            return result.map(|_| ());
        };

        match result {
            Ok(remote) => {
                info!(kind = %kind, document_id = %remote.id, file = %file_name, "Document uploaded");
                let previous = record.remote_id.replace(remote.id.clone());
                record.file_name = Some(if remote.file_name.is_empty() {
                    file_name
                } else {
                    remote.file_name
                });
                record.size_bytes = if remote.file_size > 0 {
                    remote.file_size
                } else {
                    size_bytes
                };
                record.status = UploadStatus::Success;

                if let Some(old) = previous.filter(|old| *old != remote.id) {
                    if let Err(err) = transport.delete(&old).await {
                        warn!(kind = %kind, document_id = %old, error = %err, "Failed to delete replaced document");
                    }
                }
                Ok(())
            }
            Err(err) => {
                warn!(kind = %kind, file = %file_name, error = %err, "Document upload failed");
                record.status = UploadStatus::Error {
                    message: err.to_string(),
                };
                Err(err)
            }
        }
    }

    /// Validate, send and apply in one go
    pub async fn upload<T>(&mut self, kind: DocumentKind, file: UploadFile, transport: &T) -> Result<()>
    where
        T: DocumentTransport + ?Sized,
    {
        let pending = self.begin_upload(kind, file)?;
        let outcome = pending.send(transport).await;
        self.finish(outcome, transport).await
    }

    /// Fill records from documents already stored on the backend
    ///
    /// The most recently uploaded document wins when a type appears twice.
    /// Types outside the catalogue are ignored.
    pub fn hydrate(&mut self, mut remote: Vec<RemoteDocument>) {
        remote.sort_by_key(|doc| doc.uploaded_at);

        for doc in remote {
            let Some(kind) = doc.kind() else {
                debug!(document_type = %doc.document_type, "Skipping unknown document type");
                continue;
            };
            if let Some(record) = self.records.get_mut(&kind) {
                record.remote_id = Some(doc.id);
                record.file_name = Some(doc.file_name);
                record.size_bytes = doc.file_size;
                record.status = UploadStatus::Success;
            }
        }
    }

    /// Load and apply the backend's document list
    pub async fn refresh<T>(&mut self, transport: &T) -> Result<()>
    where
        T: DocumentTransport + ?Sized,
    {
        let remote = transport.list(&self.application_id).await?;
        self.hydrate(remote);
        Ok(())
    }

    /// Required types without a successful upload, in catalogue order
    pub fn missing_required(&self) -> Vec<DocumentKind> {
        self.records()
            .filter(|record| record.required && !record.is_uploaded())
            .map(|record| record.kind)
            .collect()
    }

    pub fn all_required_uploaded(&self) -> bool {
        self.missing_required().is_empty()
    }

    /// `round(100 × uploaded_required / total_required)`; 100 when nothing
    /// is required
    pub fn completion_percent(&self) -> u8 {
        let required = self.records().filter(|record| record.required).count();
        if required == 0 {
            return 100;
        }
        let uploaded = required - self.missing_required().len();
        ((uploaded as f64 * 100.0) / required as f64).round() as u8
    }
}
