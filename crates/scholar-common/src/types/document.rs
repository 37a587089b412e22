//! Document types and their upload limits

use crate::error::PortalError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One mebibyte
pub const MIB: u64 = 1024 * 1024;

const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Category of a supporting document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    IdCard,
    HouseRegistration,
    Transcript,
    IncomeCertificate,
    Photo,
    RecommendationLetter,
    ActivityCertificate,
    Other,
}

/// Upload rules for one document type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRequirement {
    pub kind: DocumentKind,
    pub label: &'static str,
    pub required: bool,
    pub max_size_bytes: u64,
    pub allowed_extensions: &'static [&'static str],
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 8] = [
        DocumentKind::IdCard,
        DocumentKind::HouseRegistration,
        DocumentKind::Transcript,
        DocumentKind::IncomeCertificate,
        DocumentKind::Photo,
        DocumentKind::RecommendationLetter,
        DocumentKind::ActivityCertificate,
        DocumentKind::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::IdCard => "id_card",
            DocumentKind::HouseRegistration => "house_registration",
            DocumentKind::Transcript => "transcript",
            DocumentKind::IncomeCertificate => "income_certificate",
            DocumentKind::Photo => "photo",
            DocumentKind::RecommendationLetter => "recommendation_letter",
            DocumentKind::ActivityCertificate => "activity_certificate",
            DocumentKind::Other => "other",
        }
    }

    /// Default upload rules for this type
    pub fn requirement(self) -> DocumentRequirement {
        let (label, required, max_size_bytes, allowed_extensions) = match self {
            DocumentKind::IdCard => ("Copy of citizen ID card", true, 10 * MIB, DOCUMENT_EXTENSIONS),
            DocumentKind::HouseRegistration => {
                ("Copy of house registration", true, 10 * MIB, DOCUMENT_EXTENSIONS)
            }
            DocumentKind::Transcript => ("Academic transcript", true, 10 * MIB, DOCUMENT_EXTENSIONS),
            DocumentKind::IncomeCertificate => {
                ("Household income certificate", true, 10 * MIB, DOCUMENT_EXTENSIONS)
            }
            DocumentKind::Photo => ("Student photo", true, 5 * MIB, IMAGE_EXTENSIONS),
            DocumentKind::RecommendationLetter => {
                ("Recommendation letter", false, 10 * MIB, DOCUMENT_EXTENSIONS)
            }
            DocumentKind::ActivityCertificate => {
                ("Activity certificate", false, 10 * MIB, DOCUMENT_EXTENSIONS)
            }
            DocumentKind::Other => ("Other supporting document", false, 10 * MIB, DOCUMENT_EXTENSIONS),
        };

        DocumentRequirement {
            kind: self,
            label,
            required,
            max_size_bytes,
            allowed_extensions,
        }
    }

    /// Rules for every type, required types first
    pub fn catalogue() -> Vec<DocumentRequirement> {
        Self::ALL.iter().map(|kind| kind.requirement()).collect()
    }
}

impl DocumentRequirement {
    pub fn allows_extension(&self, extension: &str) -> bool {
        let extension = extension.to_lowercase();
        self.allowed_extensions.iter().any(|allowed| *allowed == extension)
    }
}

/// MIME type sent with an upload, chosen from the file extension
pub fn mime_for_extension(extension: &str) -> mime::Mime {
    match extension.to_lowercase().as_str() {
        "pdf" => mime::APPLICATION_PDF,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "png" => mime::IMAGE_PNG,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| PortalError::UnknownDocumentType(s.to_string()))
    }
}
