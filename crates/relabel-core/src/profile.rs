//! Endpoint profiles: the constants that distinguish the two classification
//! endpoint variants.
//!
//! The variants differ only in the fixed request id they send and the CSV
//! column they write, so they are one parameterised component instead of two
//! near-identical programs.

/// A classification endpoint variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// General message-classification endpoint.
    ClassificationApi,
    /// Data-science team's endpoint.
    DataScience,
}

impl Profile {
    /// Fixed `id` literal sent with every request.
    ///
    /// This is a protocol field the endpoint expects, not row identity.
    pub fn request_id(&self) -> &'static str {
        match self {
            Self::ClassificationApi => "DUMMY",
            Self::DataScience => "ad55bce2-e1fb-4d33-8206-2abe47f9928e",
        }
    }

    /// CSV column this profile writes its labels into.
    pub fn target_column(&self) -> &'static str {
        match self {
            Self::ClassificationApi => "label_classification_api",
            Self::DataScience => "label_data_science",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClassificationApi => "classification-api",
            Self::DataScience => "data-science",
        }
    }
}
