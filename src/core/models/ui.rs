use crate::core::models::lookup::LookupSource;

/// One line in the progress display. Each is later closed by an Ok or Error
/// marker from the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLine {
    SearchLocal,
    SearchUrl,
    SearchKeyserver,
    SearchContentFile,
    Import,
    TokenCheck,
    TokenPromote,
}

impl StatusLine {
    pub fn searching(source: LookupSource) -> Self {
        match source {
            LookupSource::LocalStore => Self::SearchLocal,
            LookupSource::UrlFetch => Self::SearchUrl,
            LookupSource::Keyserver => Self::SearchKeyserver,
            LookupSource::ContentFile => Self::SearchContentFile,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SearchLocal => "Searching local key store",
            Self::SearchUrl => "Fetching key from token URL",
            Self::SearchKeyserver => "Searching keyserver",
            Self::SearchContentFile => "Reading key from file",
            Self::Import => "Importing key",
            Self::TokenCheck => "Checking key against token",
            Self::TokenPromote => "Binding key to token",
        }
    }
}

/// The action the view should currently offer the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ShowImport,
    ShowRetryOrFile,
    ShowViewKey,
    ShowConfirmReset,
    RequestPermission,
    ShowFileDialog,
}
