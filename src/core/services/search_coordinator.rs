use crate::core::models::lookup::{LookupRequest, LookupSource};
use crate::core::models::search_state::SearchState;
use crate::core::models::token_identity::TokenIdentity;

/// What the fallback chain wants to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchAction {
    RunLookup(LookupRequest),
    /// Every chain source has been tried; offer retry or a manual file.
    Exhausted,
}

/// Picks the next source of the fallback chain.
///
/// The scan is a pure function of [`SearchState`]: the first source that has
/// not reported back yet wins. Because it never remembers anything itself,
/// a run can resume from any prefix of completed sources, and a retry is
/// just a reset of the state followed by the same scan.
pub struct SearchCoordinator;

impl SearchCoordinator {
    pub fn advance(&self, state: &SearchState, token: &TokenIdentity) -> SearchAction {
        LookupSource::CHAIN
            .into_iter()
            .filter(|source| !state.is_attempted(*source))
            .find_map(|source| LookupRequest::for_chain(source, token))
            .map_or(SearchAction::Exhausted, SearchAction::RunLookup)
    }
}
