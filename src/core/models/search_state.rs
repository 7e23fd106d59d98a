use crate::core::models::lookup::LookupSource;

/// Which chain sources have been queried during the current round.
///
/// Flags only ever go from `false` to `true`; the single way back is
/// [`SearchState::reset`], which the workflow calls on an explicit retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchState {
    searched_local: bool,
    searched_url: bool,
    searched_keyserver: bool,
}

impl SearchState {
    /// Record that `source` has reported back. File lookups run outside the
    /// chain and leave every flag untouched.
    pub fn mark_attempted(&mut self, source: LookupSource) {
        match source {
            LookupSource::LocalStore => self.searched_local = true,
            LookupSource::UrlFetch => self.searched_url = true,
            LookupSource::Keyserver => self.searched_keyserver = true,
            LookupSource::ContentFile => {}
        }
    }

    pub fn is_attempted(&self, source: LookupSource) -> bool {
        match source {
            LookupSource::LocalStore => self.searched_local,
            LookupSource::UrlFetch => self.searched_url,
            LookupSource::Keyserver => self.searched_keyserver,
            LookupSource::ContentFile => false,
        }
    }

    pub fn all_attempted(&self) -> bool {
        self.searched_local && self.searched_url && self.searched_keyserver
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
