//! Team listing state for the `/team` page.
//!
//! DESIGN
//! ======
//! The page owns one `RwSignal<TeamState>`; the browser-only fetch resolves it
//! exactly once through [`TeamState::finish`].

#[cfg(test)]
#[path = "team_test.rs"]
mod team_test;

use session::ProviderError;

use crate::net::types::TeamMember;

/// Fetch status and rows of the team table.
#[derive(Clone, Debug, PartialEq)]
pub struct TeamState {
    pub members: Vec<TeamMember>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for TeamState {
    fn default() -> Self {
        Self { members: Vec::new(), loading: true, error: None }
    }
}

impl TeamState {
    /// Settle the state from a fetch result. Rows are ordered by
    /// `display_order`, unordered rows last.
    pub fn finish(&mut self, result: Result<Vec<TeamMember>, ProviderError>) {
        self.loading = false;
        match result {
            Ok(mut members) => {
                members.sort_by_key(|m| (m.display_order.is_none(), m.display_order));
                self.members = members;
                self.error = None;
            }
            Err(e) => {
                self.members.clear();
                self.error = Some(e.to_string());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.loading && self.error.is_none() && self.members.is_empty()
    }
}
