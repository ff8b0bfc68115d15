//! Dream aggregate
//!
//! Accumulates what one user tells about one dream: the narrative, the
//! symbols extracted from it with the user's associations, and the
//! characters with their progressive annotation. Every "first"/"next" query
//! scans in insertion order.

mod actor;
#[cfg(test)]
mod proptests;

pub use actor::{Actor, ActorField};

use serde::Serialize;

/// Rendered in summaries for a value the user never gave
pub const NO_ANSWER: &str = "(no answer)";

/// A symbol extracted from the narrative and the user's association for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Association {
    pub symbol: String,
    pub association: Option<String>,
}

/// Which key/value pairs a summary lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairView {
    /// symbol → association
    Associations,
    /// person → characteristic
    PersonCharacteristic,
    /// characteristic → context
    CharacteristicContext,
    /// characteristic → sense
    CharacteristicSense,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dream {
    narrative: String,
    associations: Vec<Association>,
    actors: Vec<Actor>,
    interpretation: Option<String>,
}

impl Dream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn narrative(&self) -> &str {
        &self.narrative
    }

    pub fn associations(&self) -> &[Association] {
        &self.associations
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn interpretation(&self) -> Option<&str> {
        self.interpretation.as_deref()
    }

    pub fn set_interpretation(&mut self, text: impl Into<String>) {
        self.interpretation = Some(text.into());
    }

    /// Append a piece of the narrative, newline-joined to what came before
    pub fn append_narrative(&mut self, text: &str) {
        if !self.narrative.is_empty() {
            self.narrative.push('\n');
        }
        self.narrative.push_str(text);
    }

    /// Register symbols with no association yet. Known symbols are skipped.
    pub fn add_association_keys<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for key in keys {
            let key = key.into();
            if !self.associations.iter().any(|a| a.symbol == key) {
                self.associations.push(Association {
                    symbol: key,
                    association: None,
                });
            }
        }
    }

    /// Set the association of a known, still unresolved symbol.
    /// Returns whether anything changed.
    pub fn set_association(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self
            .associations
            .iter_mut()
            .find(|a| a.symbol == key && a.association.is_none())
        {
            Some(entry) => {
                entry.association = Some(value.into());
                true
            }
            None => false,
        }
    }

    pub fn first_unresolved_association_key(&self) -> Option<&str> {
        self.associations
            .iter()
            .find(|a| a.association.is_none())
            .map(|a| a.symbol.as_str())
    }

    /// Symbols still waiting for an association, in order
    pub fn unresolved_association_keys(&self) -> Vec<&str> {
        self.associations
            .iter()
            .filter(|a| a.association.is_none())
            .map(|a| a.symbol.as_str())
            .collect()
    }

    /// Append actors with only their name set. Duplicates are kept.
    pub fn add_actors<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actors.extend(names.into_iter().map(Actor::new));
    }

    /// Earliest actor that still needs `field` and has every earlier field
    pub fn next_actor_missing(&self, field: ActorField) -> Option<&Actor> {
        self.actors.iter().find(|a| a.is_awaiting(field))
    }

    /// Fill `field` on the actor [`Self::next_actor_missing`] would return.
    /// Returns whether an actor was updated.
    pub fn assign_to_next_actor_missing(
        &mut self,
        field: ActorField,
        value: impl Into<String>,
    ) -> bool {
        match self.actors.iter_mut().find(|a| a.is_awaiting(field)) {
            Some(actor) => actor.fill(field, value.into()),
            None => false,
        }
    }

    /// Markdown bullet list of the pairs selected by `view`
    pub fn render_pairs(&self, view: PairView) -> String {
        let line = |key: Option<&str>, value: Option<&str>| {
            format!(
                "- *{}* - {}",
                key.unwrap_or(NO_ANSWER),
                value.unwrap_or(NO_ANSWER)
            )
        };

        let lines: Vec<String> = match view {
            PairView::Associations => self
                .associations
                .iter()
                .map(|a| line(Some(&a.symbol), a.association.as_deref()))
                .collect(),
            PairView::PersonCharacteristic => self
                .actors
                .iter()
                .map(|a| line(Some(a.person()), a.characteristic()))
                .collect(),
            PairView::CharacteristicContext => self
                .actors
                .iter()
                .map(|a| line(a.characteristic(), a.context()))
                .collect(),
            PairView::CharacteristicSense => self
                .actors
                .iter()
                .map(|a| line(a.characteristic(), a.sense()))
                .collect(),
        };
        lines.join("\n")
    }
}
