//! Dream characters and their progressive annotation

use serde::Serialize;

/// A character of the dream, annotated field by field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    person: String,
    characteristic: Option<String>,
    context: Option<String>,
    sense: Option<String>,
}

/// Annotatable actor fields, in fill order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorField {
    Characteristic,
    Context,
    Sense,
}

impl ActorField {
    #[cfg(test)]
    pub const ALL: [ActorField; 3] = [
        ActorField::Characteristic,
        ActorField::Context,
        ActorField::Sense,
    ];

    /// Field that must be filled before this one
    pub fn previous(self) -> Option<ActorField> {
        match self {
            ActorField::Characteristic => None,
            ActorField::Context => Some(ActorField::Characteristic),
            ActorField::Sense => Some(ActorField::Context),
        }
    }
}

impl Actor {
    pub fn new(person: impl Into<String>) -> Self {
        Self {
            person: person.into(),
            characteristic: None,
            context: None,
            sense: None,
        }
    }

    pub fn person(&self) -> &str {
        &self.person
    }

    pub fn characteristic(&self) -> Option<&str> {
        self.characteristic.as_deref()
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn sense(&self) -> Option<&str> {
        self.sense.as_deref()
    }

    pub fn get(&self, field: ActorField) -> Option<&str> {
        match field {
            ActorField::Characteristic => self.characteristic(),
            ActorField::Context => self.context(),
            ActorField::Sense => self.sense(),
        }
    }

    /// True when `field` is empty and every earlier field is filled
    pub fn is_awaiting(&self, field: ActorField) -> bool {
        self.get(field).is_none()
            && field
                .previous()
                .map_or(true, |prev| self.get(prev).is_some())
    }

    /// Fill `field` if the actor is awaiting it. Returns whether it was set.
    pub(super) fn fill(&mut self, field: ActorField, value: String) -> bool {
        if !self.is_awaiting(field) {
            return false;
        }
        let slot = match field {
            ActorField::Characteristic => &mut self.characteristic,
            ActorField::Context => &mut self.context,
            ActorField::Sense => &mut self.sense,
        };
        *slot = Some(value);
        true
    }
}
