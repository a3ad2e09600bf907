//! Event allowlist compilation and matching.
//!
//! Entries are exact event names (`"chat message"`) or `"*"` for every event.

use std::collections::HashSet;

use classroom_core::error::{ClassroomError, Result};
use classroom_core::protocol::names;

/// Compiled allowlist.
#[derive(Debug, Clone, Default)]
pub struct EventAllowlist {
    any: bool,
    events: HashSet<String>,
}

pub fn compile_event_rules(raw: &[String]) -> Result<EventAllowlist> {
    let mut out = EventAllowlist::default();
    for s in raw {
        if s == "*" {
            out.any = true;
            continue;
        }
        if !names::INBOUND.contains(&s.as_str()) {
            return Err(ClassroomError::BadRequest(format!(
                "invalid allowed_events entry: {s}"
            )));
        }
        out.events.insert(s.clone());
    }
    Ok(out)
}

impl EventAllowlist {
    pub fn is_allowed(&self, event: &str) -> bool {
        self.any || self.events.contains(event)
    }

    pub fn is_empty(&self) -> bool {
        !self.any && self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn wildcard_allows_everything() {
        let rules = compile_event_rules(&["*".into()]).unwrap();
        assert!(rules.is_allowed(names::TEACHER_SIGNAL));
        assert!(rules.is_allowed(names::CHAT_MESSAGE));
    }

    #[test]
    fn exact_entries_only() {
        let rules = compile_event_rules(&[names::JOIN_LIVE_CLASS.into()]).unwrap();
        assert!(rules.is_allowed(names::JOIN_LIVE_CLASS));
        assert!(!rules.is_allowed(names::CHAT_MESSAGE));
    }

    #[test]
    fn unknown_entry_fails_compile() {
        let err = compile_event_rules(&["chat:*".into()]).unwrap_err();
        assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
    }
}
