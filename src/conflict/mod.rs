//! The conflict resolution matrix.
//!
//! A [`ConflictRule`] lists options that govern one concern, highest
//! priority first. After precedence resolution, [`apply`] evaluates every
//! registered rule against the draft snapshot: the highest-priority
//! explicitly active member wins, and every other explicitly active member
//! produces a [`Warning`]. Extending a rule means adding a name to its list.

use std::fmt;

use crate::registry::{OptionKind, Registry};
use crate::snapshot::{ConflictResolution, DraftSnapshot};

#[cfg(test)]
mod tests;

/// An ordered set of mutually exclusive options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictRule {
    concern: &'static str,
    members: Vec<&'static str>,
}

impl ConflictRule {
    /// Create a rule; `members` is in priority order, highest first.
    pub fn new(concern: &'static str, members: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            concern,
            members: members.into_iter().collect(),
        }
    }

    pub fn concern(&self) -> &'static str {
        self.concern
    }

    pub fn members(&self) -> &[&'static str] {
        &self.members
    }
}

/// A user-visible note about a deterministic conflict resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
    /// Recorded but not shown, because the winner promised minimal output.
    pub suppressed: bool,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Evaluate every registered rule, recording outcomes in `draft`.
///
/// Returns the warnings in rule order, then loser priority order.
pub fn apply(registry: &Registry, draft: &mut DraftSnapshot) -> Vec<Warning> {
    let mut warnings = Vec::new();

    for rule in registry.rules() {
        let (resolution, rule_warnings) = evaluate(registry, rule, draft);
        tracing::debug!(
            concern = rule.concern(),
            winner = resolution.winner.unwrap_or("none"),
            overridden = resolution.overridden.len(),
            "conflict rule evaluated"
        );
        warnings.extend(rule_warnings);
        draft.record(resolution);
    }

    warnings
}

fn evaluate(
    registry: &Registry,
    rule: &ConflictRule,
    draft: &DraftSnapshot,
) -> (ConflictResolution, Vec<Warning>) {
    let active: Vec<&'static str> = rule
        .members()
        .iter()
        .copied()
        .filter(|name| is_active(registry, draft, name))
        .collect();

    let Some((&winner, losers)) = active.split_first() else {
        return (
            ConflictResolution {
                concern: rule.concern(),
                winner: implicit_winner(rule, draft),
                overridden: Vec::new(),
            },
            Vec::new(),
        );
    };

    let suppressed = registry
        .get(winner)
        .is_some_and(|spec| spec.is_quiet_like());

    let warnings = losers
        .iter()
        .map(|loser| Warning {
            message: format!("{loser} overridden by {winner}"),
            suppressed,
        })
        .collect();

    (
        ConflictResolution {
            concern: rule.concern(),
            winner: Some(winner),
            overridden: losers.to_vec(),
        },
        warnings,
    )
}

/// Explicit, and for booleans explicitly `true`.
fn is_active(registry: &Registry, draft: &DraftSnapshot, name: &str) -> bool {
    let Some(setting) = draft.get(name) else {
        return false;
    };
    if !setting.explicit {
        return false;
    }
    match registry.get(name).map(|spec| spec.kind()) {
        Some(OptionKind::Boolean) => setting.value.as_bool() == Some(true),
        Some(_) => true,
        None => false,
    }
}

/// With nothing explicit, the highest-priority member enabled by the
/// environment or the config file governs, without warnings.
fn implicit_winner(rule: &ConflictRule, draft: &DraftSnapshot) -> Option<&'static str> {
    rule.members().iter().copied().find(|name| {
        draft
            .get(name)
            .and_then(|setting| setting.value.as_bool())
            .unwrap_or(false)
    })
}
