use super::entity::EntityId;
use super::registry::EntityRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectAction {
    /// Restore the entity's base tint after a damage flash.
    ClearTint,
    /// Remove the entity from the registry.
    Despawn,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledEffect {
    pub due_at: f64,
    pub entity: EntityId,
    pub action: EffectAction,
}

/// Deferred visual follow-ups, drained by the session clock and dropped
/// wholesale on teardown.
#[derive(Debug, Default)]
pub struct EffectQueue {
    pending: Vec<ScheduledEffect>,
}

impl EffectQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_at: f64, entity: EntityId, action: EffectAction) {
        self.pending.push(ScheduledEffect {
            due_at,
            entity,
            action,
        });
    }

    /// Schedules `action`, dropping any pending copy of it for the same
    /// entity so only the latest deadline fires.
    pub fn reschedule(&mut self, due_at: f64, entity: EntityId, action: EffectAction) {
        self.pending
            .retain(|effect| !(effect.entity == entity && effect.action == action));
        self.schedule(due_at, entity, action);
    }

    /// Removes and returns every effect due at or before `now`, in the order
    /// they were scheduled.
    pub fn drain_due(&mut self, now: f64) -> Vec<ScheduledEffect> {
        let mut due = Vec::new();
        self.pending.retain(|effect| {
            if effect.due_at <= now {
                due.push(*effect);
                false
            } else {
                true
            }
        });
        due
    }

    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Applies one effect. Entities that are already gone are skipped.
pub(crate) fn apply_effect(effect: &ScheduledEffect, registry: &mut EntityRegistry) -> bool {
    match effect.action {
        EffectAction::ClearTint => match registry.get_mut(effect.entity) {
            Some(entity) => {
                entity.visual.clear_tint();
                true
            }
            None => false,
        },
        EffectAction::Despawn => registry.remove(effect.entity),
    }
}
