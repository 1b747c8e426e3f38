//! Controller Policies
//!
//! The active quest controller may preset quest options (a daily-quest
//! controller makes everything repeatable, for instance). Policies run on each
//! quest right after it is read from its file.

use std::collections::HashMap;

use crate::quest::Quest;

pub trait ControllerPolicy: Send + Sync {
    fn apply(&self, quest: &mut Quest);
}

/// Quests are handed out on a rotation: always repeatable, no cooldown,
/// no requirements, no permission.
#[derive(Debug, Clone, Copy, Default)]
pub struct DailyRotationPolicy;

impl ControllerPolicy for DailyRotationPolicy {
    fn apply(&self, quest: &mut Quest) {
        quest.options.repeatable = true;
        quest.options.cooldown_enabled = true;
        quest.options.cooldown_time = 0;
        quest.options.permission_required = false;
        quest.requirements.clear();
    }
}

/// Policies keyed by controller identity
#[derive(Default)]
pub struct ControllerPolicies {
    policies: HashMap<String, Box<dyn ControllerPolicy>>,
}

impl ControllerPolicies {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in policies (`daily`)
    pub fn with_defaults() -> Self {
        let mut policies = Self::new();
        policies.register("daily", DailyRotationPolicy);
        policies
    }

    pub fn register(&mut self, controller: &str, policy: impl ControllerPolicy + 'static) {
        self.policies.insert(controller.to_string(), Box::new(policy));
    }

    pub fn for_controller(&self, controller: &str) -> Option<&dyn ControllerPolicy> {
        self.policies.get(controller).map(|p| p.as_ref())
    }
}
