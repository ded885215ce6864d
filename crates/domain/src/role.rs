//! Roles: what the controller uses an accessory for.
//!
//! Accessories get a role from an explicit identifier mapping. Accessories
//! absent from the mapping can optionally fall back to the legacy
//! name-substring heuristic (`temp`, `hum`, `relais`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::accessory::{Accessory, Capability};
use crate::id::AccessoryId;

/// The part an accessory plays in the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessoryRole {
    Thermometer,
    Hygrometer,
    Relay,
}

impl AccessoryRole {
    /// Every role, in classification order.
    pub const ALL: [Self; 3] = [Self::Thermometer, Self::Hygrometer, Self::Relay];

    /// The capability an accessory must expose to fill this role.
    #[must_use]
    pub fn required_capability(self) -> Capability {
        match self {
            Self::Thermometer => Capability::CurrentTemperature,
            Self::Hygrometer => Capability::CurrentRelativeHumidity,
            Self::Relay => Capability::PowerState,
        }
    }

    /// Lower-case substring matched by the legacy name heuristic.
    #[must_use]
    pub fn name_hint(self) -> &'static str {
        match self {
            Self::Thermometer => "temp",
            Self::Hygrometer => "hum",
            Self::Relay => "relais",
        }
    }
}

impl std::fmt::Display for AccessoryRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Thermometer => f.write_str("thermometer"),
            Self::Hygrometer => f.write_str("hygrometer"),
            Self::Relay => f.write_str("relay"),
        }
    }
}

/// Mapping from accessory identifier to role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleMap {
    explicit: HashMap<AccessoryId, AccessoryRole>,
    match_by_name: bool,
}

impl RoleMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag `accessory` with `role`, replacing any previous tag.
    #[must_use]
    pub fn with(mut self, accessory: AccessoryId, role: AccessoryRole) -> Self {
        self.explicit.insert(accessory, role);
        self
    }

    /// Enable the name-substring fallback for untagged accessories.
    #[must_use]
    pub fn match_by_name(mut self, enabled: bool) -> Self {
        self.match_by_name = enabled;
        self
    }

    /// Role of a single accessory, if any.
    #[must_use]
    pub fn role_of(&self, accessory: &Accessory) -> Option<AccessoryRole> {
        if let Some(role) = self.explicit.get(&accessory.id) {
            return Some(*role);
        }
        if !self.match_by_name {
            return None;
        }
        let name = accessory.name.to_lowercase();
        AccessoryRole::ALL
            .into_iter()
            .find(|role| name.contains(role.name_hint()))
    }

    /// Assign roles to a discovery result.
    ///
    /// Explicitly tagged accessories fill their role first; name matches
    /// only take roles still empty. Within each pass the first accessory for
    /// a role wins. Accessories lacking the capability their role requires
    /// are skipped and reported in [`Classification::skipped`].
    #[must_use]
    pub fn classify(&self, accessories: &[Accessory]) -> Classification {
        let mut classification = Classification::default();
        let (tagged, untagged): (Vec<&Accessory>, Vec<&Accessory>) = accessories
            .iter()
            .partition(|accessory| self.explicit.contains_key(&accessory.id));
        for accessory in tagged.into_iter().chain(untagged) {
            let Some(role) = self.role_of(accessory) else {
                continue;
            };
            if accessory
                .characteristic(&role.required_capability())
                .is_none()
            {
                classification.skipped.push((accessory.id, role));
                continue;
            }
            classification
                .assigned
                .entry(role)
                .or_insert_with(|| accessory.clone());
        }
        classification
    }
}

/// Result of assigning roles to discovered accessories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    assigned: HashMap<AccessoryRole, Accessory>,
    /// Accessories that matched a role but lack its capability.
    pub skipped: Vec<(AccessoryId, AccessoryRole)>,
}

impl Classification {
    #[must_use]
    pub fn get(&self, role: AccessoryRole) -> Option<&Accessory> {
        self.assigned.get(&role)
    }

    #[must_use]
    pub fn has(&self, role: AccessoryRole) -> bool {
        self.assigned.contains_key(&role)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}
