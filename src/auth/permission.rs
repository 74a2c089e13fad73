use super::model::{Actor, Capability};
use crate::receipt::ports::PermissionAuthority;

/// Answers capability checks from the capabilities granted in the actor's token.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClaimsPermissionAuthority;

impl PermissionAuthority for ClaimsPermissionAuthority {
    fn check(&self, capability: Capability, actor: &Actor) -> bool {
        let granted = actor.has(capability);
        if !granted {
            log::debug!("User {} lacks '{}'", actor.id, capability);
        }
        granted
    }
}
