//! Runtime permission checks and requests.

use crate::types::Permission;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use tracing::info;

#[async_trait]
pub trait PermissionGate: Send + Sync {
    fn check(&self, permission: Permission) -> bool;
    /// Prompts for `permissions` and returns the user's answer for each.
    async fn request(&self, permissions: &[Permission]) -> HashMap<Permission, bool>;
}

/// Permission gate with a fixed answer: every request is granted except the refused set.
///
/// Nothing is granted until requested, so the first run always goes through the request path.
pub struct PresetPermissions {
    granted: RwLock<HashSet<Permission>>,
    refused: HashSet<Permission>,
}

impl PresetPermissions {
    pub fn new(refused: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            granted: RwLock::new(HashSet::new()),
            refused: refused.into_iter().collect(),
        }
    }

    /// Gate where `granted` are already held and nothing else will be granted.
    pub fn granted(granted: impl IntoIterator<Item = Permission>) -> Self {
        let granted: HashSet<Permission> = granted.into_iter().collect();
        let refused = [
            Permission::ReadSms,
            Permission::ReceiveSms,
            Permission::ReadPhoneState,
            Permission::PostNotifications,
        ]
        .into_iter()
        .filter(|p| !granted.contains(p))
        .collect();
        Self {
            granted: RwLock::new(granted),
            refused,
        }
    }
}

#[async_trait]
impl PermissionGate for PresetPermissions {
    fn check(&self, permission: Permission) -> bool {
        self.granted
            .read()
            .map(|g| g.contains(&permission))
            .unwrap_or(false)
    }

    async fn request(&self, permissions: &[Permission]) -> HashMap<Permission, bool> {
        let mut answers = HashMap::new();
        for permission in permissions {
            let granted = !self.refused.contains(permission);
            if granted {
                if let Ok(mut g) = self.granted.write() {
                    g.insert(*permission);
                }
            }
            info!(permission = %permission, granted, "Permission answered");
            answers.insert(*permission, granted);
        }
        answers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_grants_all_but_refused() {
        let gate = PresetPermissions::new([Permission::ReadPhoneState]);
        assert!(!gate.check(Permission::ReadSms));

        let answers = gate
            .request(&[Permission::ReadSms, Permission::ReadPhoneState])
            .await;

        assert_eq!(answers.get(&Permission::ReadSms), Some(&true));
        assert_eq!(answers.get(&Permission::ReadPhoneState), Some(&false));
        assert!(gate.check(Permission::ReadSms));
        assert!(!gate.check(Permission::ReadPhoneState));
    }

    #[tokio::test]
    async fn test_granted_gate_refuses_the_rest() {
        let gate = PresetPermissions::granted([Permission::ReadSms]);
        assert!(gate.check(Permission::ReadSms));

        let answers = gate.request(&[Permission::PostNotifications]).await;
        assert_eq!(answers.get(&Permission::PostNotifications), Some(&false));
    }
}
