use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscription tier of a tenant.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Trial,
    Essential,
    Professional,
}

impl PlanTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Essential => "essential",
            Self::Professional => "professional",
        }
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Company record; the unit of data isolation.
///
/// Every profile references at most one tenant, and all table reads carry the tenant
/// identifier as a filter.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub plan: PlanTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

#[cfg(test)]
mod tests {
    mod plan_tier_tests {
        use crate::model::tenant::{PlanTier, Tenant};

        #[test]
        /// Expect missing plan field to default to trial
        fn test_tenant_plan_defaults_to_trial() {
            let tenant: Tenant = serde_json::from_str(
                r#"{"id":"550e8400-e29b-41d4-a716-446655440000","name":"Assistec"}"#,
            )
            .unwrap();

            assert_eq!(tenant.plan, PlanTier::Trial);
            assert_eq!(tenant.name, "Assistec");
        }
    }
}
