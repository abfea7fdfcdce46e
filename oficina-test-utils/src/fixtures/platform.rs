//! Data-plane JSON factories and mock endpoint creation utilities.

use mockito::{Matcher, Mock};
use serde_json::{json, Value};

use crate::constant::{TEST_EMAIL, TEST_TENANT_ID, TEST_USER_ID};
use crate::setup::TestSetup;

/// Profile row as the data plane returns it for single-object reads.
pub fn profile_json(role: &str) -> Value {
    json!({
        "auth_user_id": TEST_USER_ID,
        "tenant_id": TEST_TENANT_ID,
        "name": "Ana Souza",
        "email": TEST_EMAIL,
        "role": role,
        "permissions": ["dashboard", "orders"],
        "avatar_url": null
    })
}

/// Tenant row matching [`profile_json`]'s tenant reference.
pub fn tenant_json() -> Value {
    json!({
        "id": TEST_TENANT_ID,
        "name": "Assistec Ilhabela",
        "plan": "professional",
        "phone": "+55 12 99999-0000"
    })
}

/// Service-order row for listing fixtures.
pub fn order_json(order_number: i64, status: &str, billed_total: Option<f64>) -> Value {
    json!({
        "id": uuid::Uuid::new_v4().to_string(),
        "order_number": order_number,
        "tenant_id": TEST_TENANT_ID,
        "customer_name": "Carlos Lima",
        "device": "Notebook Dell G15",
        "status": status,
        "technician": "Ana Souza",
        "billed_total": billed_total,
        "created_at": chrono::Utc::now().to_rfc3339()
    })
}

pub struct PlatformFixtures<'a> {
    setup: &'a mut TestSetup,
}

impl<'a> PlatformFixtures<'a> {
    pub(crate) fn new(setup: &'a mut TestSetup) -> Self {
        Self { setup }
    }

    /// Mock the profile single-object read on `GET /rest/v1/profiles`.
    pub fn create_profile_endpoint(&mut self, profile: Value, expected_requests: usize) -> Mock {
        self.setup
            .server
            .mock("GET", "/rest/v1/profiles")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(profile.to_string())
            .expect(expected_requests)
            .create()
    }

    /// Mock a failing profile read with the given status.
    pub fn create_failing_profile_endpoint(
        &mut self,
        status: usize,
        expected_requests: usize,
    ) -> Mock {
        self.setup
            .server
            .mock("GET", "/rest/v1/profiles")
            .match_query(Matcher::Any)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(json!({ "message": "internal error" }).to_string())
            .expect(expected_requests)
            .create()
    }

    /// Mock the tenant single-object read on `GET /rest/v1/tenants`.
    pub fn create_tenant_endpoint(&mut self, tenant: Value, expected_requests: usize) -> Mock {
        self.setup
            .server
            .mock("GET", "/rest/v1/tenants")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(tenant.to_string())
            .expect(expected_requests)
            .create()
    }

    /// Mock the service-order listing on `GET /rest/v1/service_orders`.
    pub fn create_orders_endpoint(&mut self, orders: Vec<Value>, expected_requests: usize) -> Mock {
        self.setup
            .server
            .mock("GET", "/rest/v1/service_orders")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(Value::Array(orders).to_string())
            .expect(expected_requests)
            .create()
    }

    /// Mock a profile patch on `PATCH /rest/v1/profiles`.
    pub fn create_profile_update_endpoint(&mut self, expected_requests: usize) -> Mock {
        self.setup
            .server
            .mock("PATCH", "/rest/v1/profiles")
            .match_query(Matcher::Any)
            .with_status(204)
            .expect(expected_requests)
            .create()
    }

    /// Mock an avatar upload on the storage plane.
    pub fn create_avatar_upload_endpoint(&mut self, expected_requests: usize) -> Mock {
        self.setup
            .server
            .mock("POST", Matcher::Regex(r"^/storage/v1/object/avatars/.+$".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "Key": "avatars/upload" }).to_string())
            .expect(expected_requests)
            .create()
    }
}
