//! Tenant-scoped service-order listing and derived metrics.
//!
//! Reads go through the uniform table interface with the tenant filter always
//! applied; metrics are a pure computation over the fetched list so views can derive
//! dashboard counters without another round trip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::PlatformClient;
use crate::error::Error;

/// Server-side bound on a single listing; matches the largest view the UI renders.
pub const DEFAULT_ORDER_LIMIT: u32 = 500;

/// Workflow state of a repair order.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Open,
    InProgress,
    AwaitingParts,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::AwaitingParts => "awaiting_parts",
            Self::Ready => "ready",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

/// One row of the service-order table, as listed in overviews.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServiceOrder {
    pub id: Uuid,
    pub order_number: i64,
    pub tenant_id: Uuid,
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Device description, e.g. "iPhone 13" or "Notebook Dell G15".
    #[serde(default)]
    pub device: Option<String>,
    pub status: OrderStatus,
    #[serde(default)]
    pub technician: Option<String>,
    #[serde(default)]
    pub billed_total: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Listing filter; everything unset means "all orders".
#[derive(Clone, Debug, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Case-insensitive needle matched against customer and device.
    pub search: Option<String>,
    pub limit: Option<u32>,
}

/// Counters derived from an order list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderMetrics {
    pub total: usize,
    pub open: usize,
    pub in_progress: usize,
    pub awaiting_parts: usize,
    pub ready: usize,
    pub delivered: usize,
    /// Sum of billed totals across delivered orders.
    pub billed_revenue: f64,
}

impl OrderMetrics {
    /// Pure derived-state computation over an order list.
    pub fn compute(orders: &[ServiceOrder]) -> Self {
        let mut metrics = Self {
            total: orders.len(),
            ..Self::default()
        };

        for order in orders {
            match order.status {
                OrderStatus::Open => metrics.open += 1,
                OrderStatus::InProgress => metrics.in_progress += 1,
                OrderStatus::AwaitingParts => metrics.awaiting_parts += 1,
                OrderStatus::Ready => metrics.ready += 1,
                OrderStatus::Delivered => {
                    metrics.delivered += 1;
                    metrics.billed_revenue += order.billed_total.unwrap_or(0.0);
                }
                OrderStatus::Cancelled => {}
            }
        }

        metrics
    }
}

pub struct OrderService<'a> {
    api: &'a PlatformClient,
}

impl<'a> OrderService<'a> {
    pub fn new(api: &'a PlatformClient) -> Self {
        Self { api }
    }

    /// Newest-first listing of a tenant's orders.
    ///
    /// Status filters apply server-side; the search needle is matched client-side so a
    /// single fetch serves interactive filtering.
    pub async fn list(
        &self,
        access_token: &str,
        tenant_id: Uuid,
        filter: &OrderFilter,
    ) -> Result<Vec<ServiceOrder>, Error> {
        let mut query = self
            .api
            .table("service_orders")
            .bearer(access_token)
            .eq("tenant_id", tenant_id)
            .order("created_at", true)
            .limit(filter.limit.unwrap_or(DEFAULT_ORDER_LIMIT));

        if let Some(status) = filter.status {
            query = query.eq("status", status.as_str());
        }

        let mut orders: Vec<ServiceOrder> = query.fetch().await?;

        if let Some(needle) = filter.search.as_ref().map(|s| s.to_lowercase()) {
            orders.retain(|order| {
                let customer = order.customer_name.as_deref().unwrap_or("");
                let device = order.device.as_deref().unwrap_or("");

                customer.to_lowercase().contains(&needle)
                    || device.to_lowercase().contains(&needle)
            });
        }

        Ok(orders)
    }

    /// Fetch a listing and its derived metrics in one call.
    pub async fn list_with_metrics(
        &self,
        access_token: &str,
        tenant_id: Uuid,
        filter: &OrderFilter,
    ) -> Result<(Vec<ServiceOrder>, OrderMetrics), Error> {
        let orders = self.list(access_token, tenant_id, filter).await?;
        let metrics = OrderMetrics::compute(&orders);

        Ok((orders, metrics))
    }
}
