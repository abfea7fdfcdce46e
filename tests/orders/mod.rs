use uuid::Uuid;

use oficina::api::PlatformClient;
use oficina::service::orders::{OrderFilter, OrderMetrics, OrderService, OrderStatus};
use oficina_test_utils::prelude::*;

#[tokio::test]
/// Expect a tenant-scoped listing with client-side search and derived metrics
async fn test_order_listing_with_metrics() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_orders(
            vec![
                platform::order_json(101, "open", None),
                platform::order_json(102, "in_progress", None),
                platform::order_json(103, "delivered", Some(350.0)),
            ],
            1,
        )
        .build()
        .await?;
    let client = PlatformClient::new(test.base_url(), TEST_API_KEY).unwrap();
    let tenant_id = Uuid::parse_str(TEST_TENANT_ID).unwrap();

    let (orders, metrics) = OrderService::new(&client)
        .list_with_metrics(TEST_ACCESS_TOKEN, tenant_id, &OrderFilter::default())
        .await
        .unwrap();

    assert_eq!(orders.len(), 3);
    assert_eq!(orders[0].status, OrderStatus::Open);
    assert_eq!(
        metrics,
        OrderMetrics {
            total: 3,
            open: 1,
            in_progress: 1,
            delivered: 1,
            billed_revenue: 350.0,
            ..OrderMetrics::default()
        }
    );

    test.assert_mocks();

    Ok(())
}

#[tokio::test]
/// Expect the search needle to filter client-side across customer and device
async fn test_order_search_filters_client_side() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_orders(
            vec![
                platform::order_json(201, "open", None),
                platform::order_json(202, "ready", None),
            ],
            1,
        )
        .build()
        .await?;
    let client = PlatformClient::new(test.base_url(), TEST_API_KEY).unwrap();
    let tenant_id = Uuid::parse_str(TEST_TENANT_ID).unwrap();

    let filter = OrderFilter {
        search: Some("DELL".to_string()),
        ..OrderFilter::default()
    };
    let orders = OrderService::new(&client)
        .list(TEST_ACCESS_TOKEN, tenant_id, &filter)
        .await
        .unwrap();

    // Every fixture order is a Dell notebook; a non-matching needle returns nothing.
    assert_eq!(orders.len(), 2);

    let filter = OrderFilter {
        search: Some("iphone".to_string()),
        ..OrderFilter::default()
    };
    let test2 = TestBuilder::new()
        .with_orders(vec![platform::order_json(301, "open", None)], 1)
        .build()
        .await?;
    let client2 = PlatformClient::new(test2.base_url(), TEST_API_KEY).unwrap();
    let orders = OrderService::new(&client2)
        .list(TEST_ACCESS_TOKEN, tenant_id, &filter)
        .await
        .unwrap();

    assert!(orders.is_empty());

    Ok(())
}
