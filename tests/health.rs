use gym_store_api::routes::health::health_check;

#[tokio::test]
async fn health_check_returns_ok() {
    let response = health_check().await;
    assert_eq!(response.message, "Health check");
    assert!(response.success);
    assert_eq!(response.status_code, 200);
}
