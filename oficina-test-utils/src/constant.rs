pub static TEST_API_KEY: &str = "test-anon-key";
pub static TEST_USER_ID: &str = "550e8400-e29b-41d4-a716-446655440000";
pub static TEST_TENANT_ID: &str = "550e8400-e29b-41d4-a716-446655440001";
pub static TEST_EMAIL: &str = "tech@oficina.app";
pub static TEST_PASSWORD: &str = "hunter2";
pub static TEST_ACCESS_TOKEN: &str = "test-access-token";
pub static TEST_REFRESH_TOKEN: &str = "test-refresh-token";
