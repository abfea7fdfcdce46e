//! Object storage endpoints for avatars and catalog images.

use crate::api::{check_response, PlatformClient};
use crate::error::Error;

pub struct StorageApi<'a> {
    client: &'a PlatformClient,
}

impl<'a> StorageApi<'a> {
    pub(crate) fn new(client: &'a PlatformClient) -> Self {
        Self { client }
    }

    /// Public URL of an object; stable and derivable without a request.
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        self.client
            .endpoint(&format!("/storage/v1/object/public/{bucket}/{path}"))
    }

    /// Upload an object, replacing any existing one, and return its public URL.
    pub async fn upload(
        &self,
        access_token: &str,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, Error> {
        let endpoint = format!("/storage/v1/object/{bucket}/{path}");
        let url = self.client.endpoint(&endpoint);

        let response = self
            .client
            .http()
            .post(&url)
            .header("apikey", self.client.api_key())
            .header("content-type", content_type)
            .header("x-upsert", "true")
            .bearer_auth(access_token)
            .body(bytes)
            .send()
            .await?;

        check_response(&endpoint, response).await?;

        Ok(self.public_url(bucket, path))
    }

    /// Download a public object.
    pub async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, Error> {
        let endpoint = format!("/storage/v1/object/public/{bucket}/{path}");
        let url = self.client.endpoint(&endpoint);

        let response = self.client.http().get(&url).send().await?;
        let response = check_response(&endpoint, response).await?;

        Ok(response.bytes().await?.to_vec())
    }
}
