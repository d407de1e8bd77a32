use reqwest::{
    header::{
        HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_ENCODING,
        CONTENT_TYPE, USER_AGENT,
    },
    Client,
};
use std::time::Duration;

use crate::{configuration::Config, error::Error, types::PushHeader};

#[derive(Debug)]
pub struct HTTP {
    pub http: Client,
}

impl HTTP {
    pub fn new(config: &Config) -> Result<HTTP, Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(HTTP { http })
    }

    /// Posts an `aes128gcm` encrypted message to a push service endpoint and
    /// returns the response status.
    pub async fn post_push(
        &self,
        url: &str,
        authorization: String,
        push_header: &PushHeader,
        data: Vec<u8>,
    ) -> Result<u16, Error> {
        let mut header_map = HeaderMap::new();

        header_map.insert(USER_AGENT, HeaderValue::from_static("call-relay"));
        header_map.insert(
            AUTHORIZATION,
            HeaderValue::from_str(authorization.as_str())?,
        );
        header_map.insert(
            CONTENT_ENCODING,
            HeaderValue::from_static("aes128gcm"),
        );
        header_map.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );
        header_map.insert("ttl", HeaderValue::from(push_header.ttl));
        header_map.insert(
            "urgency",
            HeaderValue::from_str(&push_header.urgency.to_string())?,
        );

        let response = self
            .http
            .post(url)
            .headers(header_map)
            .body(data)
            .send()
            .await?;
        let status = response.status().as_u16();

        Ok(status)
    }
}
