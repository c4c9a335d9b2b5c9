//! Shared helpers for integration tests

#![allow(dead_code)]

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, StatusCode};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use oauth2_bearer::config::Config;
use oauth2_bearer::transport::HttpTransport;
use oauth2_bearer::types::LogLevel;
use oauth2_bearer::{HeaderMap, ParamMap};
use std::net::SocketAddr;

pub fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
    pairs.iter().copied().collect()
}

pub fn params(pairs: &[(&str, &str)]) -> ParamMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn form_encode(pairs: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Response status, selected headers and body text
pub struct TestResponse {
    pub status: StatusCode,
    pub www_authenticate: Option<String>,
    pub body: String,
}

/// Live server bound to loopback plus a client pointed at it
pub struct TestServer {
    pub addr: SocketAddr,
    client: Client<HttpConnector, Full<Bytes>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(Config {
            log_level: LogLevel::Error,
            ..Config::local()
        })
        .await
    }

    pub async fn start_with(config: Config) -> Self {
        let addr = HttpTransport::new(config)
            .start()
            .await
            .expect("Should start HTTP transport");
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self { addr, client }
    }

    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }

    pub async fn send(
        &self,
        method: Method,
        path_and_query: &str,
        headers: &[(&str, &str)],
        body: impl Into<Bytes>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(self.url(path_and_query));
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(Full::new(body.into())).unwrap();

        let response = self.client.request(request).await.unwrap();
        let status = response.status();
        let www_authenticate = response
            .headers()
            .get(hyper::header::WWW_AUTHENTICATE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            www_authenticate,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn get(&self, path_and_query: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.send(Method::GET, path_and_query, headers, Bytes::new())
            .await
    }

    pub async fn post_form(&self, path_and_query: &str, pairs: &[(&str, &str)]) -> TestResponse {
        self.send(
            Method::POST,
            path_and_query,
            &[("content-type", "application/x-www-form-urlencoded")],
            form_encode(pairs),
        )
        .await
    }

    pub async fn post_json(&self, path_and_query: &str, json: serde_json::Value) -> TestResponse {
        self.send(
            Method::POST,
            path_and_query,
            &[("content-type", "application/json")],
            json.to_string(),
        )
        .await
    }
}
