//! Azure Resource Manager implementation of `ClusterClient`
//!
//! Plain REST over `reqwest` with bearer-token auth. Long-running operations
//! answer with an `Azure-AsyncOperation` (or `Location`) header that is
//! polled until the operation reaches a terminal state. ARM may send that
//! header on a 200 as well as on 201/202.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::client::{ClientError, ClientResult, ClusterClient};
use crate::cluster_id::ClusterId;
use crate::config::ProviderConfig;
use crate::models::{
    Autoscale, AutoscaleConfigurationUpdateParameter, Cluster, ClusterConfigurations,
    ClusterCreateParametersExtended, ClusterPatchParameters, ClusterResizeParameters,
    Configurations, MonitoringRequest, MonitoringStatus, UpdateGatewaySettingsParameters,
};

const AZURE_ASYNC_OPERATION: &str = "azure-asyncoperation";
const LOCATION_HEADER: &str = "location";

const MONITORING_EXTENSION: &str = "clustermonitoring";
const AZURE_MONITOR_EXTENSION: &str = "azureMonitor";

/// Where to poll a long-running operation
#[derive(Debug, Clone, PartialEq, Eq)]
enum PollTarget {
    /// Status document with a `status` field
    AsyncOperation(String),
    /// 202 while running, any other success once done
    Location(String),
}

/// Terminal or in-flight state of an operation status document
#[derive(Debug, Clone, PartialEq, Eq)]
enum OperationState {
    InProgress,
    Succeeded,
    Failed { status: String, message: String },
}

#[derive(Debug, Default, Deserialize)]
struct ArmErrorResponse {
    #[serde(default)]
    error: Option<ArmError>,
}

#[derive(Debug, Default, Deserialize)]
struct ArmError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OperationStatusResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<ArmError>,
}

fn poll_target(headers: &HeaderMap) -> Option<PollTarget> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    header(AZURE_ASYNC_OPERATION)
        .map(PollTarget::AsyncOperation)
        .or_else(|| header(LOCATION_HEADER).map(PollTarget::Location))
}

fn parse_error(status: StatusCode, body: &str) -> ClientError {
    if status == StatusCode::NOT_FOUND {
        return ClientError::NotFound;
    }
    let error = serde_json::from_str::<ArmErrorResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .unwrap_or_default();
    ClientError::Status {
        status: status.as_u16(),
        code: error.code.unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string()
        }),
        message: error.message.unwrap_or_else(|| body.trim().to_string()),
    }
}

fn operation_state(body: &str) -> ClientResult<OperationState> {
    let response: OperationStatusResponse =
        serde_json::from_str(body).map_err(|e| ClientError::Decode(e.to_string()))?;
    let status = response.status.unwrap_or_default();
    if status.eq_ignore_ascii_case("Succeeded") {
        Ok(OperationState::Succeeded)
    } else if status.eq_ignore_ascii_case("Failed") || status.eq_ignore_ascii_case("Canceled") {
        let message = response
            .error
            .and_then(|e| e.message)
            .unwrap_or_else(|| "no error details".to_string());
        Ok(OperationState::Failed { status, message })
    } else {
        Ok(OperationState::InProgress)
    }
}

/// ARM HTTP client
pub struct ArmClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl ArmClient {
    pub fn new(config: ProviderConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("hdinsight-provider/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    fn url(&self, id: &ClusterId, suffix: &str) -> String {
        format!("{}{}{}", self.config.endpoint, id, suffix)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.config.access_token)
    }

    fn api_request(&self, method: Method, id: &ClusterId, suffix: &str) -> RequestBuilder {
        self.request(method, &self.url(id, suffix))
            .query(&[("api-version", self.config.api_version.as_str())])
    }

    /// Send a request and turn non-2xx answers into errors
    async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(parse_error(status, &body))
    }

    async fn json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Wait for the operation a successful answer started. An answer without
    /// a poll header completed synchronously.
    async fn wait_for_operation(&self, response: Response) -> ClientResult<()> {
        let Some(target) = poll_target(response.headers()) else {
            return Ok(());
        };
        log::debug!("polling long-running operation: {:?}", target);

        let attempts = self.config.max_poll_attempts;
        for _ in 0..attempts {
            tokio::time::sleep(self.config.poll_interval).await;

            match &target {
                PollTarget::AsyncOperation(url) => {
                    let response = self.send(self.request(Method::GET, url)).await?;
                    let body = response
                        .text()
                        .await
                        .map_err(|e| ClientError::Transport(e.to_string()))?;
                    match operation_state(&body)? {
                        OperationState::Succeeded => return Ok(()),
                        OperationState::Failed { status, message } => {
                            return Err(ClientError::OperationFailed { status, message });
                        }
                        OperationState::InProgress => {}
                    }
                }
                PollTarget::Location(url) => {
                    let response = self.send(self.request(Method::GET, url)).await?;
                    if response.status() != StatusCode::ACCEPTED {
                        return Ok(());
                    }
                }
            }
        }

        Err(ClientError::PollingExhausted { attempts })
    }

    async fn call_then_poll(&self, request: RequestBuilder) -> ClientResult<()> {
        let response = self.send(request).await?;
        self.wait_for_operation(response).await
    }

    async fn extension_status(&self, id: &ClusterId, extension: &str) -> ClientResult<MonitoringStatus> {
        let response = self
            .send(self.api_request(Method::GET, id, &format!("/extensions/{}", extension)))
            .await?;
        Self::json(response).await
    }

    async fn enable_extension(
        &self,
        id: &ClusterId,
        extension: &str,
        request: &MonitoringRequest,
    ) -> ClientResult<()> {
        self.call_then_poll(
            self.api_request(Method::PUT, id, &format!("/extensions/{}", extension))
                .json(request),
        )
        .await
    }

    async fn disable_extension(&self, id: &ClusterId, extension: &str) -> ClientResult<()> {
        self.call_then_poll(self.api_request(
            Method::DELETE,
            id,
            &format!("/extensions/{}", extension),
        ))
        .await
    }
}

#[async_trait]
impl ClusterClient for ArmClient {
    async fn get(&self, id: &ClusterId) -> ClientResult<Cluster> {
        let response = self.send(self.api_request(Method::GET, id, "")).await?;
        Self::json(response).await
    }

    async fn create_then_poll(
        &self,
        id: &ClusterId,
        params: &ClusterCreateParametersExtended,
    ) -> ClientResult<()> {
        self.call_then_poll(self.api_request(Method::PUT, id, "").json(params))
            .await
    }

    async fn update_tags(
        &self,
        id: &ClusterId,
        tags: &BTreeMap<String, String>,
    ) -> ClientResult<()> {
        let body = ClusterPatchParameters { tags: tags.clone() };
        self.send(self.api_request(Method::PATCH, id, "").json(&body))
            .await?;
        Ok(())
    }

    async fn resize_then_poll(
        &self,
        id: &ClusterId,
        target_instance_count: i64,
    ) -> ClientResult<()> {
        let body = ClusterResizeParameters {
            target_instance_count,
        };
        self.call_then_poll(
            self.api_request(Method::POST, id, "/roles/workernode/resize")
                .json(&body),
        )
        .await
    }

    async fn update_autoscale_then_poll(
        &self,
        id: &ClusterId,
        autoscale: Option<&Autoscale>,
    ) -> ClientResult<()> {
        let body = AutoscaleConfigurationUpdateParameter {
            autoscale: autoscale.cloned(),
        };
        self.call_then_poll(
            self.api_request(Method::POST, id, "/roles/workernode/autoscale")
                .json(&body),
        )
        .await
    }

    async fn update_gateway_settings_then_poll(
        &self,
        id: &ClusterId,
        settings: &UpdateGatewaySettingsParameters,
    ) -> ClientResult<()> {
        self.call_then_poll(
            self.api_request(Method::POST, id, "/updateGatewaySettings")
                .json(settings),
        )
        .await
    }

    async fn delete_then_poll(&self, id: &ClusterId) -> ClientResult<()> {
        self.call_then_poll(self.api_request(Method::DELETE, id, ""))
            .await
    }

    async fn list_configurations(&self, id: &ClusterId) -> ClientResult<Configurations> {
        let response = self
            .send(self.api_request(Method::POST, id, "/configurations"))
            .await?;
        let body: ClusterConfigurations = Self::json(response).await?;
        Ok(body.configurations.unwrap_or_default())
    }

    async fn get_monitoring_status(&self, id: &ClusterId) -> ClientResult<MonitoringStatus> {
        self.extension_status(id, MONITORING_EXTENSION).await
    }

    async fn enable_monitoring_then_poll(
        &self,
        id: &ClusterId,
        request: &MonitoringRequest,
    ) -> ClientResult<()> {
        self.enable_extension(id, MONITORING_EXTENSION, request)
            .await
    }

    async fn disable_monitoring_then_poll(&self, id: &ClusterId) -> ClientResult<()> {
        self.disable_extension(id, MONITORING_EXTENSION).await
    }

    async fn get_azure_monitor_status(&self, id: &ClusterId) -> ClientResult<MonitoringStatus> {
        self.extension_status(id, AZURE_MONITOR_EXTENSION).await
    }

    async fn enable_azure_monitor_then_poll(
        &self,
        id: &ClusterId,
        request: &MonitoringRequest,
    ) -> ClientResult<()> {
        self.enable_extension(id, AZURE_MONITOR_EXTENSION, request)
            .await
    }

    async fn disable_azure_monitor_then_poll(&self, id: &ClusterId) -> ClientResult<()> {
        self.disable_extension(id, AZURE_MONITOR_EXTENSION).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use hdinsight_core::provider::ErrorKind;
    use hdinsight_core::resource::{Resource, ResourceId, State};
    use reqwest::header::{HeaderValue, LOCATION};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use crate::cluster::tests::spark_cluster;
    use crate::models::ClusterCreateProperties;
    use crate::provider::HdInsightProvider;
    use crate::schemas::spark_cluster::RESOURCE_TYPE;

    /// Canned answer of the local management endpoint
    struct Reply {
        status: u16,
        headers: Vec<(&'static str, String)>,
        body: String,
    }

    impl Reply {
        fn new(status: u16, body: &str) -> Self {
            Self {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            }
        }

        fn header(mut self, name: &'static str, value: String) -> Self {
            self.headers.push((name, value));
            self
        }
    }

    type Respond = dyn Fn(&str, &str, &str) -> Reply + Send + Sync;

    /// Local HTTP endpoint. `respond` gets the base URL, the method and the
    /// path without query. Every request line is recorded.
    struct TestServer {
        base: String,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl TestServer {
        async fn start(respond: impl Fn(&str, &str, &str) -> Reply + Send + Sync + 'static) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let base = format!("http://{}", listener.local_addr().unwrap());
            let requests = Arc::new(Mutex::new(Vec::new()));
            let respond: Arc<Respond> = Arc::new(respond);

            let server_base = base.clone();
            let log = requests.clone();
            tokio::spawn(async move {
                loop {
                    let Ok((stream, _)) = listener.accept().await else {
                        return;
                    };
                    let (base, log, respond) = (server_base.clone(), log.clone(), respond.clone());
                    tokio::spawn(async move { handle(stream, &base, &log, &*respond).await });
                }
            });

            Self { base, requests }
        }

        fn client(&self) -> ArmClient {
            ArmClient::new(
                ProviderConfig::new("sub", "token")
                    .with_endpoint(self.base.clone())
                    .with_poll_interval(Duration::from_millis(1)),
            )
            .unwrap()
        }

        fn count(&self, request: &str) -> usize {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| *r == request)
                .count()
        }
    }

    async fn handle(
        mut stream: TcpStream,
        base: &str,
        log: &Mutex<Vec<String>>,
        respond: &Respond,
    ) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length = head
            .lines()
            .filter_map(|l| l.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < header_end + content_length {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
        let method = request_line.next().unwrap_or_default().to_string();
        let target = request_line.next().unwrap_or_default();
        let path = target.split('?').next().unwrap_or_default().to_string();
        log.lock().unwrap().push(format!("{} {}", method, path));

        let reply = respond(base, &method, &path);
        let reason = StatusCode::from_u16(reply.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown");
        let mut response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
            reply.status,
            reason,
            reply.body.len()
        );
        for (name, value) in &reply.headers {
            response.push_str(&format!("{}: {}\r\n", name, value));
        }
        response.push_str("\r\n");
        response.push_str(&reply.body);
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
    }

    const CLUSTER_PATH: &str =
        "/subscriptions/sub/resourceGroups/analytics/providers/Microsoft.HDInsight/clusters/spark01";

    fn cluster_id() -> ClusterId {
        ClusterId::new("sub", "analytics", "spark01")
    }

    fn create_parameters() -> ClusterCreateParametersExtended {
        ClusterCreateParametersExtended {
            location: "westeurope".to_string(),
            tags: BTreeMap::new(),
            properties: ClusterCreateProperties::default(),
            identity: None,
        }
    }

    /// Status documents served in order; the last one repeats
    fn statuses(sequence: &[&'static str]) -> impl Fn() -> &'static str + Send + Sync + 'static {
        let sequence = sequence.to_vec();
        let served = Mutex::new(0usize);
        move || {
            let mut served = served.lock().unwrap();
            let status = sequence[(*served).min(sequence.len() - 1)];
            *served += 1;
            status
        }
    }

    #[tokio::test]
    async fn ok_answer_with_async_operation_is_polled() {
        let next = statuses(&[
            r#"{"status":"InProgress"}"#,
            r#"{"status":"InProgress"}"#,
            r#"{"status":"Succeeded"}"#,
        ]);
        let server = TestServer::start(move |base, method, path| match (method, path) {
            ("PUT", CLUSTER_PATH) => {
                Reply::new(200, "{}").header("Azure-AsyncOperation", format!("{}/operations/1", base))
            }
            ("GET", "/operations/1") => Reply::new(200, next()),
            _ => Reply::new(500, ""),
        })
        .await;

        server
            .client()
            .create_then_poll(&cluster_id(), &create_parameters())
            .await
            .unwrap();

        assert_eq!(server.count(&format!("PUT {}", CLUSTER_PATH)), 1);
        assert_eq!(server.count("GET /operations/1"), 3);
    }

    #[tokio::test]
    async fn ok_answer_without_poll_header_completes() {
        let server = TestServer::start(|_, method, _| match method {
            "PUT" => Reply::new(200, "{}"),
            _ => Reply::new(500, ""),
        })
        .await;

        server
            .client()
            .create_then_poll(&cluster_id(), &create_parameters())
            .await
            .unwrap();

        assert_eq!(server.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn location_is_polled_until_not_accepted() {
        let accepted = Mutex::new(0usize);
        let server = TestServer::start(move |base, method, path| match (method, path) {
            ("DELETE", CLUSTER_PATH) => {
                Reply::new(202, "").header("Location", format!("{}/results/1", base))
            }
            ("GET", "/results/1") => {
                let mut accepted = accepted.lock().unwrap();
                *accepted += 1;
                if *accepted < 3 {
                    Reply::new(202, "")
                } else {
                    Reply::new(204, "")
                }
            }
            _ => Reply::new(500, ""),
        })
        .await;

        server.client().delete_then_poll(&cluster_id()).await.unwrap();

        assert_eq!(server.count("GET /results/1"), 3);
    }

    #[tokio::test]
    async fn failed_operation_is_reported() {
        let server = TestServer::start(|base, method, path| match (method, path) {
            ("POST", p) if p.ends_with("/roles/workernode/resize") => {
                Reply::new(202, "").header("Azure-AsyncOperation", format!("{}/operations/2", base))
            }
            ("GET", "/operations/2") => Reply::new(
                200,
                r#"{"status":"Failed","error":{"code":"QuotaExceeded","message":"not enough cores"}}"#,
            ),
            _ => Reply::new(500, ""),
        })
        .await;

        let err = server
            .client()
            .resize_then_poll(&cluster_id(), 10)
            .await
            .unwrap_err();

        match err {
            ClientError::OperationFailed { status, message } => {
                assert_eq!(status, "Failed");
                assert_eq!(message, "not enough cores");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn canceled_delete_is_a_remote_error() {
        let server = TestServer::start(|base, method, path| match (method, path) {
            ("DELETE", CLUSTER_PATH) => {
                Reply::new(202, "").header("Azure-AsyncOperation", format!("{}/operations/3", base))
            }
            ("GET", "/operations/3") => Reply::new(200, r#"{"status":"Canceled"}"#),
            _ => Reply::new(500, ""),
        })
        .await;
        let provider = HdInsightProvider::with_client(server.client().config.clone(), server.client());
        let id = ResourceId::new(RESOURCE_TYPE, "main");

        let err = provider
            .delete_resource(&id, &cluster_id().id())
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Remote);
        assert!(matches!(
            err.source()
                .and_then(|e| e.downcast_ref::<ClientError>()),
            Some(ClientError::OperationFailed { status, .. }) if status == "Canceled"
        ));
    }

    #[tokio::test]
    async fn polling_gives_up_after_max_attempts() {
        let server = TestServer::start(|base, method, path| match (method, path) {
            ("DELETE", CLUSTER_PATH) => {
                Reply::new(202, "").header("Azure-AsyncOperation", format!("{}/operations/4", base))
            }
            ("GET", "/operations/4") => Reply::new(200, r#"{"status":"InProgress"}"#),
            _ => Reply::new(500, ""),
        })
        .await;
        let client = ArmClient::new(
            ProviderConfig::new("sub", "token")
                .with_endpoint(server.base.clone())
                .with_poll_interval(Duration::from_millis(1))
                .with_max_poll_attempts(4),
        )
        .unwrap();

        let err = client.delete_then_poll(&cluster_id()).await.unwrap_err();

        assert!(matches!(err, ClientError::PollingExhausted { attempts: 4 }));
        assert_eq!(server.count("GET /operations/4"), 4);
    }

    #[tokio::test]
    async fn missing_cluster_is_not_found() {
        let server = TestServer::start(|_, _, _| {
            Reply::new(
                404,
                r#"{"error":{"code":"ResourceNotFound","message":"cluster spark01 was not found"}}"#,
            )
        })
        .await;

        let err = server.client().get(&cluster_id()).await.unwrap_err();
        assert!(err.is_not_found());

        let provider = HdInsightProvider::with_client(server.client().config.clone(), server.client());
        let id = ResourceId::new(RESOURCE_TYPE, "main");
        let state = provider
            .read_resource(&id, Some(&cluster_id().id()), None)
            .await
            .unwrap();
        assert!(!state.exists);

        let mut desired = spark_cluster();
        desired.tags = BTreeMap::from([("env".to_string(), "prod".to_string())]);
        let err = provider
            .update_resource(
                &id,
                &cluster_id().id(),
                &State::existing(id.clone(), spark_cluster().to_attributes()),
                &Resource::new(RESOURCE_TYPE, "main").with_attributes(desired.to_attributes()),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(server.count(&format!("PATCH {}", CLUSTER_PATH)), 1);
    }

    #[test]
    fn async_operation_header_wins_over_location() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("https://arm/location"));
        assert_eq!(
            poll_target(&headers),
            Some(PollTarget::Location("https://arm/location".to_string()))
        );

        headers.insert(
            "azure-asyncoperation",
            HeaderValue::from_static("https://arm/operation"),
        );
        assert_eq!(
            poll_target(&headers),
            Some(PollTarget::AsyncOperation("https://arm/operation".to_string()))
        );

        assert_eq!(poll_target(&HeaderMap::new()), None);
    }

    #[test]
    fn arm_error_body_is_parsed() {
        let body = r#"{"error":{"code":"Conflict","message":"Cluster spark01 already exists"}}"#;
        match parse_error(StatusCode::CONFLICT, body) {
            ClientError::Status {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 409);
                assert_eq!(code, "Conflict");
                assert_eq!(message, "Cluster spark01 already exists");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn not_found_and_opaque_errors() {
        assert!(parse_error(StatusCode::NOT_FOUND, "").is_not_found());
        match parse_error(StatusCode::BAD_GATEWAY, "upstream timed out\n") {
            ClientError::Status { code, message, .. } => {
                assert_eq!(code, "Bad Gateway");
                assert_eq!(message, "upstream timed out");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn operation_states() {
        assert_eq!(
            operation_state(r#"{"status":"InProgress"}"#).unwrap(),
            OperationState::InProgress
        );
        assert_eq!(
            operation_state(r#"{"status":"Succeeded"}"#).unwrap(),
            OperationState::Succeeded
        );
        assert_eq!(
            operation_state(r#"{"status":"Failed","error":{"code":"X","message":"quota exceeded"}}"#)
                .unwrap(),
            OperationState::Failed {
                status: "Failed".to_string(),
                message: "quota exceeded".to_string()
            }
        );
        assert!(matches!(
            operation_state(r#"{"status":"Canceled"}"#).unwrap(),
            OperationState::Failed { .. }
        ));
        assert!(operation_state("not json").is_err());
    }

    #[test]
    fn urls_carry_the_cluster_id() {
        let client = ArmClient::new(
            ProviderConfig::new("sub", "token").with_endpoint("http://localhost:8080/"),
        )
        .unwrap();
        let id = ClusterId::new("sub", "analytics", "spark01");
        assert_eq!(
            client.url(&id, "/roles/workernode/resize"),
            "http://localhost:8080/subscriptions/sub/resourceGroups/analytics/providers/Microsoft.HDInsight/clusters/spark01/roles/workernode/resize"
        );
    }
}
