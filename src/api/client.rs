//! MutualRisk backend API client.

use super::DataConverter;
use super::schema::{
    AssetHistoryDto, BookmarkListDto, Envelope, EtfDetailDto, CalculatedPortfolioDto,
    PortfolioInitRequest, PortfolioListDto, PortfolioResultDto, PortfolioStatusDto,
    PortfolioValuationDto,
};
use super::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::state::{
    Asset, AssetHistory, AssetId, EtfDetail, Measure, PortfolioAnalysis, PortfolioDetail,
    PortfolioStatus, PortfolioSummary, SeriesPoint, TimeInterval,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Longest response body kept in an [`Error::Http`].
const MAX_ERROR_BODY: usize = 200;

/// High-level API client for the MutualRisk backend.
///
/// Each call builds one request, waits for the rate limiter, and decodes the
/// `data` field of the response envelope. Failures are returned as-is; the
/// client never retries.
#[derive(Clone)]
pub struct ApiClient {
    /// Configuration.
    config: ApiConfig,
    /// Request transport.
    transport: Arc<dyn Transport>,
    /// Rate limiter state.
    rate_limiter: Arc<RwLock<RateLimiter>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client that talks HTTP to `config.base_url`.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over a custom transport.
    pub fn with_transport(config: ApiConfig, transport: Arc<dyn Transport>) -> Self {
        let rate_limiter = Arc::new(RwLock::new(RateLimiter::new(config.rate_limit)));
        Self {
            config,
            transport,
            rate_limiter,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Test connection to the API.
    pub async fn test_connection(&self) -> Result<bool> {
        let response = self.send(ApiRequest::get("/portfolio/my")).await?;
        Ok(response.is_success())
    }

    /// Fetch the user's portfolios, newest first.
    pub async fn fetch_portfolio_list(&self) -> Result<(bool, Vec<PortfolioSummary>)> {
        let dto: PortfolioListDto = self
            .request("portfolio/my", ApiRequest::get("/portfolio/my"))
            .await?;
        Ok(DataConverter::convert_portfolio_list(dto))
    }

    /// Fetch one portfolio. `None` when the backend reports no portfolio.
    pub async fn fetch_portfolio_detail(&self, portfolio_id: &str) -> Result<Option<PortfolioDetail>> {
        let request = ApiRequest::get("/portfolio/detail").query("portfolioId", portfolio_id);
        let dto: PortfolioResultDto = self.request("portfolio/detail", request).await?;
        Ok(dto.portfolio.map(DataConverter::convert_portfolio_detail))
    }

    /// Fetch the valuation series of a portfolio.
    pub async fn fetch_backtest(
        &self,
        portfolio_id: &str,
        interval: TimeInterval,
        measure: Measure,
    ) -> Result<Vec<SeriesPoint>> {
        let request = ApiRequest::get("/portfolio/backtest")
            .query(self.config.backtest_id_param.as_str(), portfolio_id)
            .query("timeInterval", interval.as_query())
            .query("measure", measure.as_query());
        let dto: PortfolioValuationDto = self.request("portfolio/backtest", request).await?;
        Ok(DataConverter::convert_series(dto))
    }

    pub async fn fetch_etf_detail(&self, asset_id: AssetId) -> Result<EtfDetail> {
        let request = ApiRequest::get("/asset/detail/etf").query("assetId", asset_id);
        let dto: EtfDetailDto = self.request("asset/detail/etf", request).await?;
        Ok(DataConverter::convert_etf(asset_id, dto))
    }

    /// Fetch closing prices for the last `period` days.
    pub async fn fetch_asset_history(&self, asset_id: AssetId, period: u32) -> Result<AssetHistory> {
        let request = ApiRequest::get(format!("/asset/history/{asset_id}")).query("period", period);
        let dto: AssetHistoryDto = self.request("asset/history", request).await?;
        Ok(DataConverter::convert_history(dto))
    }

    pub async fn fetch_bookmarks(&self) -> Result<Vec<Asset>> {
        let dto: BookmarkListDto = self
            .request("asset/interest", ApiRequest::get("/asset/interest"))
            .await?;
        Ok(dto.assets.into_iter().map(DataConverter::convert_asset).collect())
    }

    pub async fn add_bookmark(&self, asset_id: AssetId) -> Result<()> {
        self.send_checked(ApiRequest::post("/asset/interest").query("assetId", asset_id))
            .await
            .map(|_| ())
    }

    pub async fn remove_bookmark(&self, asset_id: AssetId) -> Result<()> {
        self.send_checked(ApiRequest::delete("/asset/interest").query("assetId", asset_id))
            .await
            .map(|_| ())
    }

    /// Fetch the valuation summary of portfolio version `version`.
    pub async fn fetch_portfolio_status(&self, version: u32) -> Result<PortfolioStatus> {
        let request = ApiRequest::get("/portfolio/summary").query("ver", version);
        let dto: PortfolioStatusDto = self.request("portfolio/summary", request).await?;
        Ok(DataConverter::convert_status(dto))
    }

    /// Create a portfolio from constraints and return the backend's analysis.
    pub async fn create_portfolio(&self, init: &PortfolioInitRequest) -> Result<PortfolioAnalysis> {
        let request = ApiRequest::post("/portfolio/init").json(serde_json::to_value(init)?);
        let dto: CalculatedPortfolioDto = self.request("portfolio/init", request).await?;
        Ok(DataConverter::convert_calculated(dto))
    }

    /// Send, require a 2xx status, and decode the envelope's `data`.
    async fn request<T: DeserializeOwned>(&self, endpoint: &str, request: ApiRequest) -> Result<T> {
        let response = self.send_checked(request).await?;
        let envelope: Envelope<T> =
            serde_json::from_str(&response.body).map_err(|e| Error::decode(endpoint, e))?;
        if let Some(message) = &envelope.message {
            tracing::trace!(endpoint, %message, "envelope message");
        }
        Ok(envelope.data)
    }

    async fn send_checked(&self, request: ApiRequest) -> Result<ApiResponse> {
        let path = request.path.clone();
        let response = self.send(request).await?;
        if !response.is_success() {
            tracing::warn!(%path, status = response.status, "request rejected");
            let body: String = response.body.chars().take(MAX_ERROR_BODY).collect();
            return Err(Error::http(response.status, body));
        }
        Ok(response)
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.rate_limit().await?;
        let path = request.path.clone();
        let start = Instant::now();
        let response = self.transport.send(request).await?;
        tracing::debug!(
            %path,
            status = response.status,
            duration_ms = start.elapsed().as_millis() as u64,
            "API call completed"
        );
        Ok(response)
    }

    /// Apply rate limiting.
    async fn rate_limit(&self) -> Result<()> {
        let mut limiter = self.rate_limiter.write().await;
        limiter.wait().await
    }
}

/// Token bucket refilled at `requests_per_second`. Zero disables limiting.
struct RateLimiter {
    requests_per_second: u32,
    last_request: std::time::Instant,
    tokens: f64,
}

impl RateLimiter {
    fn new(requests_per_second: u32) -> Self {
        Self {
            requests_per_second,
            last_request: std::time::Instant::now(),
            tokens: requests_per_second as f64,
        }
    }

    async fn wait(&mut self) -> Result<()> {
        if self.requests_per_second == 0 {
            return Ok(());
        }
        let rate = self.requests_per_second as f64;
        let elapsed = self.last_request.elapsed().as_secs_f64();

        // Replenish tokens
        self.tokens = (self.tokens + elapsed * rate).min(rate);

        if self.tokens < 1.0 {
            let wait_time = (1.0 - self.tokens) / rate;
            tokio::time::sleep(std::time::Duration::from_secs_f64(wait_time)).await;
            self.tokens = 1.0;
        }

        self.tokens -= 1.0;
        self.last_request = std::time::Instant::now();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::{HttpMethod, MockTransport};
    use crate::config::BacktestIdParam;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn client(mock: MockTransport) -> ApiClient {
        let config = ApiConfig {
            rate_limit: 0,
            ..Default::default()
        };
        ApiClient::with_transport(config, Arc::new(mock))
    }

    #[tokio::test]
    async fn test_fetch_backtest_builds_query() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| {
                req.method == HttpMethod::Get
                    && req.path == "/portfolio/backtest"
                    && req.query_value("portfolioId") == Some("p1")
                    && req.query_value("timeInterval") == Some("WEEK")
                    && req.query_value("measure") == Some("VALUATION")
            })
            .times(1)
            .returning(|_| {
                Ok(ApiResponse::ok(
                    r#"{"status":200,"data":{"performances":[{"time":"2024-01-01T00:00:00","valuation":100.0}]}}"#,
                ))
            });

        let series = client(mock)
            .fetch_backtest("p1", TimeInterval::Week, Measure::Valuation)
            .await
            .unwrap();
        assert_eq!(
            series,
            vec![SeriesPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                valuation: 100.0,
            }]
        );
    }

    #[tokio::test]
    async fn test_backtest_id_param_is_configurable() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.query_value("assetId") == Some("p1") && req.query_value("portfolioId").is_none())
            .returning(|_| Ok(ApiResponse::ok(r#"{"data":{"performances":[]}}"#)));

        let config = ApiConfig {
            rate_limit: 0,
            backtest_id_param: BacktestIdParam::AssetId,
            ..Default::default()
        };
        let client = ApiClient::with_transport(config, Arc::new(mock));
        let series = client.fetch_backtest("p1", TimeInterval::Day, Measure::Profit).await.unwrap();
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_error() {
        let mut mock = MockTransport::new();
        mock.expect_send().returning(|_| {
            Ok(ApiResponse {
                status: 503,
                body: "maintenance".into(),
            })
        });

        let err = client(mock).fetch_bookmarks().await.unwrap_err();
        assert!(matches!(err, Error::Http { status: 503, .. }));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_missing_data_is_decode_error() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .returning(|_| Ok(ApiResponse::ok(r#"{"status":200,"message":"ok"}"#)));

        let err = client(mock).fetch_portfolio_list().await.unwrap_err();
        match err {
            Error::Decode { endpoint, .. } => assert_eq!(endpoint, "portfolio/my"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .returning(|_| Err(Error::transport("connection refused")));

        let err = client(mock).fetch_etf_detail(AssetId(1)).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn test_fetch_bookmarks() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.path == "/asset/interest" && req.method == HttpMethod::Get)
            .returning(|_| {
                Ok(ApiResponse::ok(
                    r#"{"data":{"assets":[{"assetId":5,"name":"Apple","code":"AAPL","region":"US","price":"230.5","dailyPriceChangeRate":"1.1"}]}}"#,
                ))
            });

        let assets = client(mock).fetch_bookmarks().await.unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].asset_id, AssetId(5));
        assert_eq!(assets[0].price, dec!(230.5));
        assert_eq!(assets[0].label(), "AAPL");
    }

    #[tokio::test]
    async fn test_bookmark_mutations() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.method == HttpMethod::Delete && req.query_value("assetId") == Some("7"))
            .times(1)
            .returning(|_| Ok(ApiResponse::ok(r#"{"status":200,"message":"removed"}"#)));
        mock.expect_send()
            .withf(|req| req.method == HttpMethod::Post && req.query_value("assetId") == Some("7"))
            .times(1)
            .returning(|_| Ok(ApiResponse { status: 409, body: "exists".into() }));

        let client = client(mock);
        tokio_test::assert_ok!(client.remove_bookmark(AssetId(7)).await);
        tokio_test::assert_err!(client.add_bookmark(AssetId(7)).await);
    }

    #[tokio::test]
    async fn test_asset_history_path() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.path == "/asset/history/12" && req.query_value("period") == Some("30"))
            .returning(|_| {
                Ok(ApiResponse::ok(
                    r#"{"data":{"assetId":12,"recordNum":2,"records":[{"price":10,"date":"2024-02-01T00:00:00"},{"price":11,"date":"2024-02-02T00:00:00"}]}}"#,
                ))
            });

        let history = client(mock).fetch_asset_history(AssetId(12), 30).await.unwrap();
        assert_eq!(history.records.len(), 2);
        assert_eq!(history.change_percent(), Some(dec!(10)));
    }

    #[tokio::test]
    async fn test_create_portfolio_posts_body() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| {
                req.method == HttpMethod::Post
                    && req.path == "/portfolio/init"
                    && req
                        .body
                        .as_ref()
                        .is_some_and(|b| b["lower_bounds"] == serde_json::json!([0.05]))
            })
            .returning(|_| {
                Ok(ApiResponse::ok(
                    r#"{"data":{"original":{"totalCash":1000000.0,"performance":{"expectedReturn":0.1},
                        "assets":[{"assetId":1,"name":"A","code":"A","weight":1.0,"purchaseNum":3}]},
                        "oldPortfolioAssetInfoList":[],
                        "newPortfolioAssetInfoList":[{"assetId":1,"name":"A","code":"A","weight":1.0,"purchaseNum":3}],
                        "changeAssetInfoList":[{"assetId":1,"name":"A","code":"A","oldPurchaseNum":0,"newPurchaseNum":3}]}}"#,
                ))
            });

        let init = PortfolioInitRequest {
            name: "Portfolio 1".into(),
            total_cash: 1_000_000.0,
            asset_ids: vec![1],
            lower_bounds: vec![0.05],
            upper_bounds: vec![1.0],
            exact_proportion: vec![None],
        };
        let analysis = client(mock).create_portfolio(&init).await.unwrap();
        assert_eq!(analysis.allocations[0].purchase_num, Some(3));
        assert_eq!(analysis.performance.and_then(|p| p.expected_return), Some(0.1));
        assert_eq!(analysis.changes[0].delta(), 3);
    }

    #[tokio::test]
    async fn test_create_portfolio_without_assets_is_decode_error() {
        let mut mock = MockTransport::new();
        mock.expect_send().returning(|_| {
            Ok(ApiResponse::ok(
                r#"{"data":{"original":{"totalCash":1000000.0},"changeAssetInfoList":[]}}"#,
            ))
        });

        let init = PortfolioInitRequest {
            name: "Portfolio 1".into(),
            total_cash: 1_000_000.0,
            asset_ids: vec![1],
            lower_bounds: vec![0.0],
            upper_bounds: vec![1.0],
            exact_proportion: vec![None],
        };
        let err = client(mock).create_portfolio(&init).await.unwrap_err();
        match err {
            Error::Decode { endpoint, .. } => assert_eq!(endpoint, "portfolio/init"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_portfolio_detail() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .returning(|_| Ok(ApiResponse::ok(r#"{"data":{"hasPortfolio":false}}"#)));

        let detail = client(mock).fetch_portfolio_detail("p").await.unwrap();
        assert!(detail.is_none());
    }
}
