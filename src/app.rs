//! Main application module.
//!
//! This module contains the main `App` struct that coordinates
//! the event loop, state management, and rendering. Network side effects live
//! here; everything else is forwarded to [`Store::reduce`].

use crate::api::{ApiClient, QueryCache, QueryKey};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::EventHandler;
use crate::state::{
    Action, Asset, AssetId, Measure, Notification, SeriesPoint, Store, TimeInterval,
    merge_series,
};
use crate::ui::Ui;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// The main application.
pub struct App {
    /// Terminal.
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application store.
    store: Store,
    /// Event handler.
    event_handler: EventHandler,
    /// Action receiver.
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// API client.
    api_client: ApiClient,
    /// Shared query cache.
    cache: Arc<QueryCache>,
    /// Configuration.
    config: Config,
    /// When data was last refreshed, for auto-refresh.
    last_refresh: Instant,
}

impl App {
    /// Create a new application.
    pub async fn new(config: Config) -> Result<Self> {
        let api_client = ApiClient::new(config.api.clone())?;

        // Set up terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if config.ui.mouse_support {
            execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        } else {
            execute!(stdout, EnterAlternateScreen)?;
        }
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let store = Store::new(action_tx);

        let event_handler = EventHandler::new(
            config.keybindings.clone(),
            Duration::from_millis(config.ui.tick_rate_ms),
            config.ui.mouse_support,
        );

        tracing::info!(base_url = %config.api.base_url, "Application initialized");

        Ok(Self {
            terminal,
            store,
            event_handler,
            action_rx,
            api_client,
            cache: Arc::new(QueryCache::new()),
            config,
            last_refresh: Instant::now(),
        })
    }

    /// Run the application event loop.
    pub async fn run(&mut self) -> Result<()> {
        match self.api_client.test_connection().await {
            Ok(connected) => self.store.reduce(Action::SetConnected(connected)),
            Err(e) => {
                tracing::warn!(error = %e, "Backend unreachable at startup");
                self.store.reduce(Action::SetConnected(false));
            }
        }
        self.store.dispatch(Action::LoadPortfolios)?;
        self.store.dispatch(Action::LoadBookmarks)?;

        loop {
            self.event_handler.update_store_snapshot(&self.store);
            self.draw()?;

            tokio::select! {
                result = self.event_handler.next() => {
                    if let Some(action) = result? {
                        self.handle_action(action).await?;
                    }
                }

                Some(action) = self.action_rx.recv() => {
                    self.handle_action(action).await?;
                }
            }

            self.on_tick().await?;

            if self.store.app.should_quit {
                tracing::info!("Quitting");
                break;
            }
        }

        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let keys = &self.config.keybindings;
        let store = &self.store;
        self.terminal.draw(|frame| {
            Ui::render(frame, store, keys);
        })?;
        Ok(())
    }

    /// Reduce an action that raises a loading flag and paint it before the
    /// request blocks the loop.
    fn begin_loading(&mut self, action: Action) {
        self.store.reduce(action);
        if let Err(e) = self.draw() {
            tracing::warn!(error = %e, "Failed to draw loading state");
        }
    }

    /// Expire notifications and run the auto-refresh timer.
    async fn on_tick(&mut self) -> Result<()> {
        if self.store.app.notification_expired(chrono::Utc::now()) {
            self.store.reduce(Action::DismissNotification);
        }

        let every = self.config.ui.auto_refresh_secs;
        if every > 0 && self.last_refresh.elapsed() >= Duration::from_secs(every) {
            self.handle_action(Action::RefreshAll).await?;
        }
        Ok(())
    }

    /// Handle an action.
    async fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::LoadPortfolios => self.load_portfolios().await,
            Action::OpenSelectedPortfolio => self.open_selected_portfolio().await,
            Action::LoadBacktest => self.load_backtest().await,
            Action::SetTimeInterval(_) | Action::ToggleMeasure => {
                self.store.reduce(action);
                self.load_backtest().await;
            }
            Action::LoadBookmarks => self.load_bookmarks().await,
            Action::AddBookmark(asset) => self.add_bookmark(asset).await,
            Action::RemoveBookmark(asset_id) => self.remove_bookmark(asset_id).await,
            Action::LoadAssetDetail(asset_id) => self.load_asset_detail(asset_id).await,
            Action::SubmitPortfolio => self.submit_portfolio().await,
            Action::RefreshAll => self.refresh_all().await,
            _ => self.store.reduce(action),
        }
        Ok(())
    }

    /// Log a failed request and surface it in the UI.
    fn report(&mut self, context: &str, error: Error) {
        tracing::warn!(error = %error, recoverable = error.is_recoverable(), "{context}");
        if matches!(error, Error::Transport(_)) {
            self.store.reduce(Action::SetConnected(false));
        }
        self.store.reduce(Action::SetError(format!("{context}: {error}")));
    }

    fn notify(&mut self, notification: Notification) {
        self.store.reduce(Action::ShowNotification(notification));
    }

    async fn load_portfolios(&mut self) {
        self.begin_loading(Action::LoadPortfolios);

        let stale = self.config.cache.portfolio_list_stale();
        let result = self
            .cache
            .fetch(QueryKey::PortfolioList, stale, || {
                self.api_client.fetch_portfolio_list()
            })
            .await;

        let (has_portfolio, portfolios) = match result {
            Ok(list) => list,
            Err(e) => return self.report("Failed to load portfolios", e),
        };
        let latest_version = portfolios.first().and_then(|p| p.version);
        self.store.reduce(Action::SetConnected(true));
        self.store.reduce(Action::PortfoliosLoaded {
            has_portfolio,
            portfolios,
        });

        if let Some(version) = latest_version {
            let stale = self.config.cache.default_stale();
            let status = self
                .cache
                .fetch(QueryKey::PortfolioSummary(version), stale, || {
                    self.api_client.fetch_portfolio_status(version)
                })
                .await;
            match status {
                Ok(status) => self.store.reduce(Action::PortfolioStatusLoaded(status)),
                // The summary is decorative; a failure should not cover the list.
                Err(e) => tracing::warn!(error = %e, version, "Failed to load portfolio summary"),
            }
        }
    }

    async fn open_selected_portfolio(&mut self) {
        let Some(portfolio_id) = self
            .store
            .portfolios
            .selected_portfolio()
            .map(|p| p.id.clone())
        else {
            return;
        };
        self.begin_loading(Action::OpenSelectedPortfolio);

        let stale = self.config.cache.default_stale();
        let detail = self
            .cache
            .fetch(QueryKey::PortfolioDetail(portfolio_id.clone()), stale, || {
                self.api_client.fetch_portfolio_detail(&portfolio_id)
            })
            .await;

        match detail {
            Ok(Some(detail)) => self.store.reduce(Action::PortfolioDetailLoaded(detail)),
            Ok(None) => {
                self.store.portfolios.loading = false;
                self.notify(Notification::info("This portfolio has no detail yet"));
            }
            Err(e) => return self.report("Failed to load portfolio detail", e),
        }

        self.load_backtest().await;
    }

    /// Fetch the selected portfolio's series, plus the latest portfolio's when
    /// they differ, and merge them by date.
    async fn load_backtest(&mut self) {
        let Some(portfolio_id) = self.store.backtest.portfolio_id.clone() else {
            return;
        };
        self.begin_loading(Action::LoadBacktest);

        let interval = self.store.backtest.interval;
        let measure = self.store.backtest.measure;
        let latest_id = self.latest_portfolio_id().await;

        let result = match latest_id.as_deref().filter(|latest| *latest != portfolio_id) {
            Some(latest) => futures::try_join!(
                self.fetch_series(&portfolio_id, interval, measure),
                self.fetch_series(latest, interval, measure),
            ),
            None => self
                .fetch_series(&portfolio_id, interval, measure)
                .await
                .map(|selected| (selected, Vec::new())),
        };

        match result {
            Ok((selected, latest)) => {
                let merged = merge_series(&selected, &latest, interval);
                tracing::debug!(%portfolio_id, points = merged.len(), "Backtest merged");
                self.store.reduce(Action::BacktestLoaded {
                    portfolio_id,
                    latest_portfolio_id: latest_id,
                    merged,
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, %portfolio_id, "Failed to load backtest");
                self.store.reduce(Action::BacktestFailed(e.to_string()));
            }
        }
    }

    async fn fetch_series(
        &self,
        portfolio_id: &str,
        interval: TimeInterval,
        measure: Measure,
    ) -> Result<Vec<SeriesPoint>> {
        let key = QueryKey::Backtest {
            portfolio_id: portfolio_id.to_string(),
            interval,
            measure,
        };
        self.cache
            .fetch(key, self.config.cache.default_stale(), || {
                self.api_client.fetch_backtest(portfolio_id, interval, measure)
            })
            .await
    }

    /// The newest portfolio, from the cached list when available.
    async fn latest_portfolio_id(&self) -> Option<String> {
        let cached = self
            .cache
            .get::<(bool, Vec<crate::state::PortfolioSummary>)>(&QueryKey::PortfolioList)
            .await;
        match cached {
            Some((_, list)) => list.first().map(|p| p.id.clone()),
            None => self.store.portfolios.latest_portfolio_id().map(str::to_string),
        }
    }

    async fn load_bookmarks(&mut self) {
        self.begin_loading(Action::LoadBookmarks);

        let stale = self.config.cache.default_stale();
        let result = self
            .cache
            .fetch(QueryKey::Bookmarks, stale, || self.api_client.fetch_bookmarks())
            .await;

        match result {
            Ok(assets) => self.store.reduce(Action::BookmarksLoaded(assets)),
            Err(e) => self.report("Failed to load bookmarks", e),
        }
    }

    async fn add_bookmark(&mut self, asset: Asset) {
        let asset_id = asset.asset_id;
        if self.store.bookmarks.contains(asset_id) {
            self.notify(Notification::info(format!("{} is already bookmarked", asset.label())));
            return;
        }
        let pending = self.store.bookmarks.begin_add(asset);
        self.cache
            .set(QueryKey::Bookmarks, self.store.bookmarks.assets.clone())
            .await;

        match self.api_client.add_bookmark(asset_id).await {
            Ok(()) => {
                tracing::info!(%asset_id, "Bookmark added");
                self.notify(Notification::success("Bookmark added"));
                self.cache.invalidate(&QueryKey::Bookmarks).await;
                self.load_bookmarks().await;
            }
            Err(e) => {
                self.cache
                    .set(QueryKey::Bookmarks, pending.previous().to_vec())
                    .await;
                self.store.reduce(Action::RollbackBookmark(pending));
                self.report("Failed to add bookmark", e);
            }
        }
    }

    async fn remove_bookmark(&mut self, asset_id: AssetId) {
        let pending = self.store.bookmarks.begin_remove(asset_id);
        self.cache
            .set(QueryKey::Bookmarks, self.store.bookmarks.assets.clone())
            .await;

        match self.api_client.remove_bookmark(asset_id).await {
            Ok(()) => {
                tracing::info!(%asset_id, "Bookmark removed");
                self.notify(Notification::success("Bookmark removed"));
                self.cache.invalidate(&QueryKey::Bookmarks).await;
                self.load_bookmarks().await;
            }
            Err(e) => {
                self.cache
                    .set(QueryKey::Bookmarks, pending.previous().to_vec())
                    .await;
                self.store.reduce(Action::RollbackBookmark(pending));
                self.report("Failed to remove bookmark", e);
            }
        }
    }

    async fn load_asset_detail(&mut self, asset_id: AssetId) {
        self.begin_loading(Action::LoadAssetDetail(asset_id));

        let stale = self.config.cache.default_stale();
        let period = self.config.api.history_period_days;
        let history = self
            .cache
            .fetch(QueryKey::AssetHistory { asset_id, period }, stale, || {
                self.api_client.fetch_asset_history(asset_id, period)
            })
            .await;
        match history {
            Ok(history) => self.store.reduce(Action::AssetHistoryLoaded(history)),
            Err(e) => return self.report("Failed to load price history", e),
        }

        let is_etf = self
            .store
            .bookmarks
            .assets
            .iter()
            .any(|a| a.asset_id == asset_id && a.is_etf());
        if !is_etf {
            return;
        }

        let etf = self
            .cache
            .fetch(QueryKey::EtfDetail(asset_id), stale, || {
                self.api_client.fetch_etf_detail(asset_id)
            })
            .await;
        match etf {
            Ok(etf) => self.store.reduce(Action::EtfDetailLoaded(etf)),
            Err(e) => self.report("Failed to load ETF detail", e),
        }
    }

    async fn submit_portfolio(&mut self) {
        if self.store.assets.assets.is_empty() {
            self.notify(Notification::warning("Add assets before creating a portfolio"));
            return;
        }
        if self.store.assets.total_cash <= rust_decimal::Decimal::ZERO {
            self.notify(Notification::warning("Set the total cash first"));
            return;
        }

        let request = self.store.constraints.to_init_request(
            self.store.next_portfolio_name(),
            self.store.assets.total_cash,
            &self.store.assets.assets,
        );
        self.begin_loading(Action::SubmitPortfolio);
        tracing::info!(name = %request.name, assets = request.asset_ids.len(), "Creating portfolio");

        match self.api_client.create_portfolio(&request).await {
            Ok(analysis) => {
                let summary = analysis
                    .performance
                    .and_then(|p| p.expected_return.zip(p.volatility))
                    .map(|(ret, vol)| {
                        format!(" (return {:.2}%, volatility {:.2}%)", ret * 100.0, vol * 100.0)
                    })
                    .unwrap_or_default();
                self.store.reduce(Action::PortfolioCreated(analysis));
                self.notify(Notification::success(format!("{} created{summary}", request.name)));
                self.cache.invalidate(&QueryKey::PortfolioList).await;
                self.load_portfolios().await;
            }
            Err(e) => self.report("Failed to create portfolio", e),
        }
    }

    async fn refresh_all(&mut self) {
        self.begin_loading(Action::RefreshAll);
        self.cache.clear().await;
        self.last_refresh = Instant::now();

        self.load_portfolios().await;
        self.load_bookmarks().await;
        if self.store.backtest.portfolio_id.is_some() {
            self.load_backtest().await;
        }
        self.store.reduce(Action::SetLoading(false));
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Restore terminal state
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}
