//! Data conversion utilities for API responses.

use super::schema::{
    AssetDto, AssetHistoryDto, CalculatedPortfolioDto, ChangeAssetDto, EtfDetailDto,
    PerformanceDto, PortfolioAnalysisDto, RecommendAssetDto,
    PortfolioAssetDto, PortfolioInfoDto, PortfolioListDto, PortfolioStatusDto,
    PortfolioValuationDto, SimplePortfolioDto,
};
use crate::state::{
    Allocation, Asset, AssetHistory, AssetId, EtfDetail, EtfHolding, Holding, HoldingChange,
    Performance,
    PortfolioAnalysis, PortfolioDetail, PortfolioStatus, PortfolioSummary, PricePoint,
    SeriesPoint,
};
use rust_decimal::Decimal;

/// Converts API responses to internal state types.
pub struct DataConverter;

impl DataConverter {
    /// Convert a backend asset row to our internal Asset type.
    pub fn convert_asset(dto: AssetDto) -> Asset {
        Asset {
            asset_id: AssetId(dto.asset_id),
            name: dto.name,
            code: dto.code,
            market: dto.market.unwrap_or_default(),
            region: dto.region.unwrap_or_default(),
            price: dto.price.unwrap_or(Decimal::ZERO),
            daily_price_change_rate: dto.daily_price_change_rate,
            daily_price_change: dto.daily_price_change,
            expected_return: dto.expected_return,
        }
    }

    /// Convert the `/portfolio/my` payload into `(has_portfolio, portfolios)`.
    pub fn convert_portfolio_list(dto: PortfolioListDto) -> (bool, Vec<PortfolioSummary>) {
        let (has_portfolio, list) = match dto {
            PortfolioListDto::Bare(list) => (None, list),
            PortfolioListDto::Wrapped {
                has_portfolio,
                portfolio_list,
            } => (has_portfolio, portfolio_list),
        };
        let portfolios: Vec<PortfolioSummary> =
            list.into_iter().map(Self::convert_portfolio_summary).collect();
        (has_portfolio.unwrap_or(!portfolios.is_empty()), portfolios)
    }

    fn convert_portfolio_summary(dto: SimplePortfolioDto) -> PortfolioSummary {
        PortfolioSummary {
            id: dto.id,
            name: dto.name,
            version: dto.version,
            created_at: dto.created_at,
        }
    }

    pub fn convert_performance(dto: PerformanceDto) -> Performance {
        Performance {
            expected_return: dto.expected_return,
            volatility: dto.volatility,
            sharpe_ratio: dto.sharpe_ratio,
        }
    }

    /// Convert a portfolio's detail payload.
    pub fn convert_portfolio_detail(dto: PortfolioInfoDto) -> PortfolioDetail {
        PortfolioDetail {
            portfolio_id: dto.portfolio_id,
            total_cash: dto.total_cash.unwrap_or(Decimal::ZERO),
            performance: dto.performance.map(Self::convert_performance),
            holdings: dto.assets.into_iter().map(Self::convert_holding).collect(),
        }
    }

    fn convert_holding(dto: PortfolioAssetDto) -> Holding {
        Holding {
            asset: Self::convert_asset(dto.asset),
            weight: dto.weight.unwrap_or_default(),
            valuation: dto.valuation,
            lower_bound: dto.lower_bound,
            upper_bound: dto.upper_bound,
            exact_proportion: dto.exact_proportion,
        }
    }

    /// Convert a backtest payload into its (date, valuation) series.
    pub fn convert_series(dto: PortfolioValuationDto) -> Vec<SeriesPoint> {
        dto.performances
            .into_iter()
            .map(|p| SeriesPoint {
                date: p.time,
                valuation: p.valuation,
            })
            .collect()
    }

    pub fn convert_history(dto: AssetHistoryDto) -> AssetHistory {
        AssetHistory {
            asset_id: AssetId(dto.asset_id),
            records: dto
                .records
                .into_iter()
                .map(|r| PricePoint {
                    date: r.date,
                    price: r.price,
                })
                .collect(),
        }
    }

    /// Convert ETF detail. The requested id fills in when the payload omits it.
    pub fn convert_etf(requested: AssetId, dto: EtfDetailDto) -> EtfDetail {
        EtfDetail {
            asset_id: dto.asset_id.map(AssetId).unwrap_or(requested),
            name: dto.name,
            code: dto.code,
            market: dto.market,
            price: dto.price,
            holdings: dto
                .holdings
                .into_iter()
                .map(|h| EtfHolding {
                    name: h.name,
                    code: h.code,
                    weight: h.weight,
                })
                .collect(),
        }
    }

    pub fn convert_status(dto: PortfolioStatusDto) -> PortfolioStatus {
        PortfolioStatus {
            cur_valuation: dto.cur_valuation,
            last_valuation: dto.last_valuation,
            init_valuation: dto.init_valuation,
            sharpe_ratio: dto.sharpe_ratio,
        }
    }

    /// Flatten a `/portfolio/init` result into the recommendation and its holding changes.
    pub fn convert_calculated(dto: CalculatedPortfolioDto) -> PortfolioAnalysis {
        match dto {
            CalculatedPortfolioDto::Calculated {
                original,
                old_assets,
                new_assets: _,
                changes,
            } => {
                let mut analysis = Self::convert_analysis(original);
                analysis.previous_allocations = old_assets
                    .unwrap_or_default()
                    .into_iter()
                    .map(Self::convert_allocation)
                    .collect();
                analysis.changes = changes
                    .unwrap_or_default()
                    .into_iter()
                    .map(Self::convert_change)
                    .collect();
                analysis
            }
            CalculatedPortfolioDto::Bare(original) => Self::convert_analysis(original),
        }
    }

    pub fn convert_analysis(dto: PortfolioAnalysisDto) -> PortfolioAnalysis {
        PortfolioAnalysis {
            total_cash: dto.total_cash,
            performance: dto.performance.map(Self::convert_performance),
            fictional_performance: dto.fictional_performance.map(Self::convert_performance),
            allocations: dto.assets.into_iter().map(Self::convert_allocation).collect(),
            previous_allocations: Vec::new(),
            changes: Vec::new(),
            previous_performance: None,
        }
    }

    fn convert_allocation(dto: RecommendAssetDto) -> Allocation {
        Allocation {
            asset_id: dto.asset_id,
            name: dto.name,
            code: dto.code,
            weight: dto.weight.unwrap_or_default(),
            purchase_num: dto.purchase_num,
        }
    }

    fn convert_change(dto: ChangeAssetDto) -> HoldingChange {
        HoldingChange {
            asset_id: dto.asset_id,
            name: dto.name,
            code: dto.code,
            old_purchase_num: dto.old_purchase_num.unwrap_or_default(),
            new_purchase_num: dto.new_purchase_num.unwrap_or_default(),
        }
    }
}
