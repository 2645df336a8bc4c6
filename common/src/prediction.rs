use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{Issue, Issues, Pagination, Validate};

/// Symbols the showcase cycles through.
pub const TRACKED_SYMBOLS: [&str; 5] = ["BTC", "ETH", "ADA", "DOT", "SOL"];

/// Most price points returned per symbol by the market-data endpoint.
pub const MAX_PRICE_HISTORY: u32 = 1000;

/// Horizon a prediction is made for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1m")]
    OneMonth,
}

impl Timeframe {
    /// Timeframes shown in list views, in rotation order.
    pub const ROTATION: [Timeframe; 4] = [
        Timeframe::OneHour,
        Timeframe::FourHours,
        Timeframe::OneDay,
        Timeframe::OneWeek,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Timeframe::OneHour => "1h",
            Timeframe::FourHours => "4h",
            Timeframe::OneDay => "1d",
            Timeframe::OneWeek => "1w",
            Timeframe::OneMonth => "1m",
        }
    }
}

/// Candle interval for market-data queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketTimeframe {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[default]
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionType {
    Price,
    Trend,
    Volatility,
}

impl PredictionType {
    pub const ALL: [PredictionType; 3] = [
        PredictionType::Price,
        PredictionType::Trend,
        PredictionType::Volatility,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Bullish,
    Bearish,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    #[default]
    Active,
    Completed,
    Expired,
}

/// Technical-indicator snapshot attached to predictions and market data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    pub rsi: f64,
    pub macd: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bollinger: Option<String>,
    pub sma_20: f64,
    pub sma_50: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_sma: Option<f64>,
}

/// Market context captured when a prediction is viewed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub last_update: DateTime<Utc>,
    pub price_change_24h: String,
    pub volume_24h: String,
    pub market_cap: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub id: String,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub prediction_type: PredictionType,
    pub current_price: String,
    pub target_price: String,
    pub confidence: u8,
    pub prediction: Direction,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasoning: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_indicators: Option<TechnicalIndicators>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_data: Option<MarketSnapshot>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: PredictionStatus,
    /// Filled in once the prediction has been resolved.
    pub accuracy: Option<u8>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePredictionRequest {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub prediction_type: PredictionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Validate for CreatePredictionRequest {
    fn validate(&self) -> Vec<Issue> {
        let mut issues = Issues::new();
        issues.non_empty(&["symbol"], &self.symbol);
        if let Some(confidence) = self.confidence {
            issues.range(&["confidence"], confidence, 0.0, 100.0);
        }
        issues.finish()
    }
}

fn default_history_limit() -> u32 {
    100
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarketDataRequest {
    pub symbols: Vec<String>,
    #[serde(default)]
    pub timeframe: MarketTimeframe,
    #[serde(default = "default_history_limit")]
    pub limit: u32,
}

impl Validate for MarketDataRequest {
    fn validate(&self) -> Vec<Issue> {
        let mut issues = Issues::new();
        if self.symbols.is_empty() {
            issues.push(Issue::new(
                &["symbols"],
                "Array must contain at least 1 element(s)",
            ));
        }
        issues.range(&["limit"], self.limit as f64, 1.0, MAX_PRICE_HISTORY as f64);
        issues.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: String,
    pub volume: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    pub symbol: String,
    pub price: String,
    pub change_24h: String,
    pub volume_24h: String,
    pub market_cap: String,
    pub last_update: DateTime<Utc>,
    pub technical_indicators: TechnicalIndicators,
    pub price_history: Vec<PricePoint>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeframePerformance {
    pub total: u32,
    pub accuracy: f64,
    pub avg_confidence: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolPerformance {
    pub total: u32,
    pub accuracy: f64,
    pub best_timeframe: Timeframe,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTrends {
    pub bullish_predictions: u32,
    pub bearish_predictions: u32,
    /// Percent.
    pub avg_target_deviation: f64,
    pub best_performing_indicator: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionAnalytics {
    pub total_predictions: u32,
    pub accuracy_rate: f64,
    pub avg_confidence: f64,
    pub performance_by_timeframe: BTreeMap<String, TimeframePerformance>,
    pub performance_by_symbol: BTreeMap<String, SymbolPerformance>,
    pub recent_trends: RecentTrends,
    pub last_updated: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PredictionEnvelope {
    pub prediction: Prediction,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PredictionList {
    pub predictions: Vec<Prediction>,
    pub pagination: Pagination,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDataEnvelope {
    pub market_data: Vec<MarketData>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalyticsEnvelope {
    pub analytics: PredictionAnalytics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_wire_names() {
        assert_eq!(serde_json::to_string(&Timeframe::OneMonth).unwrap(), "\"1m\"");
        let tf: MarketTimeframe = serde_json::from_str("\"15m\"").unwrap();
        assert_eq!(tf, MarketTimeframe::FifteenMinutes);
        assert!(serde_json::from_str::<Timeframe>("\"5m\"").is_err());
    }

    #[test]
    fn test_confidence_bounds() {
        let req: CreatePredictionRequest = serde_json::from_value(serde_json::json!({
            "symbol": "BTC", "timeframe": "1d", "predictionType": "price", "confidence": 120
        }))
        .unwrap();
        assert_eq!(req.validate().len(), 1);

        let req: CreatePredictionRequest = serde_json::from_value(serde_json::json!({
            "symbol": "BTC", "timeframe": "1d", "predictionType": "trend", "confidence": 0
        }))
        .unwrap();
        assert!(req.validate().is_empty());
    }

    #[test]
    fn test_market_data_defaults_and_limits() {
        let req: MarketDataRequest =
            serde_json::from_value(serde_json::json!({"symbols": ["BTC"]})).unwrap();
        assert_eq!(req.timeframe, MarketTimeframe::OneHour);
        assert_eq!(req.limit, 100);
        assert!(req.validate().is_empty());

        let req: MarketDataRequest =
            serde_json::from_value(serde_json::json!({"symbols": [], "limit": 0})).unwrap();
        assert_eq!(req.validate().len(), 2);
    }

    #[test]
    fn test_indicator_field_names() {
        let value = serde_json::to_value(TechnicalIndicators {
            rsi: 65.5,
            macd: "bullish_crossover".into(),
            bollinger: None,
            sma_20: 44200.0,
            sma_50: 43800.0,
            volume: None,
            volume_sma: None,
        })
        .unwrap();
        assert!(value.get("sma_20").is_some());
        assert!(value.get("bollinger").is_none());
    }
}
