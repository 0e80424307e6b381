// =============================================================================
// Shared types used across the Nifty Sentinel engine
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single OHLCV bar for a fixed time interval.
///
/// Series are ordered strictly ascending by `timestamp` with no duplicates;
/// the fetcher and bar store both enforce this before anything downstream
/// sees the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// The kind of a detected signal event.
///
/// `MfiOverbought` is computed by the indicator engine and shown on the
/// dashboard, but the detector never emits it as an alertable signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    MacdBullish,
    RsiOversold,
    RsiOverbought,
    MfiOversold,
    MfiOverbought,
    VolumeSurge,
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MacdBullish => write!(f, "MACD_Bullish"),
            Self::RsiOversold => write!(f, "RSI_Oversold"),
            Self::RsiOverbought => write!(f, "RSI_Overbought"),
            Self::MfiOversold => write!(f, "MFI_Oversold"),
            Self::MfiOverbought => write!(f, "MFI_Overbought"),
            Self::VolumeSurge => write!(f, "Volume_Surge"),
        }
    }
}

/// How strong a signal is considered when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalStrength {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// One detected signal event on the latest bar of a series.
///
/// Produced fresh on every detection pass; only persisted as part of an
/// alert record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    pub message: String,
    pub strength: SignalStrength,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_kind_display_matches_wire_names() {
        assert_eq!(SignalKind::MacdBullish.to_string(), "MACD_Bullish");
        assert_eq!(SignalKind::RsiOversold.to_string(), "RSI_Oversold");
        assert_eq!(SignalKind::VolumeSurge.to_string(), "Volume_Surge");
    }

    #[test]
    fn bar_roundtrips_through_json() {
        let bar = Bar {
            timestamp: "2026-01-05T10:00:00Z".parse().unwrap(),
            open: 100.0,
            high: 102.5,
            low: 99.0,
            close: 101.25,
            volume: 15_000.0,
        };
        let json = serde_json::to_string(&bar).unwrap();
        let back: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar, back);
    }

    #[test]
    fn signal_serialises_with_kind_and_strength() {
        let sig = Signal {
            kind: SignalKind::RsiOversold,
            message: "RSI oversold: 22.10".to_string(),
            strength: SignalStrength::High,
        };
        let json = serde_json::to_string(&sig).unwrap();
        assert!(json.contains("RsiOversold"));
        assert!(json.contains("High"));
    }
}
