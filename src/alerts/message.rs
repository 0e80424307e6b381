// =============================================================================
// Alert Message Formatting
// =============================================================================
//
// Builds the email subject and HTML body for an outbound alert.  Undefined
// indicator values render as "-" rather than a fabricated number.
// =============================================================================

use chrono::{DateTime, Utc};

use crate::indicators::IndicatorSummary;
use crate::types::Signal;

/// Subject line: `Stock Alert: TCS - 2 Signal(s)`.
///
/// The exchange suffix (`.NS`) is stripped for readability.
pub fn alert_subject(symbol: &str, signal_count: usize) -> String {
    format!(
        "Stock Alert: {} - {} Signal(s)",
        display_symbol(symbol),
        signal_count
    )
}

/// HTML body with the detected signals and a snapshot of the indicators.
pub fn alert_body(
    symbol: &str,
    signals: &[Signal],
    summary: &IndicatorSummary,
    price: f64,
    now: DateTime<Utc>,
) -> String {
    let mut signal_items = String::new();
    for signal in signals {
        signal_items.push_str(&format!(
            "<li><strong>{}:</strong> {} (Strength: {})</li>\n",
            signal.kind, signal.message, signal.strength
        ));
    }

    format!(
        "<html>\n<body>\n\
         <h2>Stock Alert: {symbol}</h2>\n\
         <p><strong>Timestamp:</strong> {timestamp}</p>\n\
         <p><strong>Current Price:</strong> {price:.2}</p>\n\
         <h3>Signals Detected:</h3>\n\
         <ul>\n{signal_items}</ul>\n\
         <h3>Technical Indicators:</h3>\n\
         <table border=\"1\" style=\"border-collapse: collapse;\">\n\
         <tr><td><strong>MACD:</strong></td><td>{macd}</td></tr>\n\
         <tr><td><strong>RSI:</strong></td><td>{rsi}</td></tr>\n\
         <tr><td><strong>MFI:</strong></td><td>{mfi}</td></tr>\n\
         <tr><td><strong>Volume Ratio:</strong></td><td>{volume_ratio}</td></tr>\n\
         </table>\n\
         <p><em>This is an automated alert from the Nifty Sentinel engine.</em></p>\n\
         </body>\n</html>\n",
        symbol = display_symbol(symbol),
        timestamp = now.format("%Y-%m-%d %H:%M:%S UTC"),
        price = price,
        signal_items = signal_items,
        macd = fmt_opt(summary.macd_line, 4),
        rsi = fmt_opt(summary.rsi, 2),
        mfi = fmt_opt(summary.mfi, 2),
        volume_ratio = summary
            .volume_ratio
            .map(|r| format!("{r:.2}x"))
            .unwrap_or_else(|| "-".to_string()),
    )
}

fn display_symbol(symbol: &str) -> &str {
    symbol.strip_suffix(".NS").unwrap_or(symbol)
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "-".to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SignalKind, SignalStrength};

    fn summary() -> IndicatorSummary {
        IndicatorSummary {
            macd_line: Some(1.23456),
            rsi: Some(27.5),
            mfi: None,
            volume_ratio: Some(2.5),
            ..IndicatorSummary::default()
        }
    }

    #[test]
    fn subject_strips_exchange_suffix_and_counts_signals() {
        assert_eq!(alert_subject("TCS.NS", 2), "Stock Alert: TCS - 2 Signal(s)");
        assert_eq!(alert_subject("AAPL", 1), "Stock Alert: AAPL - 1 Signal(s)");
    }

    #[test]
    fn body_contains_signals_and_indicator_values() {
        let signals = vec![Signal {
            kind: SignalKind::RsiOversold,
            message: "RSI oversold: 27.50".to_string(),
            strength: SignalStrength::High,
        }];
        let now = "2026-02-10T09:30:00Z".parse().unwrap();
        let body = alert_body("TCS.NS", &signals, &summary(), 3110.4, now);

        assert!(body.contains("Stock Alert: TCS"));
        assert!(body.contains("RSI_Oversold"));
        assert!(body.contains("RSI oversold: 27.50"));
        assert!(body.contains("Strength: High"));
        assert!(body.contains("3110.40"));
        assert!(body.contains("1.2346")); // MACD to 4 decimal places
        assert!(body.contains("2.50x"));
        assert!(body.contains("2026-02-10 09:30:00 UTC"));
    }

    #[test]
    fn undefined_indicators_render_as_dashes() {
        let now = "2026-02-10T09:30:00Z".parse().unwrap();
        let body = alert_body("TCS.NS", &[], &summary(), 100.0, now);
        // MFI is undefined in the fixture summary.
        assert!(body.contains("<tr><td><strong>MFI:</strong></td><td>-</td></tr>"));
    }
}
