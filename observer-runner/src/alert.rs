//! Plain-text alert for new decisions with a non-zero composite signal.

use std::fmt::Write as _;

use observer_core::domain::DecisionRow;

/// Render the alert, or `None` when no decision carries a signal.
pub fn render_alert(decisions: &[DecisionRow]) -> Option<String> {
    let hits: Vec<&DecisionRow> = decisions.iter().filter(|d| d.has_alert()).collect();
    if hits.is_empty() {
        return None;
    }

    let mut out = String::new();
    let _ = writeln!(out, "{} new signal(s)", hits.len());
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<8} {:<10} signals", "ticker", "date");
    for d in hits {
        let fired: Vec<String> = d
            .signals()
            .iter()
            .filter(|(_, v)| *v != 0)
            .map(|(name, v)| format!("{name}={v}"))
            .collect();
        let _ = writeln!(out, "{:<8} {:<10} {}", d.ticker, d.date.to_string(), fired.join(" "));
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use observer_core::domain::row_id;

    fn decision(ticker: &str, ma: i32, cci_ma: i32) -> DecisionRow {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        DecisionRow {
            id: row_id(ticker, date),
            ticker: ticker.into(),
            date,
            bb_upper_pd_signal: 0,
            bb_lower_pd_signal: 0,
            atr_candle_pd_signal: 0,
            ma_signal: ma,
            atr_angle_cci_signal: 0,
            atr_angle_ma_signal: 0,
            cci_ma_signal: cci_ma,
        }
    }

    #[test]
    fn quiet_decisions_render_nothing() {
        assert_eq!(render_alert(&[decision("AAA", 0, 0)]), None);
    }

    #[test]
    fn lists_only_firing_rules() {
        let text = render_alert(&[decision("AAA", 0, 0), decision("BBB", 3, -2)]).unwrap();
        assert!(text.starts_with("1 new signal(s)"));
        assert!(text.contains("BBB      2024-02-01 ma_angle=3 cci_ma=-2"));
        assert!(!text.contains("AAA"));
    }
}
