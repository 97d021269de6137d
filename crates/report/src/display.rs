//! Text rendering of size summaries.
//!
//! Prices stay in 만원 throughout. [`summary_line`] mirrors the compact line
//! shown on the complex page; [`detail_block`] is the longer 억-formatted form.

use listing_core::{BestPrice, Config, Price, SignalColor, SignalConfig, SizeSummary};
use listing_ingestion::parser::{size_token, MAN_PER_EOK};
use std::fmt;

/// Digits with `,` every three places.
fn group_thousands(value: Price) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a 만원 price in 억 shorthand.
///
/// `120500` → "12억 500", `120000` → "12억", `5000` → "5,000".
pub fn format_price(price: Price) -> String {
    if price < 0 {
        return format!("-{}", format_price(-price));
    }

    let eok = price / MAN_PER_EOK;
    let man = price % MAN_PER_EOK;
    match (eok > 0, man > 0) {
        (true, true) => format!("{}억 {}", eok, group_thousands(man)),
        (true, false) => format!("{eok}억"),
        _ => group_thousands(price),
    }
}

/// "price/floor" for one side, "0/-" when absent.
pub fn side_label(best: Option<&BestPrice>) -> String {
    match best {
        Some(best) if best.price != 0 => format!("{}/{}", best.price, best.floor),
        _ => "0/-".to_string(),
    }
}

/// Price per pyeong, truncated. `None` when the size key has no usable number.
pub fn price_per_pyeong(price: Price, size_key: &str, pyeong_m2: f64) -> Option<i64> {
    let pyeong = size_token(size_key)? / pyeong_m2;
    if pyeong <= 0.0 || !pyeong.is_finite() {
        return None;
    }
    Some((price as f64 / pyeong) as i64)
}

/// One summary as a compact line.
///
/// `"84A  100000/12 / 70000/9  (30000, 70%, 3928/3.3m²)"`; in address-grouped
/// mode the side counts follow in parentheses and a signal, if any, is appended.
pub fn summary_line(summary: &SizeSummary, config: &Config) -> String {
    let sale_price = summary.sale_price();
    let lease_price = summary.lease_price();

    let mut extras = Vec::new();
    if sale_price != 0 && lease_price != 0 {
        extras.push(summary.gap_or_zero().to_string());
        extras.push(summary.lease_rate_label());
    }
    if sale_price != 0 {
        if let Some(per_pyeong) =
            price_per_pyeong(sale_price, &summary.size_key, config.filter.pyeong_m2)
        {
            extras.push(format!("{}/{}m²", per_pyeong, config.filter.pyeong_m2));
        }
    }

    let mut line = format!(
        "{}  {} / {}",
        summary.size_key,
        side_label(summary.sale.as_ref()),
        side_label(summary.lease.as_ref())
    );

    if !extras.is_empty() {
        line.push_str(&format!("  ({})", extras.join(", ")));
    }

    if config.aggregation.group_by_address {
        if extras.is_empty() {
            line.push_str("  ");
        }
        line.push_str(&format!("({}/{})", summary.sale_count, summary.lease_count));

        if let Some(signal) = summary.signal.as_ref().filter(|_| sale_price != 0) {
            line.push_str(&format!("  [{}: {}]", signal.color.as_str(), signal.tooltip()));
        }
    }

    line
}

/// Multi-line 억-formatted view of one summary.
pub fn detail_block(summary: &SizeSummary) -> String {
    let mut lines = vec![
        summary.size_key.clone(),
        format!(
            "  매매: {} ({}) - {}개",
            format_price(summary.sale_price()),
            summary.sale_floor(),
            summary.sale_count
        ),
        format!(
            "  전세: {} ({}) - {}개",
            format_price(summary.lease_price()),
            summary.lease_floor(),
            summary.lease_count
        ),
        format!("  갭: {}", format_price(summary.gap_or_zero())),
        format!("  전세가율: {}", summary.lease_rate_label()),
    ];

    if let Some(signal) = &summary.signal {
        lines.push(format!("  신호등: {} - {}", signal.color.as_str(), signal.tooltip()));
    }

    lines.join("\n")
}

/// Captions for the three signal tiers under a given multiplier.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalLegend {
    pub entries: Vec<(SignalColor, String)>,
}

impl SignalLegend {
    /// Build the legend for a signal configuration.
    pub fn new(config: &SignalConfig) -> Self {
        let low = config.low_threshold();
        let middle = config.middle_threshold();
        Self {
            entries: vec![
                (SignalColor::Green, format!("{low}%미만")),
                (SignalColor::Orange, format!("{middle}%미만")),
                (SignalColor::Red, format!("{middle}%이상")),
            ],
        }
    }
}

impl fmt::Display for SignalLegend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(color, caption)| format!("{} {}", color.as_str(), caption))
            .collect();
        f.write_str(&parts.join("  "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listing_core::{FloorLevel, Signal};

    fn make_summary(sale: Option<Price>, lease: Option<Price>) -> SizeSummary {
        let mut summary = SizeSummary::empty("84A");
        summary.sale = sale.map(|price| BestPrice {
            price,
            floor: FloorLevel::Level(12),
        });
        summary.lease = lease.map(|price| BestPrice {
            price,
            floor: FloorLevel::Level(9),
        });
        if let (Some(s), Some(l)) = (sale, lease) {
            summary.gap = Some(s - l);
            summary.lease_rate = Some(l * 100 / s);
        }
        summary.sale_count = 2;
        summary.lease_count = 1;
        summary
    }

    fn grouped() -> Config {
        let mut config = Config::default();
        config.aggregation.group_by_address = true;
        config
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(120500), "12억 500");
        assert_eq!(format_price(120000), "12억");
        assert_eq!(format_price(125000), "12억 5,000");
        assert_eq!(format_price(5000), "5,000");
        assert_eq!(format_price(850), "850");
        assert_eq!(format_price(0), "0");
        assert_eq!(format_price(-5000), "-5,000");
    }

    #[test]
    fn test_side_label() {
        let best = BestPrice {
            price: 53000,
            floor: FloorLevel::Low,
        };
        assert_eq!(side_label(Some(&best)), "53000/저");
        assert_eq!(side_label(None), "0/-");
    }

    #[test]
    fn test_price_per_pyeong() {
        assert_eq!(price_per_pyeong(100000, "84A", 3.3), Some(3928));
        assert_eq!(price_per_pyeong(100000, "A타입", 3.3), None);
        assert_eq!(price_per_pyeong(100000, "0A", 3.3), None);
    }

    #[test]
    fn test_summary_line_plain() {
        let line = summary_line(&make_summary(Some(100000), Some(70000)), &Config::default());
        assert_eq!(line, "84A  100000/12 / 70000/9  (30000, 70%, 3928/3.3m²)");
    }

    #[test]
    fn test_summary_line_sale_only() {
        let line = summary_line(&make_summary(Some(100000), None), &Config::default());
        assert_eq!(line, "84A  100000/12 / 0/-  (3928/3.3m²)");
    }

    #[test]
    fn test_summary_line_empty_sides() {
        let summary = make_summary(None, None);
        assert_eq!(summary_line(&summary, &Config::default()), "84A  0/- / 0/-");
        assert_eq!(summary_line(&summary, &grouped()), "84A  0/- / 0/-  (2/1)");
    }

    #[test]
    fn test_summary_line_grouped_with_signal() {
        let mut summary = make_summary(Some(90000), Some(60000));
        summary.signal = Some(Signal {
            color: SignalColor::Orange,
            rate: 10.0,
            gap: 10000,
        });
        let line = summary_line(&summary, &grouped());
        assert_eq!(
            line,
            "84A  90000/12 / 60000/9  (30000, 66%, 3535/3.3m²)(2/1)  [orange: 10.0% / 10000]"
        );
    }

    #[test]
    fn test_detail_block() {
        let block = detail_block(&make_summary(Some(120500), Some(85000)));
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines[0], "84A");
        assert_eq!(lines[1], "  매매: 12억 500 (12) - 2개");
        assert_eq!(lines[2], "  전세: 8억 5,000 (9) - 1개");
        assert_eq!(lines[3], "  갭: 3억 5,500");
        assert_eq!(lines[4], "  전세가율: 70%");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_signal_legend_scales() {
        let legend = SignalLegend::new(&SignalConfig::default());
        assert_eq!(legend.to_string(), "green 5%미만  orange 10%미만  red 10%이상");

        let doubled = SignalLegend::new(&SignalConfig {
            multiplier: 2,
            ..SignalConfig::default()
        });
        assert_eq!(doubled.entries[0].1, "10%미만");
        assert_eq!(doubled.entries[2].1, "20%이상");
    }
}
