/// Parse a free-form price string the way listing prices are compared:
/// drop every character that is not an ASCII digit or '.', then read the
/// longest leading decimal number. Non-positive or unreadable prices yield
/// `None` so callers exclude them.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in cleaned.char_indices() {
        if c == '.' {
            if seen_dot {
                break;
            }
            seen_dot = true;
        }
        end = i + 1;
    }

    let value: f64 = cleaned[..end].parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Aggregate over a set of parsed prices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceStats {
    pub count: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

impl PriceStats {
    /// `None` for an empty set; the average is never computed over zero items.
    pub fn from_prices(prices: &[f64]) -> Option<Self> {
        if prices.is_empty() {
            return None;
        }
        let sum: f64 = prices.iter().sum();
        let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            count: prices.len(),
            average: sum / prices.len() as f64,
            min,
            max,
        })
    }
}
