// Pair-name helpers. Symbols are exchange-style concatenations such as "BTCUSDT".

static PAIR_QUOTES: &[&str] = &["USDT", "USDC", "FDUSD", "BTC", "ETH"];

/// Trims and upper-cases user input ("ethusdt " -> "ETHUSDT").
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}

// Finds the trading quote at the end of the pair name and returns it.
pub fn get_quote(symbol: &str) -> Option<&str> {
    PAIR_QUOTES
        .iter()
        .find(|&&quote| symbol.len() > quote.len() && symbol.ends_with(quote))
        .copied()
}

pub fn get_base(symbol: &str) -> Option<&str> {
    let quote = get_quote(symbol)?;
    symbol.strip_suffix(quote)
}

/// Whether the pair is quoted in one of `suffixes`.
pub fn has_quote_suffix(symbol: &str, suffixes: &[&str]) -> bool {
    suffixes
        .iter()
        .any(|s| symbol.len() > s.len() && symbol.ends_with(s))
}

/// Identifier the configured backend uses for per-asset routes
/// (`/api/price/{id}`): the lower-cased base asset, "BTCUSDT" -> "btc".
pub fn backend_asset_id(symbol: &str) -> String {
    get_base(symbol).unwrap_or(symbol).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_known_quotes() {
        assert_eq!(get_quote("BTCUSDT"), Some("USDT"));
        assert_eq!(get_base("BTCUSDT"), Some("BTC"));
        assert_eq!(get_base("ETHBTC"), Some("ETH"));
        assert_eq!(get_base("SOLFDUSD"), Some("SOL"));
        assert_eq!(get_quote("USDT"), None);
        assert_eq!(get_quote("FOOBAR"), None);
    }

    #[test]
    fn backend_id_is_lowercase_base() {
        assert_eq!(backend_asset_id("XRPUSDT"), "xrp");
        assert_eq!(backend_asset_id("WEIRD"), "weird");
        assert_eq!(normalize_symbol("  ethusdt "), "ETHUSDT");
    }

    #[test]
    fn quote_suffix_check() {
        assert!(has_quote_suffix("BTCUSDT", &["USDT"]));
        assert!(!has_quote_suffix("ETHBTC", &["USDT", "USDC"]));
        assert!(!has_quote_suffix("USDT", &["USDT"]));
    }
}
