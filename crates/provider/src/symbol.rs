use common::Market;

/// Map a human-facing symbol plus market type to the provider's expected
/// ticker form. Pure lookup: crypto and forex route through named venues,
/// equities pass through unchanged.
pub fn provider_symbol(symbol: &str, market: Market) -> String {
    match market {
        Market::Stock => symbol.to_string(),
        Market::Crypto => format!("BINANCE:{symbol}"),
        Market::Forex => format!("OANDA:{symbol}"),
    }
}
