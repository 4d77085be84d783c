/// Exchange suffix the provider expects on NSE equities.
pub const NSE_SUFFIX: &str = ".NS";

const INDEX_ALIASES: &[(&str, &str)] = &[
    ("NIFTY", "^NSEI"),
    ("BANKNIFTY", "^NSEBANK"),
    ("SENSEX", "^BSESN"),
];

/// Maps a user-facing ticker to the provider's symbol.
///
/// Index names become their caret-prefixed provider codes; everything else is
/// treated as an NSE equity and gets the `.NS` suffix unless it already carries
/// it or is already an index code. Any input is accepted.
pub fn normalize(user_symbol: &str) -> String {
    let symbol = user_symbol.trim().to_uppercase();

    if let Some((_, provider)) = INDEX_ALIASES.iter().find(|(alias, _)| *alias == symbol) {
        return provider.to_string();
    }

    if symbol.starts_with('^') || symbol.ends_with(NSE_SUFFIX) {
        symbol
    } else {
        format!("{}{}", symbol, NSE_SUFFIX)
    }
}
