//! Logging utilities

use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install the JSON subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_logger() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))
}

/// Mask a mobile number before it reaches a log line.
///
/// Keeps the country/network prefix and the last two digits so support staff
/// can still tell payouts apart: `254712345678` becomes `2547******78`.
pub fn mask_msisdn(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 6 {
        return "****".to_string();
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 6), tail)
}

/// Log a single payout line with the phone number masked.
pub fn log_payout(order_id: &str, member_id: &str, msisdn: Option<&str>, amount: &str) {
    let masked = msisdn.map(mask_msisdn).unwrap_or_else(|| "-".to_string());
    info!(
        order_id = %order_id,
        member_id = %member_id,
        msisdn = %masked,
        amount = %amount,
        "Payout prepared"
    );
}
