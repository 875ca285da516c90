//! `stellar contract invoke` commands for signing a call by hand.

use crate::config::Network;
use lottery_types::Invocation;

/// Placeholder for the stellar CLI identity that signs the call.
pub const DEFAULT_SOURCE: &str = "YOUR_KEY_NAME";

/// Render `invocation` as a multi-line shell command.
pub fn render_command(invocation: &Invocation, network: Network, source: &str) -> String {
    let mut lines = vec![
        "stellar contract invoke".to_string(),
        format!("  --id {}", invocation.contract_id()),
        format!("  --source {source}"),
        format!("  --network {network}"),
        format!("  -- {}", invocation.function()),
    ];
    for (name, arg) in invocation.named_args() {
        lines.push(format!("  --{name} {arg}"));
    }
    lines.join(" \\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lottery_execution::mocks::{builder, LOTTERY_CONTRACT, PARTICIPANT, TOKEN_CONTRACT};

    #[test]
    fn test_approve_command() {
        let invocation = builder()
            .build_approve(LOTTERY_CONTRACT, PARTICIPANT, 10_000_000, 2_000_000)
            .unwrap();
        let expected = format!(
            "stellar contract invoke \\\n  --id {TOKEN_CONTRACT} \\\n  --source YOUR_KEY_NAME \\\n  --network testnet \\\n  -- approve \\\n  --from {PARTICIPANT} \\\n  --spender {LOTTERY_CONTRACT} \\\n  --amount 10000000 \\\n  --expiration_ledger 2000000"
        );
        assert_eq!(
            render_command(&invocation, Network::Testnet, DEFAULT_SOURCE),
            expected
        );
    }

    #[test]
    fn test_buy_and_reveal_commands() {
        let commitment = "ab".repeat(32);
        let buy = builder()
            .build_buy_ticket(7, PARTICIPANT, 5, &commitment)
            .unwrap();
        let rendered = render_command(&buy, Network::Mainnet, "alice");
        assert!(rendered.contains("  --source alice \\\n"));
        assert!(rendered.contains("  --network mainnet \\\n"));
        assert!(rendered.contains("  -- buy_ticket \\\n  --round_id 7 \\\n"));
        assert!(rendered.ends_with(&format!("  --commit_hash {commitment}")));

        let reveal = builder().build_reveal_seed(7, PARTICIPANT, "00ff").unwrap();
        let rendered = render_command(&reveal, Network::Testnet, DEFAULT_SOURCE);
        assert!(rendered.ends_with("  --seed 00ff"));
        assert!(rendered.starts_with(&format!(
            "stellar contract invoke \\\n  --id {LOTTERY_CONTRACT}"
        )));
    }
}
