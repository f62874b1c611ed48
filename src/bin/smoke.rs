//! Civic API connectivity check: authenticates against the sandbox and checks one wallet.
//!
//! Usage: `civic-smoke [WALLET] [NETWORK]`

use civic_pass_mcp_server::civic::{CivicApiClient, Environment};
use civic_pass_mcp_server::{validation, Config, NetworkRegistry};

const DEFAULT_WALLET: &str = "0x9281B31230C735867a2Fd62aF8ec816Cc1714521";
const DEFAULT_NETWORK: &str = "xdc-apothem";

#[tokio::main]
async fn main() -> eyre::Result<()> {
    println!("╔═══════════════════════════════════════════════════════╗");
    println!("║   Civic Pass MCP Server - API Smoke Test             ║");
    println!("╚═══════════════════════════════════════════════════════╝\n");

    let mut args = std::env::args().skip(1);
    let wallet = args.next().unwrap_or_else(|| DEFAULT_WALLET.to_string());
    let network_key = args.next().unwrap_or_else(|| DEFAULT_NETWORK.to_string());

    let config = Config::from_env()?;
    println!("API base URL: {}", config.api_base_url);

    let (network, descriptor) = NetworkRegistry::new().resolve(&network_key)?;
    if !validation::is_valid_wallet_address(&wallet, descriptor) {
        eyre::bail!(
            "{} is not a valid address for {} (expected {})",
            wallet,
            descriptor.name,
            validation::expected_format(descriptor.civic_chain)
        );
    }

    let client = CivicApiClient::new(config)?;

    println!("\n→ Authenticating (sandbox)...");
    let auth = client.authenticate(Environment::Sandbox).await?;
    println!("✓ Authenticated");
    println!("  Token type: {}", auth.token_type);
    println!("  Expires in: {} seconds", auth.expires_in);

    println!("\n→ Checking pass status for {} on {}...", wallet, descriptor.name);
    let status = client
        .check_pass_status(&wallet, network, None, None)
        .await?;
    println!("✓ Pass status retrieved:");
    println!("{}", serde_json::to_string_pretty(&status)?);

    println!("\nExplorer: {}", descriptor.explorer_address_url(&wallet));
    Ok(())
}
