//! NiftyRent client binary: prints the account's NFTs grouped by contract.

use niftyrent_client::loader::{load_my_nfts, load_token_registry};
use niftyrent_client::rpc::now_ns;
use niftyrent_client::{Config, IndexerClient, NearContracts, Session};
use niftyrent_types::duration::duration_string;
use niftyrent_types::{group_by_contract, AccountContext, TokenMetadata, TokenRegistry, NATIVE_NEAR};
use serde_json::{json, Value};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting NiftyRent client");

    let config: Config = config::Config::builder()
        .add_source(config::File::with_name("niftyrent").required(false))
        .add_source(config::Environment::with_prefix("NIFTYRENT"))
        .build()
        .and_then(|c| c.try_deserialize())
        .unwrap_or_else(|e| {
            error!(error = %e, "FATAL: Config error: fix env vars or niftyrent.toml");
            std::process::exit(1);
        });

    if config.account_id.is_empty() {
        warn!("NIFTYRENT_ACCOUNT_ID not set, nothing to load");
    }

    info!(
        network = %config.network,
        marketplace = %config.marketplace_contract_id,
        rpc = %config.rpc_url,
        "Configuration loaded"
    );

    let chain = NearContracts::connect(&config).await?;
    let index = IndexerClient::new(&config.indexer_url);
    let ctx = AccountContext::new(
        &config.account_id,
        chain.rental_contract_id(),
        chain.marketplace_contract_id(),
    );

    let session = Session::new(&ctx.account_id);
    let scope = session.current();

    let loaded = session
        .run(&scope, async {
            let (registry, views) = tokio::try_join!(
                load_token_registry(&chain),
                load_my_nfts(&ctx, &chain, &index),
            )?;
            Ok((registry, views))
        })
        .await;

    let (registry, views) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            let view_error = e.into_view_error();
            error!(error = %view_error, "Failed to load NFTs");
            return Err(view_error.into());
        }
    };

    let Some((registry, views)) = session.commit(&scope, (registry, views)) else {
        return Ok(());
    };

    let now = now_ns();
    let groups: Vec<Value> = group_by_contract(views)
        .into_iter()
        .map(|group| {
            let items: Vec<Value> = group
                .items
                .iter()
                .map(|view| {
                    json!({
                        "token_id": view.nft.token_id,
                        "title": view.nft.title,
                        "role": view.role,
                        "claimable": view.is_claimable(now),
                        "lease": view.lease.as_ref().map(|lease| json!({
                            "lease_id": lease.lease_id,
                            "lender_id": lease.lender_id,
                            "borrower_id": lease.borrower_id,
                            "price": price_label(&registry, &lease.ft_contract_addr, lease.price),
                            "remaining": view
                                .is_expiring(now)
                                .then(|| duration_string(lease.remaining_ns(now)))
                                .flatten(),
                        })),
                    })
                })
                .collect();
            json!({
                "contract_id": group.contract_id,
                "contract_name": group.contract_name,
                "items": items,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&groups)?);
    Ok(())
}

fn price_label(
    registry: &TokenRegistry,
    ft_contract_addr: &str,
    price: niftyrent_types::TokenAmount,
) -> String {
    let native = TokenMetadata::native_near();
    let metadata = match registry.metadata_of(ft_contract_addr) {
        Ok(metadata) => metadata,
        Err(_) if ft_contract_addr == NATIVE_NEAR => &native,
        Err(_) => return format!("{price} {ft_contract_addr}"),
    };
    match niftyrent_types::format_amount(metadata, price) {
        Ok(amount) => format!("{amount} {}", metadata.symbol),
        Err(_) => format!("{price} {ft_contract_addr}"),
    }
}
