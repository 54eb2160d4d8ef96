//! Places a small limit order against one outcome of a market.
//!
//! Usage:
//!   OMX_PRIVATE_KEY=0x... OMX_MAKER=0x... \
//!     cargo run --example place_order -- <market_id> <YES|NO> <BUY|SELL> <price> <quantity>

use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use omx_client::{
    ClientConfig, HttpGateway, OrderClient, OrderIntent, SignerCredential,
};
use omx_common::Side;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut args = std::env::args().skip(1);
    let market_id: u64 = args.next().ok_or("missing market id")?.parse()?;
    let outcome = args.next().ok_or("missing outcome (YES|NO)")?;
    let side = match args.next().ok_or("missing side (BUY|SELL)")?.as_str() {
        "BUY" => Side::Buy,
        "SELL" => Side::Sell,
        other => return Err(format!("unknown side {other}").into()),
    };
    let price = args.next().ok_or("missing price")?;
    let quantity = args.next().ok_or("missing quantity")?;

    let private_key = std::env::var("OMX_PRIVATE_KEY")?;
    let maker = std::env::var("OMX_MAKER")?.parse()?;

    let config = ClientConfig::for_custody(maker);
    let credential = SignerCredential::from_private_key(&private_key)?;
    let gateway = Arc::new(HttpGateway::new(&config)?);

    let client = OrderClient::new(
        config,
        credential,
        gateway.clone(),
        gateway.clone(),
        gateway,
    )
    .await;

    let intent = OrderIntent::new(side, price, quantity);
    let placed = client.place_order_for_market(market_id, &outcome, &intent).await?;
    info!(order_id = %placed.order_id, "order placed");

    let open = client.open_orders(1, 20, Some(market_id)).await?;
    info!(total = open.total, "open orders on this market");
    for record in open.list {
        info!(
            order_id = %record.order_id,
            side = %record.side,
            price = %record.price,
            filled = %record.filled,
            "open order"
        );
    }

    Ok(())
}
