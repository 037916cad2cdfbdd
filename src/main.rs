use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

use tradesim::core::Config;
use tradesim::{
    CreditLedger, ExecutionEngine, InstrumentStore, PriceFeed, Side, TradeRegistry, wire,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logger
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tradesim=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .init();

    let config = Config::default();

    // 2. Seed reference data and boot the feed
    let instruments = Arc::new(InstrumentStore::with_defaults());
    let ledger = Arc::new(CreditLedger::with_default_traders());
    let feed = Arc::new(PriceFeed::new(config.feed.clone()));
    let registry = Arc::new(TradeRegistry::new(Arc::clone(&instruments)));
    let engine = Arc::new(ExecutionEngine::new(
        Arc::clone(&registry),
        Arc::clone(&feed),
        config.execution.clone(),
    ));

    for isin in instruments.isins() {
        let instrument = instruments.require(&isin)?;
        feed.start(&isin, instrument.reference_price);
    }

    println!("==================================================");
    println!("  tradesim - trade lifecycle simulation");
    println!("==================================================");

    // 3. Run a batch of concurrent admission-checked orders
    let orders = [
        ("US0000000001", "T1", Side::Buy, 100u64, 6.0),
        ("US0000000002", "T1", Side::Sell, 250, 4.5),
        ("GB0000000003", "T2", Side::Buy, 1_000, 5.5),
    ];

    let mut handles = Vec::new();
    for (isin, trader_id, side, quantity, limit_price) in orders {
        let notional = quantity as f64 * limit_price;
        if !ledger.can_admit(trader_id, notional)? {
            tracing::warn!("{}: exposure cap reached, order skipped", trader_id);
            continue;
        }
        if !ledger.within_per_trade_limit(trader_id, notional)? {
            tracing::warn!(
                "{}: notional {:.2} over per-trade limit, order skipped",
                trader_id,
                notional
            );
            continue;
        }

        let trade_id = Uuid::new_v4().to_string();
        registry.create(&trade_id, isin, trader_id, side, quantity, limit_price)?;

        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            if let Err(e) = engine.execute_with_retry(&trade_id, 5, 0.9).await {
                tracing::error!("execution failed: {}", e);
            }
            trade_id
        }));
    }

    // 4. Report each trade once its task finishes
    for handle in handles {
        let trade_id = handle.await?;
        let trade = registry.get(&trade_id)?;
        let history: Vec<String> = trade.history.iter().map(|s| s.to_string()).collect();

        println!("\ntrade {} [{}]", trade.id, trade.state);
        println!("  history: {}", history.join(" -> "));
        println!(
            "  filled:  {}/{} @ {:.2}",
            trade.filled_quantity, trade.quantity, trade.executed_price
        );
        println!("  metrics: {}", trade.metrics.summary());
        println!("  json:    {}", serde_json::to_string(&trade.metrics)?);
        println!(
            "  drift:   {:+.4} vs reference",
            engine.price_vs_reference(&trade_id)?
        );
        println!("  fix out: {}", wire::new_order_single(&trade).encode());
        println!("  fix in:  {}", wire::execution_report(&trade).encode());
    }

    Ok(())
}
