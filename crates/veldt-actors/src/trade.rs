//! Pending-trade lifecycle: expiry by tick timer.
//!
//! The wire protocol offers no accept or reject action, so a pending trade
//! has exactly one exit: expiry after the trade window. Offers are never
//! escrowed, so expiry returns nothing -- the proposer simply stops
//! waiting.

use veldt_types::{ActorStatus, EntityRef, TradeId, TradeStatus, WorldEventKind};
use veldt_world::WorldState;
use veldt_world::constants::TRADE_EXPIRE_TICKS;

/// Expire every pending trade whose window has closed.
pub fn expire_trades(world: &mut WorldState) {
    let tick = world.tick;
    let expired: Vec<TradeId> = world
        .trades
        .values()
        .filter(|trade| {
            trade.status == TradeStatus::Pending
                && trade.created_at_tick.saturating_add(TRADE_EXPIRE_TICKS) <= tick
        })
        .map(|trade| trade.id)
        .collect();

    for id in expired {
        let Some(trade) = world.trades.get_mut(&id) else {
            continue;
        };
        trade.status = TradeStatus::Expired;
        trade.resolved_at_tick = Some(tick);
        let seller = trade.seller;
        let buyer = trade.buyer;

        // The proposer stops waiting on the counter-party.
        if let Some(actor) = world.actors.get_mut(&seller)
            && actor.is_alive
            && actor.status == ActorStatus::Trading
        {
            actor.status = ActorStatus::Idle;
            world.mark_dirty(EntityRef::Actor(seller));
        }

        world.emit(WorldEventKind::TradeExpired {
            trade: id,
            seller,
            buyer,
        });
        tracing::debug!(tick, trade = %id, "Trade expired");
    }
}
