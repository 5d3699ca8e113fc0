//! Type-safe identifier wrappers for every entity kind.
//!
//! Every entity in the world has a strongly-typed ID to prevent accidental
//! mixing of identifiers at compile time. IDs are sequential `u64` values
//! allocated by the world state: the same seed always yields the same ID
//! sequence, which keeps two runs with identical inputs bit-identical.
//! There is deliberately no entropy-based constructor here.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around `u64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub u64);

        impl $name {
            /// Wrap a raw numeric identifier.
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// Return the inner `u64` value.
            pub const fn into_inner(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a connected (or once-connected) actor.
    ActorId
}

define_id! {
    /// Unique identifier for a resource node (tree, sapling, gold vein).
    ResourceId
}

define_id! {
    /// Unique identifier for a server-driven NPC monster.
    NpcId
}

define_id! {
    /// Unique identifier for a behemoth.
    BehemothId
}

define_id! {
    /// Unique identifier for a built structure.
    StructureId
}

define_id! {
    /// Unique identifier for a trade between two actors.
    TradeId
}

define_id! {
    /// Unique identifier for a crafting job.
    CraftJobId
}

define_id! {
    /// Unique identifier for a chat message.
    MessageId
}

define_id! {
    /// Unique identifier for a world event.
    EventId
}

/// A reference to any spatially indexed entity.
///
/// The spatial index and the event system both need to talk about "some
/// entity" without caring which map it lives in. The ordering derive makes
/// the reference usable as a `BTreeSet`/`BTreeMap` key, which every
/// deterministic iteration in the engine relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EntityRef {
    /// A player-controlled actor.
    Actor(ActorId),
    /// A resource node.
    Resource(ResourceId),
    /// An NPC monster.
    Npc(NpcId),
    /// A behemoth.
    Behemoth(BehemothId),
    /// A built structure.
    Structure(StructureId),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_friendly() {
        let a = ActorId::from_raw(1);
        let b = ActorId::from_raw(2);
        assert!(a < b);
        assert_eq!(a.into_inner(), 1);
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = ResourceId::from_raw(42);
        let json = serde_json::to_string(&original).unwrap();
        let restored: ResourceId = serde_json::from_str(&json).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn entity_refs_order_by_kind_then_id() {
        let a = EntityRef::Actor(ActorId::from_raw(9));
        let r = EntityRef::Resource(ResourceId::from_raw(1));
        assert!(a < r);
    }

    #[test]
    fn id_display_matches_raw() {
        let id = NpcId::from_raw(7);
        assert_eq!(id.to_string(), "7");
    }
}
