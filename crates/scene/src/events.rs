use std::collections::BTreeMap;

/// Opaque token for one attached event handler.
///
/// Teardown must remove exactly the handlers that were attached, never
/// merely same-named ones, so handlers are addressed by token rather than
/// by zone id + kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerId(u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ZoneEventKind {
    HoverIn,
    HoverOut,
    Activate,
}

/// The per-zone subscription record the surface stores at zone creation
/// time and consumes on `clear()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneSubscription {
    pub zone: String,
    pub hover_in: HandlerId,
    pub hover_out: HandlerId,
    pub activate: HandlerId,
}

/// Registry of live handler tokens.
#[derive(Debug, Default)]
pub struct EventRegistry {
    next: u64,
    active: BTreeMap<HandlerId, (String, ZoneEventKind)>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, zone: &str, kind: ZoneEventKind) -> HandlerId {
        let id = HandlerId(self.next);
        self.next += 1;
        self.active.insert(id, (zone.to_string(), kind));
        id
    }

    /// Removes exactly the given token. Returns `true` if it was live.
    pub fn unregister(&mut self, id: HandlerId) -> bool {
        self.active.remove(&id).is_some()
    }

    pub fn is_active(&self, id: HandlerId) -> bool {
        self.active.contains_key(&id)
    }

    /// Leak check: the number of handlers currently attached.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Registers the three handlers a hit-zone carries.
    pub fn subscribe_zone(&mut self, zone: &str) -> ZoneSubscription {
        ZoneSubscription {
            zone: zone.to_string(),
            hover_in: self.register(zone, ZoneEventKind::HoverIn),
            hover_out: self.register(zone, ZoneEventKind::HoverOut),
            activate: self.register(zone, ZoneEventKind::Activate),
        }
    }

    /// Disposes a zone's subscription. Returns `true` if all three tokens
    /// were still live.
    pub fn unsubscribe(&mut self, sub: &ZoneSubscription) -> bool {
        let a = self.unregister(sub.hover_in);
        let b = self.unregister(sub.hover_out);
        let c = self.unregister(sub.activate);
        a && b && c
    }
}
