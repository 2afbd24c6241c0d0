use schedule_cell::Slot;

/// Picks one slot out of the offered candidates.
pub trait SlotSelector: Send + Sync {
    fn select(&self, candidates: &[Slot]) -> Option<Slot>;
}

/// The first candidate in table order.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstAvailable;

impl SlotSelector for FirstAvailable {
    fn select(&self, candidates: &[Slot]) -> Option<Slot> {
        candidates.first().cloned()
    }
}

/// The candidate that starts soonest; ties keep table order.
#[derive(Debug, Default, Clone, Copy)]
pub struct EarliestSlot;

impl SlotSelector for EarliestSlot {
    fn select(&self, candidates: &[Slot]) -> Option<Slot> {
        candidates
            .iter()
            .enumerate()
            .min_by_key(|(index, slot)| (slot.starts_at(), *index))
            .map(|(_, slot)| slot.clone())
    }
}
