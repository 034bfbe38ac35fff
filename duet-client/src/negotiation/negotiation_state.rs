/// Offer/answer progress of one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegotiationState {
    /// Nothing exchanged yet; the next offer is a `CallOffer`.
    #[default]
    Idle,
    OfferSent,
    OfferReceived,
    Stable,
}

impl NegotiationState {
    pub fn is_settled(self) -> bool {
        matches!(self, NegotiationState::Idle | NegotiationState::Stable)
    }
}
