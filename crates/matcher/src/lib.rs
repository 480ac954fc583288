pub mod geo;
pub mod ranking;
pub mod scorer;
pub mod sequencer;

pub use ranking::{rank_candidates, RankedCandidate};
pub use scorer::score_pair;
pub use sequencer::OfferDispatchSequencer;
