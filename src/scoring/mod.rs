//! L3 scoring engine
//!
//! Pure violation scoring over repaired candidate texts. The violation
//! catalogue and the grammar rule table are data; the scorer is control
//! flow only.

pub mod rules;
mod scorer;
mod violations;

pub use scorer::{score_candidate, ScoredCandidate};
pub use violations::{Violation, DISQUALIFYING_PENALTY};
