// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free smoothing functions and the computer that applies
// the configured set of them to a validated price series.

pub mod computer;
pub mod ema;
