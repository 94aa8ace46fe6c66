use crate::wire::HealthRes;

/// Health service shared by the API surfaces.
///
/// Checks that the phrase lexicon is available, which is the only process-wide resource
/// the matcher depends on.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Report service health without creating an instance.
    ///
    /// # Returns
    /// A `HealthRes` with the number of loaded phrase rules in its message.
    pub fn check_health() -> HealthRes {
        let rules = ctm_core::lexicon::Lexicon::shared().rules().len();
        HealthRes {
            ok: rules > 0,
            message: format!("Trial matcher is alive ({rules} phrase rules loaded)"),
        }
    }
}
