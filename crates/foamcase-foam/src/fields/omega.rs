//! Specific dissipation rate, `omega`, for the k-omega models.

use foamcase_core::CaseResult;

use super::turbulence::Quantity;
use super::*;

pub struct SpecificDissipationRate;

impl FieldGenerator for SpecificDissipationRate {
    fn object(&self) -> &'static str {
        Quantity::Omega.object()
    }

    fn build(&self, ctx: &GenerationContext<'_>, region: &RegionTopology) -> CaseResult<Option<DictionaryFile>> {
        Quantity::Omega.build(ctx, region)
    }
}
