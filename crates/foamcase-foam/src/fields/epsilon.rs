//! Turbulent dissipation rate, `epsilon`, for the k-epsilon models.

use foamcase_core::CaseResult;

use super::turbulence::Quantity;
use super::*;

pub struct DissipationRate;

impl FieldGenerator for DissipationRate {
    fn object(&self) -> &'static str {
        Quantity::Epsilon.object()
    }

    fn build(&self, ctx: &GenerationContext<'_>, region: &RegionTopology) -> CaseResult<Option<DictionaryFile>> {
        Quantity::Epsilon.build(ctx, region)
    }
}
