//! `fvSolution`: linear solvers, SIMPLE/PIMPLE controls and relaxation.

use foamcase_core::db::numerical::{Convergence, CouplingScheme, Equation, Relaxation};
use foamcase_core::document::CasePath;
use foamcase_core::CaseResult;

use crate::context::{GenerationContext, RegionTopology};
use crate::dictionary::{DataClass, DictionaryFile, FoamDict, FoamValue};

const TURBULENCE: &str = "\"(k|epsilon|omega|nuTilda)\"";
const TURBULENCE_FINAL: &str = "\"(k|epsilon|omega|nuTilda)Final\"";

fn run_conditions_path() -> CasePath {
    CasePath::root().children("runCalculation/runConditions")
}

/// Per-region `fvSolution`.
pub fn fv_solution(ctx: &GenerationContext<'_>, region: &RegionTopology) -> CaseResult<DictionaryFile> {
    let numerical = ctx.reader().numerical();
    let solid = !region.is_fluid();
    let consistent = if !solid && numerical.coupling_scheme()? == CouplingScheme::Simplec {
        "yes"
    } else {
        "no"
    };

    let mut simple = FoamDict::new()
        .with("consistent", consistent)
        .with("nNonOrthogonalCorrectors", 0)
        .with("residualControl", residual_control(ctx, |c| FoamValue::Float(c.absolute))?);
    let mut pimple = FoamDict::new()
        .with("consistent", consistent)
        .with("momentumPredictor", "on")
        .with("nOuterCorrectors", numerical.max_iterations_per_time_step()?)
        .with("nCorrectors", numerical.number_of_correctors()?)
        .with("nNonOrthogonalCorrectors", 0)
        .with(
            "maxCo",
            ctx.doc().get_float(&run_conditions_path().child("maxCourantNumber"))?,
        )
        .with(
            "residualControl",
            residual_control(ctx, |c| {
                FoamValue::Dict(
                    FoamDict::new()
                        .with("tolerance", c.absolute)
                        .with("relTol", c.relative),
                )
            })?,
        );

    if !solid {
        let reference = ctx.reader().general().reference_pressure_location()?;
        for controls in [&mut simple, &mut pimple] {
            controls.insert("pRefPoint", reference);
            controls.insert("pRefValue", 0);
        }
    }
    if !solid && ctx.reader().models().is_multiphase_model_on()? {
        pimple.insert(
            "maxAlphaCo",
            ctx.doc().get_float(&run_conditions_path().child("VoFMaxCourantNumber"))?,
        );
    }

    let data = FoamDict::new()
        .with("solvers", solvers(ctx, solid)?)
        .with("SIMPLE", simple)
        .with("PIMPLE", pimple)
        .with("relaxationFactors", relaxation_factors(ctx)?);

    Ok(DictionaryFile::new(
        DataClass::Dictionary,
        region.location("system"),
        "fvSolution",
        data,
    ))
}

/// Top-level `fvSolution` of a multi-region case; only the outer loop is
/// controlled here.
pub fn shared_fv_solution(ctx: &GenerationContext<'_>) -> CaseResult<DictionaryFile> {
    let pimple = FoamDict::new().with(
        "nOuterCorrectors",
        ctx.reader().numerical().max_iterations_per_time_step()?,
    );
    Ok(DictionaryFile::new(
        DataClass::Dictionary,
        "system",
        "fvSolution",
        FoamDict::new().with("PIMPLE", pimple),
    ))
}

fn residual_control(
    ctx: &GenerationContext<'_>,
    entry: impl Fn(Convergence) -> FoamValue,
) -> CaseResult<FoamDict> {
    let numerical = ctx.reader().numerical();
    let pressure = numerical.convergence(Equation::Pressure)?;
    let mut rc = FoamDict::new()
        .with("p", entry(pressure))
        .with("p_rgh", entry(pressure))
        .with("U", entry(numerical.convergence(Equation::Momentum)?))
        .with("h", entry(numerical.convergence(Equation::Energy)?))
        .with(TURBULENCE, entry(numerical.convergence(Equation::Turbulence)?));
    if ctx.reader().models().is_multiphase_model_on()? {
        rc.insert("\"alpha.*\"", entry(numerical.convergence(Equation::VolumeFraction)?));
    }
    Ok(rc)
}

fn relaxation_factors(ctx: &GenerationContext<'_>) -> CaseResult<FoamDict> {
    let numerical = ctx.reader().numerical();
    let pair = |d: &mut FoamDict, key: &str, r: Relaxation| {
        d.insert(key, r.factor);
        d.insert(format!("{key}Final"), r.final_factor);
    };

    let mut fields = FoamDict::new();
    let pressure = numerical.relaxation(Equation::Pressure)?;
    pair(&mut fields, "p", pressure);
    pair(&mut fields, "p_rgh", pressure);
    pair(&mut fields, "rho", numerical.relaxation(Equation::Density)?);

    let mut equations = FoamDict::new();
    pair(&mut equations, "U", numerical.relaxation(Equation::Momentum)?);
    pair(&mut equations, "h", numerical.relaxation(Equation::Energy)?);
    let turbulence = numerical.relaxation(Equation::Turbulence)?;
    equations.insert(TURBULENCE, turbulence.factor);
    equations.insert(TURBULENCE_FINAL, turbulence.final_factor);
    if ctx.reader().models().is_multiphase_model_on()? {
        let alpha = numerical.relaxation(Equation::VolumeFraction)?;
        equations.insert("\"alpha.*\"", alpha.factor);
        equations.insert("\"alpha.*Final\"", alpha.final_factor);
    }

    Ok(FoamDict::new().with("fields", fields).with("equations", equations))
}

fn solver(name: &str, preconditioner: impl Into<FoamValue>, rel_tol: f64) -> FoamDict {
    FoamDict::new()
        .with("solver", name)
        .with("preconditioner", preconditioner)
        .with("tolerance", 1e-16)
        .with("relTol", rel_tol)
}

fn gamg(smoother: &str) -> FoamDict {
    FoamDict::new()
        .with("preconditioner", "GAMG")
        .with("smoother", smoother)
        .with("tolerance", 1e-5)
        .with("relTol", 0.1)
}

fn solvers(ctx: &GenerationContext<'_>, solid: bool) -> CaseResult<FoamDict> {
    let smoother = if solid { "DIC" } else { "DILU" };
    let h = solver("PBiCGStab", gamg(smoother), 0.05);
    if solid {
        let mut d = FoamDict::new().with("h", h.clone());
        d.insert("hFinal", h.with("relTol", 0));
        return Ok(d);
    }

    let p = if ctx.reader().general().is_compressible()? {
        solver("PBiCGStab", "DILU", 0.01)
    } else {
        solver("PCG", gamg("DIC"), 0.01)
    };

    let mut d = FoamDict::new()
        .with("p", p.clone())
        .with("p_rgh", p.clone())
        .with("\"(p|p_rgh)Final\"", p.with("relTol", 0))
        .with("\"(U|k|epsilon|omega|nuTilda)\"", solver("PBiCGStab", "DILU", 0.1))
        .with(
            "\"(U|k|epsilon|omega|nuTilda)Final\"",
            solver("PBiCGStab", "DILU", 0.0),
        )
        .with("h", h.clone())
        .with("hFinal", h.with("relTol", 0))
        .with("\"(rho|rhoFinal)\"", FoamDict::new().with("solver", "diagonal"));

    if ctx.reader().models().is_multiphase_model_on()? {
        let mp = ctx.reader().numerical().multiphase()?;
        d.insert(
            "\"alpha.*\"",
            FoamDict::new()
                .with("nAlphaCorr", mp.number_of_correctors)
                .with("nAlphaSubCycles", mp.max_iterations_per_time_step)
                .with("MULESCorr", if mp.use_semi_implicit_mules { "yes" } else { "no" })
                .with("nLimiterIter", mp.number_of_mules_iterations)
                .with("cAlpha", mp.phase_interface_compression_factor),
        );
    }
    Ok(d)
}
