//! `fvSchemes`.
//!
//! Three variants: density-based runs, solid regions and fluid regions.
//! Steady-only solvers get `bounded` convection schemes.

use foamcase_core::db::numerical::{DiscretizedField, TimeScheme, UpwindOrder};
use foamcase_core::CaseResult;

use crate::context::{GenerationContext, RegionTopology};
use crate::dictionary::{format_float, DataClass, DictionaryFile, FoamDict};

pub fn fv_schemes(ctx: &GenerationContext<'_>, region: &RegionTopology) -> CaseResult<DictionaryFile> {
    let data = if ctx.reader().general().is_density_based()? {
        density_based(ctx)?
    } else if region.is_fluid() {
        fluid(ctx)?
    } else {
        solid(ctx)?
    };
    Ok(DictionaryFile::new(
        DataClass::Dictionary,
        region.location("system"),
        "fvSchemes",
        data,
    ))
}

fn entries(pairs: &[(&str, &str)]) -> FoamDict {
    let mut d = FoamDict::new();
    d.extend(pairs.iter().map(|(k, v)| (*k, *v)));
    d
}

fn density_based(ctx: &GenerationContext<'_>) -> CaseResult<FoamDict> {
    let turbulence = match ctx.reader().numerical().order(DiscretizedField::TurbulentKineticEnergy)? {
        UpwindOrder::FirstOrderUpwind => "Gauss upwind",
        UpwindOrder::SecondOrderUpwind => "Gauss linearUpwind reconGrad",
    };

    Ok(FoamDict::new()
        .with("ddtSchemes", entries(&[("default", "localEuler")]))
        .with(
            "gradSchemes",
            entries(&[
                ("default", "Gauss linear"),
                ("grad(k)", "VKLimited Gauss linear 0.5"),
                ("grad(epsilon)", "VKLimited Gauss linear 0.5"),
                ("grad(omega)", "VKLimited Gauss linear 0.5"),
                ("grad(nuTilda)", "VKLimited Gauss linear 0.5"),
                ("reconGrad", "VKLimited Gauss linear 0.5"),
            ]),
        )
        .with(
            "divSchemes",
            entries(&[
                ("default", "Gauss linear"),
                ("div(phi,k)", turbulence),
                ("div(phi,epsilon)", turbulence),
                ("div(phi,omega)", turbulence),
                ("div(phi,nuTilda)", turbulence),
            ]),
        )
        .with("laplacianSchemes", laplacian_schemes(ctx)?)
        .with(
            "interpolationSchemes",
            entries(&[("default", "linear"), ("interpolate(rho)", "linearUpwind phi grad(rho)")]),
        )
        .with("snGradSchemes", entries(&[("default", "corrected")]))
        .with("wallDist", entries(&[("method", "meshWave")])))
}

fn solid(ctx: &GenerationContext<'_>) -> CaseResult<FoamDict> {
    let mut div = entries(&[("default", "Gauss linear")]);
    if ctx.capability().is_steady_only() {
        div.insert("div(phi,scalar)", scalar_scheme(ctx, DiscretizedField::Scalar)?);
    }

    Ok(FoamDict::new()
        .with("ddtSchemes", ddt_schemes(ctx)?)
        .with("gradSchemes", entries(&[("default", "Gauss linear")]))
        .with("divSchemes", div)
        .with("laplacianSchemes", laplacian_schemes(ctx)?)
        .with("interpolationSchemes", entries(&[("default", "linear")]))
        .with("snGradSchemes", entries(&[("default", "corrected")])))
}

fn fluid(ctx: &GenerationContext<'_>) -> CaseResult<FoamDict> {
    let pressure = ctx.reader().numerical().pressure_scheme()?;

    Ok(FoamDict::new()
        .with("ddtSchemes", ddt_schemes(ctx)?)
        .with(
            "gradSchemes",
            entries(&[
                ("default", "Gauss linear"),
                ("momentumReconGrad", "VKLimited Gauss linear 1.0"),
                ("energyReconGrad", "BJLimited Gauss linear 1.0"),
                ("turbulenceReconGrad", "BJLimited Gauss linear 1.0"),
            ]),
        )
        .with("divSchemes", div_schemes(ctx)?)
        .with("laplacianSchemes", laplacian_schemes(ctx)?)
        .with(
            "interpolationSchemes",
            entries(&[
                ("default", "linear"),
                ("interpolate(p)", pressure.as_str()),
                ("interpolate(p_rgh)", pressure.as_str()),
                ("reconstruct(psi)", "Minmod"),
                ("reconstruct(p)", "Minmod"),
                ("reconstruct(U)", "MinmodV"),
                ("reconstruct(Dp)", "Minmod"),
            ]),
        )
        .with("snGradSchemes", entries(&[("default", "corrected")]))
        .with("wallDist", entries(&[("method", "meshWave")])))
}

fn ddt_schemes(ctx: &GenerationContext<'_>) -> CaseResult<FoamDict> {
    let default = if ctx.reader().general().is_time_transient()? {
        match ctx.reader().numerical().time_scheme()? {
            TimeScheme::FirstOrderImplicit => "Euler",
            TimeScheme::SecondOrderImplicit => "backward",
        }
    } else if ctx.capability().time_transient {
        // steady run of a transient-capable solver: local time stepping
        "localEuler"
    } else {
        "steadyState"
    };
    Ok(entries(&[("default", default)]))
}

fn laplacian_schemes(ctx: &GenerationContext<'_>) -> CaseResult<FoamDict> {
    let default = match ctx.reader().numerical().high_order_term_relaxation()? {
        Some(factor) => format!("Gauss linear limited corrected {}", format_float(factor)),
        None => "Gauss linear corrected".to_string(),
    };
    Ok(FoamDict::new().with("default", default))
}

fn scalar_scheme(ctx: &GenerationContext<'_>, field: DiscretizedField) -> CaseResult<&'static str> {
    Ok(match ctx.reader().numerical().order(field)? {
        UpwindOrder::FirstOrderUpwind => "Gauss upwind",
        UpwindOrder::SecondOrderUpwind => "Gauss linearUpwind momentumReconGrad",
    })
}

fn div_schemes(ctx: &GenerationContext<'_>) -> CaseResult<FoamDict> {
    let numerical = ctx.reader().numerical();
    let models = ctx.reader().models();
    let bounded = if ctx.capability().is_steady_only() { "bounded " } else { "" };

    let mut div = FoamDict::new().with("default", "Gauss linear");
    let mut put = |pairs: &[(&str, &str)]| {
        for (key, scheme) in pairs {
            div.insert(*key, format!("{bounded}{scheme}"));
        }
    };

    match numerical.order(DiscretizedField::Momentum)? {
        UpwindOrder::FirstOrderUpwind => put(&[
            ("div(phi,U)", "Gauss upwind"),
            ("div(rhoPhi,U)", "Gauss upwind"),
            ("div(phiNeg,U)", "Gauss upwind"),
            ("div(phiPos,U)", "Gauss upwind"),
        ]),
        UpwindOrder::SecondOrderUpwind => put(&[
            ("div(phi,U)", "Gauss linearUpwind momentumReconGrad"),
            ("div(rhoPhi,U)", "Gauss linearUpwind momentumReconGrad"),
            ("div(phiNeg,U)", "Gauss MinmodV"),
            ("div(phiPos,U)", "Gauss MinmodV"),
        ]),
    }

    match numerical.order(DiscretizedField::TurbulentKineticEnergy)? {
        UpwindOrder::FirstOrderUpwind => put(&[
            ("div(phi,k)", "Gauss upwind"),
            ("div(phi,epsilon)", "Gauss upwind"),
            ("div(phi,omega)", "Gauss upwind"),
            ("div(phi,nuTilda)", "Gauss upwind"),
        ]),
        UpwindOrder::SecondOrderUpwind => put(&[
            ("div(phi,k)", "Gauss linearUpwind turbulenceReconGrad"),
            ("div(phi,epsilon)", "Gauss linearUpwind turbulenceReconGrad"),
            ("div(phi,omega)", "Gauss linearUpwind turbulenceReconGrad"),
            ("div(phi,nuTilda)", "Gauss linearUpwind turbulenceReconGrad"),
        ]),
    }

    if models.is_energy_model_on()? {
        match numerical.order(DiscretizedField::Energy)? {
            UpwindOrder::FirstOrderUpwind => put(&[
                ("div(phi,h)", "Gauss upwind"),
                ("div(phiNeg,h)", "Gauss upwind"),
                ("div(phiPos,h)", "Gauss upwind"),
                ("div(phi,K)", "Gauss upwind"),
                ("div(phiNeg,K)", "Gauss upwind"),
                ("div(phiPos,K)", "Gauss upwind"),
            ]),
            UpwindOrder::SecondOrderUpwind => put(&[
                ("div(phi,h)", "Gauss linearUpwind energyReconGrad"),
                ("div(phiNeg,h)", "Gauss Minmod"),
                ("div(phiPos,h)", "Gauss Minmod"),
                ("div(phi,K)", "Gauss linearUpwind energyReconGrad"),
                ("div(phiNeg,K)", "Gauss Minmod"),
                ("div(phiPos,K)", "Gauss Minmod"),
                ("div(phid_neg,p)", "Gauss Minmod"),
                ("div(phid_pos,p)", "Gauss Minmod"),
            ]),
        }
    }

    if models.is_multiphase_model_on()? {
        match numerical.order(DiscretizedField::VolumeFraction)? {
            UpwindOrder::FirstOrderUpwind => put(&[
                ("div(phi,alpha)", "Gauss upwind"),
                ("div(phirb,alpha)", "Gauss upwind"),
            ]),
            UpwindOrder::SecondOrderUpwind => put(&[
                ("div(phi,alpha)", "Gauss vanLeer"),
                ("div(phirb,alpha)", "Gauss linear"),
            ]),
        }
    }

    // scalar transport is never bounded
    div.insert("div(phi,scalar)", scalar_scheme(ctx, DiscretizedField::Scalar)?);
    div.insert("div(phi,Yi_h)", scalar_scheme(ctx, DiscretizedField::Species)?);
    Ok(div)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::testing::{set_root, solver, REGION};
    use crate::resources::MemoryResources;
    use foamcase_core::db::material::{add_material, Phase};
    use foamcase_core::db::region::add_region;
    use foamcase_core::document::{CaseDocument, CasePath};
    use foamcase_core::template;

    fn case() -> CaseDocument {
        let mut doc = template::new_case().unwrap();
        add_region(&mut doc, REGION, 1).unwrap();
        doc
    }

    fn schemes(doc: &CaseDocument, solver_name: &str, rname: &str) -> FoamDict {
        let res = MemoryResources::new();
        let ctx = GenerationContext::with_solver(doc, &res, Default::default(), solver(solver_name));
        let region = ctx.region(rname).unwrap();
        fv_schemes(&ctx, &region).unwrap().data
    }

    fn word<'a>(d: &'a FoamDict, path: &str) -> &'a str {
        d.lookup(path).and_then(|v| v.as_word()).unwrap()
    }

    #[test]
    fn steady_solver_bounds_convection() {
        let d = schemes(&case(), "simpleNFoam", REGION);
        assert_eq!(word(&d, "ddtSchemes/default"), "steadyState");
        assert_eq!(word(&d, "divSchemes/div(phi,U)"), "bounded Gauss linearUpwind momentumReconGrad");
        assert_eq!(word(&d, "divSchemes/div(phi,k)"), "bounded Gauss upwind");
        assert_eq!(word(&d, "divSchemes/div(phi,scalar)"), "Gauss linearUpwind momentumReconGrad");
        assert!(d.lookup("divSchemes/div(phi,h)").is_none());
        assert_eq!(word(&d, "interpolationSchemes/interpolate(p)"), "momentumWeightedReconstruct");
        assert_eq!(word(&d, "laplacianSchemes/default"), "Gauss linear corrected");
    }

    #[test]
    fn transient_run_uses_implicit_time_scheme() {
        let mut doc = case();
        set_root(&mut doc, "general/timeTransient", "true");
        set_root(&mut doc, "numericalConditions/discretizationSchemes/time", "secondOrderImplicit");
        let d = schemes(&doc, "pimpleNFoam", REGION);
        assert_eq!(word(&d, "ddtSchemes/default"), "backward");
        assert_eq!(word(&d, "divSchemes/div(phi,U)"), "Gauss linearUpwind momentumReconGrad");
    }

    #[test]
    fn steady_run_of_transient_solver_uses_local_time_stepping() {
        let d = schemes(&case(), "buoyantPimpleNFoam", REGION);
        assert_eq!(word(&d, "ddtSchemes/default"), "localEuler");
    }

    #[test]
    fn energy_and_limited_laplacian() {
        let mut doc = case();
        set_root(&mut doc, "models/energyModels", "on");
        doc.set_attribute(&CasePath::root().children("numericalConditions/highOrderTermRelaxation"), "disabled", "false")
            .unwrap();
        let d = schemes(&doc, "buoyantSimpleNFoam", REGION);
        assert_eq!(word(&d, "divSchemes/div(phi,h)"), "bounded Gauss linearUpwind energyReconGrad");
        assert_eq!(word(&d, "divSchemes/div(phid_pos,p)"), "bounded Gauss Minmod");
        assert_eq!(word(&d, "laplacianSchemes/default"), "Gauss linear limited corrected 0.8");
    }

    #[test]
    fn density_based_variant() {
        let mut doc = case();
        set_root(&mut doc, "general/solverType", "densityBased");
        let d = schemes(&doc, "TSLAeroFoam", REGION);
        assert_eq!(word(&d, "ddtSchemes/default"), "localEuler");
        assert_eq!(word(&d, "gradSchemes/reconGrad"), "VKLimited Gauss linear 0.5");
        assert_eq!(word(&d, "divSchemes/div(phi,k)"), "Gauss upwind");
    }

    #[test]
    fn solid_variant() {
        let mut doc = case();
        let steel = add_material(&mut doc, "steel", Phase::Solid).unwrap();
        add_region(&mut doc, "solid", steel).unwrap();
        let d = schemes(&doc, "buoyantSimpleNFoam", "solid");
        assert_eq!(word(&d, "gradSchemes/default"), "Gauss linear");
        assert_eq!(word(&d, "divSchemes/div(phi,scalar)"), "Gauss linearUpwind momentumReconGrad");
        assert!(d.get("wallDist").is_none());
        let res = MemoryResources::new();
        let ctx = GenerationContext::with_solver(&doc, &res, Default::default(), solver("buoyantSimpleNFoam"));
        assert_eq!(fv_schemes(&ctx, &ctx.region("solid").unwrap()).unwrap().location, "system/solid");
    }
}
