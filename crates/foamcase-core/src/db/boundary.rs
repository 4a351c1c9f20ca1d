//! Boundary conditions.
//!
//! Boundary conditions belong to a region and are keyed by `bcid`. The
//! physical type selects which sub-block of the condition is meaningful; the
//! other sub-blocks keep their defaults so that switching type is lossless.

use crate::db::cascade::{CascadeHandler, CascadeRegistry, EntityKind};
use crate::db::read_enum;
use crate::db::region::{region_path, RegionDb};
use crate::document::{CaseDocument, CasePath};
use crate::errors::{CaseError, CaseResult};
use crate::template;

crate::case_enum! {
    pub enum BoundaryType ("boundary type") {
        VelocityInlet => "velocityInlet",
        FlowRateInlet => "flowRateInlet",
        PressureInlet => "pressureInlet",
        PressureOutlet => "pressureOutlet",
        AblInlet => "ablInlet",
        OpenChannelInlet => "openChannelInlet",
        OpenChannelOutlet => "openChannelOutlet",
        Outflow => "outflow",
        FreeStream => "freeStream",
        FarFieldRiemann => "farFieldRiemann",
        SubsonicInlet => "subsonicInlet",
        SubsonicOutflow => "subsonicOutflow",
        SupersonicInflow => "supersonicInflow",
        SupersonicOutflow => "supersonicOutflow",
        Wall => "wall",
        ThermoCoupledWall => "thermoCoupledWall",
        Symmetry => "symmetry",
        Interface => "interface",
        PorousJump => "porousJump",
        Fan => "fan",
        Empty => "empty",
        Cyclic => "cyclic",
        Wedge => "wedge",
    }
}

crate::case_enum! {
    /// Mesh patch type written to `polyMesh/boundary`.
    pub enum GeometricalType ("geometrical type") {
        Patch => "patch",
        Wall => "wall",
        MappedWall => "mappedWall",
        Cyclic => "cyclic",
        Symmetry => "symmetry",
        CyclicAmi => "cyclicAMI",
        Empty => "empty",
        Wedge => "wedge",
    }
}

impl BoundaryType {
    pub fn geometrical_type(&self) -> GeometricalType {
        use BoundaryType::*;
        match self {
            VelocityInlet | FlowRateInlet | PressureInlet | AblInlet | OpenChannelInlet | FreeStream
            | FarFieldRiemann | SubsonicInlet | SupersonicInflow | PressureOutlet | OpenChannelOutlet
            | Outflow | SubsonicOutflow | SupersonicOutflow => GeometricalType::Patch,
            Wall => GeometricalType::Wall,
            ThermoCoupledWall => GeometricalType::MappedWall,
            PorousJump | Fan | Cyclic => GeometricalType::Cyclic,
            Symmetry => GeometricalType::Symmetry,
            Interface => GeometricalType::CyclicAmi,
            Empty => GeometricalType::Empty,
            Wedge => GeometricalType::Wedge,
        }
    }

    /// Types that pair with another boundary through `coupledBoundary`.
    pub fn needs_coupled_boundary(&self) -> bool {
        matches!(
            self,
            BoundaryType::ThermoCoupledWall
                | BoundaryType::Interface
                | BoundaryType::PorousJump
                | BoundaryType::Fan
                | BoundaryType::Cyclic
        )
    }
}

crate::case_enum! {
    pub enum WallVelocityCondition ("wall velocity condition") {
        NoSlip => "noSlip",
        Slip => "slip",
        MovingWall => "movingWall",
        AtmosphericWall => "atmosphericWall",
        TranslationalMovingWall => "translationalMovingWall",
        RotationalMovingWall => "rotationalMovingWall",
    }
}

crate::case_enum! {
    pub enum WallTemperature ("wall temperature condition") {
        Adiabatic => "adiabatic",
        ConstantTemperature => "constantTemperature",
        ConstantHeatFlux => "constantHeatFlux",
        Convection => "convection",
    }
}

crate::case_enum! {
    pub enum InterfaceMode ("interface mode") {
        InternalInterface => "internalInterface",
        RotationalPeriodic => "rotationalPeriodic",
        TranslationalPeriodic => "translationalPeriodic",
        RegionInterface => "regionInterface",
    }
}

crate::case_enum! {
    pub enum VelocitySpecification ("velocity specification") {
        Component => "component",
        MagnitudeNormal => "magnitudeNormal",
    }
}

crate::case_enum! {
    pub enum VelocityProfile ("velocity profile") {
        Constant => "constant",
        SpatialDistribution => "spatialDistribution",
        TemporalDistribution => "temporalDistribution",
    }
}

crate::case_enum! {
    pub enum FlowRateInletSpecification ("flow rate specification") {
        VolumeFlowRate => "volumeFlowRate",
        MassFlowRate => "massFlowRate",
    }
}

crate::case_enum! {
    pub enum KOmegaSpecification ("k-omega specification") {
        KAndOmega => "kAndOmega",
        IntensityAndViscosityRatio => "intensityAndViscosityRatio",
    }
}

crate::case_enum! {
    pub enum KEpsilonSpecification ("k-epsilon specification") {
        KAndEpsilon => "kAndEpsilon",
        IntensityAndViscosityRatio => "intensityAndViscosityRatio",
    }
}

crate::case_enum! {
    pub enum SpalartAllmarasSpecification ("Spalart-Allmaras specification") {
        ModifiedTurbulentViscosity => "modifiedTurbulentViscosity",
        TurbulentViscosityRatio => "turbulentViscosityRatio",
    }
}

crate::case_enum! {
    pub enum TemperatureProfile ("temperature profile") {
        Constant => "constant",
        SpatialDistribution => "spatialDistribution",
        TemporalDistribution => "temporalDistribution",
    }
}

crate::case_enum! {
    pub enum TemperatureTemporalDistribution ("temperature temporal distribution") {
        PiecewiseLinear => "piecewiseLinear",
        Polynomial => "polynomial",
    }
}

crate::case_enum! {
    pub enum FarFieldDirectionSpecification ("flow direction specification") {
        Direct => "direct",
        AoaAos => "AoA_AoS",
    }
}

pub fn boundary_conditions_path() -> CasePath {
    CasePath::root().children("regions/region/boundaryConditions/boundaryCondition")
}

pub fn boundary_path(bcid: u64) -> CasePath {
    boundary_conditions_path().where_attr("bcid", bcid)
}

#[derive(Debug, Clone, Copy)]
pub struct BoundaryDb<'a> {
    doc: &'a CaseDocument,
}

impl<'a> BoundaryDb<'a> {
    pub fn new(doc: &'a CaseDocument) -> Self {
        Self { doc }
    }

    pub fn path(&self, bcid: u64) -> CasePath {
        boundary_path(bcid)
    }

    pub fn exists(&self, bcid: u64) -> bool {
        self.doc.exists(&boundary_path(bcid))
    }

    pub fn name(&self, bcid: u64) -> CaseResult<String> {
        self.doc.get_value(&boundary_path(bcid).child("name"))
    }

    pub fn physical_type(&self, bcid: u64) -> CaseResult<BoundaryType> {
        read_enum(self.doc, &boundary_path(bcid).child("physicalType"))
    }

    pub fn geometrical_type(&self, bcid: u64) -> CaseResult<GeometricalType> {
        read_enum(self.doc, &boundary_path(bcid).child("geometricalType"))
    }

    /// Name of the region owning `bcid`.
    pub fn region_of(&self, bcid: u64) -> CaseResult<String> {
        RegionDb::new(self.doc)
            .names()
            .into_iter()
            .find(|r| {
                self.doc.exists(
                    &region_path(r)
                        .children("boundaryConditions/boundaryCondition")
                        .where_attr("bcid", bcid),
                )
            })
            .ok_or_else(|| CaseError::path_not_found(boundary_path(bcid)))
    }

    pub fn bcid_by_name(&self, rname: &str, name: &str) -> CaseResult<u64> {
        let p = region_path(rname)
            .children("boundaryConditions/boundaryCondition")
            .where_child("name", name);
        let raw = self.doc.get_attribute(&p, "bcid")?;
        raw.parse().map_err(|_| CaseError::conversion(&p, raw, "boundary id"))
    }

    /// The paired boundary, if one is set. `0` means none.
    pub fn coupled_boundary(&self, bcid: u64) -> CaseResult<Option<u64>> {
        let p = boundary_path(bcid).child("coupledBoundary");
        let raw = self.doc.get_value(&p)?;
        match raw.trim() {
            "" | "0" => Ok(None),
            t => t
                .parse()
                .map(Some)
                .map_err(|_| CaseError::conversion(&p, raw.clone(), "boundary id")),
        }
    }

    pub fn interface_mode(&self, bcid: u64) -> CaseResult<InterfaceMode> {
        read_enum(self.doc, &boundary_path(bcid).children("interface/mode"))
    }
}

/// Add a boundary condition to a region. Names are unique per region.
pub fn add_boundary_condition(
    doc: &mut CaseDocument,
    rname: &str,
    name: &str,
    physical_type: BoundaryType,
) -> CaseResult<u64> {
    if !RegionDb::new(doc).exists(rname) {
        return Err(CaseError::path_not_found(region_path(rname)));
    }
    if BoundaryDb::new(doc).bcid_by_name(rname, name).is_ok() {
        return Err(CaseError::invalid_argument(format!(
            "boundary '{name}' already exists in region '{rname}'"
        )));
    }
    let el = template::boundary_condition(
        name,
        physical_type.as_str(),
        physical_type.geometrical_type().as_str(),
    )?;
    let bcid = doc.add_element(&region_path(rname).child("boundaryConditions"), el, "bcid")?;
    tracing::info!(bcid, region = rname, boundary = name, %physical_type, "boundary condition added");
    Ok(bcid)
}

/// Pair two boundaries with each other.
pub fn couple_boundaries(doc: &mut CaseDocument, a: u64, b: u64) -> CaseResult<()> {
    let db = BoundaryDb::new(doc);
    if !db.exists(a) || !db.exists(b) || a == b {
        return Err(CaseError::invalid_argument(format!("cannot couple boundaries {a} and {b}")));
    }
    doc.set_value(&boundary_path(a).child("coupledBoundary"), b.to_string())?;
    doc.set_value(&boundary_path(b).child("coupledBoundary"), a.to_string())
}

/// Remove a boundary condition after notifying cascade handlers. Nothing
/// changes if a handler aborts.
pub fn remove_boundary_condition(doc: &mut CaseDocument, registry: &CascadeRegistry, bcid: u64) -> CaseResult<()> {
    if !BoundaryDb::new(doc).exists(bcid) {
        return Err(CaseError::path_not_found(boundary_path(bcid)));
    }
    let mut staged = doc.clone();
    registry.notify(&mut staged, EntityKind::BoundaryCondition, bcid)?;
    staged.remove_element(&boundary_path(bcid))?;
    *doc = staged;
    tracing::info!(bcid, "boundary condition removed");
    Ok(())
}

/// Clears `coupledBoundary` on boundaries paired with a removed one.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoupleCascade;

impl CascadeHandler for CoupleCascade {
    fn id(&self) -> &str {
        "boundary.couple"
    }

    fn removing(&self, doc: &mut CaseDocument, _kind: EntityKind, id: u64) -> CaseResult<()> {
        let p = boundary_conditions_path()
            .where_child("coupledBoundary", id)
            .child("coupledBoundary");
        let n = doc.for_each_mut(&p, |e| {
            e.set_text("0");
            Ok(())
        })?;
        if n > 0 {
            tracing::debug!(bcid = id, cleared = n, "couples cleared");
        }
        Ok(())
    }
}
