//! Implementations for the LatCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use serde::Serialize;
use std::path::PathBuf;

// Internal
use super::*;
use crate::steer_limit::{SteerLimit, SteerMaxMap};
use steer_if::eqpt::vehicle::{PathPlan, VehicleState};
use util::{
    params,
    module::State,
    archive::{Archived, Archiver, ArchiveError},
    session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Lateral control module state
pub struct LatCtrl<L = SteerMaxMap> {

    /// Configuration in use this cycle
    config: ControllerConfig,

    /// Configuration to switch to at the start of the next cycle
    pending_config: Option<ControllerConfig>,

    /// Source of the actuator limit
    limit: L,

    mode: LatCtrlMode,

    estimator: StateEstimator,
    trim: IntegralTrim,
    sat_monitor: SatMonitor,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    pub(crate) output: OutputData,
    arch_output: Archiver
}

/// Input data to Lateral Control.
#[derive(Debug, Default, Copy, Clone)]
pub struct InputData {
    /// True if the automated steering feature is engaged.
    pub active: bool,

    /// Measured vehicle state for this cycle.
    pub vehicle: VehicleState,

    /// Path planner output for this cycle.
    pub path_plan: PathPlan
}

/// Output from LatCtrl that the steering actuator must execute.
#[derive(Debug, Default, Copy, Clone, Serialize, PartialEq)]
pub struct OutputData {
    /// Torque command, always within the actuator limit.
    pub steer_torque_cmd: f64,

    /// Desired angle with the offset removed.
    ///
    /// Units: degrees
    pub angle_steers_des_deg: f64
}

/// Status report for LatCtrl processing.
#[derive(Debug, Default, Copy, Clone, Serialize, PartialEq)]
pub struct StatusReport {
    /// True if the controller acted this cycle.
    pub active: bool,

    /// True if the cycle was rejected as numerically unsafe.
    pub fault: bool,

    /// Angle estimated by the observer, with the offset added back.
    ///
    /// Units: degrees
    pub estimated_angle_deg: f64,

    /// Integral trim value.
    pub trim: f64,

    /// Raw command from the control law.
    pub lqr_output: f64,

    /// Final (trimmed and clamped) command.
    pub output: f64,

    /// Actuator limit this cycle.
    pub steer_max: f64,

    /// True if the output has been saturated for longer than the limit.
    pub saturated: bool,

    /// Version of the configuration used this cycle.
    pub config_version: u64
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The possible modes of LatCtrl.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LatCtrlMode {
    Inactive,
    Active
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for LatCtrl<SteerMaxMap> {
    type InitData = PathBuf;
    type InitError = LatCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = LatCtrlError;

    /// Initialise the LatCtrl module.
    ///
    /// Expected init data is the path to the parameter file.
    fn init(init_data: Self::InitData, session: &Session)
        -> Result<Self, Self::InitError>
    {
        // Load the parameters
        let params: Params = params::load_from_path(init_data)
            .map_err(LatCtrlError::ParamLoadError)?;

        let mut lat_ctrl = Self::from_params(&params)?;

        // Initialise the archivers
        lat_ctrl.arch_report = Archiver::from_path(
            session, "lat_ctrl/status_report.csv"
        ).map_err(LatCtrlError::ArchiveInitError)?;
        lat_ctrl.arch_output = Archiver::from_path(
            session, "lat_ctrl/output.csv"
        ).map_err(LatCtrlError::ArchiveInitError)?;

        info!(
            "LatCtrl initialised with tuning version {} at {:.3} s cycle period",
            lat_ctrl.config.version,
            lat_ctrl.config.cycle_period_s
        );

        Ok(lat_ctrl)
    }

    /// Perform cyclic processing of Lateral Control.
    ///
    /// Numeric faults are not errors, they are reported in the status report.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        Ok(self.step(input_data))
    }
}

impl<L> Archived for LatCtrl<L> {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)?;
        self.arch_output.serialise(self.output)?;

        Ok(())
    }
}

impl LatCtrl<SteerMaxMap> {
    /// Build the module from a parameter set, without archiving.
    pub fn from_params(params: &Params) -> Result<Self, LatCtrlError> {
        let config = ControllerConfig::from_tuning(&params.lqr, params.cycle_period_s)?;
        let limit = SteerMaxMap::new(&params.steer_max)
            .map_err(LatCtrlError::SteerLimitError)?;

        Ok(Self::new(config, limit))
    }
}

impl<L: SteerLimit> LatCtrl<L> {

    /// Create a new controller with the given configuration and actuator
    /// limit.
    pub fn new(config: ControllerConfig, limit: L) -> Self {
        Self {
            config,
            pending_config: None,
            limit,
            mode: LatCtrlMode::Inactive,
            estimator: StateEstimator::default(),
            trim: IntegralTrim::default(),
            sat_monitor: SatMonitor::default(),
            report: StatusReport::default(),
            arch_report: Archiver::default(),
            output: OutputData::default(),
            arch_output: Archiver::default()
        }
    }

    /// Request a configuration replacement.
    ///
    /// The new configuration is applied at the start of the next cycle, the
    /// running cycle (if any) never sees a partial update. The version must
    /// be greater than both the current and any already pending version.
    pub fn request_config(&mut self, config: ControllerConfig) -> Result<(), LatCtrlError> {
        let current = match self.pending_config {
            Some(p) => p.version.max(self.config.version),
            None => self.config.version
        };

        if config.version <= current {
            return Err(LatCtrlError::StaleConfigVersion {
                current,
                requested: config.version
            })
        }

        info!("LatCtrl configuration version {} queued", config.version);
        self.pending_config = Some(config);

        Ok(())
    }

    /// Execute one control cycle.
    ///
    /// This never allocates or blocks. Only mode changes, configuration swaps
    /// and faults are logged, the per-cycle record is the returned report.
    pub fn step(&mut self, input: &InputData) -> (OutputData, StatusReport) {

        // Configuration changes only take effect on the cycle boundary
        if let Some(config) = self.pending_config.take() {
            info!(
                "LatCtrl configuration version {} -> {} applied",
                self.config.version,
                config.version
            );
            self.config = config;
        }

        // Keep the estimate so that a rejected cycle can be rolled back
        let prev_estimator = self.estimator;

        let (output, report) = match self.cycle(input) {
            Ok(o) => o,
            Err(fault) => {
                self.estimator = prev_estimator;
                self.fault(fault, input)
            }
        };

        self.output = output;
        self.report = report;

        (output, report)
    }

    /// The configuration currently in use.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// The current mode.
    pub fn mode(&self) -> LatCtrlMode {
        self.mode
    }

    /// The estimator state.
    pub fn estimator(&self) -> &StateEstimator {
        &self.estimator
    }

    /// The integral trim state.
    pub fn trim(&self) -> &IntegralTrim {
        &self.trim
    }

    /// The saturation monitor state.
    pub fn sat_monitor(&self) -> &SatMonitor {
        &self.sat_monitor
    }

    /// Run the cycle, returning a fault if any input or computed value is
    /// unsafe. The estimator may have been updated when a fault is returned,
    /// the caller is responsible for rolling it back.
    fn cycle(&mut self, input: &InputData) -> Result<(OutputData, StatusReport), NumericFault> {
        let vehicle = &input.vehicle;
        let plan = &input.path_plan;

        if !vehicle.is_finite() || !plan.is_finite() {
            return Err(NumericFault::NonFiniteInput)
        }

        let steer_max = self.limit.steer_max(vehicle.speed_ms);
        if !steer_max.is_finite() || steer_max < 0.0 {
            return Err(NumericFault::InvalidSteerLimit)
        }

        let torque_scale = torque_scale(vehicle.speed_ms);

        // Subtract offset so zero angle corresponds to zero torque
        let angle_steers_des_deg = plan.corrected_des_deg();
        let steer_angle_deg = vehicle.steer_angle_deg - plan.angle_offset_deg;

        // The estimator runs every cycle, active or not
        let angle_steers_k_deg = self.estimator.update(
            &self.config,
            steer_angle_deg,
            vehicle.steer_torque_eps,
            torque_scale
        )?;

        let mut report = StatusReport {
            estimated_angle_deg: angle_steers_k_deg + plan.angle_offset_deg,
            steer_max,
            config_version: self.config.version,
            ..Default::default()
        };
        let mut output = OutputData {
            steer_torque_cmd: 0.0,
            angle_steers_des_deg
        };

        if !is_engaged(input.active, vehicle.speed_ms) {
            self.deactivate();
            return Ok((output, report))
        }

        let lqr_output = lqr_output(
            &self.config,
            angle_steers_des_deg,
            &self.estimator.x_hat(),
            torque_scale
        );
        if !lqr_output.is_finite() {
            return Err(NumericFault::NonFiniteCommand)
        }

        // Check the trim on a copy so the persistent one is only changed if
        // the cycle is accepted
        let mut trim = self.trim;
        trim.update(
            &self.config,
            vehicle.steer_pressed,
            angle_steers_des_deg - angle_steers_k_deg,
            lqr_output,
            steer_max
        );
        let steer_torque_cmd = trim.apply(lqr_output, steer_max);
        if !steer_torque_cmd.is_finite() {
            return Err(NumericFault::NonFiniteCommand)
        }

        self.set_mode(LatCtrlMode::Active);
        self.trim = trim;

        report.saturated = self.sat_monitor.check(
            &self.config,
            steer_torque_cmd,
            steer_max,
            SatMonitor::check_enabled(vehicle)
        );
        report.active = true;
        report.trim = self.trim.value();
        report.lqr_output = lqr_output;
        report.output = steer_torque_cmd;
        output.steer_torque_cmd = steer_torque_cmd;

        Ok((output, report))
    }

    /// Handle a rejected cycle.
    ///
    /// The estimate is held, the trim and saturation counter are cleared and
    /// a zero command is issued.
    fn fault(&mut self, fault: NumericFault, input: &InputData) -> (OutputData, StatusReport) {
        warn!("LatCtrl cycle rejected: {}", fault);

        self.deactivate();

        let offset = input.path_plan.angle_offset_deg;
        let angle_k = self.estimator.predicted_angle_deg(&self.config);
        let steer_max = self.limit.steer_max(input.vehicle.speed_ms);

        let report = StatusReport {
            fault: true,
            estimated_angle_deg: if offset.is_finite() { angle_k + offset } else { angle_k },
            steer_max: if steer_max.is_finite() && steer_max >= 0.0 { steer_max } else { 0.0 },
            config_version: self.config.version,
            ..Default::default()
        };
        let output = OutputData {
            steer_torque_cmd: 0.0,
            angle_steers_des_deg: self.output.angle_steers_des_deg
        };

        (output, report)
    }

    fn deactivate(&mut self) {
        self.set_mode(LatCtrlMode::Inactive);
        self.trim.reset();
        self.sat_monitor.reset();
    }

    fn set_mode(&mut self, mode: LatCtrlMode) {
        if mode != self.mode {
            info!("LatCtrl mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }
}
