//! The roll session: owns the visible dice and sequences a rigged roll.
//!
//! Phases
//! - `Config`: the roster is editable. Resizing it resyncs the dice, draws new throw
//!   plans and dispatches a pre-solve. Dice glide to their slots.
//! - `Loading`: dice glide into their throw orientation and spin in place. Once the
//!   pre-solve is in, the alignment delta eases in under the spin. A full turn with
//!   everything staged and aligned launches the throw.
//! - `Animation`: the throw plays out in a world rebuilt from the same plans the
//!   pre-solve used; rendered orientations carry the alignment delta.
//! - `Final`: dice rested; poses are frozen and the read-out is available.
//!
//! `reset` returns to `Config` from any phase with the roster kept.

use log::{debug, info};
use rand::{SeedableRng, rngs::StdRng};
use rapier3d::{na, prelude::RigidBodyHandle};

use crate::{
    constants::{
        ALIGNMENT_TURN_SNAP, ALIGNMENT_TURN_STEP, DIE_SPACING, DIE_STAGING_Y, FALLING_GRAVITY_Y,
        STAGING_MOVE_SNAP, STAGING_MOVE_STEP, STAGING_ROTATION_XYZW, STAGING_TURN_SNAP,
        STAGING_TURN_STEP,
    },
    error::RollError,
    face::{Face, alignment_delta, top_face},
    framing::{Framing, Viewport},
    motion::{step_orientation_toward, step_position_toward},
    presolve::{
        Executor, FaceResult, PresolveStatus, Presolver, ThreadExecutor, ThrowWorld, by_position,
        throw_world,
    },
    rapier_world::{BodyVelocity, DiceWorld},
    rest::RestDetector,
    roster::TargetRoster,
    spin::LoadingSpin,
    throw_plan::{ThrowPlan, slot_position},
    tray::Tray,
    types::{Pose, Quat, Vec3},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Config,
    Loading,
    Animation,
    Final,
}

/// Runtime knobs for a session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionOptions {
    /// Initial target faces, validated on construction.
    pub roster: Vec<u8>,
    /// Fixed seed for throw plans; `None` seeds from the thread RNG.
    pub seed: Option<u64>,
    /// Gravity while a throw is in flight.
    pub gravity: Vec3,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            roster: TargetRoster::default().values(),
            seed: None,
            gravity: Vec3::new(0.0, FALLING_GRAVITY_Y, 0.0),
        }
    }
}

/// Everything a UI needs to draw its controls, published after every state change.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub roster: Vec<u8>,
    pub phase: Phase,
    pub is_loading: bool,
    pub is_animating: bool,
    pub is_final: bool,
    /// Faces shown once the dice rest, left to right. Empty before `Final`.
    pub faces: Vec<u8>,
    /// Natural faces from the last completed pre-solve.
    pub face_results: Vec<FaceResult>,
    pub presolve_ready: bool,
    /// The pre-solve failed; a roll cannot finish until it is retried or reset.
    pub roll_unavailable: bool,
}

pub type Listener = Box<dyn FnMut(&SessionSnapshot) + Send>;

/// Orientation dice rest in while configuring.
pub fn staging_rotation() -> Quat {
    let [x, y, z, w] = STAGING_ROTATION_XYZW;
    Quat::from_quaternion(na::Quaternion::new(w, x, y, z))
}

/// One visible die: its body plus the pose it is drawn with.
#[derive(Clone, Debug)]
struct DieSlot {
    body: RigidBodyHandle,
    rendered: Pose,
    /// Pose the body glides to; cleared once every die got there.
    staging: Option<Pose>,
    spin: Option<LoadingSpin>,
    /// Eased alignment delta, right-multiplied onto the rendered orientation.
    align: Quat,
    align_target: Option<Quat>,
}

impl DieSlot {
    fn with_visual(body: RigidBodyHandle, pose: Pose) -> Self {
        Self {
            body,
            rendered: pose,
            staging: None,
            spin: None,
            align: Quat::identity(),
            align_target: None,
        }
    }
}

pub struct RollSession {
    phase: Phase,
    roster: TargetRoster,
    world: DiceWorld,
    slots: Vec<DieSlot>,
    plans: Vec<ThrowPlan>,
    presolver: Presolver,
    rest: Option<RestDetector>,
    readout: Vec<Face>,
    rng: StdRng,
    framing: Framing,
    listener: Option<Listener>,
}

impl RollSession {
    /// Build a session that pre-solves on background threads.
    pub fn new(
        options: SessionOptions,
        window_width: f32,
        window_height: f32,
    ) -> Result<Self, RollError> {
        Self::with_executor(
            options,
            window_width,
            window_height,
            Box::new(ThreadExecutor),
        )
    }

    /// Build a session; nothing is created unless every input is usable.
    pub fn with_executor(
        options: SessionOptions,
        window_width: f32,
        window_height: f32,
        executor: Box<dyn Executor>,
    ) -> Result<Self, RollError> {
        let viewport = Viewport::from_window(window_width, window_height)?;
        let roster = TargetRoster::from_values(&options.roster)?;

        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let presolver = Presolver::new(executor, Tray::new(), options.gravity);
        let world = staging_world(presolver.tray());

        let mut session = Self {
            phase: Phase::Config,
            roster,
            world,
            slots: Vec::new(),
            plans: Vec::new(),
            presolver,
            rest: None,
            readout: Vec::new(),
            rng,
            framing: Framing::new(viewport),
            listener: None,
        };
        session.resync();

        info!("roll session ready with {} dice", session.roster.len());
        Ok(session)
    }

    /// Receive a snapshot after every state change.
    pub fn set_listener(&mut self, listener: impl FnMut(&SessionSnapshot) + Send + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Advance one frame. Never blocks.
    pub fn tick(&mut self) {
        let mut changed = self.presolver.poll();

        match self.phase {
            Phase::Config => {
                self.stage();
                self.render_bodies();
            }
            Phase::Loading => changed |= self.tick_loading(),
            Phase::Animation => changed |= self.tick_animation(),
            Phase::Final => {}
        }

        let narrowing = matches!(self.phase, Phase::Loading | Phase::Animation);
        self.framing
            .update(narrowing, self.slots.iter().map(|s| s.rendered.translation));

        if changed {
            self.emit();
        }
    }

    /// Append a die showing one.
    pub fn add_slot(&mut self) -> Result<(), RollError> {
        self.ensure_configuring()?;
        self.roster.push(Face::One)?;
        self.resync();
        self.emit();
        Ok(())
    }

    pub fn remove_slot(&mut self, index: usize) -> Result<(), RollError> {
        self.ensure_configuring()?;
        self.roster.remove(index)?;
        self.resync();
        self.emit();
        Ok(())
    }

    /// Change one target face. Keeps the dice, plans and pre-solve.
    pub fn set_value(&mut self, index: usize, value: u8) -> Result<(), RollError> {
        self.ensure_configuring()?;
        self.roster.set(index, value)?;
        self.emit();
        Ok(())
    }

    /// Replace the whole roster, e.g. with restored preferences. Resyncs only if the
    /// length changed.
    pub fn set_roster(&mut self, values: &[u8]) -> Result<(), RollError> {
        self.ensure_configuring()?;
        let roster = TargetRoster::from_values(values)?;
        let resized = roster.len() != self.roster.len();
        self.roster = roster;
        if resized {
            self.resync();
        }
        self.emit();
        Ok(())
    }

    /// Commit to a throw.
    pub fn start(&mut self) -> Result<(), RollError> {
        if self.phase != Phase::Config {
            return Err(RollError::NotConfiguring(self.phase));
        }

        let count = self.slots.len();
        for (index, (slot, plan)) in self.slots.iter_mut().zip(&self.plans).enumerate() {
            slot.spin = Some(LoadingSpin::new(plan.spin_axis()));
            slot.staging = Some(Pose::new(slot_position(count, index), plan.rotation));
            slot.align = Quat::identity();
            slot.align_target = None;
        }

        self.set_phase(Phase::Loading);
        self.emit();
        Ok(())
    }

    /// Rebuild the world at the current roster size and return to `Config`.
    pub fn reset(&mut self) {
        self.world = staging_world(self.presolver.tray());

        let count = self.roster.len();
        let rotation = staging_rotation();
        self.slots = (0..count)
            .map(|index| {
                let pose = Pose::new(slot_position(count, index), rotation);
                DieSlot::with_visual(self.world.create_die(pose), pose)
            })
            .collect();

        self.rest = None;
        self.readout.clear();
        self.set_phase(Phase::Config);
        self.resync();

        info!("roll reset, {} dice", count);
        self.emit();
    }

    /// Draw new plans and pre-solve them again, e.g. after a failure.
    pub fn retry_presolve(&mut self) -> Result<(), RollError> {
        if !matches!(self.phase, Phase::Config | Phase::Loading) {
            return Err(RollError::NotConfiguring(self.phase));
        }

        self.redraw_plans();
        if self.phase == Phase::Loading {
            let count = self.slots.len();
            for (index, (slot, plan)) in self.slots.iter_mut().zip(&self.plans).enumerate() {
                slot.staging = Some(Pose::new(slot_position(count, index), plan.rotation));
                slot.align_target = None;
            }
        }

        self.emit();
        Ok(())
    }

    /// Adopt a new window size. Touches framing only.
    pub fn sync_sizes(
        &mut self,
        window_width: f32,
        window_height: f32,
    ) -> Result<Viewport, RollError> {
        let viewport = Viewport::from_window(window_width, window_height)?;
        self.framing.resize(viewport);
        Ok(viewport)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            roster: self.roster.values(),
            phase: self.phase,
            is_loading: self.phase == Phase::Loading,
            is_animating: self.phase == Phase::Animation,
            is_final: self.phase == Phase::Final,
            faces: self.readout.iter().map(|f| f.value()).collect(),
            face_results: self.presolver.results().map(<[_]>::to_vec).unwrap_or_default(),
            presolve_ready: self.presolver.results().is_some(),
            roll_unavailable: self.presolver.failure().is_some(),
        }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn roster(&self) -> &TargetRoster {
        &self.roster
    }

    #[inline]
    pub fn die_count(&self) -> usize {
        self.slots.len()
    }

    /// Pose die `index` should be drawn with this frame.
    pub fn rendered_pose(&self, index: usize) -> Option<Pose> {
        self.slots.get(index).map(|s| s.rendered)
    }

    pub fn rendered_poses(&self) -> impl Iterator<Item = Pose> + '_ {
        self.slots.iter().map(|s| s.rendered)
    }

    #[inline]
    pub fn framing(&self) -> &Framing {
        &self.framing
    }

    #[inline]
    pub fn tray(&self) -> &Tray {
        self.presolver.tray()
    }

    #[inline]
    pub fn presolve_status(&self) -> &PresolveStatus {
        self.presolver.status()
    }

    /// Why the current roll cannot complete, if it cannot.
    pub fn roll_unavailable(&self) -> Option<RollError> {
        self.presolver.failure().map(RollError::from)
    }

    /// Faces shown once the dice rested, left to right.
    #[inline]
    pub fn readout(&self) -> &[Face] {
        &self.readout
    }

    fn ensure_configuring(&self) -> Result<(), RollError> {
        match self.phase {
            Phase::Config => Ok(()),
            _ => Err(RollError::Locked),
        }
    }

    /// Match the dice to the roster length, then redraw plans and re-dispatch.
    ///
    /// Surviving slots keep their body; extra dice leave from the right and new ones
    /// enter to the right of the last die.
    fn resync(&mut self) {
        let count = self.roster.len();
        let rotation = staging_rotation();

        while self.slots.len() > count {
            if let Some(slot) = self.slots.pop() {
                self.world.remove(slot.body);
            }
        }

        while self.slots.len() < count {
            let index = self.slots.len();
            let x = self
                .slots
                .last()
                .map(|s| self.world.pose(s.body).translation.x + DIE_SPACING)
                .unwrap_or_else(|| slot_position(count, index).x);
            let pose = Pose::new(Vec3::new(x, DIE_STAGING_Y, 0.0), rotation);
            let body = self.world.create_die(pose);
            self.slots.push(DieSlot::with_visual(body, pose));
        }

        for (index, slot) in self.slots.iter_mut().enumerate() {
            slot.staging = Some(Pose::new(slot_position(count, index), rotation));
        }

        self.redraw_plans();
    }

    fn redraw_plans(&mut self) {
        self.plans = ThrowPlan::generate(self.slots.len(), &mut self.rng);
        self.presolver.dispatch(self.plans.clone());
    }

    /// Glide bodies toward their staging pose. Returns `true` once all are staged.
    fn stage(&mut self) -> bool {
        let mut staged = true;

        for slot in &self.slots {
            let Some(target) = slot.staging else {
                continue;
            };
            let pose = self.world.pose(slot.body);
            let moved = step_position_toward(
                pose.translation,
                target.translation,
                STAGING_MOVE_STEP,
                STAGING_MOVE_SNAP,
            );
            let turned = step_orientation_toward(
                pose.rotation,
                target.rotation,
                STAGING_TURN_STEP,
                STAGING_TURN_SNAP,
            );

            self.world
                .set_pose(slot.body, Pose::new(moved.value, turned.value));
            self.world.set_velocity(slot.body, BodyVelocity::zero());
            staged &= moved.reached && turned.reached;
        }

        if staged {
            for slot in &mut self.slots {
                slot.staging = None;
            }
        }
        staged
    }

    fn render_bodies(&mut self) {
        for slot in &mut self.slots {
            slot.rendered = self.world.pose(slot.body);
        }
    }

    fn tick_loading(&mut self) -> bool {
        if let Some(results) = self.presolver.results()
            && self.slots.iter().any(|s| s.align_target.is_none())
            && let Some(targets) = alignment_targets(results, &self.roster)
        {
            for (slot, target) in self.slots.iter_mut().zip(targets) {
                slot.align_target = Some(target);
            }
            debug!("alignment ready for pre-solve #{}", self.presolver.generation());
        }

        let staged = self.stage();

        let mut full_turn = false;
        let mut aligned = true;
        for slot in &mut self.slots {
            if let Some(spin) = slot.spin.as_mut() {
                full_turn |= spin.advance();
            }

            match slot.align_target {
                Some(target) => {
                    let eased = step_orientation_toward(
                        slot.align,
                        target,
                        ALIGNMENT_TURN_STEP,
                        ALIGNMENT_TURN_SNAP,
                    );
                    slot.align = eased.value;
                    aligned &= eased.reached;
                }
                None => aligned = false,
            }

            let body = self.world.pose(slot.body);
            let spin = slot.spin.map_or_else(Quat::identity, |s| s.rotation());
            slot.rendered = Pose::new(body.translation, spin * body.rotation * slot.align);
        }

        if full_turn && staged && aligned {
            self.throw();
            return true;
        }
        false
    }

    /// Swap in a world launched from the plans the pre-solve played.
    fn throw(&mut self) {
        let ThrowWorld { world, dice } =
            throw_world(self.presolver.tray(), &self.plans, self.presolver.gravity());
        self.world = world;

        for (slot, body) in self.slots.iter_mut().zip(dice) {
            slot.body = body;
            slot.staging = None;
            slot.spin = None;
            if let Some(target) = slot.align_target {
                slot.align = target;
            }
            let pose = self.world.pose(body);
            slot.rendered = Pose::new(pose.translation, pose.rotation * slot.align);
        }

        self.rest = Some(RestDetector::new());
        self.set_phase(Phase::Animation);
    }

    fn tick_animation(&mut self) -> bool {
        self.world.step();

        for slot in &mut self.slots {
            let pose = self.world.pose(slot.body);
            slot.rendered = Pose::new(pose.translation, pose.rotation * slot.align);
        }

        let bodies: Vec<_> = self.slots.iter().map(|s| s.body).collect();
        let settled = self
            .rest
            .get_or_insert_with(RestDetector::new)
            .check(&self.world, &bodies);

        if settled {
            self.finish();
            return true;
        }
        false
    }

    fn finish(&mut self) {
        let mut resting: Vec<&DieSlot> = self.slots.iter().collect();
        resting.sort_by(|a, b| by_position(&a.rendered, &b.rendered));
        self.readout = resting
            .iter()
            .map(|s| top_face(&s.rendered.rotation))
            .collect();

        self.rest = None;
        self.set_phase(Phase::Final);
        info!(
            "roll finished: {:?}",
            self.readout.iter().map(|f| f.value()).collect::<Vec<_>>()
        );
    }

    fn set_phase(&mut self, phase: Phase) {
        info!("phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn emit(&mut self) {
        let snapshot = self.snapshot();
        if let Some(listener) = self.listener.as_mut() {
            listener(&snapshot);
        }
    }
}

/// An empty staging world: the tray without gravity.
fn staging_world(tray: &Tray) -> DiceWorld {
    let mut world = DiceWorld::new(Vec3::zeros());
    tray.insert_into(&mut world);
    world
}

/// Alignment delta per slot.
///
/// Results are in resting order, so rank `r` must show roster face `r`; the delta lands
/// on the slot the die was thrown from.
fn alignment_targets(results: &[FaceResult], roster: &TargetRoster) -> Option<Vec<Quat>> {
    if results.len() != roster.len() {
        return None;
    }

    let mut targets = vec![Quat::identity(); roster.len()];
    for (result, &target) in results.iter().zip(roster.faces()) {
        *targets.get_mut(result.slot)? = alignment_delta(result.face, target);
    }
    Some(targets)
}
