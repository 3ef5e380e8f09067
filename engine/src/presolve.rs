//! Headless pre-solve of a throw.
//!
//! A throw is simulated to rest in a private world off the interactive thread, so the
//! session knows which face each die will naturally land on before anything is shown.
//!
//! Flow
//! - [`Presolver::dispatch`] bumps the generation and hands a job to an [`Executor`].
//! - The job builds its own world via [`throw_world`], runs [`simulate`] and sends a
//!   [`PresolveOutcome`] tagged with its generation back over an `mpsc` channel.
//! - [`Presolver::poll`] drains the channel without blocking. Only the first outcome of
//!   the current generation is kept; everything else is stale and dropped.
//!
//! A job that is dropped or unwinds before replying reports
//! [`PresolveError::Terminated`] through its reply guard, so a lost task never leaves
//! the session waiting silently.

use std::{
    cmp::Ordering,
    sync::mpsc::{self, Receiver, Sender},
    thread,
};

use log::{debug, error};
use rapier3d::prelude::RigidBodyHandle;

use crate::{
    error::PresolveError,
    face::{Face, top_face},
    rapier_world::{BodyVelocity, DiceWorld},
    rest::RestDetector,
    throw_plan::{ThrowPlan, slot_position},
    tray::Tray,
    types::{Pose, Vec3},
};

/// Natural resting face of one die and the slot it was thrown from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceResult {
    pub face: Face,
    pub slot: usize,
}

/// A world set up for a throw: the tray plus one die per plan, launched.
pub struct ThrowWorld {
    pub world: DiceWorld,
    /// Die handles in slot order.
    pub dice: Vec<RigidBodyHandle>,
}

/// Build the world a throw plays out in.
///
/// Each die starts at its slot position in the plan's orientation, spinning at the
/// plan's angular velocity, with the plan's impulse applied at its centre. The visible
/// throw and the pre-solve both start here, so they play out step for step alike.
pub fn throw_world(tray: &Tray, plans: &[ThrowPlan], gravity: Vec3) -> ThrowWorld {
    let mut world = DiceWorld::new(gravity);
    tray.insert_into(&mut world);

    let count = plans.len();
    let dice = plans
        .iter()
        .enumerate()
        .map(|(slot, plan)| {
            let centre = slot_position(count, slot);
            let handle = world.create_die(Pose::new(centre, plan.rotation));
            world.set_velocity(
                handle,
                BodyVelocity {
                    linear: Vec3::zeros(),
                    angular: plan.angular_velocity,
                },
            );
            world.apply_impulse(handle, plan.impulse, centre);
            handle
        })
        .collect();

    ThrowWorld { world, dice }
}

/// Run the throw to rest and read each die's natural face.
///
/// Results are ordered by resting position: `x` ascending, then `y`.
pub fn simulate(tray: &Tray, plans: &[ThrowPlan], gravity: Vec3) -> Vec<FaceResult> {
    let ThrowWorld { mut world, dice } = throw_world(tray, plans, gravity);
    let mut rest = RestDetector::new();

    loop {
        world.step();
        if rest.check(&world, &dice) {
            break;
        }
    }
    debug!("pre-solve settled after {} steps", rest.steps());

    let mut resting: Vec<(usize, Pose)> = dice
        .iter()
        .enumerate()
        .map(|(slot, &h)| (slot, world.pose(h)))
        .collect();
    resting.sort_by(|(_, a), (_, b)| by_position(a, b));

    resting
        .into_iter()
        .map(|(slot, pose)| FaceResult {
            face: top_face(&pose.rotation),
            slot,
        })
        .collect()
}

/// Left-to-right ordering of resting dice: `x` first, then `y`.
pub(crate) fn by_position(a: &Pose, b: &Pose) -> Ordering {
    a.translation
        .x
        .total_cmp(&b.translation.x)
        .then(a.translation.y.total_cmp(&b.translation.y))
}

/// A unit of background work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs pre-solve jobs somewhere other than the interactive loop.
pub trait Executor: Send {
    /// Take ownership of `job`. A job that is dropped unrun reports
    /// [`PresolveError::Terminated`] on its own.
    fn execute(&mut self, job: Job) -> Result<(), PresolveError>;
}

/// One named OS thread per job.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadExecutor;

impl Executor for ThreadExecutor {
    fn execute(&mut self, job: Job) -> Result<(), PresolveError> {
        thread::Builder::new()
            .name("presolve".into())
            .spawn(job)
            .map(|_| ())
            .map_err(|err| {
                error!("failed to spawn pre-solve thread: {err}");
                PresolveError::Spawn
            })
    }
}

/// Runs the job on the calling thread before returning.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&mut self, job: Job) -> Result<(), PresolveError> {
        job();
        Ok(())
    }
}

/// Message from a job back to its [`Presolver`].
#[derive(Clone, Debug, PartialEq)]
pub struct PresolveOutcome {
    pub generation: u64,
    pub result: Result<Vec<FaceResult>, PresolveError>,
}

/// What is known about the current generation.
#[derive(Clone, Debug, PartialEq)]
pub enum PresolveStatus {
    Pending,
    Ready(Vec<FaceResult>),
    Failed(PresolveError),
}

/// Sends the job's outcome exactly once; sends [`PresolveError::Terminated`] if dropped
/// before [`Reply::send`].
struct Reply {
    tx: Sender<PresolveOutcome>,
    generation: u64,
    sent: bool,
}

impl Reply {
    fn send(mut self, results: Vec<FaceResult>) {
        self.sent = true;
        self.deliver(Ok(results));
    }

    fn deliver(&self, result: Result<Vec<FaceResult>, PresolveError>) {
        // The receiver is gone only when the session was dropped; nobody is waiting.
        let _ = self.tx.send(PresolveOutcome {
            generation: self.generation,
            result,
        });
    }
}

impl Drop for Reply {
    fn drop(&mut self) {
        if !self.sent {
            self.deliver(Err(PresolveError::Terminated));
        }
    }
}

/// Owns the background pre-solve of one session.
pub struct Presolver {
    executor: Box<dyn Executor>,
    tx: Sender<PresolveOutcome>,
    rx: Receiver<PresolveOutcome>,
    generation: u64,
    status: PresolveStatus,
    tray: Tray,
    gravity: Vec3,
}

impl Presolver {
    /// `gravity` must match the gravity the visible throw falls under.
    pub fn new(executor: Box<dyn Executor>, tray: Tray, gravity: Vec3) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            executor,
            tx,
            rx,
            generation: 0,
            status: PresolveStatus::Pending,
            tray,
            gravity,
        }
    }

    /// Start a pre-solve for `plans`, superseding any previous one.
    ///
    /// Returns the new generation.
    pub fn dispatch(&mut self, plans: Vec<ThrowPlan>) -> u64 {
        self.generation += 1;
        self.status = PresolveStatus::Pending;

        let generation = self.generation;
        let reply = Reply {
            tx: self.tx.clone(),
            generation,
            sent: false,
        };
        let tray = self.tray.clone();
        let gravity = self.gravity;

        debug!("dispatching pre-solve #{generation} for {} dice", plans.len());
        let job: Job = Box::new(move || {
            let results = simulate(&tray, &plans, gravity);
            reply.send(results);
        });

        if let Err(err) = self.executor.execute(job) {
            error!("pre-solve #{generation} could not start: {err}");
            self.status = PresolveStatus::Failed(err);
        }

        generation
    }

    /// Drain delivered outcomes without blocking. Returns `true` if the status changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;

        while let Ok(outcome) = self.rx.try_recv() {
            if outcome.generation != self.generation {
                debug!(
                    "discarding stale pre-solve #{} (current #{})",
                    outcome.generation, self.generation
                );
                continue;
            }
            if self.status != PresolveStatus::Pending {
                debug!("ignoring repeated outcome for pre-solve #{}", outcome.generation);
                continue;
            }

            self.status = match outcome.result {
                Ok(results) => PresolveStatus::Ready(results),
                Err(err) => {
                    error!("pre-solve #{} failed: {err}", outcome.generation);
                    PresolveStatus::Failed(err)
                }
            };
            changed = true;
        }

        changed
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn status(&self) -> &PresolveStatus {
        &self.status
    }

    pub fn results(&self) -> Option<&[FaceResult]> {
        match &self.status {
            PresolveStatus::Ready(results) => Some(results),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<PresolveError> {
        match self.status {
            PresolveStatus::Failed(err) => Some(err),
            _ => None,
        }
    }

    #[inline]
    pub fn tray(&self) -> &Tray {
        &self.tray
    }

    #[inline]
    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }
}

/// Executors that hold jobs back so tests can run them late, out of order, or never.
#[cfg(test)]
pub(crate) mod testing {
    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
    };

    use super::*;

    /// Queues jobs; the test decides when each one runs.
    #[derive(Clone, Default)]
    pub struct DeferredExecutor {
        queue: Arc<Mutex<VecDeque<Job>>>,
    }

    impl DeferredExecutor {
        pub fn pending(&self) -> usize {
            self.queue.lock().unwrap().len()
        }

        pub fn run_oldest(&self) {
            let job = self.queue.lock().unwrap().pop_front().unwrap();
            job();
        }

        pub fn run_newest(&self) {
            let job = self.queue.lock().unwrap().pop_back().unwrap();
            job();
        }

        pub fn run_all(&self) {
            while self.pending() > 0 {
                self.run_oldest();
            }
        }

        /// Drop the oldest job without running it.
        pub fn drop_oldest(&self) {
            drop(self.queue.lock().unwrap().pop_front().unwrap());
        }
    }

    impl Executor for DeferredExecutor {
        fn execute(&mut self, job: Job) -> Result<(), PresolveError> {
            self.queue.lock().unwrap().push_back(job);
            Ok(())
        }
    }

    /// Refuses every job.
    pub struct FailingExecutor;

    impl Executor for FailingExecutor {
        fn execute(&mut self, _job: Job) -> Result<(), PresolveError> {
            Err(PresolveError::Spawn)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use rand::{SeedableRng, rngs::StdRng};

    use super::{testing::*, *};
    use crate::constants::FALLING_GRAVITY_Y;

    fn falling() -> Vec3 {
        Vec3::new(0.0, FALLING_GRAVITY_Y, 0.0)
    }

    fn plans(count: usize, seed: u64) -> Vec<ThrowPlan> {
        ThrowPlan::generate(count, &mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn simulate_reports_every_slot_in_position_order() {
        let tray = Tray::new();
        let plans = plans(4, 1);
        let results = simulate(&tray, &plans, falling());

        assert_eq!(results.len(), 4);
        let mut slots: Vec<_> = results.iter().map(|r| r.slot).collect();
        slots.sort_unstable();
        assert_eq!(slots, vec![0, 1, 2, 3]);
    }

    #[test]
    fn throw_world_replays_the_presolve() {
        let tray = Tray::new();
        let plans = plans(3, 5);
        let presolved = simulate(&tray, &plans, falling());

        let ThrowWorld { mut world, dice } = throw_world(&tray, &plans, falling());
        let mut rest = RestDetector::new();
        loop {
            world.step();
            if rest.check(&world, &dice) {
                break;
            }
        }
        let mut poses: Vec<_> = dice
            .iter()
            .enumerate()
            .map(|(slot, &h)| (slot, world.pose(h)))
            .collect();
        poses.sort_by(|(_, a), (_, b)| by_position(a, b));

        assert_eq!(presolved.len(), poses.len());
        for (result, (slot, pose)) in presolved.iter().zip(poses) {
            assert_eq!(result.slot, slot);
            assert_eq!(result.face, top_face(&pose.rotation));
        }
    }

    #[test]
    fn ordering_is_x_then_y() {
        let a = Pose::from_translation(Vec3::new(-1.0, 5.0, 0.0));
        let b = Pose::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let c = Pose::from_translation(Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(by_position(&a, &b), Ordering::Less);
        assert_eq!(by_position(&b, &c), Ordering::Less);
        assert_eq!(by_position(&c, &b), Ordering::Greater);
    }

    #[test]
    fn thread_executor_delivers_results() {
        let mut presolver = Presolver::new(Box::new(ThreadExecutor), Tray::new(), falling());
        presolver.dispatch(plans(2, 3));

        let deadline = Instant::now() + Duration::from_secs(120);
        while !presolver.poll() {
            assert!(Instant::now() < deadline, "pre-solve never arrived");
            thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(presolver.results().map(<[FaceResult]>::len), Some(2));
    }

    #[test]
    fn stale_generations_are_discarded() {
        let executor = DeferredExecutor::default();
        let mut presolver = Presolver::new(Box::new(executor.clone()), Tray::new(), falling());

        let first = presolver.dispatch(plans(1, 10));
        let second = presolver.dispatch(plans(2, 11));
        assert_eq!(second, first + 1);
        assert_eq!(executor.pending(), 2);

        // The superseded job finishes late: nothing changes.
        executor.run_oldest();
        assert!(!presolver.poll());
        assert_eq!(presolver.status(), &PresolveStatus::Pending);

        executor.run_newest();
        assert!(presolver.poll());
        assert_eq!(presolver.results().map(<[FaceResult]>::len), Some(2));
    }

    #[test]
    fn dropped_job_reports_terminated() {
        let executor = DeferredExecutor::default();
        let mut presolver = Presolver::new(Box::new(executor.clone()), Tray::new(), falling());

        presolver.dispatch(plans(1, 2));
        executor.drop_oldest();

        assert!(presolver.poll());
        assert_eq!(presolver.failure(), Some(PresolveError::Terminated));
        assert!(presolver.results().is_none());
    }

    #[test]
    fn spawn_failure_is_reported_once() {
        let mut presolver = Presolver::new(Box::new(FailingExecutor), Tray::new(), falling());
        presolver.dispatch(plans(1, 2));

        assert_eq!(presolver.failure(), Some(PresolveError::Spawn));
        // The dropped job's own termination notice is a repeat and is ignored.
        assert!(!presolver.poll());
        assert_eq!(presolver.failure(), Some(PresolveError::Spawn));
    }

    #[test]
    fn inline_executor_is_ready_after_one_poll() {
        let mut presolver = Presolver::new(Box::new(InlineExecutor), Tray::new(), falling());
        let generation = presolver.dispatch(plans(1, 4));

        assert_eq!(generation, 1);
        assert!(presolver.poll());
        assert!(matches!(presolver.status(), PresolveStatus::Ready(r) if r.len() == 1));
    }
}
