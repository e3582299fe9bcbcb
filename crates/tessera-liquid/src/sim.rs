use std::sync::Arc;
use std::time::{Duration, Instant};

use tessera_blocks::{AIR, BlockId, BlockRegistry};
use tessera_chunk::BlockPos;

use crate::{LiquidConfig, LiquidWorld, MAX_LEVEL, Worklist, mass_from_meta, meta_from_mass};

const HORIZONTAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LiquidTickReport {
    pub processed: usize,
    /// Cells carried over because the time budget ran out.
    pub deferred: usize,
    /// Total mass handed between cells this tick.
    pub moved_mass: u64,
}

#[derive(Clone, Debug)]
pub struct LiquidSimulator {
    reg: Arc<BlockRegistry>,
    pub config: LiquidConfig,
    active: Worklist,
}

impl LiquidSimulator {
    pub fn new(reg: Arc<BlockRegistry>, config: LiquidConfig) -> Self {
        Self { reg, config, active: Worklist::new() }
    }

    #[inline]
    pub fn wake(&mut self, p: BlockPos) {
        self.active.push(p);
    }

    /// Wakes `p` and its six face neighbors; used after an outside edit near liquid.
    pub fn wake_around(&mut self, p: BlockPos) {
        self.active.push(p);
        for n in p.face_neighbors() {
            self.active.push(n);
        }
    }

    #[inline]
    pub fn active(&self) -> &Worklist {
        &self.active
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    /// Drops queued cells that fall in chunks the caller no longer holds.
    pub fn forget_where(&mut self, gone: impl Fn(&BlockPos) -> bool) {
        self.active.retain(|p| !gone(p));
    }

    /// One tick using the configured time budget.
    pub fn update(&mut self, world: &mut impl LiquidWorld) -> LiquidTickReport {
        let budget = Duration::from_millis(self.config.time_budget_ms);
        self.update_with_budget(world, budget)
    }

    /// Processes the cells queued at the start of the call. At least one cell is
    /// always processed; once `budget` elapses the rest move, in order, to the
    /// front of the next tick's worklist.
    pub fn update_with_budget(&mut self, world: &mut impl LiquidWorld, budget: Duration) -> LiquidTickReport {
        let mut report = LiquidTickReport::default();
        let mut batch = std::mem::take(&mut self.active);
        let start = Instant::now();
        while let Some(p) = batch.pop() {
            report.moved_mass += self.step(world, p);
            report.processed += 1;
            if !batch.is_empty() && start.elapsed() >= budget {
                break;
            }
        }
        report.deferred = batch.len();
        if report.deferred > 0 {
            log::debug!(target: "liquid", "tick budget hit: processed={} deferred={}", report.processed, report.deferred);
        }
        let fresh = std::mem::take(&mut self.active);
        batch.append(fresh);
        self.active = batch;
        report
    }

    fn step(&mut self, world: &mut impl LiquidWorld, p: BlockPos) -> u64 {
        let Some(id) = world.block_at(p.x, p.y, p.z) else { return 0 };
        if !self.reg.is_liquid(id) {
            return 0;
        }
        let mut mass = mass_from_meta(world.metadata_at(p.x, p.y, p.z).unwrap_or(0)) as u32;
        if mass == MAX_LEVEL as u32 && world.block_at(p.x, p.y + 1, p.z) == Some(id) {
            return 0;
        }
        let cfg = &self.config;
        let (fall, spread, threshold) = (cfg.max_fall_speed as u32, cfg.max_spread_speed as u32, cfg.stability_threshold as u32);
        let mut moved = 0u64;
        let mut woke = false;

        let below = p.offset(0, -1, 0);
        let into_below = match world.block_at(below.x, below.y, below.z) {
            Some(AIR) => Some(0),
            Some(b) if b == id => Some(mass_from_meta(world.metadata_at(below.x, below.y, below.z).unwrap_or(0)) as u32),
            _ => None,
        };
        if let Some(below_mass) = into_below {
            let t = mass.min(MAX_LEVEL as u32 - below_mass).min(fall);
            if t > 0 {
                write_mass(world, below, id, below_mass + t);
                mass -= t;
                moved += t as u64;
                self.active.push(below);
                woke |= t > threshold;
            }
        }

        if mass > 0 {
            let mut targets: [(BlockPos, u32); 4] = [(p, 0); 4];
            let mut n = 0;
            for (dx, dz) in HORIZONTAL {
                let q = p.offset(dx, 0, dz);
                let qm = match world.block_at(q.x, q.y, q.z) {
                    Some(AIR) => 0,
                    Some(b) if b == id => mass_from_meta(world.metadata_at(q.x, q.y, q.z).unwrap_or(0)) as u32,
                    _ => continue,
                };
                if qm <= mass {
                    targets[n] = (q, qm);
                    n += 1;
                }
            }
            let total: u32 = mass + targets[..n].iter().map(|&(_, m)| m).sum::<u32>();
            let level = total / (n as u32 + 1);
            if n > 0 && mass - level >= threshold.max(1) {
                for &(q, qm) in &targets[..n] {
                    if qm >= level { continue; }
                    let give = (level - qm).min(spread).min(mass);
                    if give == 0 { continue; }
                    write_mass(world, q, id, qm + give);
                    mass -= give;
                    moved += give as u64;
                    self.active.push(q);
                    woke |= give > threshold;
                }
            }
        }

        if woke {
            for (dx, dz) in HORIZONTAL {
                self.active.push(p.offset(dx, 0, dz));
            }
            self.active.push(p.offset(0, 1, 0));
        }

        if moved > 0 {
            write_mass(world, p, id, mass);
            if mass > 0 {
                self.active.push(p);
            } else {
                // the emptied cell may have held up liquid above it
                self.active.push(p.offset(0, 1, 0));
            }
        }
        moved
    }
}

/// Writes `mass` (0 clears the cell to air).
fn write_mass(world: &mut impl LiquidWorld, p: BlockPos, id: BlockId, mass: u32) {
    debug_assert!(mass <= MAX_LEVEL as u32, "liquid mass {mass} out of range");
    let mass = if mass > MAX_LEVEL as u32 {
        log::warn!(target: "liquid", "clamping mass {} at ({},{},{})", mass, p.x, p.y, p.z);
        MAX_LEVEL
    } else {
        mass as u8
    };
    if mass == 0 {
        world.set_liquid_cell(p.x, p.y, p.z, AIR, 0);
    } else {
        world.set_liquid_cell(p.x, p.y, p.z, id, meta_from_mass(mass));
    }
}
