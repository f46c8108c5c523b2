//! Occupation grid and the packer that grows a cluster of adjacent buildings in it.
//!
//! Committed records live in an arena; grid cells hold the arena index of the record that
//! reserved them. Packing starts from a single seed record. Every accepted record schedules
//! ten propagation attempts, each proposing a neighbor that hugs one of its edges, and
//! heights shrink each generation until candidates drop below one unit and are abandoned.
//!
//! Propagation runs off an explicit stack of `(source, remaining)` entries. A newly
//! accepted record's attempts are pushed on top, so they all run before its parent's
//! remaining attempts: the depth-first order of a recursive formulation, without the
//! call depth.

use rand::prelude::*;

use crate::error::PlacementError;

/// Attempts scheduled for every accepted record.
pub const PROPAGATIONS_PER_RECORD: u32 = 10;
/// Minimum span along either axis.
pub const MIN_SPAN: i32 = 2;

/// Index of a committed record in the grid's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub usize);

/// One rectangular building reservation. Upper bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupationRecord {
    pub x: i32,
    pub xend: i32,
    pub z: i32,
    pub zend: i32,
    /// Base height
    pub h1: f32,
    /// Top height
    pub h2: f32,
}

impl OccupationRecord {
    pub fn new(x: i32, xend: i32, z: i32, zend: i32, h1: f32, h2: f32) -> Self {
        Self { x, xend, z, zend, h1, h2 }
    }

    pub fn width(&self) -> i32 {
        self.xend - self.x
    }

    pub fn depth(&self) -> i32 {
        self.zend - self.z
    }

    /// Same record with each axis ordered low to high.
    pub fn normalized(&self) -> Self {
        Self {
            x: self.x.min(self.xend),
            xend: self.x.max(self.xend),
            z: self.z.min(self.zend),
            zend: self.z.max(self.zend),
            ..*self
        }
    }

    /// Zero width or zero depth.
    pub fn is_degenerate(&self) -> bool {
        self.x == self.xend || self.z == self.zend
    }

    /// Whether two (normalized) spans share at least one cell.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x < other.xend && other.x < self.xend && self.z < other.zend && other.z < self.zend
    }

    fn cells(&self) -> impl Iterator<Item = (i32, i32)> {
        let (z, zend) = (self.z, self.zend);
        (self.x..self.xend).flat_map(move |x| (z..zend).map(move |z| (x, z)))
    }
}

/// Fixed-size reservation grid. Every cell points at no record or at exactly one.
#[derive(Debug, Clone)]
pub struct OccupationGrid {
    width: usize,
    depth: usize,
    cells: Vec<Option<RecordId>>,
    records: Vec<OccupationRecord>,
}

impl OccupationGrid {
    pub fn new(width: usize, depth: usize) -> Self {
        Self {
            width,
            depth,
            cells: vec![None; width * depth],
            records: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    fn index(&self, x: usize, z: usize) -> usize {
        x * self.depth + z
    }

    pub fn in_bounds(&self, x: i32, z: i32) -> bool {
        x >= 0 && z >= 0 && (x as usize) < self.width && (z as usize) < self.depth
    }

    /// Record reserving cell `(x, z)`. `None` when free or out of bounds.
    pub fn get(&self, x: i32, z: i32) -> Option<RecordId> {
        if !self.in_bounds(x, z) {
            return None;
        }
        self.cells[self.index(x as usize, z as usize)]
    }

    pub fn is_free(&self, x: i32, z: i32) -> bool {
        self.in_bounds(x, z) && self.get(x, z).is_none()
    }

    pub fn record(&self, id: RecordId) -> &OccupationRecord {
        &self.records[id.0]
    }

    pub fn records(&self) -> impl Iterator<Item = (RecordId, &OccupationRecord)> {
        self.records.iter().enumerate().map(|(i, r)| (RecordId(i), r))
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Run the placement checks in order: bounds, overlap, minimum size.
    pub fn check(&self, record: &OccupationRecord) -> Result<(), PlacementError> {
        let r = record.normalized();

        if r.x < 0 || r.z < 0 || r.xend > self.width as i32 || r.zend > self.depth as i32 {
            return Err(PlacementError::OutOfBounds {
                x: r.x,
                xend: r.xend,
                z: r.z,
                zend: r.zend,
                width: self.width,
                depth: self.depth,
            });
        }

        if let Some((x, z)) = r.cells().find(|&(x, z)| self.get(x, z).is_some()) {
            return Err(PlacementError::Overlap { x, z });
        }

        if r.width() < MIN_SPAN || r.depth() < MIN_SPAN {
            return Err(PlacementError::TooSmall {
                width: r.width(),
                depth: r.depth(),
            });
        }

        Ok(())
    }

    /// Check and, on success, commit the record and write it into every cell of its span.
    pub fn reserve(&mut self, record: OccupationRecord) -> Result<RecordId, PlacementError> {
        self.check(&record)?;
        let record = record.normalized();
        let id = RecordId(self.records.len());
        self.records.push(record);
        for (x, z) in record.cells() {
            let i = self.index(x as usize, z as usize);
            self.cells[i] = Some(id);
        }
        Ok(id)
    }
}

/// Packing tunables.
#[derive(Debug, Clone)]
pub struct PackConfig {
    pub width: usize,
    pub depth: usize,
    /// Cells a candidate extends outward from its source's edge.
    pub propagation_depth: std::ops::Range<i32>,
    /// Divisor applied to the source's top height.
    pub height_falloff: std::ops::Range<f32>,
    /// Candidates lower than this are abandoned before placement.
    pub min_height: f32,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            width: 25,
            depth: 25,
            propagation_depth: 3..10,
            height_falloff: 1.5..3.0,
            min_height: 1.0,
        }
    }
}

/// Counters for one packing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackStats {
    pub accepted: u32,
    pub out_of_bounds: u32,
    pub overlap: u32,
    pub too_small: u32,
    /// Propagations dropped because the candidate fell below the height floor.
    pub abandoned: u32,
    pub propagations: u32,
}

impl PackStats {
    pub fn rejected(&self) -> u32 {
        self.out_of_bounds + self.overlap + self.too_small
    }
}

/// Edge of the source record a candidate grows from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    /// Toward -z
    Up,
    /// Toward +z
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    source: RecordId,
    remaining: u32,
}

/// Grows a building cluster inside an [`OccupationGrid`].
pub struct Packer {
    grid: OccupationGrid,
    config: PackConfig,
    pending: Vec<Pending>,
    stats: PackStats,
}

impl Packer {
    pub fn new(config: PackConfig) -> Self {
        Self {
            grid: OccupationGrid::new(config.width, config.depth),
            config,
            pending: Vec::new(),
            stats: PackStats::default(),
        }
    }

    pub fn grid(&self) -> &OccupationGrid {
        &self.grid
    }

    pub fn stats(&self) -> PackStats {
        self.stats
    }

    /// Propagation attempts scheduled but not yet run.
    pub fn pending_propagations(&self) -> u32 {
        self.pending.iter().map(|p| p.remaining).sum()
    }

    pub fn into_grid(self) -> OccupationGrid {
        self.grid
    }

    /// Reserve `record` if it fits. On success schedules its propagation attempts.
    pub fn try_place(&mut self, record: OccupationRecord) -> bool {
        match self.grid.reserve(record) {
            Ok(id) => {
                self.stats.accepted += 1;
                self.pending.push(Pending {
                    source: id,
                    remaining: PROPAGATIONS_PER_RECORD,
                });
                log::debug!(
                    "Reserved {:?} [{}, {}) x [{}, {}) h={:.2}",
                    id,
                    record.x,
                    record.xend,
                    record.z,
                    record.zend,
                    record.h2
                );
                true
            }
            Err(e) => {
                match e {
                    PlacementError::OutOfBounds { .. } => self.stats.out_of_bounds += 1,
                    PlacementError::Overlap { .. } => self.stats.overlap += 1,
                    PlacementError::TooSmall { .. } => self.stats.too_small += 1,
                }
                log::trace!("Rejected candidate: {}", e);
                false
            }
        }
    }

    /// Propose one neighbor of `source` and try to place it.
    ///
    /// Returns `None` when the candidate was abandoned for being too low, otherwise the
    /// placement outcome.
    pub fn propagate<R: Rng + ?Sized>(&mut self, source: RecordId, rng: &mut R) -> Option<bool> {
        self.stats.propagations += 1;
        let src = *self.grid.record(source);

        let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        let h2 = src.h2 / rng.gen_range(self.config.height_falloff.clone());
        if h2 < self.config.min_height {
            self.stats.abandoned += 1;
            return None;
        }

        let reach = rng.gen_range(self.config.propagation_depth.clone());
        let candidate = match direction {
            Direction::Left => {
                let (z, zend) = shrink_lateral(src.z, src.zend, rng);
                OccupationRecord::new(src.x - reach, src.x, z, zend, 0.0, h2)
            }
            Direction::Right => {
                let (z, zend) = shrink_lateral(src.z, src.zend, rng);
                OccupationRecord::new(src.xend, src.xend + reach, z, zend, 0.0, h2)
            }
            Direction::Up => {
                let (x, xend) = shrink_lateral(src.x, src.xend, rng);
                OccupationRecord::new(x, xend, src.z - reach, src.z, 0.0, h2)
            }
            Direction::Down => {
                let (x, xend) = shrink_lateral(src.x, src.xend, rng);
                OccupationRecord::new(x, xend, src.zend, src.zend + reach, 0.0, h2)
            }
        };

        if candidate.is_degenerate() {
            log::trace!("Degenerate {:?} candidate off {:?}: {:?}", direction, source, candidate);
        }
        Some(self.try_place(candidate))
    }

    /// Drain all scheduled propagation attempts, including ones scheduled along the way.
    pub fn run_propagation<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        while let Some(top) = self.pending.last_mut() {
            if top.remaining == 0 {
                self.pending.pop();
                continue;
            }
            top.remaining -= 1;
            let source = top.source;
            self.propagate(source, rng);
        }
    }

    /// Seed record spanning from the grid's first half into its second half on both axes.
    pub fn seed_record<R: Rng + ?Sized>(&self, rng: &mut R) -> OccupationRecord {
        let half_w = (self.config.width / 2) as i32;
        let half_d = (self.config.depth / 2) as i32;
        let x = rng.gen_range(1..half_w.max(2));
        let xend = rng.gen_range(half_w..(self.config.width as i32).max(half_w + 1));
        let z = rng.gen_range(1..half_d.max(2));
        let zend = rng.gen_range(half_d..(self.config.depth as i32).max(half_d + 1));
        let h2 = (((xend - x).abs() + (zend - z).abs()) as f32).sqrt();
        OccupationRecord::new(x, xend, z, zend, 0.0, h2)
    }

    /// Seed once and grow the cluster until propagation dies out.
    pub fn pack<R: Rng + ?Sized>(config: PackConfig, rng: &mut R) -> (OccupationGrid, PackStats) {
        let mut packer = Self::new(config);
        let seed = packer.seed_record(rng);
        if !packer.try_place(seed) {
            log::debug!("Seed record {:?} did not fit", seed);
        }
        packer.run_propagation(rng);

        let stats = packer.stats;
        log::info!(
            "Packed {} buildings ({} rejected, {} abandoned, {} propagations)",
            stats.accepted,
            stats.rejected(),
            stats.abandoned,
            stats.propagations
        );
        (packer.into_grid(), stats)
    }
}

/// Keep one end of `[lo, hi)` and pull the other in by 2..=span cells.
fn shrink_lateral<R: Rng + ?Sized>(lo: i32, hi: i32, rng: &mut R) -> (i32, i32) {
    let span = (hi - lo).max(MIN_SPAN);
    let keep_near = rng.gen_bool(0.5);
    let shrink = rng.gen_range(MIN_SPAN..=span);
    if keep_near {
        (lo, hi - shrink)
    } else {
        (lo + shrink, hi)
    }
}
