//! Median-centred, fixed-width module assignment.
//!
//! Cells are ordered by signed `dist` and cut into contiguous runs of
//! `width`. The first module sits on the median, then modules are added
//! alternately above and below it:
//!
//! ```text
//!   index:  0 ......................................... n
//!           |  3  |  1  |  2  |  4  | ...
//!                    ^ median
//! ```
//!
//! Once one side has no room for another full module, the walk continues on
//! the other side only, until that side is exhausted too. Whatever is left
//! (fewer than `width` cells, always at one end) stays unassigned.

use log::debug;

use crate::data::model::ScoredCell;

/// Module numbers produced by one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    /// Number given to the first module carved.
    pub first_module: u32,
    /// How many modules were carved.
    pub carved: u32,
}

impl Assignment {
    /// The first number free for a later pass.
    pub fn next_module(&self) -> u32 {
        self.first_module + self.carved
    }

    /// Highest module number used, if any module was carved.
    pub fn last_module(&self) -> Option<u32> {
        (self.carved > 0).then(|| self.first_module + self.carved - 1)
    }
}

/// Which end of the index range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Low,
    High,
}

impl Side {
    fn opposite(self) -> Side {
        match self {
            Side::Low => Side::High,
            Side::High => Side::Low,
        }
    }
}

/// Covered index span `[lo, hi)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub lo: isize,
    pub hi: isize,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Sort `cells` by `dist` and stamp modules of exactly `width` cells,
/// numbered from `first_module`.
///
/// Cells not reached keep `module == 0`. A population of `n` cells always
/// yields `n / width` modules.
pub fn assign_modules(cells: &mut [ScoredCell], width: usize, first_module: u32) -> Assignment {
    assert!(width > 0, "module width must be positive");

    sort_by_dist(cells);
    let mut carver = Carver {
        cells,
        width: width as isize,
        next_module: first_module,
    };

    if carver.len() < carver.width {
        debug!("{} cells: too few for one module of {width}", carver.len());
        return carver.assignment(first_module);
    }

    let median = median_index(carver.cells);
    let start = aligned_start(median, carver.cells.len(), width);
    let (span, exhausted) = carver.zigzag(start);
    carver.continue_one_side(span, exhausted.opposite());

    let assignment = carver.assignment(first_module);
    debug!(
        "{} cells, median at {median}, first module at {start}: {} modules from {first_module}",
        carver.cells.len(),
        assignment.carved
    );
    assignment
}

/// Order by signed `dist`, ties by id.
pub fn sort_by_dist(cells: &mut [ScoredCell]) {
    cells.sort_by(|a, b| a.dist.total_cmp(&b.dist).then_with(|| a.id().cmp(&b.id())));
}

/// First position whose `|dist|` is smallest. `cells` must be non-empty.
pub fn median_index(cells: &[ScoredCell]) -> usize {
    cells
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.dist.abs().total_cmp(&b.dist.abs()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Start index of the first module.
///
/// The module centred on `median` leaves `r_lo` cells below it and `r_hi`
/// above it that cannot fill whole modules. The start is shifted toward the
/// smaller remainder (low on a tie), which aligns the module grid to one end
/// of the range, then clamped onto a grid slot inside `[0, n)`.
pub fn aligned_start(median: usize, n: usize, width: usize) -> isize {
    let (n, w, median) = (n as isize, width as isize, median as isize);
    debug_assert!(n >= w);

    let centred = median - w / 2;
    let r_lo = centred.rem_euclid(w);
    let r_hi = (n - (centred + w)).rem_euclid(w);

    let start = if r_lo <= r_hi {
        centred - r_lo
    } else {
        centred + r_hi
    };

    let phase = start.rem_euclid(w);
    let last = phase + ((n - phase) / w - 1) * w;
    start.clamp(phase, last)
}

// ---------------------------------------------------------------------------
// Carver – stamps modules onto the ordered population
// ---------------------------------------------------------------------------

struct Carver<'a> {
    cells: &'a mut [ScoredCell],
    width: isize,
    next_module: u32,
}

impl Carver<'_> {
    fn len(&self) -> isize {
        self.cells.len() as isize
    }

    fn fits(&self, start: isize) -> bool {
        start >= 0 && start + self.width <= self.len()
    }

    fn carve(&mut self, start: isize) {
        debug_assert!(self.fits(start));
        let module = self.next_module;
        let range = start as usize..(start + self.width) as usize;
        for cell in &mut self.cells[range] {
            debug_assert_eq!(cell.module, 0, "cell {} carved twice", cell.id());
            cell.module = module;
        }
        self.next_module += 1;
    }

    fn assignment(&self, first_module: u32) -> Assignment {
        Assignment {
            first_module,
            carved: self.next_module - first_module,
        }
    }

    /// Carve at `start`, then alternate above and below with growing steps
    /// until a candidate falls outside the range. Returns the covered span
    /// and the side that ran out of room.
    fn zigzag(&mut self, start: isize) -> (Span, Side) {
        self.carve(start);
        let mut span = Span {
            lo: start,
            hi: start + self.width,
        };

        let mut center = start;
        let mut step: isize = 1;
        let mut direction: isize = 1;
        loop {
            let candidate = center + step * direction * self.width;
            if !self.fits(candidate) {
                let side = if direction > 0 { Side::High } else { Side::Low };
                return (span, side);
            }
            self.carve(candidate);
            span.lo = span.lo.min(candidate);
            span.hi = span.hi.max(candidate + self.width);
            center = candidate;
            step += 1;
            direction = -direction;
        }
    }

    /// Keep tiling outward from `span` on `side` only.
    fn continue_one_side(&mut self, span: Span, side: Side) -> Span {
        let mut span = span;
        match side {
            Side::High => {
                while self.fits(span.hi) {
                    self.carve(span.hi);
                    span.hi += self.width;
                }
            }
            Side::Low => {
                while self.fits(span.lo - self.width) {
                    span.lo -= self.width;
                    self.carve(span.lo);
                }
            }
        }
        span
    }
}
