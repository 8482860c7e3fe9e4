use crate::foundation::core::Rect;
use crate::foundation::error::{SketchreelError, SketchreelResult};
use crate::foundation::math::lerp_exact;
use crate::render::surface::Surface;
use crate::reveal::grid::{BlockId, GridModel};
use crate::reveal::plan::{Direction, RevealPlan};
use crate::session::stage::Stage;

/// One sub-step of a sweep: the revealed source window and its destination window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepStep {
    pub src: Rect,
    pub dst: Rect,
    /// Revealed fraction of the block, exactly `1.0` on the last step.
    pub ratio: f64,
}

/// Sub-steps revealing one block along a direction.
///
/// There is one step per source row (vertical) or column (horizontal), at least one.
#[derive(Clone, Debug)]
pub struct Sweep {
    src: Rect,
    dst: Rect,
    direction: Direction,
    extent: f64,
    steps: u32,
    next: u32,
}

impl Sweep {
    pub fn new(src: Rect, dst: Rect, direction: Direction) -> Self {
        let extent = if direction.is_vertical() {
            src.height()
        } else {
            src.width()
        };
        let steps = if extent.is_finite() && extent > 0.0 {
            (extent.ceil() as u32).max(1)
        } else {
            1
        };
        Self {
            src,
            dst,
            direction,
            extent,
            steps,
            next: 1,
        }
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    fn step(&self, i: u32) -> SweepStep {
        let ratio = if i >= self.steps || !(self.extent > 0.0) {
            1.0
        } else {
            (f64::from(i).min(self.extent) / self.extent).min(1.0)
        };
        let (s, d) = (self.src, self.dst);
        let (src, dst) = match self.direction {
            Direction::TopToBottom => (
                Rect::new(s.x0, s.y0, s.x1, lerp_exact(s.y0, s.y1, ratio)),
                Rect::new(d.x0, d.y0, d.x1, lerp_exact(d.y0, d.y1, ratio)),
            ),
            Direction::BottomToTop => (
                Rect::new(s.x0, lerp_exact(s.y1, s.y0, ratio), s.x1, s.y1),
                Rect::new(d.x0, lerp_exact(d.y1, d.y0, ratio), d.x1, d.y1),
            ),
            Direction::LeftToRight => (
                Rect::new(s.x0, s.y0, lerp_exact(s.x0, s.x1, ratio), s.y1),
                Rect::new(d.x0, d.y0, lerp_exact(d.x0, d.x1, ratio), d.y1),
            ),
            Direction::RightToLeft => (
                Rect::new(lerp_exact(s.x1, s.x0, ratio), s.y0, s.x1, s.y1),
                Rect::new(lerp_exact(d.x1, d.x0, ratio), d.y0, d.x1, d.y1),
            ),
        };
        SweepStep { src, dst, ratio }
    }
}

impl Iterator for Sweep {
    type Item = SweepStep;

    fn next(&mut self) -> Option<SweepStep> {
        if self.next > self.steps {
            return None;
        }
        let step = self.step(self.next);
        self.next += 1;
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.steps + 1).saturating_sub(self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Sweep {}

/// Paints a grid image block by block, sweeping each block along one direction.
#[derive(Debug)]
pub struct BlockRevealRenderer<'a> {
    grid: &'a GridModel,
    image: &'a Surface,
    direction: Direction,
}

impl<'a> BlockRevealRenderer<'a> {
    /// `image` must be the decoded (and background-flattened) source the grid was built for.
    pub fn new(
        grid: &'a GridModel,
        image: &'a Surface,
        direction: Direction,
    ) -> SketchreelResult<Self> {
        if grid.image_size() != (image.width(), image.height()) {
            return Err(SketchreelError::invalid_input(format!(
                "grid was built for a {}x{} image, got {}x{}",
                grid.image_size().0,
                grid.image_size().1,
                image.width(),
                image.height()
            )));
        }
        Ok(Self {
            grid,
            image,
            direction,
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn sweep(&self, id: BlockId) -> Sweep {
        Sweep::new(self.grid.src_rect(id), self.grid.dst_rect(id), self.direction)
    }

    /// Paint one sweep window of `id`. Image pixels replace what is under them, so repainting a
    /// window is a no-op.
    pub fn paint_step(&self, surface: &mut Surface, id: BlockId, step: &SweepStep) {
        surface.copy_image_clipped(
            self.image,
            self.grid.src_rect(id),
            self.grid.dst_rect(id),
            step.dst,
        );
    }

    /// Paint the whole of `id` at once.
    pub fn paint_block(&self, surface: &mut Surface, id: BlockId) {
        let dst = self.grid.dst_rect(id);
        surface.copy_image_clipped(self.image, self.grid.src_rect(id), dst, dst);
    }

    /// Paint every block without animating.
    pub fn paint_all(&self, surface: &mut Surface) {
        for id in self.grid.blocks() {
            self.paint_block(surface, id);
        }
    }

    /// Sweep every block of `plan` in order, presenting one frame per sub-step, then repaint the
    /// full image once.
    #[tracing::instrument(skip_all, fields(blocks = plan.len(), direction = %self.direction))]
    pub fn run(&self, plan: &RevealPlan<BlockId>, stage: &mut Stage<'_>) -> SketchreelResult<()> {
        let total = plan.len();
        if total == 0 {
            return Ok(());
        }

        for (k, &id) in plan.iter().enumerate() {
            if !self.grid.contains(id) {
                return Err(SketchreelError::invalid_input(format!(
                    "block {id} is outside the {}x{} grid",
                    self.grid.rows(),
                    self.grid.cols()
                )));
            }
            let sweep = self.sweep(id);
            tracing::trace!(block = %id, steps = sweep.steps(), "sweeping block");
            for step in sweep {
                self.paint_step(stage.surface_mut(), id, &step);
                stage.present_step()?;
                stage.report(100.0 * (k as f64 + step.ratio) / total as f64);
            }
        }

        self.paint_all(stage.surface_mut());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/block.rs"]
mod tests;
