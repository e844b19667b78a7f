//! Scripted drag stories replayed through [`DragTracker`] and drop zones.
//!
//! The board owns the key lists, the way a host application would, and
//! applies each reported [`GridChange`] to them before handing the new order
//! back to the zones.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use regrid::{
    Bounds, DragSignal, DragTracker, DropZoneConfig, GridChange, GridDropZone, GridProvider,
    ItemLayout, Point, PointerEvent, SignalResponse, Spring, apply_change, presets,
};
use serde::Serialize;

use crate::error::{DemoError, Result};

const FRAME: Duration = Duration::from_millis(16);
const MAX_SETTLE_FRAMES: usize = 240;

/// One grid placed on the page.
#[derive(Debug, Clone)]
pub struct GridPlacement {
    pub id: &'static str,
    pub bounds: Bounds,
    pub boxes_per_row: usize,
    pub row_height: f64,
    pub motion: Spring,
    pub keys: Vec<String>,
}

/// How a scripted drag ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    Release,
    Cancel,
}

/// Pointer path for one item, in displacement from pointer-down.
#[derive(Debug, Clone)]
pub struct Step {
    pub label: &'static str,
    pub grid: &'static str,
    pub index: usize,
    pub path: Vec<Point>,
    pub ending: Ending,
}

#[derive(Debug, Clone)]
pub struct Script {
    pub grids: Vec<GridPlacement>,
    pub steps: Vec<Step>,
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

/// Straight-line pointer path from the origin to `to`.
fn path_to(to: Point, samples: u32) -> Vec<Point> {
    (1..=samples)
        .map(|i| {
            let t = f64::from(i) / f64::from(samples);
            Point::new(to.x * t, to.y * t)
        })
        .collect()
}

impl Script {
    /// Reorders within a single grid.
    #[must_use]
    pub fn single() -> Self {
        Self {
            grids: vec![GridPlacement {
                id: "tiles",
                bounds: Bounds::new(0.0, 0.0, 400.0, 210.0),
                boxes_per_row: 4,
                row_height: 70.0,
                motion: presets::gentle(),
                keys: keys(&["a", "b", "c", "d", "e", "f", "g"]),
            }],
            steps: vec![
                Step {
                    label: "move the first tile to the end of the row",
                    grid: "tiles",
                    index: 0,
                    path: path_to(Point::new(300.0, 0.0), 6),
                    ending: Ending::Release,
                },
                Step {
                    label: "pull a tile up a row",
                    grid: "tiles",
                    index: 5,
                    path: path_to(Point::new(110.0, -65.0), 5),
                    ending: Ending::Release,
                },
                Step {
                    label: "lose the pointer over another slot",
                    grid: "tiles",
                    index: 2,
                    path: path_to(Point::new(-120.0, 40.0), 4),
                    ending: Ending::Cancel,
                },
            ],
        }
    }

    /// Two side-by-side grids trading tiles.
    #[must_use]
    pub fn between() -> Self {
        let grid = |id, left, names: &[&str]| GridPlacement {
            id,
            bounds: Bounds::new(left, 0.0, 400.0, 300.0),
            boxes_per_row: 4,
            row_height: 100.0,
            motion: presets::stiff(),
            keys: keys(names),
        };
        Self {
            grids: vec![
                grid("left", 0.0, &["a", "b", "c", "d", "e", "f"]),
                grid("right", 500.0, &["x", "y", "z"]),
            ],
            steps: vec![
                Step {
                    label: "reorder inside the left grid",
                    grid: "left",
                    index: 0,
                    path: path_to(Point::new(200.0, 0.0), 5),
                    ending: Ending::Release,
                },
                Step {
                    label: "carry a tile into the right grid",
                    grid: "left",
                    index: 5,
                    path: path_to(Point::new(420.0, 0.0), 8),
                    ending: Ending::Release,
                },
                Step {
                    label: "visit the left grid, then come home",
                    grid: "right",
                    index: 0,
                    path: {
                        let mut path = path_to(Point::new(-450.0, 0.0), 6);
                        path.extend(path_to(Point::new(-450.0, 0.0), 6).into_iter().rev());
                        path.push(Point::new(2.0, 0.0));
                        path
                    },
                    ending: Ending::Release,
                },
                Step {
                    label: "carry a tile back past the last slot",
                    grid: "right",
                    index: 1,
                    path: path_to(Point::new(-300.0, 150.0), 8),
                    ending: Ending::Release,
                },
                Step {
                    label: "lose the pointer over the right grid",
                    grid: "left",
                    index: 1,
                    path: path_to(Point::new(510.0, 0.0), 4),
                    ending: Ending::Cancel,
                },
            ],
        }
    }
}

/// Snapshot of one grid after a step.
#[derive(Debug, Clone, Serialize)]
pub struct GridReport {
    pub id: String,
    pub keys: Vec<String>,
    pub layout: Vec<ItemLayout<String>>,
}

/// Outcome of one scripted drag.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub label: String,
    pub cancelled: bool,
    pub change: GridChange,
    pub settled_after_frames: usize,
    pub grids: Vec<GridReport>,
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ending = if self.cancelled { " (cancelled)" } else { "" };
        writeln!(f, "== {}{ending}", self.label)?;
        let change = &self.change;
        match &change.target_id {
            _ if change.is_noop() => writeln!(f, "   no change")?,
            Some(target) => writeln!(
                f,
                "   {}[{}] -> {}[{}]",
                change.source_id, change.source_index, target, change.target_index
            )?,
            None => writeln!(
                f,
                "   {}[{}] -> [{}]",
                change.source_id, change.source_index, change.target_index
            )?,
        }
        for grid in &self.grids {
            writeln!(f, "   {:<6} {}", grid.id, grid.keys.join(" "))?;
        }
        write!(f, "   settled in {} frames", self.settled_after_frames)
    }
}

struct Slot {
    keys: Vec<String>,
    zone: GridDropZone<String>,
}

/// Grids sharing one provider plus the key lists they display.
pub struct Board {
    slots: Vec<Slot>,
    changes: Rc<RefCell<Vec<GridChange>>>,
}

impl Board {
    pub fn new(script: &Script) -> Result<Self> {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        let provider = GridProvider::default().with_on_change(move |change| {
            tracing::info!(
                message = "demo.change",
                source = %change.source_id,
                source_index = change.source_index,
                target_index = change.target_index,
                cross_grid = change.is_cross_grid()
            );
            sink.borrow_mut().push(change.clone());
        });

        let mut slots = Vec::with_capacity(script.grids.len());
        for placement in &script.grids {
            let config = DropZoneConfig::new(placement.boxes_per_row, placement.row_height)
                .motion(placement.motion.clone());
            let mut zone = GridDropZone::new(
                placement.id,
                provider.clone(),
                config,
                Rc::new(Cell::new(placement.bounds)),
            )?;
            zone.mount();
            zone.set_items(placement.keys.iter().cloned());
            slots.push(Slot {
                keys: placement.keys.clone(),
                zone,
            });
        }
        Ok(Self { slots, changes })
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.slots
            .iter()
            .position(|slot| slot.zone.id().as_str() == id)
            .ok_or_else(|| DemoError::UnknownGrid { id: id.to_string() })
    }

    pub fn play(&mut self, script: &Script) -> Result<Vec<StepReport>> {
        script.steps.iter().map(|step| self.run_step(step)).collect()
    }

    fn run_step(&mut self, step: &Step) -> Result<StepReport> {
        let _span = tracing::info_span!("demo.step", label = step.label).entered();
        let source = self.position(step.grid)?;
        // A cancelled drag still resolves like a release.
        let change = self.drag(source, step)?.ok_or_else(|| DemoError::Unfinished {
            grid: step.grid.to_string(),
            index: step.index,
        })?;
        self.apply(&change)?;
        let settled_after_frames = self.settle();
        Ok(StepReport {
            label: step.label.to_string(),
            cancelled: step.ending == Ending::Cancel,
            change,
            settled_after_frames,
            grids: self.reports(),
        })
    }

    /// Feed the pointer path through a tracker into the source zone.
    fn drag(&mut self, source: usize, step: &Step) -> Result<Option<GridChange>> {
        let mut tracker = DragTracker::default();
        let mut finished = None;

        let release = step.path.last().copied().unwrap_or(Point::ZERO);
        let events = std::iter::once(PointerEvent::Down(Point::ZERO))
            .chain(step.path.iter().copied().map(PointerEvent::Move))
            .chain(std::iter::once(match step.ending {
                Ending::Release => PointerEvent::Up(release),
                Ending::Cancel => PointerEvent::Cancel,
            }));

        for event in events {
            let Some(signal) = tracker.process(event) else {
                continue;
            };
            let mut signals = vec![signal];
            if signal == DragSignal::Claim
                && let Some(pending) = tracker.pending_move()
            {
                signals.push(pending);
            }
            for signal in signals {
                match self.slots[source].zone.handle_signal(step.index, signal)? {
                    SignalResponse::Rejected => tracker.reject(),
                    SignalResponse::Finished(change) => finished = Some(change),
                    SignalResponse::Claimed
                    | SignalResponse::Tracking
                    | SignalResponse::Ignored => {}
                }
                // Siblings read the registry once per frame.
                for slot in &mut self.slots {
                    slot.zone.tick(FRAME);
                }
            }
        }
        Ok(finished)
    }

    fn apply(&mut self, change: &GridChange) -> Result<()> {
        let source = self.position(change.source_id.as_str())?;
        match &change.target_id {
            Some(target_id) => {
                let target = self.position(target_id.as_str())?;
                let mut target_keys = std::mem::take(&mut self.slots[target].keys);
                apply_change(change, &mut self.slots[source].keys, Some(&mut target_keys))?;
                self.slots[target].keys = target_keys;
                let keys = self.slots[source].keys.clone();
                self.slots[source].zone.set_items(keys);
                let keys = self.slots[target].keys.clone();
                self.slots[target].zone.set_items(keys);
            }
            None => {
                apply_change(change, &mut self.slots[source].keys, None)?;
                let keys = self.slots[source].keys.clone();
                self.slots[source].zone.set_items(keys);
            }
        }
        Ok(())
    }

    /// Tick every zone until all items rest. Returns the frames spent.
    fn settle(&mut self) -> usize {
        for frame in 0..MAX_SETTLE_FRAMES {
            if self.slots.iter().all(|slot| slot.zone.is_at_rest()) {
                return frame;
            }
            for slot in &mut self.slots {
                slot.zone.tick(FRAME);
            }
        }
        tracing::warn!(message = "demo.settle_timeout", frames = MAX_SETTLE_FRAMES);
        MAX_SETTLE_FRAMES
    }

    fn reports(&self) -> Vec<GridReport> {
        self.slots
            .iter()
            .map(|slot| GridReport {
                id: slot.zone.id().to_string(),
                keys: slot.keys.clone(),
                layout: slot.zone.layout(),
            })
            .collect()
    }

    /// Every change the provider has reported so far.
    #[must_use]
    pub fn changes(&self) -> Vec<GridChange> {
        self.changes.borrow().clone()
    }
}
