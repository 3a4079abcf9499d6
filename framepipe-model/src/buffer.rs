// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The command buffer between the render thread and the GPU.
//!
//! Commands enter the buffer when the render thread finishes a frame and
//! leave it the moment the GPU starts executing that frame. Leaving is
//! recorded as a pending [`ReleaseEvent`] which is only applied once the CPU
//! clock reaches its time.

use std::collections::VecDeque;
use std::rc::Rc;

use framepipe_track::entity::Entity;
use framepipe_track::{trace, value};

/// `amount` commands leave the buffer once the clock reaches `time`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ReleaseEvent {
    time: f64,
    amount: u64,
}

pub(crate) struct CommandBuffer {
    entity: Rc<Entity>,

    // Maximum number of commands held at once
    capacity: u64,

    // Current number of commands held
    occupancy: u64,

    // Pending releases in time order
    releases: VecDeque<ReleaseEvent>,
}

impl CommandBuffer {
    #[must_use]
    pub(crate) fn new(entity: &Rc<Entity>, capacity: u64) -> Self {
        Self {
            entity: entity.clone(),
            capacity,
            occupancy: 0,
            releases: VecDeque::new(),
        }
    }

    /// Apply every release whose time has been reached.
    pub(crate) fn settle(&mut self, time: f64) {
        while let Some(release) = self.releases.front().copied() {
            if release.time > time {
                break;
            }
            self.releases.pop_front();
            self.occupancy = self.occupancy.saturating_sub(release.amount);
            trace!(self.entity ; "release {} commands scheduled at {:.3}ms, occupancy {}",
                release.amount, release.time, self.occupancy);
        }
    }

    /// Time of the earliest release still pending.
    #[must_use]
    pub(crate) fn next_release_time(&self) -> Option<f64> {
        self.releases.front().map(|release| release.time)
    }

    #[must_use]
    pub(crate) fn has_room_for(&self, count: u64) -> bool {
        self.occupancy.saturating_add(count) <= self.capacity
    }

    /// Add `count` commands and return the resulting occupancy.
    pub(crate) fn enqueue(&mut self, count: u64) -> u64 {
        self.occupancy = self.occupancy.saturating_add(count);
        value!(self.entity ; self.occupancy);
        self.occupancy
    }

    pub(crate) fn schedule_release(&mut self, time: f64, amount: u64) {
        // Keep the queue in time order, equal times in arrival order
        let index = self
            .releases
            .iter()
            .position(|release| release.time > time)
            .unwrap_or(self.releases.len());
        self.releases.insert(index, ReleaseEvent { time, amount });
    }

    #[must_use]
    pub(crate) fn occupancy(&self) -> u64 {
        self.occupancy
    }
}
