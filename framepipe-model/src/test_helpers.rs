// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use std::rc::Rc;

use framepipe_track::entity::{Entity, toplevel};
use framepipe_track::test_helpers::create_tracker;

/// Create the top-level entity for a test with a tracker that writes to
/// `traces/<test file>.log`.
#[must_use]
pub fn start_test(full_filepath: &str) -> Rc<Entity> {
    toplevel(&create_tracker(full_filepath), "top")
}
