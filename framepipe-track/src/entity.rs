// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Named simulation entities.
//!
//! Every simulated component owns an [`Entity`]. Entities form a tree rooted
//! at the one created by [`toplevel`], and each carries the [`Id`] that its
//! track events are reported against.

use std::fmt;
use std::rc::Rc;

use crate::{Id, Tracker, create, destroy};

/// A node in the entity tree.
///
/// Creating an entity emits a `create` event and dropping it emits a
/// `destroy` event.
pub struct Entity {
    /// Owning entity, `None` only for the top level.
    pub parent: Option<Rc<Entity>>,

    pub id: Id,

    /// [`Tracker`] shared by the whole tree.
    pub tracker: Tracker,

    /// Names from the top level down joined with `::`.
    full_name: String,
}

const SEPARATOR: &str = "::";

impl Entity {
    /// Create a child of `parent` called `name`.
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
        let full_name = format!("{}{SEPARATOR}{name}", parent.full_name);
        Self::register(Some(parent.clone()), &parent.tracker, full_name)
    }

    fn register(parent: Option<Rc<Entity>>, tracker: &Tracker, full_name: String) -> Self {
        let id = tracker.unique_id();
        tracker.add_entity(id, &full_name);
        let entity = Self {
            parent,
            id,
            tracker: tracker.clone(),
            full_name,
        };
        create!(entity);
        entity
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }
}

impl Drop for Entity {
    fn drop(&mut self) {
        destroy!(self);
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

/// Create the root of an entity tree.
pub fn toplevel(tracker: &Tracker, name: &str) -> Rc<Entity> {
    Rc::new(Entity::register(None, tracker, name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::check_and_clear;

    #[test]
    fn names_nest() {
        let (test_tracker, tracker) = crate::test_init!(1);
        let top = toplevel(&tracker, "top");
        let child = Rc::new(Entity::new(&top, "pipeline"));
        let grandchild = Entity::new(&child, "buffer");

        assert_eq!(grandchild.full_name(), "top::pipeline::buffer");
        assert_eq!(child.to_string(), "top::pipeline");
        check_and_clear(
            &test_tracker,
            &[
                "0: created 1, top",
                "1: created 2, top::pipeline",
                "2: created 3, top::pipeline::buffer",
            ],
        );

        drop(grandchild);
        check_and_clear(&test_tracker, &["2: destroyed 3"]);
    }
}
