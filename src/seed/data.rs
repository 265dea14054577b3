use crate::model::{EntityKind, Target};
use crate::store::memory::InMemoryContainmentStore;

fn project(id: i64) -> Target {
    Target::new(EntityKind::Project, id)
}

fn dataset(id: i64) -> Target {
    Target::new(EntityKind::Dataset, id)
}

fn screen(id: i64) -> Target {
    Target::new(EntityKind::Screen, id)
}

fn plate(id: i64) -> Target {
    Target::new(EntityKind::Plate, id)
}

fn well(id: i64) -> Target {
    Target::new(EntityKind::Well, id)
}

/// Load a small demonstration hierarchy:
///
/// - Project 1 holds datasets 11 and 12. Dataset 11 holds images 101 and 102,
///   dataset 12 holds images 103, 104 and 105.
/// - Fileset 1001 holds images 101, 102 and 103 (split across both datasets).
/// - Image 104 predates filesets; fileset 1003 holds image 105 alone.
/// - Screen 2 holds plate 21 with wells 211 and 212, whose images 201 and 202
///   make up fileset 1002.
pub fn load_seed_data(store: &InMemoryContainmentStore) {
    store.link_all(project(1), [dataset(11), dataset(12)]);
    store.link_all(dataset(11), [Target::image(101), Target::image(102)]);
    store.link_all(dataset(12), [Target::image(103), Target::image(104), Target::image(105)]);
    store.link_all(
        Target::fileset(1001),
        [Target::image(101), Target::image(102), Target::image(103)],
    );
    store.link(Target::fileset(1003), Target::image(105));

    store.link(screen(2), plate(21));
    store.link_all(plate(21), [well(211), well(212)]);
    store.link(well(211), Target::image(201));
    store.link(well(212), Target::image(202));
    store.link_all(Target::fileset(1002), [Target::image(201), Target::image(202)]);
}
