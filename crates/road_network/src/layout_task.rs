//! Background road layout builds.
//!
//! The builder is pure CPU work whose cost grows steeply with the POI count,
//! so it runs on the `AsyncComputeTaskPool` instead of inside a frame. At
//! most one build is in flight; while it runs, new requests are ignored.
//! The finished layout replaces the `RoadLayout` resource in one assignment,
//! so readers never see roads from one build next to waypoints from another.
//!
//! Rebuilds only happen when the deduplicated POI snapshot or the
//! parameters differ from the last build request.

use bevy::prelude::*;
use bevy::tasks::{block_on, AsyncComputeTaskPool, Task};

use crate::config::RoadLayoutParams;
use crate::error::LayoutError;
use crate::layout::{build_from_snapshot, CancelToken, RoadLayout};
use crate::poi::{snapshot_pois, Poi, PoiSnapshot};

/// Everything a build reads, captured when the build starts.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutInput {
    pub snapshot: PoiSnapshot,
    pub params: RoadLayoutParams,
}

struct InFlightBuild {
    task: Task<Result<RoadLayout, LayoutError>>,
    cancel: CancelToken,
    input: LayoutInput,
}

/// Tracks the in-flight build and the input of the last one requested.
#[derive(Resource, Default)]
pub struct RoadLayoutBuilder {
    in_flight: Option<InFlightBuild>,
    /// Input of the most recent build that was started or rejected. A new
    /// build starts only when the current input differs from this.
    last_input: Option<LayoutInput>,
    /// Bumped every time a layout is published.
    generation: u64,
}

impl RoadLayoutBuilder {
    pub fn is_building(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Input of the build currently running, if any.
    pub fn pending_input(&self) -> Option<&LayoutInput> {
        self.in_flight.as_ref().map(|b| &b.input)
    }

    /// Ask the in-flight build to stop. Returns `false` if nothing is running.
    pub fn cancel(&self) -> bool {
        match &self.in_flight {
            Some(build) => {
                build.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Forget the last input so the next request rebuilds even if nothing
    /// changed.
    pub fn invalidate(&mut self) {
        self.last_input = None;
    }

    fn is_up_to_date(&self, input: &LayoutInput) -> bool {
        self.last_input.as_ref() == Some(input)
    }

    fn publish(
        &mut self,
        input: &LayoutInput,
        result: Result<RoadLayout, LayoutError>,
        layout: &mut RoadLayout,
        rebuilt: &mut EventWriter<RoadLayoutRebuilt>,
    ) {
        match result {
            Ok(new_layout) => {
                self.generation += 1;
                info!(
                    "Road layout rebuilt (generation {}): {} POIs, {} roads, {} intersections",
                    self.generation,
                    new_layout.pois.len(),
                    new_layout.connections.len(),
                    new_layout.intersections.len()
                );
                rebuilt.send(RoadLayoutRebuilt {
                    generation: self.generation,
                    poi_count: new_layout.pois.len(),
                    connection_count: new_layout.connections.len(),
                    intersection_count: new_layout.intersections.len(),
                });
                *layout = new_layout;
            }
            Err(LayoutError::Cancelled) => {
                info!(
                    "Road layout build for {} POIs cancelled; keeping previous layout",
                    input.snapshot.len()
                );
            }
            Err(e) => {
                warn!("Road layout build failed: {}", e);
            }
        }
    }
}

/// Fired after a new `RoadLayout` has been published.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoadLayoutRebuilt {
    pub generation: u64,
    pub poi_count: usize,
    pub connection_count: usize,
    pub intersection_count: usize,
}

/// Request cooperative cancellation of the in-flight build.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct CancelRoadLayout;

/// Start a build when the POIs or parameters changed and nothing is running.
///
/// On WASM the async pool has no worker threads, so the build runs inline.
pub fn request_road_layout(
    mut builder: ResMut<RoadLayoutBuilder>,
    params: Res<RoadLayoutParams>,
    pois: Query<(Entity, &GlobalTransform), With<Poi>>,
    mut layout: ResMut<RoadLayout>,
    mut rebuilt: EventWriter<RoadLayoutRebuilt>,
) {
    if builder.is_building() {
        return;
    }

    let input = LayoutInput {
        snapshot: snapshot_pois(pois.iter()),
        params: params.clone(),
    };
    if builder.is_up_to_date(&input) {
        return;
    }

    if let Err(e) = input.params.validate() {
        warn!("Not rebuilding road layout: {}", e);
        builder.last_input = Some(input);
        return;
    }

    debug!(
        "Requesting road layout build for {} POIs",
        input.snapshot.len()
    );

    if cfg!(target_arch = "wasm32") {
        let result = build_from_snapshot(&input.snapshot, &input.params, &CancelToken::default());
        builder.publish(&input, result, &mut layout, &mut rebuilt);
        builder.last_input = Some(input);
        return;
    }

    let cancel = CancelToken::default();
    let task_input = input.clone();
    let task_cancel = cancel.clone();
    let task = AsyncComputeTaskPool::get().spawn(async move {
        build_from_snapshot(&task_input.snapshot, &task_input.params, &task_cancel)
    });

    builder.last_input = Some(input.clone());
    builder.in_flight = Some(InFlightBuild {
        task,
        cancel,
        input,
    });
}

/// Poll the in-flight build and publish its result once it finishes.
pub fn collect_road_layout(
    mut builder: ResMut<RoadLayoutBuilder>,
    mut layout: ResMut<RoadLayout>,
    mut rebuilt: EventWriter<RoadLayoutRebuilt>,
) {
    let Some(in_flight) = builder.in_flight.as_mut() else {
        return;
    };
    let Some(result) = block_on(futures_lite::future::poll_once(&mut in_flight.task)) else {
        return;
    };
    if let Some(finished) = builder.in_flight.take() {
        builder.publish(&finished.input, result, &mut layout, &mut rebuilt);
    }
}

/// Forward `CancelRoadLayout` events to the in-flight build.
pub fn handle_cancel_requests(
    mut requests: EventReader<CancelRoadLayout>,
    builder: Res<RoadLayoutBuilder>,
) {
    if requests.read().count() == 0 {
        return;
    }
    if builder.cancel() {
        debug!("Cancellation requested for in-flight road layout build");
    }
}
