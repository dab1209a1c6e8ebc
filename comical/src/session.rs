// Copyright 2025 the Comical Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The editing session: every container being edited, the active bubble, pointer interaction
//! and baking to static images.

use comical_surface::{ItemFlags, QueryFilter};
use comical_spec::{BubbleSpec, TailSpec};
use hashbrown::{HashMap, HashSet};
use kurbo::Point;

use crate::bubble::Bubble;
use crate::config::SessionConfig;
use crate::container::{ContainerData, ItemRole};
use crate::gesture::{DragResult, DragState};
use crate::host::{ElementId, Host, read_spec, write_spec};
use crate::layering::rebuild_layers;
use crate::{Error, avoid, family, link, query};

/// Callback told about every change of the active bubble.
pub type ActiveBubbleListener = Box<dyn FnMut(Option<ElementId>)>;

/// Which end of a tail a handle moves.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HandlePart {
    /// The tip.
    Tip,
    /// The control midpoint.
    Mid,
}

/// A handle being dragged.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DragTarget {
    /// Content element of the bubble owning the tail.
    pub element: ElementId,
    /// Index of the tail in the bubble's spec.
    pub tail: usize,
    /// Which handle of the tail.
    pub part: HandlePart,
}

/// What a pointer event did.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PointerOutcome {
    /// Nothing: unknown container or no drag in progress.
    Ignored,
    /// A handle was grabbed.
    DragStarted(DragTarget),
    /// The grabbed handle moved to the given point.
    Dragged(DragTarget, Point),
    /// The drag ended and the change was persisted.
    DragFinished(DragTarget),
    /// The press selected a bubble, or cleared the selection.
    Activated(Option<ElementId>),
}

/// Editor-wide state, owned by the host application for the lifetime of an editing session.
///
/// Every operation runs to completion on the calling thread. Operations whose preconditions
/// fail report on the `tracing` channel, return an [`Error`], and leave the session untouched.
pub struct Session {
    config: SessionConfig,
    containers: HashMap<ElementId, ContainerData>,
    active: Option<ElementId>,
    listener: Option<ActiveBubbleListener>,
    drag: DragState<DragTarget>,
    drag_container: Option<ElementId>,
    /// The dragged tail as it was when the press started.
    drag_origin: Option<TailSpec>,
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("containers", &self.containers.len())
            .field("active", &self.active)
            .field("has_listener", &self.listener.is_some())
            .field("drag", &self.drag)
            .finish_non_exhaustive()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn report<T>(result: Result<T, Error>, operation: &'static str) -> Result<T, Error> {
    if let Err(err) = &result {
        tracing::warn!(operation, %err, "operation skipped");
    }
    result
}

impl Session {
    /// A session with default settings and nothing being edited.
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// A session with custom settings.
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            drag: DragState::new(config.drag_threshold),
            config,
            containers: HashMap::new(),
            active: None,
            listener: None,
            drag_container: None,
            drag_origin: None,
        }
    }

    /// Current settings.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// State of a container being edited.
    pub fn container(&self, container: ElementId) -> Option<&ContainerData> {
        self.containers.get(&container)
    }

    /// Whether `container` is being edited.
    pub fn is_editing(&self, container: ElementId) -> bool {
        self.containers.contains_key(&container)
    }

    /// Containers being edited, in no particular order.
    pub fn containers(&self) -> impl Iterator<Item = &ContainerData> {
        self.containers.values()
    }

    // --- lifecycle ---

    /// Start editing each container: drop any static image it shows and build its bubbles.
    ///
    /// Containers already being edited are simply refreshed.
    pub fn start_editing<H: Host + ?Sized>(&mut self, host: &mut H, containers: &[ElementId]) {
        for &container in containers {
            let data = self.containers.entry(container).or_insert_with(|| {
                host.remove_static_image(container);
                ContainerData::new(container)
            });
            data.refresh(host, &self.config);
        }
        self.sync_handles();
    }

    /// Bake every container to a static image and end the session's editing state.
    pub fn stop_editing<H: Host + ?Sized>(&mut self, host: &mut H) {
        let mut containers: Vec<ElementId> = self.containers.keys().copied().collect();
        containers.sort_unstable();
        for container in containers {
            // Only containers we just listed are baked, so this cannot fail.
            let _ = self.convert_canvas_to_svg_img(host, container);
        }
        self.set_active(None);
        self.drag.cancel();
        self.drag_container = None;
        self.drag_origin = None;
    }

    /// Re-read every bubble of `container` from the host and rebuild all layers.
    pub fn update<H: Host + ?Sized>(&mut self, host: &mut H, container: ElementId) -> Result<(), Error> {
        let result = match self.containers.get_mut(&container) {
            Some(data) => {
                data.refresh(host, &self.config);
                Ok(())
            }
            None => Err(Error::ContainerNotActive(container)),
        };
        report(result, "update")?;
        if self.active.is_some_and(|a| self.locate(a).is_none()) {
            self.set_active(None);
        } else {
            self.sync_handles();
        }
        Ok(())
    }

    /// React to host-reported changes of observed elements by updating each affected container
    /// once.
    pub fn handle_mutations<H: Host + ?Sized>(&mut self, host: &mut H, changed: &[ElementId]) {
        let mut affected: Vec<ElementId> = Vec::new();
        for &element in changed {
            let container = if self.containers.contains_key(&element) {
                Some(element)
            } else {
                self.locate(element)
                    .map(|(data, _)| data.element())
                    .or_else(|| host.parent_of(element).filter(|p| self.is_editing(*p)))
            };
            if let Some(container) = container
                && !affected.contains(&container)
            {
                affected.push(container);
            }
        }
        for container in affected {
            let _ = self.update(host, container);
        }
    }

    /// Bake one container: drop its handles, hand the host a static SVG of what is drawn, and
    /// release all of its state and observers.
    pub fn convert_canvas_to_svg_img<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        container: ElementId,
    ) -> Result<(), Error> {
        let mut data = report(
            self.containers
                .remove(&container)
                .ok_or(Error::ContainerNotActive(container)),
            "convert_canvas_to_svg_img",
        )?;
        data.release_observers(host);
        data.surface
            .retain(|item| !item.flags.contains(ItemFlags::HANDLE));

        let svg = {
            let host: &H = &*host;
            let mut used: HashSet<String> = HashSet::new();
            let mut counter = 0_u64;
            data.surface.to_svg(data.client_bounds().size(), || {
                loop {
                    counter += 1;
                    let id = format!("comical-{counter}");
                    if !host.id_in_use(&id) && used.insert(id.clone()) {
                        return id;
                    }
                }
            })
        };
        host.install_static_image(container, svg);

        if self.drag_container == Some(container) {
            self.drag.cancel();
            self.drag_container = None;
            self.drag_origin = None;
        }
        if self.active.is_some_and(|a| data.bubble(a).is_some()) {
            self.set_active(None);
        }
        tracing::debug!(?container, "baked container to static image");
        Ok(())
    }

    // --- activation ---

    /// Register the callback told about active-bubble changes, replacing any previous one.
    pub fn set_active_bubble_listener(&mut self, listener: Option<ActiveBubbleListener>) {
        self.listener = listener;
    }

    /// The content element of the active bubble.
    pub fn active_element(&self) -> Option<ElementId> {
        self.active
    }

    /// Make the bubble of `element` active, showing its handles, or clear the selection.
    ///
    /// An element without a bubble in any edited container clears the selection.
    pub fn activate_element(&mut self, element: Option<ElementId>) {
        let resolved = element.filter(|e| self.locate(*e).is_some());
        if element.is_some() && resolved.is_none() {
            tracing::warn!(?element, "cannot activate an element without a bubble");
        }
        self.set_active(resolved);
    }

    fn set_active(&mut self, element: Option<ElementId>) {
        let changed = self.active != element;
        self.active = element;
        self.sync_handles();
        if changed && let Some(listener) = self.listener.as_mut() {
            listener(element);
        }
    }

    fn sync_handles(&mut self) {
        for data in self.containers.values_mut() {
            data.rebuild_handles(self.active, &self.config);
        }
    }

    // --- mutation ---

    /// Make `child`'s bubble the newest member of `parent`'s family.
    ///
    /// Descriptions are persisted to the host, but shapes are not regenerated; call
    /// [`Session::update`] on the container afterwards.
    pub fn initialize_child<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        child: ElementId,
        parent: ElementId,
    ) -> Result<(), Error> {
        let container = self.locate(parent).map(|(data, _)| data.element());
        let result = match container.and_then(|c| self.containers.get_mut(&c)) {
            Some(data) => link::initialize_child(data, host, child, parent),
            None => Err(Error::NoBubble(parent)),
        };
        report(result, "initialize_child")
    }

    // --- queries ---

    fn locate(&self, element: ElementId) -> Option<(&ContainerData, &Bubble)> {
        self.containers
            .values()
            .find_map(|data| data.bubble(element).map(|b| (data, b)))
    }

    /// The container `element` belongs to: the element itself if it is being edited, otherwise
    /// the container holding its bubble.
    fn container_for(&self, element: ElementId) -> Option<&ContainerData> {
        self.containers
            .get(&element)
            .or_else(|| self.locate(element).map(|(data, _)| data))
    }

    /// The bubble drawn for `element`.
    pub fn bubble(&self, element: ElementId) -> Option<&Bubble> {
        self.locate(element).map(|(_, b)| b)
    }

    /// Whether anything drawn in `container` is at `point`.
    pub fn something_hit(&self, container: ElementId, point: Point) -> bool {
        self.containers
            .get(&container)
            .is_some_and(|data| query::something_hit(data, point, &self.config))
    }

    /// The topmost bubble whose shape contains `point`.
    pub fn get_bubble_hit(&self, container: ElementId, point: Point) -> Option<&Bubble> {
        query::get_bubble_hit(self.containers.get(&container)?, point, &self.config)
    }

    /// The first bubble whose content box contains `point`.
    pub fn bubble_with_content_at_point(&self, container: ElementId, point: Point) -> Option<&Bubble> {
        query::bubble_with_content_at_point(self.containers.get(&container)?, point)
    }

    /// Highest level among the bubbles of `element`'s container.
    ///
    /// For a container that is not being edited the host's attributes are read directly.
    pub fn get_max_level<H: Host + ?Sized>(&self, host: &H, element: ElementId) -> i32 {
        if let Some(data) = self.container_for(element) {
            return query::max_level(data.bubbles());
        }
        let container = if host.bubble_attribute(element).is_some() {
            host.parent_of(element).unwrap_or(element)
        } else {
            element
        };
        host.bubble_elements(container)
            .into_iter()
            .filter_map(|e| read_spec(host, e).ok().flatten())
            .map(|spec: BubbleSpec| spec.effective_level())
            .max()
            .unwrap_or(0)
    }

    /// Content element of the closest ancestor of `element`'s bubble in its family.
    pub fn find_parent(&self, element: ElementId) -> Option<ElementId> {
        let (data, bubble) = self.locate(element)?;
        family::find_parent(data.bubbles(), bubble).map(Bubble::content)
    }

    /// Content element of the closest successor of `element`'s bubble in its family.
    pub fn find_child(&self, element: ElementId) -> Option<ElementId> {
        let (data, bubble) = self.locate(element)?;
        family::find_child(data.bubbles(), bubble).map(Bubble::content)
    }

    /// Content elements of every ancestor of `element`'s bubble, oldest first.
    pub fn find_ancestors(&self, element: ElementId) -> Vec<ElementId> {
        self.locate(element)
            .map(|(data, bubble)| {
                family::find_ancestors(data.bubbles(), bubble)
                    .into_iter()
                    .map(Bubble::content)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Content elements of every other member of `element`'s family, in order.
    pub fn find_relatives(&self, element: ElementId) -> Vec<ElementId> {
        self.locate(element)
            .map(|(data, bubble)| {
                family::find_relatives(data.bubbles(), bubble)
                    .into_iter()
                    .map(Bubble::content)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Content element of the last member of `element`'s family.
    pub fn get_last_in_family(&self, element: ElementId) -> Option<ElementId> {
        let (data, bubble) = self.locate(element)?;
        family::last_in_family(data.bubbles(), bubble).map(Bubble::content)
    }

    /// Move a container-relative point off every bubble's content in `element`'s container.
    ///
    /// Points in unknown containers come back unchanged.
    pub fn move_point_outside_bubble_content(&self, element: ElementId, point: Point) -> Point {
        match self.container_for(element) {
            Some(data) => avoid::move_point_outside_bubble_content(
                data,
                point,
                self.config.max_avoid_iterations,
            ),
            None => point,
        }
    }

    // --- pointer interaction ---

    /// Press at `point`: grab a handle under it, otherwise select the bubble under it (or
    /// nothing).
    pub fn pointer_down(&mut self, container: ElementId, point: Point) -> PointerOutcome {
        let Some(data) = self.containers.get(&container) else {
            return PointerOutcome::Ignored;
        };
        let handle = data
            .surface()
            .hit_test_point(
                point,
                QueryFilter::new().pickable().handles(),
                &self.config.hit_params,
            )
            .and_then(|hit| data.surface().item(hit.item))
            .and_then(|item| {
                let (tail, part) = match item.meta.role {
                    ItemRole::TipHandle(tail) => (tail, HandlePart::Tip),
                    ItemRole::MidHandle(tail) => (tail, HandlePart::Mid),
                    _ => return None,
                };
                Some(DragTarget {
                    element: item.meta.element,
                    tail,
                    part,
                })
            });
        if let Some(target) = handle {
            self.drag_origin = data
                .bubble(target.element)
                .and_then(|b| b.spec().tails.get(target.tail))
                .copied();
            self.drag.on_down(target, point);
            self.drag_container = Some(container);
            return PointerOutcome::DragStarted(target);
        }

        let hit = query::get_bubble_hit(data, point, &self.config).map(Bubble::content);
        self.set_active(hit);
        PointerOutcome::Activated(hit)
    }

    /// Move the grabbed handle to `point`. Tips are kept off bubble content.
    pub fn pointer_move(&mut self, container: ElementId, point: Point) -> PointerOutcome {
        if self.drag_container != Some(container) {
            return PointerOutcome::Ignored;
        }
        let Some(target) = self.drag.on_move(point) else {
            return PointerOutcome::Ignored;
        };
        let active = self.active;
        let config = self.config;
        let Some(data) = self.containers.get_mut(&container) else {
            return PointerOutcome::Ignored;
        };
        let position = match target.part {
            HandlePart::Tip => {
                avoid::move_point_outside_bubble_content(data, point, config.max_avoid_iterations)
            }
            HandlePart::Mid => point,
        };
        let Some(tail) = data
            .bubble_mut(target.element)
            .and_then(|b| b.spec_mut().tails.get_mut(target.tail))
        else {
            self.drag.cancel();
            self.drag_container = None;
            self.drag_origin = None;
            return PointerOutcome::Ignored;
        };
        match target.part {
            HandlePart::Tip => tail.set_tip(position),
            HandlePart::Mid => tail.set_midpoint(position),
        }
        rebuild_layers(data, &config);
        data.rebuild_handles(active, &config);
        PointerOutcome::Dragged(target, position)
    }

    /// Release the pointer, persisting the dragged tail if the handle really moved.
    ///
    /// A press that stayed within the drag threshold leaves the tail as it was before the press.
    /// Releasing over a different container abandons the drag the same way.
    pub fn pointer_up<H: Host + ?Sized>(&mut self, host: &mut H, container: ElementId, point: Point) -> PointerOutcome {
        let Some(drag_container) = self.drag_container.take() else {
            return PointerOutcome::Ignored;
        };
        let origin = self.drag_origin.take();
        if drag_container != container {
            if let Some(target) = self.drag.press().map(|p| p.target) {
                self.restore_tail(drag_container, target, origin);
            }
            self.drag.cancel();
            return PointerOutcome::Ignored;
        }
        match self.drag.on_up(point) {
            DragResult::Moved(target) => {
                let Some(bubble) = self.locate(target.element).map(|(_, b)| b) else {
                    return PointerOutcome::Ignored;
                };
                write_spec(host, target.element, bubble.spec());
                PointerOutcome::DragFinished(target)
            }
            DragResult::Click(target) => {
                self.restore_tail(container, target, origin);
                PointerOutcome::Ignored
            }
            DragResult::Idle => PointerOutcome::Ignored,
        }
    }

    fn restore_tail(&mut self, container: ElementId, target: DragTarget, origin: Option<TailSpec>) {
        let Some(origin) = origin else {
            return;
        };
        let active = self.active;
        let config = self.config;
        let Some(data) = self.containers.get_mut(&container) else {
            return;
        };
        let Some(tail) = data
            .bubble_mut(target.element)
            .and_then(|b| b.spec_mut().tails.get_mut(target.tail))
        else {
            return;
        };
        if *tail == origin {
            return;
        }
        *tail = origin;
        rebuild_layers(data, &config);
        data.rebuild_handles(active, &config);
    }
}
