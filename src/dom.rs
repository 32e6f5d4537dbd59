//! Browser host: binds a [`SurfaceCore`] to a DOM container.
//!
//! This is the only module that touches `web_sys`. It normalizes pointer
//! events into [`PointerInput`], resolves hit markers from `data-hit` /
//! `data-sensor-id` attributes, applies the engine's [`Action`]s, and copies
//! each [`Scene`] into DOM nodes. Window listeners live in a [`ListenerGuard`]
//! for exactly as long as a gesture is active.
//!
//! All fallible DOM calls propagate `Result<(), JsValue>`; the top-level
//! callers log failures with `tracing` and carry on.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Interval;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, PointerEvent, Storage, Window};

use crate::background::accept_upload;
use crate::consts::{CLOCK_TICK_MS, SIMULATION_PERIOD_MS};
use crate::geometry::{MapRect, Point};
use crate::hit::{HitTarget, ROLE_BODY, ROLE_REMOVE, ROLE_RESIZE};
use crate::input::{PointerButton, PointerInput, PointerKind};
use crate::persist::{KeyValueStore, PersistError, load_snapshot, save_snapshot, save_viewport};
use crate::render::{IndicatorView, Scene};
use crate::sensor::SensorKind;
use crate::simulator::Simulator;
use crate::surface::{Action, SurfaceCore};

const EMPTY_HINT: &str = "Upload a map image or enter Edit Mode to place sensors";
const EDIT_BANNER: &str = "EDITING LAYOUT";

type Listener = Closure<dyn FnMut(Event)>;

// =============================================================
// Storage
// =============================================================

/// [`KeyValueStore`] over `window.localStorage`.
struct LocalStore {
    storage: Option<Storage>,
}

impl LocalStore {
    fn open(window: &Window) -> Self {
        let storage = match window.local_storage() {
            Ok(storage) => storage,
            Err(e) => {
                warn!(error = ?e, "localStorage unavailable");
                None
            }
        };
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, PersistError> {
        self.storage.as_ref().ok_or(PersistError::Unavailable)
    }
}

fn js_error(e: JsValue) -> PersistError {
    PersistError::Backend(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        self.storage()?.get_item(key).map_err(js_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.storage()?.set_item(key, value).map_err(js_error)
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        self.storage()?.remove_item(key).map_err(js_error)
    }
}

// =============================================================
// Listener guard
// =============================================================

/// Event listeners registered on one target, removed on [`ListenerGuard::detach`] or drop.
struct ListenerGuard {
    target: EventTarget,
    registered: Vec<(&'static str, Listener)>,
    attached: bool,
}

impl ListenerGuard {
    fn attach(target: EventTarget, listeners: Vec<(&'static str, Listener)>) -> Result<Self, JsValue> {
        let mut guard = Self { target, registered: Vec::with_capacity(listeners.len()), attached: true };
        for (event, listener) in listeners {
            guard.target.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())?;
            guard.registered.push((event, listener));
        }
        Ok(guard)
    }

    /// Unregister every listener. The closures stay alive until the guard drops,
    /// so this is safe to call from inside one of them.
    fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        for (event, listener) in &self.registered {
            if let Err(e) = self.target.remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref()) {
                warn!(event, error = ?e, "failed to remove listener");
            }
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.detach();
    }
}

// =============================================================
// Host
// =============================================================

struct HostInner {
    window: Window,
    document: Document,
    container: HtmlElement,
    layer: HtmlElement,
    overlay: HtmlElement,
    core: RefCell<SurfaceCore>,
    store: RefCell<LocalStore>,
    /// Present only while a gesture is active.
    gesture_listeners: RefCell<Option<ListenerGuard>>,
    /// Detached guard kept until the next gesture; its closure may still be on the stack.
    retired_listeners: RefCell<Option<ListenerGuard>>,
    container_listeners: RefCell<Option<ListenerGuard>>,
    timers: RefCell<Vec<Interval>>,
    on_edit_sensor: RefCell<Option<js_sys::Function>>,
    on_notice: RefCell<Option<js_sys::Function>>,
}

/// The interactive map, exported to JavaScript.
#[wasm_bindgen]
pub struct MapHost {
    inner: Rc<HostInner>,
}

#[wasm_bindgen]
impl MapHost {
    /// Mount the map into `container`, restore state from localStorage and
    /// start the sensor simulator.
    ///
    /// # Errors
    ///
    /// Returns `Err` if there is no window/document or the DOM rejects setup.
    #[wasm_bindgen(constructor)]
    pub fn new(container: HtmlElement) -> Result<MapHost, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;

        let layer = create_html(&document, "div", "map-layer")?;
        let layer_style = layer.style();
        layer_style.set_property("position", "absolute")?;
        layer_style.set_property("inset", "0")?;
        layer_style.set_property("transform-origin", "top left")?;
        layer_style.set_property("background-size", "cover")?;
        layer_style.set_property("background-position", "center")?;
        let overlay = create_html(&document, "div", "map-overlay")?;
        overlay.style().set_property("pointer-events", "none")?;
        container.style().set_property("touch-action", "none")?;
        container.append_child(&layer)?;
        container.append_child(&overlay)?;

        let store = LocalStore::open(&window);
        let mut core = SurfaceCore::default();
        core.load(load_snapshot(&store));

        let inner = Rc::new(HostInner {
            window,
            document,
            container,
            layer,
            overlay,
            core: RefCell::new(core),
            store: RefCell::new(store),
            gesture_listeners: RefCell::new(None),
            retired_listeners: RefCell::new(None),
            container_listeners: RefCell::new(None),
            timers: RefCell::new(Vec::new()),
            on_edit_sensor: RefCell::new(None),
            on_notice: RefCell::new(None),
        });

        HostInner::install(&inner)?;
        inner.refresh_rect();
        inner.render();
        Ok(MapHost { inner })
    }

    /// Called with the sensor id when an indicator is clicked.
    pub fn set_on_edit_sensor(&self, callback: Option<js_sys::Function>) {
        *self.inner.on_edit_sensor.borrow_mut() = callback;
    }

    /// Called with a message string for non-blocking notices.
    pub fn set_on_notice(&self, callback: Option<js_sys::Function>) {
        *self.inner.on_notice.borrow_mut() = callback;
    }

    pub fn enter_edit(&self) {
        let actions = self.inner.core.borrow_mut().enter_edit();
        self.inner.apply(actions, None);
    }

    pub fn save_edit(&self) {
        let actions = self.inner.core.borrow_mut().save_edit();
        self.inner.apply(actions, None);
    }

    pub fn cancel_edit(&self) {
        let actions = self.inner.core.borrow_mut().cancel_edit();
        self.inner.apply(actions, None);
    }

    pub fn save_settings(&self) {
        let actions = self.inner.core.borrow_mut().save_settings();
        self.inner.apply(actions, None);
    }

    pub fn select_for_placement(&self, sensor_id: Option<String>) {
        let actions = self.inner.core.borrow_mut().select_for_placement(sensor_id.as_deref());
        self.inner.apply(actions, None);
    }

    /// JSON array of the sensors not on the map, for the placement dropdown.
    ///
    /// # Errors
    ///
    /// Returns `Err` if serialization fails.
    pub fn unplaced_sensors(&self) -> Result<String, JsValue> {
        let core = self.inner.core.borrow();
        serde_json::to_string(&core.unplaced_sensors()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn zoom_in(&self) {
        self.inner.refresh_rect();
        let now = self.inner.now_ms();
        let actions = self.inner.core.borrow_mut().zoom_in(now);
        self.inner.apply(actions, None);
    }

    pub fn zoom_out(&self) {
        self.inner.refresh_rect();
        let now = self.inner.now_ms();
        let actions = self.inner.core.borrow_mut().zoom_out(now);
        self.inner.apply(actions, None);
    }

    pub fn reset_view(&self) {
        let now = self.inner.now_ms();
        let actions = self.inner.core.borrow_mut().reset_view(now);
        self.inner.apply(actions, None);
    }

    /// Use an uploaded file (already read as a data URL) as the background.
    ///
    /// # Errors
    ///
    /// Returns `Err` with a message for unsupported or empty uploads.
    pub fn upload_image(&self, mime: &str, data_url: &str) -> Result<(), JsValue> {
        let image = match accept_upload(mime, data_url) {
            Ok(image) => image,
            Err(e) => {
                self.inner.apply(vec![Action::Notice(e.to_string())], None);
                return Err(JsValue::from_str(&e.to_string()));
            }
        };
        let actions = self.inner.core.borrow_mut().set_map_image(Some(image));
        self.inner.apply(actions, None);
        Ok(())
    }

    pub fn clear_image(&self) {
        let actions = self.inner.core.borrow_mut().set_map_image(None);
        self.inner.apply(actions, None);
    }

    /// Create a sensor; returns its id.
    ///
    /// # Errors
    ///
    /// Returns `Err` for an unknown kind or a blank name.
    pub fn add_sensor(&self, name: &str, kind: &str) -> Result<String, JsValue> {
        let kind = SensorKind::parse(kind).ok_or_else(|| JsValue::from_str(&format!("unknown sensor type: {kind}")))?;
        let id = self.inner.core.borrow_mut().add_sensor(name, kind).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.inner.render();
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `Err` for a blank name or unknown id.
    pub fn rename_sensor(&self, id: &str, name: &str) -> Result<(), JsValue> {
        self.inner.core.borrow_mut().rename_sensor(id, name).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.inner.render();
        Ok(())
    }

    pub fn remove_sensor(&self, id: &str) {
        let actions = self.inner.core.borrow_mut().remove_sensor(id);
        self.inner.apply(actions, None);
    }

    pub fn dismiss_notice(&self) {
        let actions = self.inner.core.borrow_mut().dismiss_notice();
        self.inner.apply(actions, None);
    }

    /// Re-read the container rect after the page layout changed.
    pub fn refresh_layout(&self) {
        self.inner.refresh_rect();
        self.inner.render();
    }
}

impl HostInner {
    /// Register the container listener and the timers. Everything captures a `Weak`.
    fn install(this: &Rc<Self>) -> Result<(), JsValue> {
        let weak = Rc::downgrade(this);
        let down: Listener = Closure::wrap(Box::new(move |event: Event| {
            let Some(host) = weak.upgrade() else {
                return;
            };
            if let Some(pointer) = event.dyn_ref::<PointerEvent>() {
                host.on_pointer_down(pointer);
            }
        }) as Box<dyn FnMut(Event)>);
        let target: EventTarget = this.container.clone().into();
        *this.container_listeners.borrow_mut() = Some(ListenerGuard::attach(target, vec![("pointerdown", down)])?);

        let weak = Rc::downgrade(this);
        let mut simulator = Simulator::seeded(js_sys::Date::now().to_bits());
        let simulation = Interval::new(SIMULATION_PERIOD_MS, move || {
            let Some(host) = weak.upgrade() else {
                return;
            };
            let readings = simulator.next_readings(host.core.borrow().sensors().as_slice());
            let actions = host.core.borrow_mut().apply_readings(&readings);
            host.apply(actions, None);
        });

        let weak = Rc::downgrade(this);
        let clock = Interval::new(CLOCK_TICK_MS, move || {
            let Some(host) = weak.upgrade() else {
                return;
            };
            let now = host.now_ms();
            let actions = host.core.borrow_mut().tick(now);
            host.apply(actions, None);
        });

        this.timers.borrow_mut().extend([simulation, clock]);
        Ok(())
    }

    /// Milliseconds on the same clock as `Event.timeStamp`.
    fn now_ms(&self) -> f64 {
        self.window.performance().map_or(0.0, |p| p.now())
    }

    fn refresh_rect(&self) {
        let rect = self.container.get_bounding_client_rect();
        let actions =
            self.core.borrow_mut().set_map_rect(MapRect::new(rect.left(), rect.top(), rect.width(), rect.height()));
        if !actions.is_empty() {
            debug!(width = rect.width(), height = rect.height(), "map rect changed");
        }
    }

    fn on_pointer_down(self: &Rc<Self>, event: &PointerEvent) {
        self.refresh_rect();
        let input = pointer_input(event);
        let actions = {
            let mut core = self.core.borrow_mut();
            let hit = hit_target(event, &core);
            core.on_pointer_down(&input, &hit)
        };
        let event: &Event = event;
        self.apply(actions, Some(event));
    }

    fn on_window_event(self: &Rc<Self>, event: &Event) {
        let actions = match (event.type_().as_str(), event.dyn_ref::<PointerEvent>()) {
            ("pointermove", Some(pointer)) => self.core.borrow_mut().on_pointer_move(&pointer_input(pointer)),
            ("pointerup", Some(pointer)) => self.core.borrow_mut().on_pointer_up(&pointer_input(pointer)),
            ("pointercancel", Some(pointer)) => self.core.borrow_mut().on_pointer_lost(&pointer_input(pointer)),
            _ => self.core.borrow_mut().on_pointer_cancel(event.time_stamp()),
        };
        self.apply(actions, Some(event));
    }

    fn attach_gesture_listeners(self: &Rc<Self>) -> Result<(), JsValue> {
        let events = ["pointermove", "pointerup", "pointercancel", "blur"];
        let listeners = events
            .into_iter()
            .map(|name| {
                let weak: Weak<Self> = Rc::downgrade(self);
                let listener: Listener = Closure::wrap(Box::new(move |event: Event| {
                    if let Some(host) = weak.upgrade() {
                        host.on_window_event(&event);
                    }
                }) as Box<dyn FnMut(Event)>);
                (name, listener)
            })
            .collect();
        let guard = ListenerGuard::attach(self.window.clone().into(), listeners)?;
        self.retired_listeners.borrow_mut().take();
        *self.gesture_listeners.borrow_mut() = Some(guard);
        Ok(())
    }

    fn detach_gesture_listeners(&self) {
        if let Some(mut guard) = self.gesture_listeners.borrow_mut().take() {
            guard.detach();
            *self.retired_listeners.borrow_mut() = Some(guard);
        }
    }

    /// Apply engine actions in order. Follow-up actions (from persistence) are queued.
    fn apply(self: &Rc<Self>, actions: Vec<Action>, event: Option<&Event>) {
        let mut queue: VecDeque<Action> = actions.into();
        let mut render = false;
        while let Some(action) = queue.pop_front() {
            match action {
                Action::AttachPointerListeners => {
                    if let Err(e) = self.attach_gesture_listeners() {
                        warn!(error = ?e, "failed to attach gesture listeners; cancelling");
                        let now = self.now_ms();
                        queue.extend(self.core.borrow_mut().on_pointer_cancel(now));
                    }
                }
                Action::DetachPointerListeners => self.detach_gesture_listeners(),
                Action::PreventDefault => {
                    if let Some(event) = event {
                        event.prevent_default();
                    }
                }
                Action::EditSensor(id) => self.call_back(&self.on_edit_sensor, &id),
                Action::SetCursor(cursor) => {
                    if let Err(e) = self.container.style().set_property("cursor", &cursor) {
                        warn!(error = ?e, "failed to set cursor");
                    }
                }
                Action::RenderNeeded => render = true,
                Action::PersistSnapshot => {
                    let snapshot = self.core.borrow().snapshot();
                    let result = save_snapshot(&mut *self.store.borrow_mut(), &snapshot);
                    queue.extend(self.core.borrow_mut().report_persist_result(result));
                }
                Action::PersistViewport(viewport) => {
                    if let Err(e) = save_viewport(&mut *self.store.borrow_mut(), &viewport) {
                        warn!(error = %e, "viewport autosave failed");
                    }
                }
                Action::Notice(message) => {
                    if self.on_notice.borrow().is_some() {
                        self.call_back(&self.on_notice, &message);
                    } else {
                        warn!(%message, "notice");
                    }
                }
            }
        }
        if render {
            self.render();
        }
    }

    fn call_back(&self, slot: &RefCell<Option<js_sys::Function>>, arg: &str) {
        let callback = slot.borrow().clone();
        if let Some(callback) = callback {
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(arg)) {
                warn!(error = ?e, "host callback threw");
            }
        }
    }

    fn render(&self) {
        let scene = self.core.borrow().scene();
        if let Err(e) = draw_scene(&self.document, &self.container, &self.layer, &self.overlay, &scene) {
            warn!(error = ?e, "map render failed");
        }
    }
}

// =============================================================
// Event normalization
// =============================================================

fn pointer_input(event: &PointerEvent) -> PointerInput {
    PointerInput {
        point: Point::new(f64::from(event.client_x()), f64::from(event.client_y())),
        button: PointerButton::from_dom(event.button()),
        kind: PointerKind::from_dom(&event.pointer_type()),
        cancelable: event.cancelable(),
        time_ms: event.time_stamp(),
        pointer_id: event.pointer_id(),
    }
}

/// Nearest `data-hit` marker at or above the event target.
fn hit_target(event: &PointerEvent, core: &SurfaceCore) -> HitTarget {
    let Some(target) = event.target() else {
        return HitTarget::Background;
    };
    let Ok(element) = target.dyn_into::<Element>() else {
        return HitTarget::Background;
    };
    let marker = match element.closest("[data-hit]") {
        Ok(Some(marker)) => marker,
        Ok(None) => return HitTarget::Background,
        Err(e) => {
            warn!(error = ?e, "hit marker lookup failed");
            return HitTarget::Background;
        }
    };
    HitTarget::from_marker(
        marker.get_attribute("data-hit").as_deref(),
        marker.get_attribute("data-sensor-id").as_deref(),
        core.visible_layout(),
    )
}

// =============================================================
// Scene drawing
// =============================================================

fn create_html(document: &Document, tag: &str, class: &str) -> Result<HtmlElement, JsValue> {
    let element = document.create_element(tag)?;
    element.set_class_name(class);
    Ok(element.dyn_into::<HtmlElement>()?)
}

fn text_element(document: &Document, tag: &str, class: &str, text: &str) -> Result<Element, JsValue> {
    let element = document.create_element(tag)?;
    element.set_class_name(class);
    element.set_text_content(Some(text));
    Ok(element)
}

fn marker_element(document: &Document, tag: &str, class: &str, role: &str, sensor_id: &str) -> Result<Element, JsValue> {
    let element = document.create_element(tag)?;
    element.set_class_name(class);
    element.set_attribute("data-hit", role)?;
    element.set_attribute("data-sensor-id", sensor_id)?;
    Ok(element)
}

fn indicator_element(document: &Document, view: &IndicatorView) -> Result<Element, JsValue> {
    let class = if view.active {
        format!("indicator {} active", view.status_class)
    } else {
        format!("indicator {}", view.status_class)
    };
    let root = marker_element(document, "div", &class, ROLE_BODY, &view.sensor_id)?;
    root.set_attribute(
        "style",
        &format!(
            "position: absolute; left: {}%; top: {}%; transform: translate(-50%, -50%) scale({});",
            view.left_pct, view.top_pct, view.scale
        ),
    )?;
    root.append_child(&text_element(document, "h4", "indicator-name", &view.name)?)?;
    root.append_child(&text_element(document, "p", "indicator-value", &view.value)?)?;
    if view.show_controls {
        let remove = marker_element(document, "button", "indicator-remove", ROLE_REMOVE, &view.sensor_id)?;
        remove.set_text_content(Some("X"));
        remove.set_attribute("title", "Remove from map")?;
        root.append_child(&remove)?;
        let resize = marker_element(document, "div", "indicator-resize", ROLE_RESIZE, &view.sensor_id)?;
        resize.set_attribute("title", "Resize")?;
        root.append_child(&resize)?;
    }
    Ok(root)
}

fn draw_scene(
    document: &Document,
    container: &HtmlElement,
    layer: &HtmlElement,
    overlay: &HtmlElement,
    scene: &Scene,
) -> Result<(), JsValue> {
    let style = layer.style();
    style.set_property("background-image", &scene.background_css)?;
    style.set_property("transform", &scene.layer_transform)?;
    container.style().set_property("cursor", scene.cursor)?;
    container.set_attribute("data-editing", if scene.editing { "true" } else { "false" })?;

    layer.set_inner_html("");
    for indicator in &scene.indicators {
        layer.append_child(&indicator_element(document, indicator)?)?;
    }

    overlay.set_inner_html("");
    if scene.editing {
        overlay.append_child(&text_element(document, "div", "map-banner", EDIT_BANNER)?)?;
    }
    if scene.show_empty_hint {
        overlay.append_child(&text_element(document, "p", "map-hint", EMPTY_HINT)?)?;
    }
    if let Some(notice) = &scene.notice {
        overlay.append_child(&text_element(document, "div", "map-notice", notice)?)?;
    }
    Ok(())
}
