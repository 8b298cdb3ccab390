use eframe::egui::{Pos2, Rect, Vec2};

pub(in crate::app) const MIN_ZOOM: f32 = 0.05;
pub(in crate::app) const MAX_ZOOM: f32 = 6.0;
pub(in crate::app) const FIT_PADDING: f32 = 80.0;
const FOCUS_ZOOM: f32 = 1.2;
const ANIMATION_SECS: f64 = 0.3;

struct CameraAnimation {
    from_pan: Vec2,
    from_zoom: f32,
    to_pan: Vec2,
    to_zoom: f32,
    started_at: f64,
}

/// Screen = viewport center + pan + world * zoom.
pub(in crate::app) struct Camera {
    pub(in crate::app) pan: Vec2,
    pub(in crate::app) zoom: f32,
    animation: Option<CameraAnimation>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            animation: None,
        }
    }
}

impl Camera {
    pub(in crate::app) fn world_to_screen(&self, rect: Rect, world: Vec2) -> Pos2 {
        rect.center() + self.pan + world * self.zoom
    }

    pub(in crate::app) fn screen_to_world(&self, rect: Rect, screen: Pos2) -> Vec2 {
        (screen - rect.center() - self.pan) / self.zoom
    }

    pub(in crate::app) fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Keeps the world point under `pointer` fixed while scaling.
    pub(in crate::app) fn zoom_around(&mut self, rect: Rect, pointer: Pos2, factor: f32) {
        self.animation = None;
        let world_before = self.screen_to_world(rect, pointer);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn pan_by(&mut self, delta: Vec2) {
        self.animation = None;
        self.pan += delta;
    }

    /// Shows the whole `(min, max)` world box inside `viewport` with `padding` on each side.
    pub(in crate::app) fn fit(&mut self, bounds: (Vec2, Vec2), viewport: Vec2, padding: f32) {
        let (min, max) = bounds;
        let span = (max - min).max(Vec2::splat(1.0));
        let room = (viewport - Vec2::splat(padding * 2.0)).max(Vec2::splat(1.0));

        self.animation = None;
        self.zoom = (room.x / span.x).min(room.y / span.y).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = -((min + max) * 0.5) * self.zoom;
    }

    /// Starts a short glide that centers `world`. Zoom only ever grows here.
    pub(in crate::app) fn focus_on(&mut self, world: Vec2, now: f64) {
        let to_zoom = self.zoom.max(FOCUS_ZOOM);
        self.animation = Some(CameraAnimation {
            from_pan: self.pan,
            from_zoom: self.zoom,
            to_pan: -world * to_zoom,
            to_zoom,
            started_at: now,
        });
    }

    /// Advances a running glide. Returns whether another frame is needed.
    pub(in crate::app) fn tick(&mut self, now: f64) -> bool {
        let Some(animation) = &self.animation else {
            return false;
        };

        let t = ((now - animation.started_at) / ANIMATION_SECS).clamp(0.0, 1.0) as f32;
        let eased = 1.0 - (1.0 - t) * (1.0 - t);
        self.zoom = animation.from_zoom + (animation.to_zoom - animation.from_zoom) * eased;
        self.pan = animation.from_pan + (animation.to_pan - animation.from_pan) * eased;

        if t >= 1.0 {
            self.animation = None;
            return false;
        }
        true
    }
}
