//! Resolved, paint-ordered view of the store.

use crate::drawable::{Drawable, resolve};
use crate::handles::SelectionOverlay;
use crate::images::ImageCache;
use designkit_core::CanvasStore;
use designkit_core::object::CanvasObject;
use kurbo::{Point, Rect};

/// Extra reach around strokes when hit testing, in pixels.
pub const HIT_TOLERANCE: f64 = 3.0;

/// Every drawable object, back to front.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    drawables: Vec<Drawable>,
    /// Store revision this scene was built from.
    revision: u64,
}

impl Scene {
    /// Resolve the store's collection. Objects that cannot be drawn are skipped.
    pub fn build(store: &CanvasStore, images: &ImageCache) -> Self {
        let mut scene = Self::from_objects(store.objects(), images);
        scene.revision = store.revision();
        scene
    }

    /// Resolve a plain object list.
    pub fn from_objects(objects: &[CanvasObject], images: &ImageCache) -> Self {
        let drawables: Vec<Drawable> = objects.iter().filter_map(|o| resolve(o, images)).collect();
        if drawables.len() < objects.len() {
            log::debug!(
                "Scene skipped {} of {} objects",
                objects.len() - drawables.len(),
                objects.len()
            );
        }
        Self {
            drawables,
            revision: 0,
        }
    }

    pub fn drawables(&self) -> &[Drawable] {
        &self.drawables
    }

    pub fn get(&self, id: &str) -> Option<&Drawable> {
        self.drawables.iter().find(|d| d.id == id)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    /// The topmost object under a canvas point.
    pub fn hit_test(&self, point: Point) -> Option<&Drawable> {
        self.drawables
            .iter()
            .rev()
            .find(|d| d.contains(point, HIT_TOLERANCE))
    }

    /// Overlay for the selected object. None when nothing is selected or the
    /// selected id no longer resolves to a drawable.
    pub fn selection_overlay(&self, selection: Option<&str>) -> Option<SelectionOverlay> {
        selection
            .and_then(|id| self.get(id))
            .map(SelectionOverlay::new)
    }

    /// Union of all painted bounds in canvas coordinates.
    pub fn bounds(&self) -> Option<Rect> {
        self.drawables
            .iter()
            .map(Drawable::world_bounds)
            .reduce(|a, b| a.union(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use designkit_core::object::ShapeKind;

    fn store() -> CanvasStore {
        let mut store = CanvasStore::new();
        store.add_object(CanvasObject::shape("back", ShapeKind::Rectangle, 0.0, 0.0));
        store.add_object(CanvasObject::shape("front", ShapeKind::Rectangle, 50.0, 50.0));
        store.add_object(CanvasObject::shape("mystery", ShapeKind::Unknown, 0.0, 0.0));
        store
    }

    #[test]
    fn test_build_skips_undrawable() {
        let store = store();
        let scene = Scene::build(&store, &ImageCache::new());
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.revision(), store.revision());
    }

    #[test]
    fn test_hit_test_topmost_first() {
        let scene = Scene::build(&store(), &ImageCache::new());
        assert_eq!(scene.hit_test(Point::new(75.0, 75.0)).unwrap().id, "front");
        assert_eq!(scene.hit_test(Point::new(25.0, 25.0)).unwrap().id, "back");
        assert!(scene.hit_test(Point::new(500.0, 500.0)).is_none());
    }

    #[test]
    fn test_overlay_follows_selection() {
        let mut store = store();
        let images = ImageCache::new();

        let scene = Scene::build(&store, &images);
        assert!(scene.selection_overlay(store.selection()).is_none());

        store.select(Some("front".to_string()));
        let overlay = scene.selection_overlay(store.selection()).unwrap();
        assert_eq!(overlay.id, "front");

        // Dangling selection detaches the overlay
        store.remove_object("back");
        store.select(Some("back".to_string()));
        let scene = Scene::build(&store, &images);
        assert!(scene.selection_overlay(store.selection()).is_none());
    }

    #[test]
    fn test_bounds_union() {
        let scene = Scene::build(&store(), &ImageCache::new());
        assert_eq!(scene.bounds(), Some(Rect::new(-1.0, -1.0, 151.0, 151.0)));
        assert_eq!(Scene::default().bounds(), None);
    }
}
