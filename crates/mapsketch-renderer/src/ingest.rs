//! Commits shapes completed in the engine's sketch into the active layer.

use mapsketch_core::{Feature, LayerId, LayerStore, Notice, Notifier};

use crate::engine::DrawingEngine;

/// Message shown when a shape is drawn with no layer to receive it.
pub const NO_ACTIVE_LAYER_MESSAGE: &str = "Please create and select a layer first.";

/// What happened to a completed sketch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Stored in the layer; the sketch was cleared.
    Committed(LayerId),
    /// No active layer. The user was warned and the sketch cleared.
    RejectedNoActiveLayer,
    /// Geometry missing or unusable. Logged only; nothing else touched.
    DiscardedInvalid,
    /// Arrived after the surface was torn down; ignored.
    Detached,
}

/// Handle the engine's "shape completed" event.
///
/// An active pointer that no longer resolves to a layer counts as unset.
pub fn on_shape_completed<E: DrawingEngine + ?Sized>(
    store: &mut LayerStore,
    engine: &mut E,
    notifier: &mut dyn Notifier,
    feature: Feature,
) -> IngestOutcome {
    let Some((layer_id, color)) = store.active_layer().map(|l| (l.id, l.color)) else {
        log::warn!("Shape completed with no active layer; discarding sketch");
        notifier.notify(Notice::warning(NO_ACTIVE_LAYER_MESSAGE));
        engine.clear_sketch();
        return IngestOutcome::RejectedNoActiveLayer;
    };

    if !feature.has_valid_geometry() {
        log::error!("Invalid feature drawn: {:?}", feature);
        return IngestOutcome::DiscardedInvalid;
    }

    store.add_feature_to_layer(layer_id, feature.stamped(color));
    // The committed copy comes back through the render pass.
    engine.clear_sketch();
    IngestOutcome::Committed(layer_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingEngine;
    use mapsketch_core::{Geometry, LayerColor, NoticeLog, Point, Severity};

    fn triangle() -> Feature {
        Feature::new(Geometry::Polygon(vec![vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(0.0, 0.0),
        ]]))
    }

    #[test]
    fn test_commit_into_active_layer() {
        let mut store = LayerStore::new();
        let other = store.add_layer("Other", None);
        let active = store.add_layer("Active", Some(LayerColor::rgb(9, 9, 9)));
        let mut engine = RecordingEngine::default();
        let mut notices = NoticeLog::new();

        let outcome = on_shape_completed(&mut store, &mut engine, &mut notices, triangle());

        assert_eq!(outcome, IngestOutcome::Committed(active));
        assert_eq!(store.layer(active).unwrap().feature_count(), 1);
        assert_eq!(store.layer(other).unwrap().feature_count(), 0);
        assert_eq!(
            store.layer(active).unwrap().features[0].stamped_color(),
            Some(LayerColor::rgb(9, 9, 9))
        );
        assert_eq!(engine.sketch_clears, 1);
        assert!(notices.notices().is_empty());
    }

    #[test]
    fn test_no_active_layer_warns_and_clears() {
        let mut store = LayerStore::new();
        let kept = store.add_layer("Kept", None);
        store.add_feature_to_layer(kept, triangle());
        let temp = store.add_layer("Temp", None);
        store.remove_layer(temp);
        assert!(store.active_layer_id().is_none());

        let mut engine = RecordingEngine::default();
        let mut notices = NoticeLog::new();
        let outcome = on_shape_completed(&mut store, &mut engine, &mut notices, triangle());

        assert_eq!(outcome, IngestOutcome::RejectedNoActiveLayer);
        assert_eq!(store.feature_count(), 1);
        assert_eq!(engine.sketch_clears, 1);
        assert_eq!(notices.notices().len(), 1);
        assert_eq!(notices.notices()[0].severity, Severity::Warning);
    }

    #[test]
    fn test_dangling_active_pointer_counts_as_unset() {
        let mut store = LayerStore::new();
        store.add_layer("A", None);
        store.set_active_layer(LayerId::new_v4());

        let mut engine = RecordingEngine::default();
        let mut notices = NoticeLog::new();
        let outcome = on_shape_completed(&mut store, &mut engine, &mut notices, triangle());
        assert_eq!(outcome, IngestOutcome::RejectedNoActiveLayer);
        assert_eq!(store.feature_count(), 0);
    }

    #[test]
    fn test_invalid_geometry_is_silent() {
        let mut store = LayerStore::new();
        store.add_layer("A", None);
        let mut engine = RecordingEngine::default();
        let mut notices = NoticeLog::new();

        let mut broken = triangle();
        broken.geometry = None;
        let outcome = on_shape_completed(&mut store, &mut engine, &mut notices, broken);

        assert_eq!(outcome, IngestOutcome::DiscardedInvalid);
        assert_eq!(store.feature_count(), 0);
        assert_eq!(engine.sketch_clears, 0);
        assert!(notices.notices().is_empty());
    }
}
