// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Skeleton views.
//!
//! A [`SkeletonView`] owns one posed [`Skeleton`], the [`PoseDriver`] that
//! animates it, and the scene subtree that mirrors it. Each frame:
//!
//! 1. The requested delta time is clamped by the effective delay limit.
//! 2. The driver advances the pose. If it reports the view destroyed, the
//!    view tears itself down and the frame is aborted.
//! 3. Every slot is synchronized ([`AttachmentSynchronizer`]).
//! 4. The root's child list is rebuilt from the draw order
//!    ([`DrawOrderCompositor`]).
//!
//! Hosts then [`evaluate`](SkeletonView::evaluate) the scene and hand the
//! changes to their [`Presenter`].

use alloc::vec::Vec;

use kurbo::Size;

use crate::atlas::TextureResolver;
use crate::attachment::{Attachment, TextureRegion};
use crate::backend::Presenter;
use crate::cache::{CacheStats, DrawableCache, TeardownReport, TextureOverride};
use crate::color::{GlobalTint, Rgb};
use crate::composite::{CompositeReport, DrawOrderCompositor};
use crate::config::{ViewConfig, effective_delay_limit};
use crate::error::{LookupError, SkeletonError};
use crate::scene::{NodeId, SceneChanges, SceneTree};
use crate::skeleton::{PoseDriver, PoseStatus, Skeleton};
use crate::sync::AttachmentSynchronizer;
use crate::time::{HostTime, Timebase};
use crate::trace::{FrameAbortedEvent, FrameBeginEvent, FrameEndEvent, TeardownEvent, Tracer};

/// Identifies a slot by index or by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotRef<'a> {
    /// Slot index in definition order.
    Index(usize),
    /// Slot name.
    Name(&'a str),
}

impl From<usize> for SlotRef<'_> {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl<'a> From<&'a str> for SlotRef<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

/// Why a frame stopped before synchronizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AbortReason {
    /// The pose driver reported the view destroyed.
    DestroyedDuringPose,
    /// The view was already torn down.
    TornDown,
}

/// Why a frame did not run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The view is not visible.
    Invisible,
    /// Auto-update is off globally or for this view.
    AutoUpdateDisabled,
}

/// What a completed frame did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Delta time handed to the pose driver, in seconds.
    pub dt: f64,
    /// Slots synchronized.
    pub slots_synced: u32,
    /// Slots whose mesh or clip vertices were recomputed.
    pub geometry_updates: u32,
    /// Draw-order compositing summary.
    pub composite: CompositeReport,
}

/// Result of [`SkeletonView::update`] and [`SkeletonView::tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameOutcome {
    /// The pose was advanced and mirrored into the scene.
    Updated(FrameReport),
    /// Nothing ran.
    Skipped(SkipReason),
    /// The frame stopped early.
    Aborted(AbortReason),
}

/// Active sprites and meshes partitioned by attachment name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DrawableGroups {
    /// Drawables whose attachment name ends with the suffix.
    pub matching: Vec<NodeId>,
    /// All other active drawables.
    pub others: Vec<NodeId>,
}

#[derive(Debug)]
struct Pose<D> {
    skeleton: Skeleton,
    driver: D,
}

/// One skeleton instance mirrored into a scene subtree.
#[derive(Debug)]
pub struct SkeletonView<D> {
    pose: Option<Pose<D>>,
    scene: SceneTree,
    root: NodeId,
    cache: DrawableCache,
    synchronizer: AttachmentSynchronizer,
    compositor: DrawOrderCompositor,
    changes: SceneChanges,
    config: ViewConfig,
    local_delay_limit: Option<f64>,
    auto_update: bool,
    visible: bool,
    last_tick: Option<HostTime>,
    frame_index: u64,
}

impl<D: PoseDriver> SkeletonView<D> {
    /// Builds a view for `skeleton`.
    ///
    /// Creates the root, one container per slot in slot order, and the
    /// drawable for each slot's current attachment.
    ///
    /// # Errors
    ///
    /// Returns the first structural problem found in `skeleton`.
    pub fn new(skeleton: Skeleton, driver: D, config: ViewConfig) -> Result<Self, SkeletonError> {
        skeleton.validate()?;

        let mut scene = SceneTree::new();
        let root = scene.create_node();
        let mut cache = DrawableCache::new();
        for _ in &skeleton.slots {
            cache.push_slot(&mut scene, root);
        }

        let synchronizer = AttachmentSynchronizer::new(config.tint_mode);
        let mut tracer = Tracer::none();
        for slot in 0..skeleton.slots.len() {
            synchronizer.sync(&mut scene, &mut cache, &skeleton, slot, &mut tracer);
        }

        Ok(Self {
            pose: Some(Pose { skeleton, driver }),
            scene,
            root,
            cache,
            synchronizer,
            compositor: DrawOrderCompositor::new(),
            changes: SceneChanges::default(),
            config,
            local_delay_limit: None,
            auto_update: true,
            visible: true,
            last_tick: None,
            frame_index: 0,
        })
    }

    /// Advances the pose by `dt` seconds and mirrors it into the scene.
    ///
    /// A negative or non-finite `dt` is treated as `0.0`; the result is then
    /// clamped by [`delay_limit`](Self::delay_limit).
    pub fn update(&mut self, dt: f64) -> FrameOutcome {
        self.update_traced(dt, &mut Tracer::none())
    }

    /// Like [`update`](Self::update), reporting to `tracer`.
    pub fn update_traced(&mut self, dt: f64, tracer: &mut Tracer<'_>) -> FrameOutcome {
        let frame_index = self.frame_index;
        let limit = self.delay_limit();
        let Some(pose) = self.pose.as_mut() else {
            log::warn!("frame {frame_index}: update on a torn-down skeleton view");
            tracer.frame_aborted(&FrameAbortedEvent {
                frame_index,
                reason: AbortReason::TornDown,
            });
            return FrameOutcome::Aborted(AbortReason::TornDown);
        };
        if !self.visible {
            return FrameOutcome::Skipped(SkipReason::Invisible);
        }
        self.frame_index += 1;

        let clamped = sanitize_dt(dt).min(limit);
        tracer.frame_begin(&FrameBeginEvent {
            frame_index,
            requested_dt: dt,
            clamped_dt: clamped,
        });

        if pose.driver.advance(clamped, &mut pose.skeleton) == PoseStatus::Destroyed {
            self.teardown_traced(tracer);
            tracer.frame_aborted(&FrameAbortedEvent {
                frame_index,
                reason: AbortReason::DestroyedDuringPose,
            });
            return FrameOutcome::Aborted(AbortReason::DestroyedDuringPose);
        }

        let mut report = FrameReport {
            dt: clamped,
            ..FrameReport::default()
        };
        let slots = pose.skeleton.slots.len().min(self.cache.len());
        for slot in 0..slots {
            let result = self.synchronizer.sync(
                &mut self.scene,
                &mut self.cache,
                &pose.skeleton,
                slot,
                tracer,
            );
            report.slots_synced += 1;
            if result.geometry_updated {
                report.geometry_updates += 1;
            }
        }
        report.composite = self.compositor.composite(
            &mut self.scene,
            self.root,
            &mut self.cache,
            &pose.skeleton,
            frame_index,
            tracer,
        );

        tracer.frame_end(&FrameEndEvent {
            frame_index,
            report,
        });
        FrameOutcome::Updated(report)
    }

    /// Auto-update entry point, called once per host frame with the host's
    /// monotonic clock.
    ///
    /// The delta time is the time since the previous tick; the first tick,
    /// and the first tick after the view becomes visible, use zero. Nothing
    /// runs while auto-update is off (globally or for this view) or the view
    /// is invisible. Turning global auto-update off also forgets the previous
    /// tick.
    pub fn tick(&mut self, now: HostTime, timebase: Timebase) -> FrameOutcome {
        self.tick_traced(now, timebase, &mut Tracer::none())
    }

    /// Like [`tick`](Self::tick), reporting to `tracer`.
    pub fn tick_traced(
        &mut self,
        now: HostTime,
        timebase: Timebase,
        tracer: &mut Tracer<'_>,
    ) -> FrameOutcome {
        if !self.config.auto_update {
            self.last_tick = None;
            return FrameOutcome::Skipped(SkipReason::AutoUpdateDisabled);
        }
        if !self.auto_update {
            return FrameOutcome::Skipped(SkipReason::AutoUpdateDisabled);
        }
        if !self.visible {
            return FrameOutcome::Skipped(SkipReason::Invisible);
        }
        let last = self.last_tick.replace(now).unwrap_or(now);
        let dt = now.saturating_duration_since(last).as_secs_f64(timebase);
        self.update_traced(dt, tracer)
    }

    /// Replaces the texture region of a slot's current attachment for this
    /// view only.
    ///
    /// The override sticks to the slot and the attachment: it applies
    /// whenever that attachment is shown in that slot, until replaced or
    /// cleared. If the attachment's drawable is already visible the change
    /// is applied immediately; otherwise it is applied when the drawable is
    /// next shown. `size` replaces the attachment's declared width and
    /// height. Passing `None` as `texture` restores the attachment's own
    /// region.
    ///
    /// # Errors
    ///
    /// Fails if the slot does not exist, shows no textured attachment, or
    /// the view is torn down.
    pub fn override_slot_texture<'a>(
        &mut self,
        slot: impl Into<SlotRef<'a>>,
        texture: Option<TextureRegion>,
        size: Option<Size>,
    ) -> Result<(), LookupError> {
        let Some(pose) = self.pose.as_ref() else {
            return Err(LookupError::TornDown);
        };
        let index = resolve_slot(&pose.skeleton, slot.into())?;
        let attachment = pose.skeleton.slots[index]
            .attachment
            .clone()
            .filter(|a| a.is_textured())
            .ok_or(LookupError::NoTexturedAttachment { slot: index })?;

        let drawables = self.cache.slot_mut(index);
        let shown = match &*attachment {
            Attachment::Region(a) => drawables.current_sprite_name() == Some(&*a.name),
            Attachment::Mesh(a) => drawables.current_mesh_name() == Some(&*a.name),
            Attachment::Clip(_) => false,
        };
        drawables.texture_override = texture.map(|region| TextureOverride {
            attachment,
            region,
            size,
        });

        if shown {
            self.synchronizer.sync(
                &mut self.scene,
                &mut self.cache,
                &pose.skeleton,
                index,
                &mut Tracer::none(),
            );
        }
        Ok(())
    }

    /// Like [`override_slot_texture`](Self::override_slot_texture), looking
    /// the region up by name.
    ///
    /// # Errors
    ///
    /// Fails if `resolver` has no region named `region`, or for any reason
    /// [`override_slot_texture`](Self::override_slot_texture) fails.
    pub fn override_slot_texture_named<'a>(
        &mut self,
        slot: impl Into<SlotRef<'a>>,
        resolver: &impl TextureResolver,
        region: &str,
        size: Option<Size>,
    ) -> Result<(), LookupError> {
        let texture = resolver
            .resolve(region)
            .ok_or_else(|| LookupError::UnknownRegion(region.into()))?;
        self.override_slot_texture(slot, Some(texture), size)
    }

    /// Releases every node this view created, then the skeleton and driver.
    ///
    /// Returns `None` if the view was already torn down. Frame calls after
    /// teardown are aborted.
    pub fn teardown(&mut self) -> Option<TeardownReport> {
        self.teardown_traced(&mut Tracer::none())
    }

    /// Like [`teardown`](Self::teardown), reporting to `tracer`.
    pub fn teardown_traced(&mut self, tracer: &mut Tracer<'_>) -> Option<TeardownReport> {
        self.pose.take()?;
        let report = self.cache.release_all(&mut self.scene, tracer);
        self.scene.destroy_node(self.root);
        self.last_tick = None;
        tracer.teardown(&TeardownEvent {
            frame_index: self.frame_index,
            report,
        });
        Some(report)
    }
}

impl<D> SkeletonView<D> {
    /// Partitions the visible sprites and meshes by attachment name suffix.
    ///
    /// An empty suffix yields two empty groups.
    #[must_use]
    pub fn group_drawables_by_suffix(&self, suffix: &str) -> DrawableGroups {
        let mut groups = DrawableGroups::default();
        if suffix.is_empty() {
            return groups;
        }
        for slot in self.cache.slots() {
            if let Some((name, node)) = slot.active_drawable() {
                if name.ends_with(suffix) {
                    groups.matching.push(node);
                } else {
                    groups.others.push(node);
                }
            }
        }
        groups
    }

    /// Returns the light tint.
    #[must_use]
    pub fn tint(&self) -> Rgb {
        self.synchronizer.tint().light
    }

    /// Sets the light tint, applied from the next frame.
    pub fn set_tint(&mut self, light: Rgb) {
        let tint = self.synchronizer.tint();
        self.synchronizer.set_tint(GlobalTint { light, ..tint });
    }

    /// Returns the light tint as `0xRRGGBB`.
    #[must_use]
    pub fn tint_hex(&self) -> u32 {
        self.tint().to_hex()
    }

    /// Sets the light tint from `0xRRGGBB`.
    pub fn set_tint_hex(&mut self, hex: u32) {
        self.set_tint(Rgb::from_hex(hex));
    }

    /// Returns the dark tint used by dual-tint presenters.
    #[must_use]
    pub fn dark_tint(&self) -> Rgb {
        self.synchronizer.tint().dark
    }

    /// Sets the dark tint, applied from the next frame.
    pub fn set_dark_tint(&mut self, dark: Rgb) {
        let tint = self.synchronizer.tint();
        self.synchronizer.set_tint(GlobalTint { dark, ..tint });
    }

    /// Returns the per-view delay limit override.
    #[must_use]
    pub fn local_delay_limit(&self) -> Option<f64> {
        self.local_delay_limit
    }

    /// Overrides the configured delay limit for this view; `None` restores
    /// the configured one, `Some(0.0)` lifts the limit.
    pub fn set_local_delay_limit(&mut self, limit: Option<f64>) {
        self.local_delay_limit = limit;
    }

    /// Returns the upper bound on delta time, in seconds.
    #[must_use]
    pub fn delay_limit(&self) -> f64 {
        effective_delay_limit(self.local_delay_limit, self.config.delay_limit)
    }

    /// Returns whether [`tick`](Self::tick) advances this view.
    #[must_use]
    pub fn auto_update(&self) -> bool {
        self.auto_update
    }

    /// Enables or disables auto-update for this view.
    pub fn set_auto_update(&mut self, enabled: bool) {
        self.auto_update = enabled;
    }

    /// Returns whether the view updates at all.
    #[must_use]
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the view. Becoming visible restarts the tick clock.
    pub fn set_visible(&mut self, visible: bool) {
        if visible != self.visible {
            self.visible = visible;
            if self.pose.is_some() {
                self.scene.set_hidden(self.root, !visible);
            }
            if visible {
                self.last_tick = None;
            }
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> ViewConfig {
        self.config
    }

    /// Replaces the configuration. A changed tint mode applies from the next
    /// frame.
    pub fn set_config(&mut self, config: ViewConfig) {
        self.config = config;
        self.synchronizer.set_mode(config.tint_mode);
    }

    /// Returns the number of frames that reached the pose driver.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Returns whether the view has been torn down.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.pose.is_none()
    }

    /// Returns the skeleton, unless torn down.
    #[must_use]
    pub fn skeleton(&self) -> Option<&Skeleton> {
        self.pose.as_ref().map(|p| &p.skeleton)
    }

    /// Returns the skeleton for direct edits, unless torn down. Edits are
    /// mirrored on the next frame.
    pub fn skeleton_mut(&mut self) -> Option<&mut Skeleton> {
        self.pose.as_mut().map(|p| &mut p.skeleton)
    }

    /// Returns the pose driver, unless torn down.
    #[must_use]
    pub fn driver(&self) -> Option<&D> {
        self.pose.as_ref().map(|p| &p.driver)
    }

    /// Returns the pose driver mutably, unless torn down.
    pub fn driver_mut(&mut self) -> Option<&mut D> {
        self.pose.as_mut().map(|p| &mut p.driver)
    }

    /// Returns the scene tree.
    #[must_use]
    pub fn scene(&self) -> &SceneTree {
        &self.scene
    }

    /// Returns the root node. Stale after teardown.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the drawable cache.
    #[must_use]
    pub fn drawables(&self) -> &DrawableCache {
        &self.cache
    }

    /// Returns the drawable creation counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Evaluates the scene and returns what changed since the last call.
    pub fn evaluate(&mut self) -> SceneChanges {
        self.scene.evaluate()
    }

    /// Evaluates the scene and applies the changes to `presenter`.
    pub fn present(&mut self, presenter: &mut impl Presenter) {
        self.scene.evaluate_into(&mut self.changes);
        presenter.apply(&self.scene, &self.changes);
    }
}

fn sanitize_dt(dt: f64) -> f64 {
    if dt.is_finite() && dt > 0.0 { dt } else { 0.0 }
}

fn resolve_slot(skeleton: &Skeleton, slot: SlotRef<'_>) -> Result<usize, LookupError> {
    match slot {
        SlotRef::Index(index) if index < skeleton.slots.len() => Ok(index),
        SlotRef::Index(index) => Err(LookupError::SlotIndexOutOfRange {
            index,
            len: skeleton.slots.len(),
        }),
        SlotRef::Name(name) => skeleton
            .find_slot_index(name)
            .ok_or_else(|| LookupError::UnknownSlotName(name.into())),
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use alloc::vec;

    use kurbo::Affine;

    use super::*;
    use crate::atlas::AtlasRegions;
    use crate::color::{Color, TintMode};
    use crate::scene::Content;
    use crate::skeleton::{Bone, Slot, StaticPose};
    use crate::testing::{
        RecordingPresenter, ScriptedDriver, Step, clip_attachment, mesh_attachment, region,
        region_attachment, skeleton,
    };

    fn view(attachments: Vec<Option<Arc<Attachment>>>) -> SkeletonView<ScriptedDriver> {
        scripted(attachments, [], ViewConfig::new())
    }

    fn scripted(
        attachments: Vec<Option<Arc<Attachment>>>,
        script: impl IntoIterator<Item = Step>,
        config: ViewConfig,
    ) -> SkeletonView<ScriptedDriver> {
        SkeletonView::new(skeleton(attachments), ScriptedDriver::new(script), config).unwrap()
    }

    fn sprite_frame(view: &SkeletonView<ScriptedDriver>, slot: usize) -> kurbo::Rect {
        let node = view.drawables().slot(slot).unwrap().current_sprite().unwrap();
        match view.scene().content(node) {
            Content::Sprite { frame, .. } => *frame,
            other => panic!("expected sprite content, got {other:?}"),
        }
    }

    #[test]
    fn new_builds_containers_in_slot_order() {
        let v = view(vec![Some(region_attachment("a")), None, Some(region_attachment("c"))]);
        let containers: Vec<_> = v.drawables().slots().iter().map(|s| s.container()).collect();
        let children: Vec<_> = v.scene().children(v.root()).collect();
        assert_eq!(children, containers);
        assert_eq!(v.stats().sprites_created, 2);
        assert_eq!(v.stats().containers_created, 3);
        assert!(v.scene().is_hidden(containers[1]));
    }

    #[test]
    fn new_rejects_malformed_skeleton() {
        let skeleton = Skeleton::new(
            vec![Bone::new("root", Affine::IDENTITY)],
            vec![Slot::new("a", 4, None)],
        );
        let err = SkeletonView::new(skeleton, StaticPose, ViewConfig::new()).unwrap_err();
        assert!(matches!(
            err,
            SkeletonError::BoneOutOfRange { slot: 0, bone: 4, bones: 1 }
        ));
    }

    #[test]
    fn delay_limit_clamps_dt() {
        let mut v = scripted(vec![None], [], ViewConfig::new().with_delay_limit(0.1));
        assert!(matches!(v.update(5.0), FrameOutcome::Updated(r) if r.dt == 0.1));
        v.update(0.05);
        assert_eq!(v.driver().unwrap().dts, [0.1, 0.05]);
    }

    #[test]
    fn invalid_dt_becomes_zero() {
        let mut v = scripted(vec![None], [], ViewConfig::new().with_delay_limit(0.1));
        assert!(matches!(v.update(f64::NAN), FrameOutcome::Updated(r) if r.dt == 0.0));
        v.update(-1.0);
        v.update(f64::INFINITY);
        v.set_local_delay_limit(Some(0.0));
        v.update(f64::NAN);
        assert_eq!(v.driver().unwrap().dts, [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn zero_delay_limit_is_unlimited() {
        let mut v = view(vec![None]);
        v.update(5.0);
        assert_eq!(v.driver().unwrap().dts, [5.0]);
    }

    #[test]
    fn local_delay_limit_overrides_config() {
        let mut v = scripted(vec![None], [], ViewConfig::new().with_delay_limit(0.1));
        v.set_local_delay_limit(Some(0.5));
        assert_eq!(v.delay_limit(), 0.5);
        v.update(5.0);
        v.set_local_delay_limit(Some(0.0));
        v.update(5.0);
        v.set_local_delay_limit(None);
        v.update(5.0);
        assert_eq!(v.driver().unwrap().dts, [0.5, 5.0, 0.1]);
    }

    #[test]
    fn destroyed_during_pose_aborts_and_releases() {
        let mut v = scripted(
            vec![Some(region_attachment("a"))],
            [Step::Destroy],
            ViewConfig::new(),
        );
        assert_eq!(
            v.update(0.016),
            FrameOutcome::Aborted(AbortReason::DestroyedDuringPose)
        );
        assert!(v.is_torn_down());
        assert!(v.skeleton().is_none());
        assert_eq!(v.scene().node_count(), 0);
        assert_eq!(
            v.update(0.016),
            FrameOutcome::Aborted(AbortReason::TornDown)
        );
        assert_eq!(v.teardown(), None);
    }

    #[test]
    fn toggling_attachments_creates_one_sprite_per_name() {
        let open = region_attachment("eyes-open");
        let closed = region_attachment("eyes-closed");
        let script = (0..20).map(|i| {
            let next = if i % 2 == 0 { &closed } else { &open };
            Step::Attach(0, Some(next.clone()))
        });
        let mut v = scripted(vec![Some(open.clone())], script, ViewConfig::new());
        for _ in 0..20 {
            v.update(0.016);
        }
        assert_eq!(v.stats().sprites_created, 2);
        assert_eq!(v.drawables().slot(0).unwrap().sprite_count(), 2);
    }

    #[test]
    fn teardown_releases_every_node_once() {
        let script = [
            Step::Attach(0, Some(region_attachment("b"))),
            Step::Attach(1, Some(mesh_attachment("m2"))),
            Step::Attach(0, Some(region_attachment("a"))),
        ];
        let mut v = scripted(
            vec![
                Some(region_attachment("a")),
                Some(mesh_attachment("m1")),
                Some(clip_attachment("clip", None)),
                Some(region_attachment("c")),
            ],
            script,
            ViewConfig::new(),
        );
        v.skeleton_mut().unwrap().draw_order = vec![0, 2, 1, 3];
        for _ in 0..3 {
            v.update(0.016);
        }
        let mut presenter = RecordingPresenter::default();
        v.present(&mut presenter);
        let live = presenter.live;

        let stats = v.stats();
        let report = v.teardown().unwrap();
        assert_eq!(report.sprites, stats.sprites_created);
        assert_eq!(report.meshes, stats.meshes_created);
        assert_eq!(report.clip_nodes, stats.clips_created * 2);
        assert_eq!(report.placeholders, stats.placeholders_created);
        assert_eq!(report.containers, stats.containers_created);
        assert_eq!(report.total() as usize + 1, live, "plus the root");

        v.present(&mut presenter);
        assert_eq!(presenter.removed, live);
        assert_eq!(presenter.live, 0);
    }

    fn composite_frame(view: &mut SkeletonView<ScriptedDriver>) -> CompositeReport {
        match view.update(0.016) {
            FrameOutcome::Updated(report) => report.composite,
            other => panic!("expected an updated frame, got {other:?}"),
        }
    }

    #[test]
    fn clip_grouping_follows_draw_order_each_frame() {
        let script = [
            Step::DrawOrder(vec![0, 1, 2, 3]),
            Step::DrawOrder(vec![1, 0, 2, 3]),
            Step::DrawOrder(vec![3, 0, 1, 2]),
            Step::DrawOrder(vec![0, 1, 2, 3]),
        ];
        let mut v = scripted(
            vec![
                Some(clip_attachment("clip", Some(3))),
                Some(region_attachment("a")),
                Some(region_attachment("b")),
                Some(region_attachment("d")),
            ],
            script,
            ViewConfig::new(),
        );
        let container = |v: &SkeletonView<ScriptedDriver>, i: usize| {
            v.drawables().slot(i).unwrap().container()
        };
        let clip = v.drawables().slot(0).unwrap().clip().unwrap().container;
        let [c0, c1, c2, c3] = [0, 1, 2, 3].map(|i| container(&v, i));

        // The clip groups every following slot up to and including `d`.
        let report = composite_frame(&mut v);
        assert_eq!((report.scopes_closed, report.placeholders), (1, 3));
        assert_eq!(v.scene().children(clip).collect::<Vec<_>>(), [c1, c2, c3]);

        // `a` moves in front of the clip and returns to top level.
        let report = composite_frame(&mut v);
        assert_eq!((report.scopes_closed, report.placeholders), (1, 2));
        let top: Vec<_> = v.scene().children(v.root()).collect();
        assert_eq!(top.len(), 4, "one child per slot");
        assert_eq!(top[..2], [c1, c0]);
        assert!(top[2..].iter().all(|&n| v.scene().is_hidden(n)));
        assert_eq!(v.scene().children(clip).collect::<Vec<_>>(), [c2, c3]);

        // The end slot comes first, so the scope never closes.
        let report = composite_frame(&mut v);
        assert!(report.unterminated);
        assert_eq!(report.scopes_closed, 0);
        assert_eq!(v.scene().parent(c3), Some(v.root()));
        assert_eq!(v.scene().children(clip).collect::<Vec<_>>(), [c1, c2]);

        // Restoring the order closes the scope again.
        let report = composite_frame(&mut v);
        assert!(!report.unterminated);
        assert_eq!(report.scopes_closed, 1);
        assert_eq!(v.scene().children(clip).collect::<Vec<_>>(), [c1, c2, c3]);
        assert_eq!(v.scene().children(v.root()).count(), 4);
    }

    #[test]
    fn pending_override_applies_at_creation() {
        let hat = region_attachment("hat");
        let mut v = view(vec![None]);
        v.skeleton_mut().unwrap().slots[0].attachment = Some(hat);
        v.override_slot_texture(0_usize, Some(region("cap")), None).unwrap();
        assert!(v.drawables().slot(0).unwrap().current_sprite().is_none());

        v.update(0.0);
        assert_eq!(v.stats().sprites_created, 1);
        assert_eq!(sprite_frame(&v, 0), region("cap").frame);
    }

    #[test]
    fn override_on_visible_sprite_applies_now_and_persists() {
        let mut v = view(vec![Some(region_attachment("hat"))]);
        v.override_slot_texture("s0", Some(region("cap")), None).unwrap();
        assert_eq!(sprite_frame(&v, 0), region("cap").frame);

        v.update(0.016);
        assert_eq!(sprite_frame(&v, 0), region("cap").frame);

        v.override_slot_texture(0_usize, None, None).unwrap();
        assert_eq!(sprite_frame(&v, 0), region("hat").frame);
    }

    fn mesh_content(view: &SkeletonView<ScriptedDriver>, slot: usize) -> (kurbo::Rect, Vec<f32>) {
        let node = view.drawables().slot(slot).unwrap().current_mesh().unwrap();
        match view.scene().content(node) {
            Content::Mesh {
                frame, vertices, ..
            } => (*frame, vertices.clone()),
            other => panic!("expected mesh content, got {other:?}"),
        }
    }

    #[test]
    fn override_on_visible_mesh_keeps_vertices() {
        let mut v = view(vec![Some(mesh_attachment("cape"))]);
        v.override_slot_texture(0_usize, Some(region("cloth")), None).unwrap();
        let (frame, vertices) = mesh_content(&v, 0);
        assert_eq!(frame, region("cloth").frame);
        // First vertex (0, 0) under the bone at (10, 20).
        assert_eq!(vertices[..2], [10.0, 20.0]);

        v.update(0.016);
        let (frame, vertices) = mesh_content(&v, 0);
        assert_eq!(frame, region("cloth").frame);
        assert_eq!(vertices[..2], [10.0, 20.0]);
        assert_eq!(v.stats().meshes_created, 1);
    }

    #[test]
    fn pending_mesh_override_applies_at_creation() {
        let mut v = view(vec![None]);
        v.skeleton_mut().unwrap().slots[0].attachment = Some(mesh_attachment("cape"));
        v.override_slot_texture(0_usize, Some(region("cloth")), None).unwrap();
        assert!(v.drawables().slot(0).unwrap().current_mesh().is_none());

        v.update(0.0);
        assert_eq!(v.stats().meshes_created, 1);
        let (frame, vertices) = mesh_content(&v, 0);
        assert_eq!(frame, region("cloth").frame);
        assert_eq!(vertices.len(), 8);
        assert_eq!(vertices[2..4], [20.0, 20.0]);
    }

    #[test]
    fn override_with_atlas_lookup() {
        let atlas: AtlasRegions = [region("cap")].into_iter().collect();
        let mut v = view(vec![Some(region_attachment("hat"))]);
        v.override_slot_texture_named(0_usize, &atlas, "cap", Some(Size::new(64.0, 32.0)))
            .unwrap();
        assert_eq!(sprite_frame(&v, 0), region("cap").frame);
        assert_eq!(
            v.override_slot_texture_named(0_usize, &atlas, "visor", None),
            Err(LookupError::UnknownRegion("visor".into()))
        );
    }

    #[test]
    fn override_lookup_failures() {
        let mut v = view(vec![None, Some(clip_attachment("clip", None))]);
        assert_eq!(
            v.override_slot_texture(5_usize, None, None),
            Err(LookupError::SlotIndexOutOfRange { index: 5, len: 2 })
        );
        assert_eq!(
            v.override_slot_texture("nope", None, None),
            Err(LookupError::UnknownSlotName("nope".into()))
        );
        assert_eq!(
            v.override_slot_texture(0_usize, None, None),
            Err(LookupError::NoTexturedAttachment { slot: 0 })
        );
        assert_eq!(
            v.override_slot_texture(1_usize, None, None),
            Err(LookupError::NoTexturedAttachment { slot: 1 })
        );
        v.teardown();
        assert_eq!(
            v.override_slot_texture(0_usize, None, None),
            Err(LookupError::TornDown)
        );
    }

    #[test]
    fn invisible_view_skips_updates() {
        let mut v = view(vec![None]);
        v.set_visible(false);
        assert_eq!(v.update(0.1), FrameOutcome::Skipped(SkipReason::Invisible));
        assert!(v.driver().unwrap().dts.is_empty());
        assert_eq!(v.frame_index(), 0);
    }

    #[test]
    fn tick_derives_dt_from_host_time() {
        let mut v = view(vec![None]);
        v.tick(HostTime(1_000), Timebase::MILLIS);
        v.tick(HostTime(1_250), Timebase::MILLIS);
        let dts = &v.driver().unwrap().dts;
        assert_eq!(dts.len(), 2);
        assert_eq!(dts[0], 0.0, "first tick has no previous time");
        assert!((dts[1] - 0.25).abs() < 1e-9);
    }

    #[test]
    fn becoming_visible_restarts_tick_clock() {
        let mut v = view(vec![None]);
        v.tick(HostTime(0), Timebase::MILLIS);
        v.set_visible(false);
        assert_eq!(
            v.tick(HostTime(500), Timebase::MILLIS),
            FrameOutcome::Skipped(SkipReason::Invisible)
        );
        v.set_visible(true);
        v.tick(HostTime(9_000), Timebase::MILLIS);
        assert_eq!(v.driver().unwrap().dts, [0.0, 0.0]);
    }

    #[test]
    fn global_auto_update_off_skips_and_forgets() {
        let mut v = scripted(vec![None], [], ViewConfig::new().with_auto_update(false));
        assert_eq!(
            v.tick(HostTime(100), Timebase::MILLIS),
            FrameOutcome::Skipped(SkipReason::AutoUpdateDisabled)
        );
        v.set_config(ViewConfig::new());
        v.tick(HostTime(5_000), Timebase::MILLIS);
        assert_eq!(v.driver().unwrap().dts, [0.0]);

        v.set_auto_update(false);
        assert_eq!(
            v.tick(HostTime(6_000), Timebase::MILLIS),
            FrameOutcome::Skipped(SkipReason::AutoUpdateDisabled)
        );
        assert_eq!(v.update(0.5), FrameOutcome::Updated(FrameReport {
            dt: 0.5,
            slots_synced: 1,
            ..FrameReport::default()
        }));
    }

    #[test]
    fn suffix_groups_split_active_drawables() {
        let v = view(vec![
            Some(region_attachment("arm-glow")),
            Some(mesh_attachment("body")),
            None,
            Some(region_attachment("eye-glow")),
        ]);
        let groups = v.group_drawables_by_suffix("-glow");
        let slot = |i: usize| v.drawables().slot(i).unwrap();
        assert_eq!(
            groups.matching,
            [
                slot(0).current_sprite().unwrap(),
                slot(3).current_sprite().unwrap()
            ]
        );
        assert_eq!(groups.others, [slot(1).current_mesh().unwrap()]);
        assert_eq!(v.group_drawables_by_suffix(""), DrawableGroups::default());
    }

    #[test]
    fn tint_applies_on_next_frame() {
        let mut v = view(vec![Some(region_attachment("a"))]);
        v.set_tint_hex(0xff8000);
        assert_eq!(v.tint_hex(), 0xff8000);
        v.update(0.0);
        let node = v.drawables().slot(0).unwrap().current_sprite().unwrap();
        assert_eq!(v.scene().paint(node).tint.to_hex(), 0xff8000);
    }

    #[test]
    fn dual_tint_sets_dark_channel() {
        let mut v = scripted(
            vec![Some(region_attachment("a"))],
            [],
            ViewConfig::new().with_tint_mode(TintMode::Dual),
        );
        v.skeleton_mut().unwrap().slots[0].color = Color::WHITE;
        v.set_dark_tint(Rgb::new(0.2, 0.2, 0.2));
        v.update(0.0);
        let node = v.drawables().slot(0).unwrap().current_sprite().unwrap();
        let paint = v.scene().paint(node);
        assert_eq!(paint.tint, Rgb::WHITE);
        assert_eq!(paint.dark, Some(Rgb::new(0.2, 0.2, 0.2)));
    }

    #[test]
    fn present_replays_scene_changes() {
        let mut v = view(vec![Some(region_attachment("a")), Some(region_attachment("b"))]);
        let mut presenter = RecordingPresenter::default();
        v.present(&mut presenter);
        assert_eq!(presenter.added, v.scene().node_count());

        v.update(0.0);
        v.present(&mut presenter);
        assert_eq!(presenter.frames, 2);
        assert_eq!(presenter.added, v.scene().node_count());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn frame_events_report_clamping_and_teardown() {
        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Sink {
            begins: Vec<(f64, f64)>,
            aborted: Vec<AbortReason>,
            teardowns: usize,
        }
        impl TraceSink for Sink {
            fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
                self.begins.push((e.requested_dt, e.clamped_dt));
            }
            fn on_frame_aborted(&mut self, e: &FrameAbortedEvent) {
                self.aborted.push(e.reason);
            }
            fn on_teardown(&mut self, _e: &TeardownEvent) {
                self.teardowns += 1;
            }
        }

        let mut v = scripted(
            vec![None],
            [Step::Attach(0, None), Step::Destroy],
            ViewConfig::new().with_delay_limit(0.25),
        );
        let mut sink = Sink::default();
        let mut tracer = Tracer::new(&mut sink);
        v.update_traced(1.0, &mut tracer);
        v.update_traced(0.1, &mut tracer);
        drop(tracer);
        assert_eq!(sink.begins, [(1.0, 0.25), (0.1, 0.1)]);
        assert_eq!(sink.aborted, [AbortReason::DestroyedDuringPose]);
        assert_eq!(sink.teardowns, 1);
    }
}
