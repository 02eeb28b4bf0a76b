//! Smooth path generation for G-code export.
//!
//! # Overview
//!
//! The ordering core hands raw extrusion entities (open paths, closed loops,
//! collections) to a [`PathSmoother`] strategy, which turns each one into a
//! [`SmoothPath`]: an ordered run of straight segments and fitted arcs that
//! the G-code writer can emit directly. The smoother owns two decisions that
//! depend on the travel cursor:
//!
//! - where to cut a closed loop open (the seam vertex nearest the cursor)
//! - the cursor update itself: after smoothing, the cursor sits at the
//!   smoothed path's endpoint
//!
//! Degenerate input yields an empty path, which callers skip. Consecutive
//! output points are kept farther apart than [`MIN_GCODE_SEGMENT_LENGTH`]
//! except possibly the final pair, which always preserves the endpoint.
//!
//! # Reference
//!
//! - `src/libslic3r/GCode/SmoothPath.hpp` - smooth path representation
//! - `src/libslic3r/GCodeProcessor.cpp` - arc fitting logic

use crate::extrusion::{ExtrusionAttributes, ExtrusionEntity, ExtrusionEntityReference};
use crate::gcode::extrusion_order::InstancePoint;
use crate::geometry::{lerp, Point, PointF};
use crate::print::Layer;
use crate::{Coord, CoordF, SCALING_FACTOR};
use serde::{Deserialize, Serialize};

/// Minimum G-code segment length in mm. Smoothing collapses any interior
/// segment shorter than this.
pub const MIN_GCODE_SEGMENT_LENGTH: CoordF = 0.002;

/// Scaled form of [`MIN_GCODE_SEGMENT_LENGTH`].
pub const SCALED_MIN_GCODE_SEGMENT_LENGTH: Coord =
    (MIN_GCODE_SEGMENT_LENGTH * SCALING_FACTOR) as Coord;

/// Direction of a fitted arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArcDirection {
    /// Clockwise arc (G2).
    Clockwise,
    /// Counter-clockwise arc (G3).
    CounterClockwise,
}

/// A circular arc fitted to a run of path points.
///
/// All coordinates and the radius are in scaled units; the angle is in
/// radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedArc {
    /// Start point of the arc.
    pub start: Point,

    /// End point of the arc.
    pub end: Point,

    /// Center of the fitted circle.
    pub center: Point,

    /// Radius in scaled units.
    pub radius: CoordF,

    /// Swept angle in radians, always positive.
    pub angle: CoordF,

    /// Traversal direction.
    pub direction: ArcDirection,
}

impl FittedArc {
    /// Arc length in scaled units.
    pub fn length(&self) -> CoordF {
        self.radius * self.angle
    }

    /// The point reached after sweeping the given angle from the start.
    pub fn point_at_angle(&self, swept: CoordF) -> Point {
        let cx = self.center.x as CoordF;
        let cy = self.center.y as CoordF;
        let start_angle = (self.start.y as CoordF - cy).atan2(self.start.x as CoordF - cx);
        let angle = match self.direction {
            ArcDirection::CounterClockwise => start_angle + swept,
            ArcDirection::Clockwise => start_angle - swept,
        };
        Point::new(
            (cx + self.radius * angle.cos()).round() as Coord,
            (cy + self.radius * angle.sin()).round() as Coord,
        )
    }
}

/// One element of a smooth path: a straight segment run or a fitted arc,
/// both carrying the source entity's extrusion attributes.
///
/// Consecutive elements share their boundary point: an element's geometry
/// starts where the previous element ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SmoothPathElement {
    /// A run of straight segments.
    Line {
        attributes: ExtrusionAttributes,
        points: Vec<Point>,
    },
    /// A fitted circular arc.
    Arc {
        attributes: ExtrusionAttributes,
        arc: FittedArc,
    },
}

impl SmoothPathElement {
    /// The extrusion attributes governing this element.
    pub fn attributes(&self) -> ExtrusionAttributes {
        match self {
            SmoothPathElement::Line { attributes, .. } => *attributes,
            SmoothPathElement::Arc { attributes, .. } => *attributes,
        }
    }

    /// First point of the element's geometry.
    pub fn first_point(&self) -> Option<Point> {
        match self {
            SmoothPathElement::Line { points, .. } => points.first().copied(),
            SmoothPathElement::Arc { arc, .. } => Some(arc.start),
        }
    }

    /// Last point of the element's geometry.
    pub fn last_point(&self) -> Option<Point> {
        match self {
            SmoothPathElement::Line { points, .. } => points.last().copied(),
            SmoothPathElement::Arc { arc, .. } => Some(arc.end),
        }
    }

    /// Length of the element's geometry in scaled units.
    pub fn length(&self) -> CoordF {
        match self {
            SmoothPathElement::Line { points, .. } => points
                .windows(2)
                .map(|pair| pair[0].distance(&pair[1]))
                .sum(),
            SmoothPathElement::Arc { arc, .. } => arc.length(),
        }
    }

    /// Whether the element draws nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            SmoothPathElement::Line { points, .. } => points.len() < 2,
            SmoothPathElement::Arc { .. } => false,
        }
    }
}

/// A smoothed extrusion path ready for G-code emission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmoothPath {
    /// Path elements in print order.
    pub elements: Vec<SmoothPathElement>,
}

impl SmoothPath {
    /// Create an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the path draws nothing.
    pub fn is_empty(&self) -> bool {
        self.elements.iter().all(|e| e.is_empty())
    }

    /// First point of the path.
    pub fn first_point(&self) -> Option<Point> {
        self.elements.iter().find_map(|e| e.first_point())
    }

    /// Last point of the path.
    pub fn last_point(&self) -> Option<Point> {
        self.elements.iter().rev().find_map(|e| e.last_point())
    }

    /// Total length in scaled units.
    pub fn length(&self) -> CoordF {
        self.elements.iter().map(|e| e.length()).sum()
    }

    /// Append an element, dropping empty ones.
    pub fn push(&mut self, element: SmoothPathElement) {
        if !element.is_empty() {
            self.elements.push(element);
        }
    }

    /// Remove the given length (scaled units) from the end of the path.
    ///
    /// Used by the writer to wipe before a retraction. A partial trailing
    /// segment shorter than [`MIN_GCODE_SEGMENT_LENGTH`] is removed entirely
    /// rather than emitted.
    pub fn clip_end(&mut self, clip: CoordF) {
        let min = SCALED_MIN_GCODE_SEGMENT_LENGTH as CoordF;
        let mut remaining = clip;
        while remaining > 0.0 && !self.elements.is_empty() {
            let mut drop_last = false;
            if let Some(element) = self.elements.last_mut() {
                match element {
                    SmoothPathElement::Line { points, .. } => {
                        while points.len() >= 2 && remaining > 0.0 {
                            let n = points.len();
                            let segment = points[n - 2].distance(&points[n - 1]);
                            if segment <= remaining {
                                remaining -= segment;
                                points.pop();
                            } else {
                                let kept = segment - remaining;
                                remaining = 0.0;
                                if kept >= min {
                                    points[n - 1] =
                                        lerp(points[n - 2], points[n - 1], kept / segment);
                                } else {
                                    points.pop();
                                }
                            }
                        }
                        drop_last = points.len() < 2;
                    }
                    SmoothPathElement::Arc { arc, .. } => {
                        let length = arc.length();
                        if length <= remaining {
                            remaining -= length;
                            drop_last = true;
                        } else {
                            let kept = length - remaining;
                            remaining = 0.0;
                            if kept >= min && arc.radius > 0.0 {
                                let angle = kept / arc.radius;
                                arc.end = arc.point_at_angle(angle);
                                arc.angle = angle;
                            } else {
                                drop_last = true;
                            }
                        }
                    }
                }
            }
            if drop_last {
                self.elements.pop();
            }
        }
    }
}

/// Strategy turning an extrusion entity into a [`SmoothPath`].
///
/// Implementations own the travel cursor: they cut closed loops at the seam
/// vertex nearest `previous_position` and leave the cursor at the smoothed
/// path's endpoint. All coordinates are instance-space.
pub trait PathSmoother {
    /// Smooth one entity for the given layer and extruder.
    fn smooth(
        &self,
        layer: &Layer,
        entity: ExtrusionEntityReference<'_>,
        extruder_id: u32,
        previous_position: &mut Option<InstancePoint>,
    ) -> SmoothPath;
}

/// The traversal-order points of one leaf entity: open paths follow the
/// stored orientation (reversed when flipped), closed loops are cut open at
/// the vertex nearest the cursor.
fn traversal_points(
    leaf: &ExtrusionEntityReference<'_>,
    previous_position: &Option<InstancePoint>,
) -> Option<(Vec<Point>, ExtrusionAttributes)> {
    match leaf.entity() {
        ExtrusionEntity::Path(path) => {
            if path.is_empty() {
                return None;
            }
            let mut points: Vec<Point> = path.polyline.to_vec();
            if leaf.flipped() {
                points.reverse();
            }
            Some((points, path.attributes))
        }
        ExtrusionEntity::Loop(l) => {
            if l.is_empty() {
                return None;
            }
            let seam = previous_position
                .as_ref()
                .and_then(|cursor| l.polygon.nearest_point_index(&cursor.0))
                .unwrap_or(0);
            let mut points: Vec<Point> = l.polygon.split_at_index(seam).to_vec();
            if leaf.flipped() {
                points.reverse();
            }
            Some((points, l.attributes))
        }
        // flatten() never yields collections
        ExtrusionEntity::Collection { .. } => None,
    }
}

/// Collapse interior points closer than `min_segment` (scaled units) to
/// their predecessor. The endpoint always survives, so the final pair may
/// be shorter than the tolerance.
fn decimate(points: &[Point], min_segment: CoordF) -> Vec<Point> {
    if points.len() < 2 {
        return Vec::new();
    }
    let mut kept = Vec::with_capacity(points.len());
    kept.push(points[0]);
    let mut last = points[0];
    for &p in &points[1..points.len() - 1] {
        if last.distance(&p) >= min_segment {
            kept.push(p);
            last = p;
        }
    }
    let end = points[points.len() - 1];
    if end != last {
        kept.push(end);
    }
    if kept.len() < 2 {
        return Vec::new();
    }
    kept
}

/// Default smoothing strategy: collapses sub-tolerance segments and emits
/// one straight-segment run per leaf entity.
#[derive(Debug, Clone)]
pub struct DecimationSmoother {
    /// Minimum surviving segment length in mm.
    pub tolerance: CoordF,
}

impl Default for DecimationSmoother {
    fn default() -> Self {
        Self {
            tolerance: MIN_GCODE_SEGMENT_LENGTH,
        }
    }
}

impl DecimationSmoother {
    /// Create a smoother with the default tolerance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum surviving segment length in mm.
    pub fn with_tolerance(mut self, tolerance: CoordF) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl PathSmoother for DecimationSmoother {
    fn smooth(
        &self,
        _layer: &Layer,
        entity: ExtrusionEntityReference<'_>,
        _extruder_id: u32,
        previous_position: &mut Option<InstancePoint>,
    ) -> SmoothPath {
        let min_segment = self.tolerance * SCALING_FACTOR;
        let mut path = SmoothPath::new();
        for leaf in entity.entity().flatten(entity.flipped()) {
            let Some((points, attributes)) = traversal_points(&leaf, previous_position) else {
                continue;
            };
            let points = decimate(&points, min_segment);
            if let Some(&end) = points.last() {
                *previous_position = Some(InstancePoint(end));
            }
            path.push(SmoothPathElement::Line { attributes, points });
        }
        path
    }
}

/// Passthrough smoothing for tests: seam cutting and cursor advancement
/// without any point reduction.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentitySmoother;

impl PathSmoother for IdentitySmoother {
    fn smooth(
        &self,
        _layer: &Layer,
        entity: ExtrusionEntityReference<'_>,
        _extruder_id: u32,
        previous_position: &mut Option<InstancePoint>,
    ) -> SmoothPath {
        let mut path = SmoothPath::new();
        for leaf in entity.entity().flatten(entity.flipped()) {
            let Some((points, attributes)) = traversal_points(&leaf, previous_position) else {
                continue;
            };
            if points.len() < 2 {
                continue;
            }
            if let Some(&end) = points.last() {
                *previous_position = Some(InstancePoint(end));
            }
            path.push(SmoothPathElement::Line { attributes, points });
        }
        path
    }
}

/// Configuration for the arc fitting smoother.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArcFittingConfig {
    /// Maximum deviation of original points from the fitted arc (mm).
    pub tolerance: CoordF,

    /// Minimum arc radius (mm); tighter curves stay as line segments.
    pub min_radius: CoordF,

    /// Maximum arc radius (mm); flatter curves stay as line segments.
    pub max_radius: CoordF,

    /// Minimum number of points an arc must replace.
    pub min_points: usize,

    /// Maximum swept angle (radians); longer arcs are split.
    pub max_arc_angle: CoordF,

    /// Relative tolerance between arc length and replaced polyline length.
    pub length_tolerance: CoordF,
}

impl Default for ArcFittingConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.05,
            min_radius: 0.5,
            max_radius: 2000.0,
            min_points: 3,
            max_arc_angle: std::f64::consts::PI * 1.5,
            length_tolerance: 0.05,
        }
    }
}

impl ArcFittingConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum deviation in mm.
    pub fn with_tolerance(mut self, tolerance: CoordF) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the minimum arc radius in mm.
    pub fn with_min_radius(mut self, min_radius: CoordF) -> Self {
        self.min_radius = min_radius;
        self
    }

    /// Set the maximum arc radius in mm.
    pub fn with_max_radius(mut self, max_radius: CoordF) -> Self {
        self.max_radius = max_radius;
        self
    }

    /// Set the minimum number of points an arc must replace.
    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points.max(3);
        self
    }
}

/// An accepted circle fit, in mm space.
struct FitCandidate {
    center: PointF,
    radius: CoordF,
    angle: CoordF,
    direction: ArcDirection,
}

/// Arc-fitting smoothing strategy: decimates, then replaces circular runs
/// of points with [`FittedArc`] elements.
#[derive(Debug, Clone, Default)]
pub struct ArcFitSmoother {
    config: ArcFittingConfig,
}

impl ArcFitSmoother {
    /// Create a smoother with the given configuration.
    pub fn new(config: ArcFittingConfig) -> Self {
        Self { config }
    }

    /// Create a smoother with the default configuration.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// The active configuration.
    pub fn config(&self) -> &ArcFittingConfig {
        &self.config
    }

    /// Split one decimated point run into line and arc elements.
    fn fit_elements(
        &self,
        points: &[Point],
        attributes: ExtrusionAttributes,
    ) -> Vec<SmoothPathElement> {
        if points.len() < self.config.min_points {
            return vec![SmoothPathElement::Line {
                attributes,
                points: points.to_vec(),
            }];
        }
        let mm: Vec<PointF> = points.iter().map(|p| p.to_f64()).collect();

        let mut elements = Vec::new();
        let mut line = vec![points[0]];
        let mut i = 0;
        while i + 1 < points.len() {
            match self.try_fit_arc(&points[i..], &mm[i..]) {
                Some((arc, consumed)) => {
                    // Close the running line at the arc's start.
                    if line.len() >= 2 {
                        elements.push(SmoothPathElement::Line {
                            attributes,
                            points: std::mem::take(&mut line),
                        });
                    } else {
                        line.clear();
                    }
                    i += consumed - 1;
                    elements.push(SmoothPathElement::Arc { attributes, arc });
                    // The arc's end seeds the next line run.
                    line.push(points[i]);
                }
                None => {
                    line.push(points[i + 1]);
                    i += 1;
                }
            }
        }
        if line.len() >= 2 {
            elements.push(SmoothPathElement::Line {
                attributes,
                points: line,
            });
        }
        elements
    }

    /// Grow an arc from the start of the slice; keep the longest valid fit.
    fn try_fit_arc(&self, points: &[Point], mm: &[PointF]) -> Option<(FittedArc, usize)> {
        if points.len() < self.config.min_points {
            return None;
        }
        let mut best: Option<(FittedArc, usize)> = None;
        for end in self.config.min_points..=points.len() {
            match self.fit_arc(&mm[..end]) {
                Some(candidate) => {
                    let arc = FittedArc {
                        start: points[0],
                        end: points[end - 1],
                        center: Point::new_scale(candidate.center.x, candidate.center.y),
                        radius: candidate.radius * SCALING_FACTOR,
                        angle: candidate.angle,
                        direction: candidate.direction,
                    };
                    best = Some((arc, end));
                }
                None => break,
            }
        }
        best
    }

    /// Fit and validate a circle through a point run (mm space).
    fn fit_arc(&self, mm: &[PointF]) -> Option<FitCandidate> {
        if mm.len() < 3 {
            return None;
        }
        let p1 = mm[0];
        let p2 = mm[mm.len() / 2];
        let p3 = mm[mm.len() - 1];

        let center = find_circle_center(p1, p2, p3)?;
        let radius = p1.distance(&center);

        // Both endpoints must sit on the circle for a well-formed arc.
        if (p3.distance(&center) - radius).abs() > self.config.tolerance {
            return None;
        }
        if radius < self.config.min_radius || radius > self.config.max_radius {
            return None;
        }

        // Every point must stay within tolerance of the circle.
        let max_deviation = mm
            .iter()
            .map(|p| (p.distance(&center) - radius).abs())
            .fold(0.0, CoordF::max);
        if max_deviation > self.config.tolerance {
            return None;
        }

        let v1 = p2 - p1;
        let v2 = p3 - p2;
        let direction = if v1.cross(&v2) > 0.0 {
            ArcDirection::CounterClockwise
        } else {
            ArcDirection::Clockwise
        };

        let start_angle = (p1.y - center.y).atan2(p1.x - center.x);
        let end_angle = (p3.y - center.y).atan2(p3.x - center.x);
        let mut angle = end_angle - start_angle;
        match direction {
            ArcDirection::CounterClockwise => {
                if angle < 0.0 {
                    angle += 2.0 * std::f64::consts::PI;
                }
            }
            ArcDirection::Clockwise => {
                if angle > 0.0 {
                    angle -= 2.0 * std::f64::consts::PI;
                }
                angle = angle.abs();
            }
        }
        if angle > self.config.max_arc_angle {
            return None;
        }

        // The arc must replace a polyline of matching length, otherwise the
        // points wrap the wrong way around the circle.
        let polyline_length: CoordF = mm.windows(2).map(|w| w[0].distance(&w[1])).sum();
        if polyline_length <= 0.0 {
            return None;
        }
        let arc_length = radius * angle;
        if (arc_length - polyline_length).abs() / polyline_length >= self.config.length_tolerance {
            return None;
        }

        Some(FitCandidate {
            center,
            radius,
            angle,
            direction,
        })
    }
}

impl PathSmoother for ArcFitSmoother {
    fn smooth(
        &self,
        _layer: &Layer,
        entity: ExtrusionEntityReference<'_>,
        _extruder_id: u32,
        previous_position: &mut Option<InstancePoint>,
    ) -> SmoothPath {
        let mut path = SmoothPath::new();
        for leaf in entity.entity().flatten(entity.flipped()) {
            let Some((points, attributes)) = traversal_points(&leaf, previous_position) else {
                continue;
            };
            let points = decimate(&points, SCALED_MIN_GCODE_SEGMENT_LENGTH as CoordF);
            if points.is_empty() {
                continue;
            }
            if let Some(&end) = points.last() {
                *previous_position = Some(InstancePoint(end));
            }
            for element in self.fit_elements(&points, attributes) {
                path.push(element);
            }
        }
        path
    }
}

/// Center of the circle through three points, `None` when collinear.
fn find_circle_center(p1: PointF, p2: PointF, p3: PointF) -> Option<PointF> {
    let d = 2.0 * (p1.x * (p2.y - p3.y) + p2.x * (p3.y - p1.y) + p3.x * (p1.y - p2.y));
    if d.abs() < 1e-10 {
        return None;
    }
    let sq1 = p1.x * p1.x + p1.y * p1.y;
    let sq2 = p2.x * p2.x + p2.y * p2.y;
    let sq3 = p3.x * p3.x + p3.y * p3.y;
    let ux = (sq1 * (p2.y - p3.y) + sq2 * (p3.y - p1.y) + sq3 * (p1.y - p2.y)) / d;
    let uy = (sq1 * (p3.x - p2.x) + sq2 * (p1.x - p3.x) + sq3 * (p2.x - p1.x)) / d;
    Some(PointF::new(ux, uy))
}
