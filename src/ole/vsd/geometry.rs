//! Geometry sections.
//!
//! A shape owns any number of geometry sections, each a [`PatchList`] of
//! drawing instructions. Every instruction kind has a resolved form
//! ([`GeometryElement`]) and a partial form ([`GeometryPatch`]) whose fields
//! are optional, so that a shape's own rows can patch the rows it inherited
//! from its master.

use super::collector::Collector;
use super::consts::MINUS_ONE;
use super::list::{PatchList, Patchable};
use bitflags::bitflags;
use std::collections::BTreeMap;

bitflags! {
    /// Geometry section flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct GeometryFlags: u8 {
        /// Section is not filled
        const NO_FILL = 0x01;
        /// Section has no outline
        const NO_LINE = 0x02;
        /// Section is hidden
        const NO_SHOW = 0x04;
    }
}

macro_rules! geometry_elements {
    ($(
        $(#[$meta:meta])*
        $kind:ident($patch:ident) { $($field:ident : $ty:ty = $default:expr),* $(,)? }
    ),* $(,)?) => {
        /// One resolved geometry instruction.
        #[derive(Debug, Clone, PartialEq)]
        pub enum GeometryElement {
            $(
                $(#[$meta])*
                $kind { $($field: $ty),* },
            )*
        }

        /// One partial geometry instruction.
        #[derive(Debug, Clone, PartialEq)]
        pub enum GeometryPatch {
            $($kind($patch),)*
        }

        $(
            #[derive(Debug, Clone, Default, PartialEq)]
            pub struct $patch {
                $(pub $field: Option<$ty>,)*
            }

            impl From<$patch> for GeometryPatch {
                fn from(patch: $patch) -> Self {
                    GeometryPatch::$kind(patch)
                }
            }
        )*

        impl Patchable for GeometryElement {
            type Patch = GeometryPatch;

            fn from_patch(patch: GeometryPatch) -> Self {
                match patch {
                    $(
                        GeometryPatch::$kind(patch) => GeometryElement::$kind {
                            $($field: patch.$field.unwrap_or($default),)*
                        },
                    )*
                }
            }

            fn merge(&mut self, patch: GeometryPatch) -> Result<(), GeometryPatch> {
                match (self, patch) {
                    $(
                        (GeometryElement::$kind { $($field),* }, GeometryPatch::$kind(patch)) => {
                            $(
                                if let Some(value) = patch.$field {
                                    *$field = value;
                                }
                            )*
                            Ok(())
                        },
                    )*
                    (_, patch) => Err(patch),
                }
            }
        }
    };
}

geometry_elements! {
    /// Section header
    Geometry(GeometryHeaderPatch) { no_fill: bool = false, no_line: bool = false, no_show: bool = false },
    MoveTo(MoveToPatch) { x: f64 = 0.0, y: f64 = 0.0 },
    LineTo(LineToPatch) { x: f64 = 0.0, y: f64 = 0.0 },
    ArcTo(ArcToPatch) { x2: f64 = 0.0, y2: f64 = 0.0, bow: f64 = 0.0 },
    EllipticalArcTo(EllipticalArcToPatch) {
        x3: f64 = 0.0, y3: f64 = 0.0, x2: f64 = 0.0, y2: f64 = 0.0, angle: f64 = 0.0, ecc: f64 = 1.0,
    },
    Ellipse(EllipsePatch) {
        cx: f64 = 0.0, cy: f64 = 0.0, xleft: f64 = 0.0, yleft: f64 = 0.0, xtop: f64 = 0.0, ytop: f64 = 0.0,
    },
    InfiniteLine(InfiniteLinePatch) { x1: f64 = 0.0, y1: f64 = 0.0, x2: f64 = 0.0, y2: f64 = 0.0 },
    SplineStart(SplineStartPatch) {
        x: f64 = 0.0, y: f64 = 0.0, second_knot: f64 = 0.0, first_knot: f64 = 0.0,
        last_knot: f64 = 0.0, degree: u32 = 0,
    },
    SplineKnot(SplineKnotPatch) { x: f64 = 0.0, y: f64 = 0.0, knot: f64 = 0.0 },
    /// Polyline whose points live in the shape's data table
    PolylineTo(PolylineToPatch) { x: f64 = 0.0, y: f64 = 0.0, data_id: u32 = MINUS_ONE },
    /// NURBS segment whose control points live in the shape's data table
    NurbsTo(NurbsToPatch) {
        x2: f64 = 0.0, y2: f64 = 0.0, knot: f64 = 0.0, knot_prev: f64 = 0.0,
        weight: f64 = 0.0, weight_prev: f64 = 0.0, data_id: u32 = MINUS_ONE,
    },
    RelMoveTo(RelMoveToPatch) { x: f64 = 0.0, y: f64 = 0.0 },
    RelLineTo(RelLineToPatch) { x: f64 = 0.0, y: f64 = 0.0 },
    RelCubBezTo(RelCubBezToPatch) {
        x: f64 = 0.0, y: f64 = 0.0, a: f64 = 0.0, b: f64 = 0.0, c: f64 = 0.0, d: f64 = 0.0,
    },
    RelQuadBezTo(RelQuadBezToPatch) { x: f64 = 0.0, y: f64 = 0.0, a: f64 = 0.0, b: f64 = 0.0 },
    RelEllipticalArcTo(RelEllipticalArcToPatch) {
        x: f64 = 0.0, y: f64 = 0.0, a: f64 = 0.0, b: f64 = 0.0, c: f64 = 0.0, d: f64 = 0.0,
    },
}

impl GeometryHeaderPatch {
    /// Build a header patch from the on-disk flag byte.
    pub fn from_flags(flags: GeometryFlags) -> Self {
        Self {
            no_fill: Some(flags.contains(GeometryFlags::NO_FILL)),
            no_line: Some(flags.contains(GeometryFlags::NO_LINE)),
            no_show: Some(flags.contains(GeometryFlags::NO_SHOW)),
        }
    }
}

/// Point list referenced by a polyline instruction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolylineData {
    pub x_type: u8,
    pub y_type: u8,
    pub points: Vec<(f64, f64)>,
}

/// Control data referenced by a NURBS instruction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NurbsData {
    pub last_knot: f64,
    pub degree: u32,
    pub x_type: u8,
    pub y_type: u8,
    pub knots: Vec<f64>,
    pub weights: Vec<f64>,
    pub points: Vec<(f64, f64)>,
}

/// Polyline and NURBS payloads of one shape, keyed by data id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeData {
    pub polylines: BTreeMap<u32, PolylineData>,
    pub nurbs: BTreeMap<u32, NurbsData>,
}

impl ShapeData {
    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty() && self.nurbs.is_empty()
    }

    /// Copy entries from `other` that this table does not define.
    pub fn inherit(&mut self, other: &ShapeData) {
        for (id, data) in &other.polylines {
            self.polylines.entry(*id).or_insert_with(|| data.clone());
        }
        for (id, data) in &other.nurbs {
            self.nurbs.entry(*id).or_insert_with(|| data.clone());
        }
    }
}

/// One geometry section.
pub type GeometryList = PatchList<GeometryElement>;

impl GeometryElement {
    fn is_spline_knot(&self) -> bool {
        matches!(self, GeometryElement::SplineKnot { .. })
    }

    fn emit(&self, id: u32, level: u32, data: &ShapeData, collector: &mut dyn Collector) {
        match *self {
            GeometryElement::Geometry {
                no_fill,
                no_line,
                no_show,
            } => collector.collect_geometry(id, level, no_fill, no_line, no_show),
            GeometryElement::MoveTo { x, y } => collector.collect_move_to(id, level, x, y),
            GeometryElement::LineTo { x, y } => collector.collect_line_to(id, level, x, y),
            GeometryElement::ArcTo { x2, y2, bow } => collector.collect_arc_to(id, level, x2, y2, bow),
            GeometryElement::EllipticalArcTo {
                x3,
                y3,
                x2,
                y2,
                angle,
                ecc,
            } => collector.collect_elliptical_arc_to(id, level, x3, y3, x2, y2, angle, ecc),
            GeometryElement::Ellipse {
                cx,
                cy,
                xleft,
                yleft,
                xtop,
                ytop,
            } => collector.collect_ellipse(id, level, cx, cy, xleft, yleft, xtop, ytop),
            GeometryElement::InfiniteLine { x1, y1, x2, y2 } => {
                collector.collect_infinite_line(id, level, x1, y1, x2, y2)
            },
            GeometryElement::SplineStart {
                x,
                y,
                second_knot,
                first_knot,
                last_knot,
                degree,
            } => collector.collect_spline_start(
                id,
                level,
                x,
                y,
                second_knot,
                first_knot,
                last_knot,
                degree,
            ),
            GeometryElement::SplineKnot { x, y, knot } => {
                collector.collect_spline_knot(id, level, x, y, knot)
            },
            GeometryElement::PolylineTo { x, y, data_id } => {
                collector.collect_polyline_to(id, level, x, y, data.polylines.get(&data_id))
            },
            GeometryElement::NurbsTo {
                x2,
                y2,
                knot,
                knot_prev,
                weight,
                weight_prev,
                data_id,
            } => collector.collect_nurbs_to(
                id,
                level,
                x2,
                y2,
                knot,
                knot_prev,
                weight,
                weight_prev,
                data.nurbs.get(&data_id),
            ),
            GeometryElement::RelMoveTo { x, y } => collector.collect_rel_move_to(id, level, x, y),
            GeometryElement::RelLineTo { x, y } => collector.collect_rel_line_to(id, level, x, y),
            GeometryElement::RelCubBezTo { x, y, a, b, c, d } => {
                collector.collect_rel_cub_bez_to(id, level, x, y, a, b, c, d)
            },
            GeometryElement::RelQuadBezTo { x, y, a, b } => {
                collector.collect_rel_quad_bez_to(id, level, x, y, a, b)
            },
            GeometryElement::RelEllipticalArcTo { x, y, a, b, c, d } => {
                collector.collect_rel_elliptical_arc_to(id, level, x, y, a, b, c, d)
            },
        }
    }
}

impl PatchList<GeometryElement> {
    /// Replay the section through a collector.
    ///
    /// A spline end is reported before every instruction that is not a spline
    /// knot, and once more after the last instruction, so that a spline run
    /// is always closed before the next segment starts.
    pub fn handle(&self, data: &ShapeData, collector: &mut dyn Collector) {
        for (id, entry) in self.iter() {
            if !entry.element.is_spline_knot() {
                collector.collect_spline_end();
            }
            entry.element.emit(id, entry.level, data, collector);
        }
        collector.collect_spline_end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl Collector for Recorder {
        fn collect_move_to(&mut self, id: u32, _level: u32, x: f64, y: f64) {
            self.events.push(format!("move {id} {x} {y}"));
        }
        fn collect_line_to(&mut self, id: u32, _level: u32, x: f64, y: f64) {
            self.events.push(format!("line {id} {x} {y}"));
        }
        fn collect_spline_start(
            &mut self,
            id: u32,
            _level: u32,
            _x: f64,
            _y: f64,
            _second_knot: f64,
            _first_knot: f64,
            _last_knot: f64,
            _degree: u32,
        ) {
            self.events.push(format!("spline-start {id}"));
        }
        fn collect_spline_knot(&mut self, id: u32, _level: u32, _x: f64, _y: f64, _knot: f64) {
            self.events.push(format!("knot {id}"));
        }
        fn collect_spline_end(&mut self) {
            self.events.push("end".to_string());
        }
        fn collect_polyline_to(
            &mut self,
            id: u32,
            _level: u32,
            _x: f64,
            _y: f64,
            data: Option<&PolylineData>,
        ) {
            self.events
                .push(format!("polyline {id} {}", data.map_or(0, |d| d.points.len())));
        }
    }

    #[test]
    fn test_patch_merge_keeps_earlier_fields() {
        let mut list = GeometryList::new();
        list.add(5, 0, MoveToPatch { x: Some(10.0), y: None }.into());
        list.add(5, 1, MoveToPatch { x: None, y: Some(20.0) }.into());
        assert_eq!(list.get(5), Some(&GeometryElement::MoveTo { x: 10.0, y: 20.0 }));
    }

    #[test]
    fn test_kind_change_replaces_entry() {
        let mut list = GeometryList::new();
        list.add(7, 0, MoveToPatch { x: Some(1.0), y: Some(2.0) }.into());
        list.add(7, 0, LineToPatch { x: Some(3.0), y: None }.into());
        assert_eq!(list.get(7), Some(&GeometryElement::LineTo { x: 3.0, y: 0.0 }));
    }

    #[test]
    fn test_header_flags() {
        let patch = GeometryHeaderPatch::from_flags(GeometryFlags::from_bits_truncate(0x05));
        let element = GeometryElement::from_patch(patch.into());
        assert_eq!(
            element,
            GeometryElement::Geometry {
                no_fill: true,
                no_line: false,
                no_show: true
            }
        );
    }

    #[test]
    fn test_ascending_walk_without_order() {
        let mut list = GeometryList::new();
        for id in [3u32, 1, 2] {
            list.add(id, 0, LineToPatch { x: Some(id as f64), y: Some(0.0) }.into());
        }
        let mut recorder = Recorder::default();
        list.handle(&ShapeData::default(), &mut recorder);
        assert_eq!(
            recorder.events,
            vec!["end", "line 1 1 0", "end", "line 2 2 0", "end", "line 3 3 0", "end"]
        );
    }

    #[test]
    fn test_spline_end_placement() {
        let mut list = GeometryList::new();
        list.add(1, 0, MoveToPatch::default().into());
        list.add(2, 0, SplineStartPatch::default().into());
        list.add(3, 0, SplineKnotPatch::default().into());
        list.add(4, 0, SplineKnotPatch::default().into());
        list.add(5, 0, LineToPatch::default().into());

        let mut recorder = Recorder::default();
        list.handle(&ShapeData::default(), &mut recorder);
        assert_eq!(
            recorder.events,
            vec![
                "end",
                "move 1 0 0",
                "end",
                "spline-start 2",
                "knot 3",
                "knot 4",
                "end",
                "line 5 0 0",
                "end",
            ]
        );
    }

    #[test]
    fn test_polyline_resolves_data() {
        let mut data = ShapeData::default();
        data.polylines.insert(
            9,
            PolylineData {
                points: vec![(0.0, 0.0), (1.0, 1.0)],
                ..PolylineData::default()
            },
        );
        let mut list = GeometryList::new();
        list.add(1, 0, PolylineToPatch { data_id: Some(9), ..Default::default() }.into());
        list.add(2, 0, PolylineToPatch::default().into());

        let mut recorder = Recorder::default();
        list.handle(&data, &mut recorder);
        assert_eq!(recorder.events, vec!["end", "polyline 1 2", "end", "polyline 2 0", "end"]);
    }

    #[test]
    fn test_shape_data_inherit_keeps_own() {
        let mut own = ShapeData::default();
        own.polylines.insert(1, PolylineData { x_type: 1, ..PolylineData::default() });
        let mut master = ShapeData::default();
        master.polylines.insert(1, PolylineData { x_type: 2, ..PolylineData::default() });
        master.polylines.insert(2, PolylineData { x_type: 3, ..PolylineData::default() });
        own.inherit(&master);
        assert_eq!(own.polylines[&1].x_type, 1);
        assert_eq!(own.polylines[&2].x_type, 3);
    }
}
