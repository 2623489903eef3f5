//! Streaming KML serializer.
//!
//! Writes the document in order straight to the sink: prologue, styles, then
//! folders of placemarks. Nothing is buffered beyond what the sink itself
//! buffers, so output size does not bound memory use.
//!
//! ## Layout
//!
//! ```text
//! kml
//! └── Document
//!     ├── Style × 5
//!     └── flat:    Folder(activities) Folder(visits) Folder(tracks)
//!         grouped: Folder(day_YYYY_MM_DD) × N
//!                  └── Folder(activities_…) Folder(visits_…) Folder(tracks_…)
//! ```
//!
//! Both layouts go through [`write_group`]; flat mode is a single group with
//! no day key. Empty category folders are omitted.

use std::io::{self, Write};

use log::info;

use crate::aggregate::{Categories, Group};
use crate::classify::{Activity, Track, Visit};
use crate::config::ConvertConfig;
use crate::error::Result;
use crate::timestamp::{format_for_display, format_duration};
use crate::Coordinate;

pub const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

const DOCUMENT_NAME: &str = "Location History";
const DOCUMENT_DESCRIPTION: &str = "Converted from location history JSON";

pub const TRACK_STYLE: &str = "track_line";
pub const ACTIVITY_START_STYLE: &str = "activity_start";
pub const ACTIVITY_END_STYLE: &str = "activity_end";
pub const VISIT_STYLE: &str = "visit";
pub const VISIT_SECONDARY_STYLE: &str = "visit_hierarchy_1";

/// Track line colour (AABBGGRR) and width.
const TRACK_COLOR: &str = "ffcc0000";
const TRACK_WIDTH: u32 = 3;

const MOVEMENT_ICON: &str = "https://maps.google.com/mapfiles/kml/pal4/icon56.png";
const PLACE_ICON: &str = "https://maps.google.com/mapfiles/kml/pal4/icon49.png";

struct IconStyle {
    id: &'static str,
    /// AABBGGRR
    color: &'static str,
    icon: &'static str,
}

const ICON_STYLES: [IconStyle; 4] = [
    IconStyle {
        id: ACTIVITY_START_STYLE,
        color: "ff00ff00",
        icon: MOVEMENT_ICON,
    },
    IconStyle {
        id: ACTIVITY_END_STYLE,
        color: "ff0000ff",
        icon: MOVEMENT_ICON,
    },
    IconStyle {
        id: VISIT_STYLE,
        color: "ffff0000",
        icon: PLACE_ICON,
    },
    IconStyle {
        id: VISIT_SECONDARY_STYLE,
        color: "ff00ffff",
        icon: PLACE_ICON,
    },
];

const UNKNOWN_VISIT_TIME: &str = "Unknown time";

// ============================================================================
// Low-level writer
// ============================================================================

/// Indenting line writer over any sink.
struct KmlWriter<W: Write> {
    out: W,
    depth: usize,
}

impl<W: Write> KmlWriter<W> {
    fn new(out: W) -> Self {
        Self { out, depth: 0 }
    }

    fn line(&mut self, content: &str) -> io::Result<()> {
        writeln!(self.out, "{:width$}{}", "", content, width = self.depth * 2)
    }

    fn open(&mut self, tag: &str) -> io::Result<()> {
        self.line(&format!("<{}>", tag))?;
        self.depth += 1;
        Ok(())
    }

    fn close(&mut self, name: &str) -> io::Result<()> {
        self.depth = self.depth.saturating_sub(1);
        self.line(&format!("</{}>", name))
    }

    fn element(&mut self, name: &str, value: &str) -> io::Result<()> {
        self.line(&format!("<{name}>{value}</{name}>"))
    }

    /// Element whose free text is wrapped in CDATA.
    fn cdata_element(&mut self, name: &str, text: &str) -> io::Result<()> {
        self.line(&format!("<{name}>{}</{name}>", cdata(text)))
    }

    fn finish(mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Wrap text in a CDATA section, splitting any embedded `]]>`.
pub fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}

/// Format one coordinate in KML order: `longitude,latitude`.
///
/// Components are plain decimals in shortest round-trip form and always keep
/// a decimal point (`2.0`, not `2`; `-0.00005`, not `-5e-5`).
pub fn kml_coordinate(coord: &Coordinate) -> String {
    format!("{},{}", degrees(coord.longitude), degrees(coord.latitude))
}

fn degrees(value: f64) -> String {
    let text = value.to_string();
    if text.contains('.') {
        text
    } else {
        text + ".0"
    }
}

/// Element identifiers may not contain hyphens.
fn day_id(prefix: &str, day: &str) -> String {
    format!("{}_{}", prefix, day.replace('-', "_"))
}

fn percent(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

fn distance_label(distance: Option<f64>) -> Option<String> {
    distance
        .filter(|d| *d != 0.0)
        .map(|d| format!("Distance: {:.0}m", d))
}

// ============================================================================
// Document
// ============================================================================

/// Serialize aggregated records as a KML document.
///
/// The sink is flushed before returning. A write failure aborts immediately;
/// whatever was already written stays in the sink.
pub fn write_kml<W: Write>(out: W, categories: &Categories, config: &ConvertConfig) -> Result<()> {
    let mut w = KmlWriter::new(out);

    w.line(r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    w.open(&format!(r#"kml xmlns="{}""#, KML_NAMESPACE))?;
    w.open("Document")?;
    w.cdata_element("name", DOCUMENT_NAME)?;
    w.cdata_element("description", DOCUMENT_DESCRIPTION)?;
    w.element("visibility", "1")?;
    w.element("open", "1")?;

    write_styles(&mut w)?;

    let groups = categories.groups(config.group_by_day);
    let mut written = 0;
    for group in groups.iter().filter(|g| !g.is_empty()) {
        write_group(&mut w, group)?;
        written += 1;
    }

    w.close("Document")?;
    w.close("kml")?;
    w.finish()?;

    info!(
        "[Kml] Wrote {} {} ({} activities, {} visits, {} tracks)",
        written,
        if config.group_by_day { "day folders" } else { "groups" },
        categories.activities.len(),
        categories.visits.len(),
        categories.tracks.len()
    );
    Ok(())
}

fn write_styles<W: Write>(w: &mut KmlWriter<W>) -> io::Result<()> {
    w.open(&format!(r#"Style id="{}""#, TRACK_STYLE))?;
    w.open("LineStyle")?;
    w.element("color", TRACK_COLOR)?;
    w.element("width", &TRACK_WIDTH.to_string())?;
    w.close("LineStyle")?;
    w.close("Style")?;

    for style in &ICON_STYLES {
        w.open(&format!(r#"Style id="{}""#, style.id))?;
        w.open("IconStyle")?;
        w.element("color", style.color)?;
        w.element("scale", "1.0")?;
        w.open("Icon")?;
        w.element("href", style.icon)?;
        w.close("Icon")?;
        w.line(r#"<hotSpot x="0.5" xunits="fraction" y="0.5" yunits="fraction"/>"#)?;
        w.close("IconStyle")?;
        w.open("LabelStyle")?;
        w.element("color", style.color)?;
        w.element("scale", "1.0")?;
        w.close("LabelStyle")?;
        w.close("Style")?;
    }
    Ok(())
}

// ============================================================================
// Folders
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Category {
    Activities,
    Visits,
    Tracks,
}

impl Category {
    /// Sub-folder order within a group.
    const ORDER: [Category; 3] = [Category::Activities, Category::Visits, Category::Tracks];

    fn id(&self) -> &'static str {
        match self {
            Category::Activities => "activities",
            Category::Visits => "visits",
            Category::Tracks => "tracks",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Category::Activities => "Activities",
            Category::Visits => "Visits",
            Category::Tracks => "Tracks",
        }
    }

    /// Point folders start hidden; track lines are shown.
    fn visibility(&self) -> &'static str {
        match self {
            Category::Activities | Category::Visits => "0",
            Category::Tracks => "1",
        }
    }

    fn description(&self, day: Option<&str>) -> String {
        match (self, day) {
            (Category::Activities, Some(day)) => format!("Movement activities for {}", day),
            (Category::Visits, Some(day)) => format!("Places visited on {}", day),
            (Category::Tracks, Some(day)) => format!("Movement tracks for {}", day),
            (Category::Activities, None) => {
                "Movement activities like walking, driving, etc.".to_string()
            }
            (Category::Visits, None) => "Places visited and time spent".to_string(),
            (Category::Tracks, None) => "Movement tracks between locations".to_string(),
        }
    }

    fn len(&self, group: &Group<'_>) -> usize {
        match self {
            Category::Activities => group.activities.len(),
            Category::Visits => group.visits.len(),
            Category::Tracks => group.tracks.len(),
        }
    }
}

/// Emit one group: a day folder wrapping the category folders, or the
/// category folders alone in flat mode.
fn write_group<W: Write>(w: &mut KmlWriter<W>, group: &Group<'_>) -> io::Result<()> {
    if let Some(day) = group.day {
        w.open(&format!(r#"Folder id="{}""#, day_id("day", day)))?;
        w.cdata_element("name", day)?;
        w.element("visibility", "1")?;
        w.cdata_element("description", &format!("Location data for {}", day))?;
    }

    for category in Category::ORDER {
        if category.len(group) > 0 {
            write_category_folder(w, category, group)?;
        }
    }

    if group.day.is_some() {
        w.close("Folder")?;
    }
    Ok(())
}

fn write_category_folder<W: Write>(
    w: &mut KmlWriter<W>,
    category: Category,
    group: &Group<'_>,
) -> io::Result<()> {
    let id = match group.day {
        Some(day) => day_id(category.id(), day),
        None => category.id().to_string(),
    };
    w.open(&format!(r#"Folder id="{}""#, id))?;
    w.cdata_element("name", category.name())?;
    w.element("visibility", category.visibility())?;
    w.cdata_element("description", &category.description(group.day))?;

    match category {
        Category::Activities => {
            for activity in &group.activities {
                write_activity_placemarks(w, activity)?;
            }
        }
        Category::Visits => {
            for visit in &group.visits {
                write_visit_placemark(w, visit)?;
            }
        }
        Category::Tracks => {
            for track in &group.tracks {
                write_track_placemark(w, track)?;
            }
        }
    }

    w.close("Folder")
}

// ============================================================================
// Placemarks
// ============================================================================

fn write_point<W: Write>(
    w: &mut KmlWriter<W>,
    name: &str,
    description: &str,
    style: &str,
    coord: &Coordinate,
) -> io::Result<()> {
    w.open("Placemark")?;
    w.cdata_element("name", name)?;
    w.cdata_element("description", description)?;
    w.element("styleUrl", &format!("#{}", style))?;
    w.open("Point")?;
    w.element("altitudeMode", "clampToGround")?;
    w.element("coordinates", &kml_coordinate(coord))?;
    w.close("Point")?;
    w.close("Placemark")
}

#[derive(Debug, Clone, Copy)]
enum PointRole {
    Start,
    End,
}

/// Start and end point of an activity, each only when its coordinate is known.
fn write_activity_placemarks<W: Write>(
    w: &mut KmlWriter<W>,
    activity: &Activity,
) -> io::Result<()> {
    let points = [
        (PointRole::Start, activity.start_coord, activity.start_time.as_ref()),
        (PointRole::End, activity.end_coord, activity.end_time.as_ref()),
    ];

    for (role, coord, time) in points {
        let Some(coord) = coord else {
            continue;
        };
        let (label, style) = match role {
            PointRole::Start => ("start", ACTIVITY_START_STYLE),
            PointRole::End => ("end", ACTIVITY_END_STYLE),
        };

        let mut description = format!("{} ({})", activity.kind, label);
        if let Some(distance) = distance_label(activity.distance_meters) {
            description.push_str("<br/>");
            description.push_str(&distance);
        }
        description.push_str(&format!("<br/>Probability: {}", percent(activity.probability)));

        write_point(w, &format_for_display(time), &description, style, &coord)?;
    }
    Ok(())
}

fn write_visit_placemark<W: Write>(w: &mut KmlWriter<W>, visit: &Visit) -> io::Result<()> {
    let name = match visit.display_time() {
        Some(time) => format_for_display(Some(time)),
        None => UNKNOWN_VISIT_TIME.to_string(),
    };

    let mut description = format!("Type: {}", visit.semantic_type);
    if let Some(duration) = visit.duration() {
        description.push_str(&format!("<br/>Duration: {}", format_duration(duration)));
    }
    description.push_str(&format!("<br/>Probability: {}", percent(visit.probability)));
    if let Some(place_id) = &visit.place_id {
        description.push_str(&format!("<br/>Place ID: {}", place_id));
    }

    let style = if visit.is_primary() {
        VISIT_STYLE
    } else {
        VISIT_SECONDARY_STYLE
    };
    write_point(w, &name, &description, style, &visit.coord)
}

fn write_track_placemark<W: Write>(w: &mut KmlWriter<W>, track: &Track) -> io::Result<()> {
    let name = format!(
        "{} - {}",
        format_for_display(track.start_time.as_ref()),
        track.activity_type
    );

    let mut description = format!(
        "Activity: {}<br/>Track Type: {}<br/>Points: {}",
        track.activity_type,
        track.source.label(),
        track.coordinates.len()
    );
    if let Some(duration) = track.duration() {
        description.push_str(&format!("<br/>Duration: {}", format_duration(duration)));
    }
    if let Some(distance) = distance_label(track.distance_meters) {
        description.push_str("<br/>");
        description.push_str(&distance);
    }

    let coordinates = track
        .coordinates
        .iter()
        .map(kml_coordinate)
        .collect::<Vec<_>>()
        .join(" ");

    w.open("Placemark")?;
    w.cdata_element("name", &name)?;
    w.cdata_element("description", &description)?;
    w.element("styleUrl", &format!("#{}", TRACK_STYLE))?;
    w.open("LineString")?;
    w.element("altitudeMode", "clampToGround")?;
    w.element("coordinates", &coordinates)?;
    w.close("LineString")?;
    w.close("Placemark")
}
