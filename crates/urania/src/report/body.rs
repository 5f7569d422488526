use crate::dom::{Document, NodeId};
use crate::interpretation::Atom;
use crate::report::view::{AngleSection, AspectRow, ReportView};
use crate::report::ReportSection;
use crate::zodiac::Element;

pub const SECTION_ATTR: &str = "data-section";

fn append(doc: &mut Document, parent: NodeId, name: &str, text: Option<&str>) -> NodeId {
    let id = doc.create_element(name);
    doc.append_child(parent, id);
    if let Some(text) = text {
        let t = doc.create_text(text);
        doc.append_child(id, t);
    }
    id
}

fn append_atom(doc: &mut Document, parent: NodeId, atom: &Atom) {
    let block = append(doc, parent, "div", None);
    doc.set_attr(block, "class", "atom");
    if let Some(key) = &atom.key {
        doc.set_attr(block, "data-atom", key);
    }
    append(doc, block, "h4", Some(&atom.title));
    append(doc, block, "p", Some(&atom.body));
}

fn aspect_item(doc: &mut Document, list: NodeId, row: &AspectRow) {
    let item = append(doc, list, "li", None);
    doc.set_attr(item, "data-aspect", &row.aspect.key());
    let line = format!(
        "{} (orb {:.2}°, {} {}, {})",
        row.title(),
        row.aspect.orb,
        row.strength.label,
        row.strength.score,
        row.phase.as_str()
    );
    append(doc, item, "span", Some(&line));
    if let Some(atom) = &row.atom {
        append_atom(doc, item, atom);
    }
}

fn section(doc: &mut Document, parent: NodeId, which: ReportSection, heading: &str) -> NodeId {
    let id = append(doc, parent, "section", None);
    doc.set_attr(id, SECTION_ATTR, which.as_str());
    append(doc, id, "h2", Some(heading));
    id
}

fn angle_section(doc: &mut Document, parent: NodeId, which: ReportSection, angle: &AngleSection) {
    let heading = format!("{} in {}", angle.name, angle.angle.sign);
    let id = section(doc, parent, which, &heading);
    append(doc, id, "p", Some(&format!("{} {}", angle.degree, angle.angle.sign)));
    if let Some(atom) = &angle.atom {
        append_atom(doc, id, atom);
    }
    if !angle.aspects.is_empty() {
        let list = append(doc, id, "ul", None);
        for row in &angle.aspects {
            aspect_item(doc, list, row);
        }
    }
}

fn natal_wheel(doc: &mut Document, parent: NodeId, svg: Option<&str>) {
    let id = section(doc, parent, ReportSection::NatalWheel, ReportSection::NatalWheel.title());
    let chart = match svg.map(Document::parse) {
        Some(Ok(chart)) => chart,
        Some(Err(e)) => {
            log::warn!("chart image could not be embedded: {}", e);
            append(doc, id, "p", Some("Chart image unavailable."));
            return;
        }
        None => {
            append(doc, id, "p", Some("Chart image unavailable."));
            return;
        }
    };
    let holder = append(doc, id, "div", None);
    doc.set_attr(holder, "data-chart", "natal");
    doc.import_subtree(&chart, chart.root(), holder);
}

fn planets(doc: &mut Document, parent: NodeId, view: &ReportView) {
    let id = section(doc, parent, ReportSection::Planets, ReportSection::Planets.title());
    let table = append(doc, id, "table", None);
    let head = append(doc, table, "tr", None);
    for label in ["Planet", "Sign", "Degree", "House", ""] {
        append(doc, head, "th", Some(label));
    }
    for row in &view.planets {
        let tr = append(doc, table, "tr", None);
        doc.set_attr(tr, "data-planet", &row.token);
        append(doc, tr, "td", Some(&row.name));
        append(doc, tr, "td", Some(&row.sign));
        append(doc, tr, "td", Some(&row.degree));
        append(doc, tr, "td", Some(&row.house.to_string()));
        append(doc, tr, "td", Some(if row.retrograde { "R" } else { "" }));
    }
    for row in &view.planets {
        for atom in row.sign_atom.iter().chain(row.house_atom.iter()) {
            append_atom(doc, id, atom);
        }
    }
}

fn aspects(doc: &mut Document, parent: NodeId, view: &ReportView) {
    let id = section(doc, parent, ReportSection::Aspects, ReportSection::Aspects.title());
    if view.aspects.is_empty() {
        append(doc, id, "p", Some("No aspects within orb."));
        return;
    }
    let list = append(doc, id, "ul", None);
    for row in &view.aspects {
        aspect_item(doc, list, row);
    }
}

fn themes(doc: &mut Document, parent: NodeId, view: &ReportView) {
    let id = section(doc, parent, ReportSection::Themes, ReportSection::Themes.title());
    let d = &view.dominants;
    let summary = Element::ALL
        .iter()
        .map(|e| format!("{} {:.0}%", crate::zodiac::capitalize_first(e.as_str()), d.get(*e)))
        .collect::<Vec<_>>()
        .join(", ");
    let p = append(doc, id, "p", Some(&summary));
    doc.set_attr(p, "data-dominant", d.leading().as_str());
    for atom in &view.themes {
        append_atom(doc, id, atom);
    }
}

/// The highlightable report body: an `<article>` with one
/// `<section data-section="...">` per section in canonical order. The chart
/// is embedded under a `data-chart` holder so it stays out of text offsets.
pub fn render_body(view: &ReportView) -> Document {
    let mut doc = Document::new("article");
    let root = doc.root();
    doc.set_attr(root, "class", "report");
    for which in ReportSection::ALL {
        match which {
            ReportSection::NatalWheel => natal_wheel(&mut doc, root, view.chart_svg.as_deref()),
            ReportSection::Ascendant => angle_section(&mut doc, root, which, &view.ascendant),
            ReportSection::Midheaven => angle_section(&mut doc, root, which, &view.midheaven),
            ReportSection::Planets => planets(&mut doc, root, view),
            ReportSection::Aspects => aspects(&mut doc, root, view),
            ReportSection::Themes => themes(&mut doc, root, view),
        }
    }
    doc
}

/// The `<section>` element for `which`, if the body has one.
pub fn find_section(doc: &Document, which: ReportSection) -> Option<NodeId> {
    doc.find(doc.root(), |d, n| {
        d.name(n) == Some("section") && d.attr(n, SECTION_ATTR) == Some(which.as_str())
    })
}
