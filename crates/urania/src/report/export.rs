use crate::dom::{Document, NodeId};
use crate::highlights::strip_markers;
use crate::report::body::find_section;
use crate::report::view::ReportView;
use crate::report::ReportSection;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

const PRINT_CSS: &str = "body{font-family:serif;margin:2cm}\
section{page-break-inside:avoid;margin-bottom:1.5em}\
.cover{page-break-after:always;text-align:center}\
mark.hl-yellow{background:#fff59d}mark.hl-green{background:#c5e1a5}\
mark.hl-blue{background:#90caf9}mark.hl-pink{background:#f8bbd0}\
mark.hl-purple{background:#ce93d8}";

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub sections: BTreeSet<ReportSection>,
    pub include_highlights: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            sections: ReportSection::ALL.into_iter().collect(),
            include_highlights: true,
        }
    }
}

fn append(doc: &mut Document, parent: NodeId, name: &str, text: Option<&str>) -> NodeId {
    let id = doc.create_element(name);
    doc.append_child(parent, id);
    if let Some(text) = text {
        let t = doc.create_text(text);
        doc.append_child(id, t);
    }
    id
}

fn cover(doc: &mut Document, parent: NodeId, view: &ReportView, generated_at: DateTime<Utc>) {
    let s = &view.subject;
    let page = append(doc, parent, "section", None);
    doc.set_attr(page, "class", "cover");
    let title = if s.name.trim().is_empty() { "Natal report" } else { s.name.as_str() };
    append(doc, page, "h1", Some(title));

    let mut rows: Vec<(&str, String)> = Vec::new();
    if let Some(date) = &s.birth_date {
        let when = match &s.birth_time {
            Some(time) => format!("{} {}", date, time),
            None => date.clone(),
        };
        rows.push(("Born", when));
    }
    if let Some(city) = &s.city {
        rows.push(("Place", city.clone()));
    }
    if let (Some(lat), Some(lng)) = (s.latitude, s.longitude) {
        rows.push(("Coordinates", format!("{:.4}, {:.4}", lat, lng)));
    }
    if let Some(tz) = &s.timezone {
        rows.push(("Timezone", tz.clone()));
    }
    rows.push(("House system", crate::zodiac::capitalize_first(view.house_system.as_str())));
    rows.push(("Zodiac", crate::zodiac::capitalize_first(view.zodiac_type.as_str())));
    rows.push(("Generated", generated_at.format("%Y-%m-%d %H:%M UTC").to_string()));

    let list = append(doc, page, "dl", None);
    for (label, value) in rows {
        append(doc, list, "dt", Some(label));
        append(doc, list, "dd", Some(&value));
    }
}

/// Standalone printable XHTML: a cover page, then the selected sections of
/// `body` in canonical order. Highlight markers are kept only when asked.
pub fn compose_export(
    view: &ReportView,
    body: &Document,
    options: &ExportOptions,
    generated_at: DateTime<Utc>,
) -> String {
    let stripped;
    let source = if options.include_highlights {
        body
    } else {
        let mut copy = body.clone();
        let root = copy.root();
        let removed = strip_markers(&mut copy, root);
        log::debug!("export without highlights: {} marker(s) removed", removed);
        stripped = copy;
        &stripped
    };

    let mut doc = Document::new("html");
    let html = doc.root();
    doc.set_attr(html, "xmlns", XHTML_NS);
    let head = append(&mut doc, html, "head", None);
    let meta = append(&mut doc, head, "meta", None);
    doc.set_attr(meta, "charset", "utf-8");
    let title = format!("Natal report: {}", view.subject.name);
    append(&mut doc, head, "title", Some(&title));
    append(&mut doc, head, "style", Some(PRINT_CSS));

    let page = append(&mut doc, html, "body", None);
    cover(&mut doc, page, view, generated_at);
    for which in ReportSection::ALL {
        if !options.sections.contains(&which) {
            continue;
        }
        match find_section(source, which) {
            Some(node) => {
                doc.import_subtree(source, node, page);
            }
            None => log::debug!("section {} missing from report body", which.as_str()),
        }
    }

    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", doc.to_markup())
}
