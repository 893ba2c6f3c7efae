use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as FmtWrite;

use crate::surface::{ArrowMarker, ElementId, ElementKind, Surface};
use crate::{Result, SceneConfig};

#[derive(Debug, Clone)]
enum Tag {
    Group,
    Element(ElementKind),
}

impl Tag {
    fn name(&self) -> &'static str {
        match self {
            Tag::Group => "g",
            Tag::Element(kind) => kind.tag(),
        }
    }
}

#[derive(Debug, Clone)]
struct Element {
    tag: Tag,
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    text: Option<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    fn new(tag: Tag, parent: Option<ElementId>) -> Self {
        Self {
            tag,
            attributes: Vec::new(),
            classes: Vec::new(),
            text: None,
            parent,
            children: Vec::new(),
        }
    }
}

/// In-memory scene graph that serializes to SVG.
///
/// Element ids are never reused; removed elements are dropped from the map.
#[derive(Debug, Clone, Default)]
pub struct SvgScene {
    elements: BTreeMap<usize, Element>,
    next_id: usize,
    roots: Vec<ElementId>,
    markers: BTreeSet<ArrowMarker>,
}

impl SvgScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, element: ElementId) -> Option<&Element> {
        self.elements.get(&element.0)
    }

    fn get_mut(&mut self, element: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&element.0)
    }

    fn insert(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.elements.insert(id.0, element);
        id
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.get(element).is_some()
    }

    /// Number of live elements, groups included.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    pub fn children(&self, element: ElementId) -> &[ElementId] {
        self.get(element)
            .map(|element| element.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn attribute(&self, element: ElementId, name: &str) -> Option<&str> {
        self.get(element)?
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn text(&self, element: ElementId) -> Option<&str> {
        self.get(element)?.text.as_deref()
    }

    pub fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.get(element)
            .is_some_and(|element| element.classes.iter().any(|c| c == class))
    }

    pub fn markers(&self) -> impl Iterator<Item = ArrowMarker> + '_ {
        self.markers.iter().copied()
    }

    pub fn render_svg(&self, config: &SceneConfig) -> Result<String> {
        let mut svg = String::new();
        write!(
            svg,
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.0} {:.0}" font-family="Inter, system-ui, sans-serif">
  <defs>
"##,
            config.width, config.height, config.width, config.height,
        )?;

        for marker in &self.markers {
            let fill = match marker {
                ArrowMarker::Temporary => "#a0aec0",
                ArrowMarker::Final => "context-stroke",
            };
            writeln!(
                svg,
                "    <marker id=\"{}\" markerWidth=\"8\" markerHeight=\"8\" refX=\"6\" refY=\"4\" orient=\"auto\" markerUnits=\"strokeWidth\">\n      <path d=\"M1,1 L6,4 L1,7 z\" fill=\"{}\" />\n    </marker>",
                marker.id(),
                fill
            )?;
        }

        writeln!(
            svg,
            "  </defs>\n  <rect width=\"100%\" height=\"100%\" fill=\"{}\" />",
            escape_xml(&config.background)
        )?;

        for root in &self.roots {
            self.write_element(&mut svg, *root, 1, config)?;
        }

        svg.push_str("</svg>\n");
        Ok(svg)
    }

    fn write_element(
        &self,
        svg: &mut String,
        id: ElementId,
        depth: usize,
        config: &SceneConfig,
    ) -> Result<()> {
        let Some(element) = self.get(id) else {
            return Ok(());
        };
        let indent = "  ".repeat(depth);

        write!(svg, "{indent}<{}", element.tag.name())?;
        for (name, value) in &element.attributes {
            write!(svg, " {}=\"{}\"", name, escape_xml(value))?;
        }
        if matches!(element.tag, Tag::Element(ElementKind::Circle))
            && !element.attributes.iter().any(|(name, _)| name == "r")
        {
            write!(svg, " r=\"{}\"", config.node_radius)?;
        }
        if matches!(element.tag, Tag::Element(ElementKind::Path)) {
            svg.push_str(" fill=\"none\" stroke=\"#2d3748\" stroke-width=\"2\"");
        }
        if !element.classes.is_empty() {
            write!(svg, " class=\"{}\"", escape_xml(&element.classes.join(" ")))?;
        }

        if element.children.is_empty() && element.text.is_none() {
            svg.push_str(" />\n");
            return Ok(());
        }

        if element.children.is_empty() {
            writeln!(
                svg,
                ">{}</{}>",
                escape_xml(element.text.as_deref().unwrap_or_default()),
                element.tag.name()
            )?;
            return Ok(());
        }

        svg.push_str(">\n");
        if let Some(text) = &element.text {
            writeln!(svg, "{indent}  {}", escape_xml(text))?;
        }
        for child in &element.children {
            self.write_element(svg, *child, depth + 1, config)?;
        }
        writeln!(svg, "{indent}</{}>", element.tag.name())?;
        Ok(())
    }
}

impl Surface for SvgScene {
    fn create_group(&mut self, class: &str) -> ElementId {
        let mut group = Element::new(Tag::Group, None);
        group.classes.push(class.to_string());
        let id = self.insert(group);
        self.roots.push(id);
        id
    }

    fn create_element(&mut self, parent: ElementId, kind: ElementKind) -> ElementId {
        if !self.contains(parent) {
            return self.insert(Element::new(Tag::Element(kind), None));
        }
        let id = self.insert(Element::new(Tag::Element(kind), Some(parent)));
        if let Some(parent) = self.get_mut(parent) {
            parent.children.push(id);
        }
        id
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        let Some(element) = self.get_mut(element) else {
            return;
        };
        match element.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => element
                .attributes
                .push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attribute(&mut self, element: ElementId, name: &str) {
        if let Some(element) = self.get_mut(element) {
            element.attributes.retain(|(key, _)| key != name);
        }
    }

    fn set_text(&mut self, element: ElementId, text: &str) {
        if let Some(element) = self.get_mut(element) {
            element.text = Some(text.to_string());
        }
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        if let Some(element) = self.get_mut(element) {
            if !element.classes.iter().any(|c| c == class) {
                element.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        if let Some(element) = self.get_mut(element) {
            element.classes.retain(|c| c != class);
        }
    }

    fn use_marker(&mut self, marker: ArrowMarker) {
        self.markers.insert(marker);
    }

    fn remove(&mut self, element: ElementId) {
        let Some(removed) = self.elements.remove(&element.0) else {
            return;
        };
        match removed.parent.and_then(|parent| self.get_mut(parent)) {
            Some(parent) => parent.children.retain(|child| *child != element),
            None => self.roots.retain(|root| *root != element),
        }

        let mut pending = removed.children;
        while let Some(id) = pending.pop() {
            if let Some(child) = self.elements.remove(&id.0) {
                pending.extend(child.children);
            }
        }
    }
}

pub fn escape_xml(input: &str) -> String {
    let mut escaped = String::new();
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
